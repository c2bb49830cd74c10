// Ledger data model
// Income and expense records plus the Ledger that owns both collections.
//
// Records are identified by an opaque string (UUID v4 for new records).
// The two collections are independent: no invariant links incomes to expenses.

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

// ============================================================================
// SUGGESTED LABELS (offered to the user, never enforced)
// ============================================================================

/// Suggested expense types
pub const EXPENSE_TYPES: &[&str] = &[
    "Housing",
    "Food",
    "Transportation",
    "Health",
    "Education",
    "Leisure",
    "Utilities",
    "Taxes",
    "Insurance",
    "Debts",
    "Investments",
    "Personal Care",
    "Pets",
    "Communication",
    "Entertainment",
    "Emergencies",
    "Financial",
    "Other",
];

/// Suggested income categories
pub const INCOME_CATEGORIES: &[&str] = &["Salary", "Benefits", "Investments", "Freelance", "Other"];

// ============================================================================
// EXPENSE CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    #[serde(rename = "essential")]
    Essential,

    #[serde(rename = "non-essential")]
    NonEssential,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseCategory::Essential => "essential",
            ExpenseCategory::NonEssential => "non-essential",
        }
    }

    /// Display label used by reports
    pub fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::Essential => "Essential",
            ExpenseCategory::NonEssential => "Non-essential",
        }
    }

    /// Parse the persisted form ("essential" / "non-essential")
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "essential" => Some(ExpenseCategory::Essential),
            "non-essential" | "nonessential" | "non_essential" => {
                Some(ExpenseCategory::NonEssential)
            }
            _ => None,
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// RECORDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub id: String,
    pub description: String,
    pub value: f64,
    /// Free-text label, e.g. "Salary"
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub description: String,
    pub value: f64,
    pub category: ExpenseCategory,
    /// Free-text label, normally one of EXPENSE_TYPES
    #[serde(rename = "type")]
    pub kind: String,
}

/// Income data before an identifier is assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewIncome {
    pub description: String,
    pub value: f64,
    pub category: String,
}

/// Expense data before an identifier is assigned
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpense {
    pub description: String,
    pub value: f64,
    pub category: ExpenseCategory,
    #[serde(rename = "type")]
    pub kind: String,
}

impl NewIncome {
    pub fn new(description: &str, value: f64, category: &str) -> Self {
        Self {
            description: description.to_string(),
            value,
            category: category.to_string(),
        }
    }

    pub fn with_id(self, id: String) -> Income {
        Income {
            id,
            description: self.description,
            value: self.value,
            category: self.category,
        }
    }
}

impl NewExpense {
    pub fn new(description: &str, value: f64, category: ExpenseCategory, kind: &str) -> Self {
        Self {
            description: description.to_string(),
            value,
            category,
            kind: kind.to_string(),
        }
    }

    pub fn with_id(self, id: String) -> Expense {
        Expense {
            id,
            description: self.description,
            value: self.value,
            category: self.category,
            kind: self.kind,
        }
    }
}

/// Values must be finite and non-negative
pub fn check_value(value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(StoreError::InvalidRecord(format!(
            "value must be a non-negative number, got {}",
            value
        )));
    }
    Ok(())
}

// ============================================================================
// LEDGER
// ============================================================================

/// Persisted shape: {"incomes": [...], "expenses": [...]}
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ledger {
    pub incomes: Vec<Income>,
    pub expenses: Vec<Expense>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.incomes.is_empty() && self.expenses.is_empty()
    }

    pub fn find_income(&self, id: &str) -> Option<&Income> {
        self.incomes.iter().find(|income| income.id == id)
    }

    pub fn find_expense(&self, id: &str) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id == id)
    }

    pub fn insert_income(&mut self, income: Income) {
        self.incomes.push(income);
    }

    pub fn insert_expense(&mut self, expense: Expense) {
        self.expenses.push(expense);
    }

    /// Replace the income with the same id. Returns false if none matched.
    pub fn replace_income(&mut self, income: Income) -> bool {
        match self.incomes.iter_mut().find(|item| item.id == income.id) {
            Some(slot) => {
                *slot = income;
                true
            }
            None => false,
        }
    }

    /// Replace the expense with the same id. Returns false if none matched.
    pub fn replace_expense(&mut self, expense: Expense) -> bool {
        match self.expenses.iter_mut().find(|item| item.id == expense.id) {
            Some(slot) => {
                *slot = expense;
                true
            }
            None => false,
        }
    }

    pub fn remove_income(&mut self, id: &str) -> bool {
        let before = self.incomes.len();
        self.incomes.retain(|item| item.id != id);
        self.incomes.len() != before
    }

    pub fn remove_expense(&mut self, id: &str) -> bool {
        let before = self.expenses.len();
        self.expenses.retain(|item| item.id != id);
        self.expenses.len() != before
    }

    /// Check the invariants a persisted ledger must hold to be accepted
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for income in &self.incomes {
            check_id(&income.id)?;
            if !seen.insert(income.id.as_str()) {
                return Err(StoreError::InvalidRecord(format!(
                    "duplicate income id {}",
                    income.id
                )));
            }
            check_value(income.value)?;
        }

        let mut seen = HashSet::new();
        for expense in &self.expenses {
            check_id(&expense.id)?;
            if !seen.insert(expense.id.as_str()) {
                return Err(StoreError::InvalidRecord(format!(
                    "duplicate expense id {}",
                    expense.id
                )));
            }
            check_value(expense.value)?;
        }

        Ok(())
    }
}

fn check_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(StoreError::InvalidRecord("empty identifier".to_string()));
    }
    Ok(())
}
