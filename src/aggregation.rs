// Aggregation Engine
// Pure functions over a ledger snapshot. Nothing is cached: every call
// recomputes from the full ledger.

use crate::model::{ExpenseCategory, Ledger};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Months of balance the emergency fund target covers
pub const EMERGENCY_FUND_MONTHS: f64 = 6.0;

// ============================================================================
// TOTALS
// ============================================================================

pub fn total_income(ledger: &Ledger) -> f64 {
    ledger.incomes.iter().map(|income| income.value).sum()
}

pub fn total_for_category(ledger: &Ledger, category: ExpenseCategory) -> f64 {
    ledger
        .expenses
        .iter()
        .filter(|expense| expense.category == category)
        .map(|expense| expense.value)
        .sum()
}

pub fn total_essential_expenses(ledger: &Ledger) -> f64 {
    total_for_category(ledger, ExpenseCategory::Essential)
}

pub fn total_non_essential_expenses(ledger: &Ledger) -> f64 {
    total_for_category(ledger, ExpenseCategory::NonEssential)
}

pub fn total_expenses(ledger: &Ledger) -> f64 {
    total_essential_expenses(ledger) + total_non_essential_expenses(ledger)
}

/// Income minus expenses. Can be negative.
pub fn balance(ledger: &Ledger) -> f64 {
    total_income(ledger) - total_expenses(ledger)
}

/// Six months of balance. Not floored: a negative balance gives a negative target.
pub fn emergency_fund(ledger: &Ledger) -> f64 {
    balance(ledger) * EMERGENCY_FUND_MONTHS
}

/// Every headline figure of the dashboard in one pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub total_income: f64,
    pub total_essential_expenses: f64,
    pub total_non_essential_expenses: f64,
    pub total_expenses: f64,
    pub balance: f64,
    pub emergency_fund: f64,
}

impl Totals {
    pub fn compute(ledger: &Ledger) -> Self {
        let total_income = total_income(ledger);
        let total_essential_expenses = total_essential_expenses(ledger);
        let total_non_essential_expenses = total_non_essential_expenses(ledger);
        let total_expenses = total_essential_expenses + total_non_essential_expenses;
        let balance = total_income - total_expenses;

        Totals {
            total_income,
            total_essential_expenses,
            total_non_essential_expenses,
            total_expenses,
            balance,
            emergency_fund: balance * EMERGENCY_FUND_MONTHS,
        }
    }
}

// ============================================================================
// BREAKDOWNS
// ============================================================================

/// `value / total * 100`, or 0 when the total is zero
pub fn percentage_of(value: f64, total: f64) -> f64 {
    if total == 0.0 {
        return 0.0;
    }
    let pct = value / total * 100.0;
    if pct.is_finite() {
        pct
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub label: String,
    pub value: f64,
    pub percentage: f64,
}

/// Sum `(label, value)` pairs by label, largest first
fn group<'a, I>(items: I, total: f64) -> Vec<BreakdownEntry>
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    for (label, value) in items {
        *sums.entry(label).or_insert(0.0) += value;
    }

    let mut entries: Vec<BreakdownEntry> = sums
        .into_iter()
        .map(|(label, value)| BreakdownEntry {
            label: label.to_string(),
            value,
            percentage: percentage_of(value, total),
        })
        .collect();

    // BTreeMap already ordered labels; a stable sort keeps that order on ties
    entries.sort_by(|a, b| b.value.total_cmp(&a.value));
    entries
}

/// Expense value per type label, as a share of total expenses
pub fn expenses_by_type(ledger: &Ledger) -> Vec<BreakdownEntry> {
    group(
        ledger
            .expenses
            .iter()
            .map(|expense| (expense.kind.as_str(), expense.value)),
        total_expenses(ledger),
    )
}

/// Income value per category label, as a share of total income
pub fn income_by_category(ledger: &Ledger) -> Vec<BreakdownEntry> {
    group(
        ledger
            .incomes
            .iter()
            .map(|income| (income.category.as_str(), income.value)),
        total_income(ledger),
    )
}

/// Essential then non-essential, as shares of total expenses
pub fn expenses_by_category(ledger: &Ledger) -> Vec<BreakdownEntry> {
    let total = total_expenses(ledger);
    [ExpenseCategory::Essential, ExpenseCategory::NonEssential]
        .into_iter()
        .map(|category| {
            let value = total_for_category(ledger, category);
            BreakdownEntry {
                label: category.label().to_string(),
                value,
                percentage: percentage_of(value, total),
            }
        })
        .collect()
}
