// Report and recommendations
// Income shares, breakdowns and budgeting advice derived from the totals.

use crate::aggregation::{
    expenses_by_category, expenses_by_type, income_by_category, percentage_of, BreakdownEntry,
    Totals, EMERGENCY_FUND_MONTHS,
};
use crate::model::Ledger;
use serde::{Deserialize, Serialize};

/// Above this share of income, essential spending is flagged
pub const ESSENTIAL_LIMIT_PCT: f64 = 50.0;
/// Above this share of income, non-essential spending is flagged
pub const NON_ESSENTIAL_LIMIT_PCT: f64 = 30.0;
/// Savings rate considered healthy
pub const SAVINGS_TARGET_PCT: f64 = 20.0;
/// Above this share of expenses, debt payments are flagged
pub const DEBT_LIMIT_PCT: f64 = 20.0;
/// Expense type label that holds debt payments
pub const DEBT_TYPE: &str = "Debts";

/// Spending and savings as percentages of total income (0 when there is no income)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IncomeShares {
    pub essential: f64,
    pub non_essential: f64,
    pub savings_rate: f64,
}

impl IncomeShares {
    pub fn from_totals(totals: &Totals) -> Self {
        IncomeShares {
            essential: percentage_of(totals.total_essential_expenses, totals.total_income),
            non_essential: percentage_of(totals.total_non_essential_expenses, totals.total_income),
            savings_rate: percentage_of(totals.balance, totals.total_income),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    HighEssentialSpending,
    HighDiscretionarySpending,
    LowSavingsRate,
    Deficit,
    HighDebt,
    HealthySavings,
    KeepEmergencyFund,
}

impl Recommendation {
    pub fn message(&self) -> &'static str {
        match self {
            Recommendation::HighEssentialSpending => {
                "Essential expenses are above 50% of your income. Consider cutting housing costs or renegotiating debts."
            }
            Recommendation::HighDiscretionarySpending => {
                "Non-essential expenses are above 30% of your income. Consider cutting leisure, subscriptions and non-essential purchases."
            }
            Recommendation::LowSavingsRate => {
                "You are saving less than 20% of your income. Try to raise your savings rate to build a sturdier emergency fund."
            }
            Recommendation::Deficit => {
                "You are spending more than you earn. Review your spending and cut non-essential expenses now."
            }
            Recommendation::HighDebt => {
                "Debt payments are very high. Consider renegotiating or consolidating your debts."
            }
            Recommendation::HealthySavings => {
                "You are saving at least 20% of your income. Keep it up and consider investing the surplus."
            }
            Recommendation::KeepEmergencyFund => {
                "Keep an emergency fund worth at least 6 months of expenses."
            }
        }
    }

    /// Warnings need action; the rest are informational
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            Recommendation::HighEssentialSpending
                | Recommendation::HighDiscretionarySpending
                | Recommendation::LowSavingsRate
                | Recommendation::Deficit
                | Recommendation::HighDebt
        )
    }
}

/// Advice in display order. The emergency fund reminder is always last.
pub fn recommendations(totals: &Totals, by_type: &[BreakdownEntry]) -> Vec<Recommendation> {
    let shares = IncomeShares::from_totals(totals);
    let mut out = Vec::new();

    if shares.essential > ESSENTIAL_LIMIT_PCT {
        out.push(Recommendation::HighEssentialSpending);
    }
    if shares.non_essential > NON_ESSENTIAL_LIMIT_PCT {
        out.push(Recommendation::HighDiscretionarySpending);
    }
    if totals.balance > 0.0 && shares.savings_rate < SAVINGS_TARGET_PCT {
        out.push(Recommendation::LowSavingsRate);
    }
    if totals.balance <= 0.0 {
        out.push(Recommendation::Deficit);
    }
    if by_type
        .iter()
        .any(|entry| entry.label == DEBT_TYPE && entry.percentage > DEBT_LIMIT_PCT)
    {
        out.push(Recommendation::HighDebt);
    }
    if totals.total_income > 0.0 && shares.savings_rate >= SAVINGS_TARGET_PCT {
        out.push(Recommendation::HealthySavings);
    }

    out.push(Recommendation::KeepEmergencyFund);
    out
}

/// Everything the reports view shows, computed from one ledger snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub totals: Totals,
    pub emergency_fund_months: f64,
    pub income_shares: IncomeShares,
    pub expenses_by_type: Vec<BreakdownEntry>,
    pub expenses_by_category: Vec<BreakdownEntry>,
    pub income_by_category: Vec<BreakdownEntry>,
    pub recommendations: Vec<Recommendation>,
}

impl Report {
    pub fn build(ledger: &Ledger) -> Self {
        let totals = Totals::compute(ledger);
        let by_type = expenses_by_type(ledger);
        let recommendations = recommendations(&totals, &by_type);

        Report {
            totals,
            emergency_fund_months: EMERGENCY_FUND_MONTHS,
            income_shares: IncomeShares::from_totals(&totals),
            expenses_by_type: by_type,
            expenses_by_category: expenses_by_category(ledger),
            income_by_category: income_by_category(ledger),
            recommendations,
        }
    }
}
