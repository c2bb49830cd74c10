// Seed dataset
// Used whenever the persisted ledger is missing or unreadable.

use crate::model::{Expense, ExpenseCategory, Income, Ledger};

fn income(id: &str, description: &str, value: f64, category: &str) -> Income {
    Income {
        id: id.to_string(),
        description: description.to_string(),
        value,
        category: category.to_string(),
    }
}

fn expense(
    id: &str,
    description: &str,
    value: f64,
    category: ExpenseCategory,
    kind: &str,
) -> Expense {
    Expense {
        id: id.to_string(),
        description: description.to_string(),
        value,
        category,
        kind: kind.to_string(),
    }
}

/// Fixed default ledger. Ids are stable so every fallback yields an equal ledger.
pub fn seed_ledger() -> Ledger {
    use ExpenseCategory::{Essential, NonEssential};

    Ledger {
        incomes: vec![
            income("seed-income-1", "Monthly salary", 5000.0, "Salary"),
            income("seed-income-2", "Side project", 800.0, "Freelance"),
        ],
        expenses: vec![
            expense("seed-expense-1", "Rent", 1500.0, Essential, "Housing"),
            expense("seed-expense-2", "Groceries", 800.0, Essential, "Food"),
            expense("seed-expense-3", "Electricity and water", 250.0, Essential, "Utilities"),
            expense("seed-expense-4", "Bus pass", 150.0, Essential, "Transportation"),
            expense("seed-expense-5", "Streaming services", 60.0, NonEssential, "Entertainment"),
            expense("seed-expense-6", "Restaurants", 300.0, NonEssential, "Leisure"),
        ],
    }
}
