// Personal Finance Tracker - Core Library
// Ledger store and aggregation engine, shared by the CLI and tests

pub mod error;
pub mod model;
pub mod seed;
pub mod storage;
pub mod store;
pub mod aggregation;
pub mod insights;
pub mod settings;

// Re-export commonly used types
pub use error::{Result, StoreError};
pub use model::{
    Expense, ExpenseCategory, Income, Ledger, NewExpense, NewIncome,
    EXPENSE_TYPES, INCOME_CATEGORIES,
};
pub use seed::seed_ledger;
pub use storage::{FileSlot, KeyValueSlot, MemorySlot, SqliteSlot};
pub use store::{load, save, LedgerStore, STORAGE_KEY};
pub use aggregation::{
    balance, emergency_fund, expenses_by_category, expenses_by_type, income_by_category,
    percentage_of, total_essential_expenses, total_expenses, total_income,
    total_non_essential_expenses, BreakdownEntry, Totals, EMERGENCY_FUND_MONTHS,
};
pub use insights::{recommendations, IncomeShares, Recommendation, Report};
pub use settings::{Settings, StorageBackend, StorageSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
