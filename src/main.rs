use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use finance_tracker::{
    ExpenseCategory, KeyValueSlot, LedgerStore, NewExpense, NewIncome, Report, Settings,
    StorageBackend, Totals, EXPENSE_TYPES, INCOME_CATEGORIES,
};

type Store = LedgerStore<Box<dyn KeyValueSlot>>;

#[derive(Debug, Parser)]
#[command(name = "finance-tracker", version, about = "Personal income and expense tracker")]
struct Cli {
    /// Settings file (TOML)
    #[arg(long, env = "FINANCE_TRACKER_CONFIG")]
    config: Option<PathBuf>,
    /// Override storage backend
    #[arg(long, value_enum)]
    backend: Option<StorageBackend>,
    /// Override storage path (database file or directory)
    #[arg(long)]
    path: Option<PathBuf>,
    /// Override storage key
    #[arg(long)]
    key: Option<String>,
    /// Override log filter (RUST_LOG still wins)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Headline totals (default)
    Dashboard,
    /// Breakdowns and recommendations
    Report {
        #[arg(long)]
        json: bool,
    },
    /// All income and expense records
    List,
    AddIncome {
        description: String,
        value: f64,
        /// e.g. Salary, Benefits, Investments, Freelance, Other
        #[arg(long, default_value = "Other")]
        category: String,
    },
    AddExpense {
        description: String,
        value: f64,
        #[arg(long, value_parser = parse_category)]
        category: ExpenseCategory,
        /// e.g. Housing, Food, Transportation
        #[arg(long = "type", default_value = "Other")]
        kind: String,
    },
    UpdateIncome {
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        value: Option<f64>,
        #[arg(long)]
        category: Option<String>,
    },
    UpdateExpense {
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        value: Option<f64>,
        #[arg(long, value_parser = parse_category)]
        category: Option<ExpenseCategory>,
        #[arg(long = "type")]
        kind: Option<String>,
    },
    DeleteIncome {
        id: String,
    },
    DeleteExpense {
        id: String,
    },
    /// Replace everything with the seed data
    Reset,
    /// Suggested labels for categories and types
    Labels,
}

fn parse_category(s: &str) -> std::result::Result<ExpenseCategory, String> {
    ExpenseCategory::parse(s)
        .ok_or_else(|| format!("expected 'essential' or 'non-essential', got '{}'", s))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    if let Some(backend) = cli.backend {
        settings.storage.backend = backend;
    }
    if let Some(path) = cli.path {
        settings.storage.path = Some(path);
    }
    if let Some(key) = cli.key {
        settings.storage.key = key;
    }
    if let Some(level) = cli.log_level {
        settings.log_level = level;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let slot = settings
        .storage
        .open_slot()
        .with_context(|| {
            format!(
                "Failed to open storage at {}",
                settings.storage.resolved_path().display()
            )
        })?;
    let mut store = LedgerStore::open_with_key(slot, settings.storage.key.clone());

    match cli.command.unwrap_or(Command::Dashboard) {
        Command::Dashboard => print_dashboard(&store),
        Command::Report { json } => {
            let report = Report::build(store.ledger());
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Command::List => print_list(&store),
        Command::AddIncome { description, value, category } => {
            let income = store
                .add_income(NewIncome::new(&description, value, &category))
                .context("Failed to add income")?;
            println!("✓ Added income {}", income.id);
        }
        Command::AddExpense { description, value, category, kind } => {
            let expense = store
                .add_expense(NewExpense::new(&description, value, category, &kind))
                .context("Failed to add expense")?;
            println!("✓ Added expense {}", expense.id);
        }
        Command::UpdateIncome { id, description, value, category } => {
            let Some(mut income) = store.ledger().find_income(&id).cloned() else {
                println!("No income with id {}", id);
                return Ok(());
            };
            if let Some(description) = description {
                income.description = description;
            }
            if let Some(value) = value {
                income.value = value;
            }
            if let Some(category) = category {
                income.category = category;
            }
            store.update_income(income).context("Failed to update income")?;
            println!("✓ Updated income {}", id);
        }
        Command::UpdateExpense { id, description, value, category, kind } => {
            let Some(mut expense) = store.ledger().find_expense(&id).cloned() else {
                println!("No expense with id {}", id);
                return Ok(());
            };
            if let Some(description) = description {
                expense.description = description;
            }
            if let Some(value) = value {
                expense.value = value;
            }
            if let Some(category) = category {
                expense.category = category;
            }
            if let Some(kind) = kind {
                expense.kind = kind;
            }
            store.update_expense(expense).context("Failed to update expense")?;
            println!("✓ Updated expense {}", id);
        }
        Command::DeleteIncome { id } => {
            store.delete_income(&id).context("Failed to delete income")?;
            println!("✓ Deleted income {}", id);
        }
        Command::DeleteExpense { id } => {
            store.delete_expense(&id).context("Failed to delete expense")?;
            println!("✓ Deleted expense {}", id);
        }
        Command::Reset => {
            store.reset_to_seed().context("Failed to reset ledger")?;
            println!("✓ Ledger reset to seed data");
        }
        Command::Labels => {
            println!("Income categories: {}", INCOME_CATEGORIES.join(", "));
            println!("Expense types:     {}", EXPENSE_TYPES.join(", "));
        }
    }

    Ok(())
}

fn print_dashboard(store: &Store) {
    let totals = Totals::compute(store.ledger());

    println!("📊 Dashboard");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Total income:              {:>12.2}", totals.total_income);
    println!("Essential expenses:        {:>12.2}", totals.total_essential_expenses);
    println!("Non-essential expenses:    {:>12.2}", totals.total_non_essential_expenses);
    println!("Total expenses:            {:>12.2}", totals.total_expenses);
    println!("Monthly balance:           {:>12.2}", totals.balance);
    println!("Emergency fund (6 months): {:>12.2}", totals.emergency_fund);
}

fn print_report(report: &Report) {
    let shares = &report.income_shares;

    println!("📈 Report");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Essential share of income:     {:>6.1}%", shares.essential);
    println!("Non-essential share of income: {:>6.1}%", shares.non_essential);
    println!("Savings rate:                  {:>6.1}%", shares.savings_rate);

    println!("\nExpenses by category");
    for entry in &report.expenses_by_category {
        println!("  {:<24} {:>12.2} ({:.1}%)", entry.label, entry.value, entry.percentage);
    }

    println!("\nExpenses by type");
    for entry in &report.expenses_by_type {
        println!("  {:<24} {:>12.2} ({:.1}%)", entry.label, entry.value, entry.percentage);
    }

    println!("\nIncome by category");
    for entry in &report.income_by_category {
        println!("  {:<24} {:>12.2} ({:.1}%)", entry.label, entry.value, entry.percentage);
    }

    println!("\nRecommendations");
    for rec in &report.recommendations {
        let marker = if rec.is_warning() { "⚠" } else { "•" };
        println!("  {} {}", marker, rec.message());
    }
}

fn print_list(store: &Store) {
    let ledger = store.ledger();

    println!("Incomes ({})", ledger.incomes.len());
    for income in &ledger.incomes {
        println!(
            "  {}  {:<30} {:>12.2}  {}",
            income.id, income.description, income.value, income.category
        );
    }

    println!("\nExpenses ({})", ledger.expenses.len());
    for expense in &ledger.expenses {
        println!(
            "  {}  {:<30} {:>12.2}  {:<13} {}",
            expense.id,
            expense.description,
            expense.value,
            expense.category.as_str(),
            expense.kind
        );
    }
}
