// Ledger Store
// Owns the ledger and the slot it is persisted to.
//
// Every mutation builds the next ledger, persists it in full, and only then
// replaces the in-memory copy. Memory and storage stay equal even when a write fails.

use crate::error::Result;
use crate::model::{check_value, Expense, Income, Ledger, NewExpense, NewIncome};
use crate::seed::seed_ledger;
use crate::storage::KeyValueSlot;
use tracing::{debug, info, warn};

/// Key the ledger is stored under.
///
/// Snake case to match the rest of the settings keys; not compatible with
/// ledgers written under the browser app's `financialData` key.
pub const STORAGE_KEY: &str = "financial_data";

/// Read the persisted ledger, falling back to the seed dataset.
///
/// Never fails: a missing value, a read error, malformed JSON, or a ledger that
/// breaks its invariants all yield the seed. Only the last three are logged as warnings.
pub fn load<S: KeyValueSlot + ?Sized>(slot: &S, key: &str) -> Ledger {
    let raw = match slot.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "no persisted ledger, using seed data");
            return seed_ledger();
        }
        Err(err) => {
            warn!(key, error = %err, "failed to read persisted ledger, using seed data");
            return seed_ledger();
        }
    };

    let ledger: Ledger = match serde_json::from_str(&raw) {
        Ok(ledger) => ledger,
        Err(err) => {
            warn!(key, error = %err, "persisted ledger is not valid JSON, using seed data");
            return seed_ledger();
        }
    };

    if let Err(err) = ledger.validate() {
        warn!(key, error = %err, "persisted ledger is malformed, using seed data");
        return seed_ledger();
    }

    info!(
        key,
        incomes = ledger.incomes.len(),
        expenses = ledger.expenses.len(),
        "loaded persisted ledger"
    );
    ledger
}

/// Serialize the whole ledger and overwrite the slot
pub fn save<S: KeyValueSlot + ?Sized>(slot: &mut S, key: &str, ledger: &Ledger) -> Result<()> {
    let json = serde_json::to_string(ledger)?;
    slot.write(key, &json)
}

pub struct LedgerStore<S: KeyValueSlot> {
    slot: S,
    key: String,
    ledger: Ledger,
}

impl<S: KeyValueSlot> LedgerStore<S> {
    /// Load from `slot` under the default key
    pub fn open(slot: S) -> Self {
        Self::open_with_key(slot, STORAGE_KEY)
    }

    pub fn open_with_key(slot: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let ledger = load(&slot, &key);
        Self { slot, key, ledger }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    pub fn into_slot(self) -> S {
        self.slot
    }

    /// Persist the current ledger as-is
    pub fn save(&mut self) -> Result<()> {
        save(&mut self.slot, &self.key, &self.ledger)
    }

    fn commit(&mut self, next: Ledger) -> Result<&Ledger> {
        save(&mut self.slot, &self.key, &next)?;
        self.ledger = next;
        Ok(&self.ledger)
    }

    // ========================================================================
    // INCOMES
    // ========================================================================

    /// Returns the stored record with its freshly assigned id
    pub fn add_income(&mut self, data: NewIncome) -> Result<Income> {
        check_value(data.value)?;
        let income = data.with_id(new_id());

        let mut next = self.ledger.clone();
        next.insert_income(income.clone());
        self.commit(next)?;

        debug!(id = %income.id, value = income.value, "income added");
        Ok(income)
    }

    /// Replace the income with the same id; unknown ids leave the ledger unchanged
    pub fn update_income(&mut self, income: Income) -> Result<&Ledger> {
        let mut next = self.ledger.clone();
        if next.find_income(&income.id).is_none() {
            debug!(id = %income.id, matched = false, "income update");
            return self.commit(next);
        }

        check_value(income.value)?;
        let id = income.id.clone();
        next.replace_income(income);
        debug!(%id, matched = true, "income update");
        self.commit(next)
    }

    pub fn delete_income(&mut self, id: &str) -> Result<&Ledger> {
        let mut next = self.ledger.clone();
        let matched = next.remove_income(id);
        debug!(id, matched, "income delete");
        self.commit(next)
    }

    // ========================================================================
    // EXPENSES
    // ========================================================================

    pub fn add_expense(&mut self, data: NewExpense) -> Result<Expense> {
        check_value(data.value)?;
        let expense = data.with_id(new_id());

        let mut next = self.ledger.clone();
        next.insert_expense(expense.clone());
        self.commit(next)?;

        debug!(
            id = %expense.id,
            value = expense.value,
            category = %expense.category,
            "expense added"
        );
        Ok(expense)
    }

    pub fn update_expense(&mut self, expense: Expense) -> Result<&Ledger> {
        let mut next = self.ledger.clone();
        if next.find_expense(&expense.id).is_none() {
            debug!(id = %expense.id, matched = false, "expense update");
            return self.commit(next);
        }

        check_value(expense.value)?;
        let id = expense.id.clone();
        next.replace_expense(expense);
        debug!(%id, matched = true, "expense update");
        self.commit(next)
    }

    pub fn delete_expense(&mut self, id: &str) -> Result<&Ledger> {
        let mut next = self.ledger.clone();
        let matched = next.remove_expense(id);
        debug!(id, matched, "expense delete");
        self.commit(next)
    }

    /// Throw away the current ledger and persist the seed dataset
    pub fn reset_to_seed(&mut self) -> Result<&Ledger> {
        info!(key = %self.key, "resetting ledger to seed data");
        self.commit(seed_ledger())
    }
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::Totals;
    use crate::error::StoreError;
    use crate::model::ExpenseCategory;
    use crate::storage::{MemorySlot, SqliteSlot};
    use std::collections::HashSet;

    /// Slot whose writes always fail
    struct BrokenSlot;

    impl KeyValueSlot for BrokenSlot {
        fn read(&self, _key: &str) -> Result<Option<String>> {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "denied",
            )))
        }

        fn write(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "denied",
            )))
        }
    }

    fn empty_store() -> LedgerStore<MemorySlot> {
        let slot = MemorySlot::with_entry(STORAGE_KEY, r#"{"incomes":[],"expenses":[]}"#);
        LedgerStore::open(slot)
    }

    fn persisted(store: &LedgerStore<MemorySlot>) -> Ledger {
        let raw = store.slot().read(STORAGE_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_load_missing_uses_seed() {
        let store = LedgerStore::open(MemorySlot::new());
        assert_eq!(store.ledger(), &seed_ledger());
    }

    #[test]
    fn test_load_malformed_json_uses_seed() {
        let slot = MemorySlot::with_entry(STORAGE_KEY, "{not json");
        assert_eq!(load(&slot, STORAGE_KEY), seed_ledger());

        let slot = MemorySlot::with_entry(STORAGE_KEY, r#"{"incomes":[]}"#);
        assert_eq!(load(&slot, STORAGE_KEY), seed_ledger());
    }

    #[test]
    fn test_load_invalid_ledger_uses_seed() {
        let raw = r#"{"incomes":[
            {"id":"a","description":"x","value":1,"category":"Salary"},
            {"id":"a","description":"y","value":2,"category":"Salary"}
        ],"expenses":[]}"#;
        let slot = MemorySlot::with_entry(STORAGE_KEY, raw);
        assert_eq!(load(&slot, STORAGE_KEY), seed_ledger());
    }

    #[test]
    fn test_load_read_error_uses_seed() {
        assert_eq!(load(&BrokenSlot, STORAGE_KEY), seed_ledger());
    }

    #[test]
    fn test_load_empty_persisted_ledger_is_kept() {
        let store = empty_store();
        assert!(store.ledger().is_empty());
    }

    #[test]
    fn test_add_assigns_unique_ids_and_persists() {
        let mut store = empty_store();

        let a = store.add_income(NewIncome::new("Salary", 5000.0, "Salary")).unwrap();
        let b = store.add_income(NewIncome::new("Salary", 5000.0, "Salary")).unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(store.ledger().incomes.len(), 2);
        assert_eq!(&persisted(&store), store.ledger());
    }

    #[test]
    fn test_add_rejects_negative_value() {
        let mut store = empty_store();
        let result = store.add_expense(NewExpense::new(
            "Refund",
            -10.0,
            ExpenseCategory::Essential,
            "Other",
        ));

        assert!(matches!(result, Err(StoreError::InvalidRecord(_))));
        assert!(store.ledger().is_empty());
    }

    #[test]
    fn test_persisted_snapshot_tracks_every_mutation() {
        let mut store = empty_store();

        let income = store.add_income(NewIncome::new("Job", 3000.0, "Salary")).unwrap();
        assert_eq!(&persisted(&store), store.ledger());

        let expense = store
            .add_expense(NewExpense::new("Rent", 900.0, ExpenseCategory::Essential, "Housing"))
            .unwrap();
        assert_eq!(&persisted(&store), store.ledger());

        let mut changed = income.clone();
        changed.value = 3200.0;
        store.update_income(changed).unwrap();
        assert_eq!(&persisted(&store), store.ledger());

        store.delete_expense(&expense.id).unwrap();
        assert_eq!(&persisted(&store), store.ledger());

        // Reopening the same slot yields the same ledger
        let expected = store.ledger().clone();
        let reopened = LedgerStore::open(store.into_slot());
        assert_eq!(reopened.ledger(), &expected);
    }

    #[test]
    fn test_add_then_delete_restores_totals() {
        let mut store = LedgerStore::open(MemorySlot::new());
        let before = Totals::compute(store.ledger());

        let expense = store
            .add_expense(NewExpense::new("Gym", 99.9, ExpenseCategory::NonEssential, "Health"))
            .unwrap();
        assert_ne!(Totals::compute(store.ledger()), before);

        store.delete_expense(&expense.id).unwrap();
        assert_eq!(Totals::compute(store.ledger()), before);

        let income = store.add_income(NewIncome::new("Gift", 150.25, "Other")).unwrap();
        store.delete_income(&income.id).unwrap();
        assert_eq!(Totals::compute(store.ledger()), before);
    }

    #[test]
    fn test_update_preserves_size_and_ids() {
        let mut store = LedgerStore::open(MemorySlot::new());
        let ids_before: HashSet<String> =
            store.ledger().expenses.iter().map(|e| e.id.clone()).collect();

        let mut target = store.ledger().expenses[0].clone();
        target.value = 1.0;
        target.category = ExpenseCategory::NonEssential;
        target.kind = "Other".to_string();
        let ledger = store.update_expense(target.clone()).unwrap();

        let ids_after: HashSet<String> = ledger.expenses.iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids_before, ids_after);
        assert_eq!(store.ledger().find_expense(&target.id), Some(&target));
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut store = LedgerStore::open(MemorySlot::new());
        let before = store.ledger().clone();

        let ghost = NewIncome::new("Ghost", 1.0, "Other").with_id("missing".to_string());
        let after = store.update_income(ghost).unwrap();

        assert_eq!(after, &before);
    }

    #[test]
    fn test_update_unknown_id_ignores_invalid_value() {
        let mut store = LedgerStore::open(MemorySlot::new());
        let before = store.ledger().clone();

        let ghost = NewIncome::new("Ghost", -1.0, "Other").with_id("missing".to_string());
        assert_eq!(store.update_income(ghost).unwrap(), &before);

        let ghost = NewExpense::new("Ghost", f64::NAN, ExpenseCategory::Essential, "Other")
            .with_id("missing".to_string());
        assert_eq!(store.update_expense(ghost).unwrap(), &before);

        // Still persisted
        let reopened = LedgerStore::open(store.into_slot());
        assert_eq!(reopened.ledger(), &before);
    }

    #[test]
    fn test_update_known_id_rejects_invalid_value() {
        let mut store = LedgerStore::open(MemorySlot::new());
        let before = store.ledger().clone();

        let mut income = before.incomes[0].clone();
        income.value = -1.0;
        let result = store.update_income(income);

        assert!(matches!(result, Err(StoreError::InvalidRecord(_))));
        assert_eq!(store.ledger(), &before);
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let mut store = LedgerStore::open(MemorySlot::new());
        let before = store.ledger().clone();
        let totals_before = Totals::compute(&before);

        store.delete_income("missing").unwrap();
        store.delete_expense("missing").unwrap();

        assert_eq!(store.ledger(), &before);
        assert_eq!(Totals::compute(store.ledger()), totals_before);
    }

    #[test]
    fn test_failed_save_keeps_memory_unchanged() {
        let mut store = LedgerStore::open(BrokenSlot);
        let before = store.ledger().clone();

        let result = store.add_income(NewIncome::new("Job", 10.0, "Salary"));
        assert!(result.is_err());
        assert!(store.delete_expense("seed-expense-1").is_err());
        assert_eq!(store.ledger(), &before);
    }

    #[test]
    fn test_reset_to_seed() {
        let mut store = empty_store();
        store.add_income(NewIncome::new("Job", 10.0, "Salary")).unwrap();

        store.reset_to_seed().unwrap();

        assert_eq!(store.ledger(), &seed_ledger());
        assert_eq!(persisted(&store), seed_ledger());
    }

    #[test]
    fn test_store_on_sqlite() {
        let slot = SqliteSlot::open_in_memory().unwrap();
        let mut store = LedgerStore::open_with_key(slot, "custom_key");
        assert_eq!(store.key(), "custom_key");

        let income = store.add_income(NewIncome::new("Job", 4200.0, "Salary")).unwrap();
        let expected = store.ledger().clone();

        let reopened = LedgerStore::open_with_key(store.into_slot(), "custom_key");
        assert_eq!(reopened.ledger(), &expected);
        assert!(reopened.ledger().find_income(&income.id).is_some());
        assert!(reopened.slot().updated_at("custom_key").unwrap().is_some());
    }
}
