use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    errors::{LedgerError, Result},
    ledger::{Expense, ExpenseDraft, ExpenseId, IdAllocator, Ledger},
    storage::{
        decode_expenses, decode_id_watermark, encode_expenses, encode_id_watermark,
        id_watermark_key, SnapshotStore,
    },
};

use super::time::Clock;

/// Metadata describing how the ledger was restored at startup.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub restored: usize,
    pub warnings: Vec<String>,
}

/// Owns the ledger and writes a full snapshot after every mutation.
///
/// The highest id ever issued is kept in a sibling slot so ids of deleted
/// records stay retired across restarts.
pub struct LedgerStore {
    ledger: Ledger,
    backend: Box<dyn SnapshotStore>,
    key: String,
    ids_key: String,
    recorded_watermark: u64,
    clock: Arc<dyn Clock>,
    report: LoadReport,
}

impl LedgerStore {
    /// Restores the ledger kept under `key`.
    ///
    /// Never fails: a missing, unreadable, or unparsable snapshot yields an empty ledger.
    pub fn open(
        backend: Box<dyn SnapshotStore>,
        key: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let key = key.into();
        let ids_key = id_watermark_key(&key);
        let mut report = LoadReport::default();
        let recorded_watermark = match backend.read(&ids_key) {
            Ok(Some(payload)) => match decode_id_watermark(&payload) {
                Ok(mark) => mark,
                Err(err) => {
                    report
                        .warnings
                        .push(format!("id watermark `{}` could not be parsed: {}", ids_key, err));
                    0
                }
            },
            Ok(None) => 0,
            Err(err) => {
                report
                    .warnings
                    .push(format!("id watermark `{}` could not be read: {}", ids_key, err));
                0
            }
        };
        let expenses = match backend.read(&key) {
            Ok(Some(payload)) => match decode_expenses(&payload) {
                Ok(expenses) => expenses,
                Err(err) => {
                    report
                        .warnings
                        .push(format!("snapshot `{}` could not be parsed: {}", key, err));
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                report
                    .warnings
                    .push(format!("snapshot `{}` could not be read: {}", key, err));
                Vec::new()
            }
        };
        let (ledger, repairs) = Ledger::from_snapshot(
            expenses,
            IdAllocator::resume(recorded_watermark),
            clock.now_millis(),
        );
        report
            .warnings
            .extend(repairs.iter().map(ToString::to_string));
        for warning in &report.warnings {
            warn!(key = %key, "{}", warning);
        }
        report.restored = ledger.len();
        info!(key = %key, expenses = ledger.len(), "ledger restored");
        Self {
            ledger,
            backend,
            key,
            ids_key,
            recorded_watermark,
            clock,
            report,
        }
    }

    pub fn load_report(&self) -> &LoadReport {
        &self.report
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Validates and appends a new expense, returning the stored record.
    pub fn create(&mut self, draft: ExpenseDraft) -> Result<Expense> {
        draft.validate()?;
        let expense = self
            .ledger
            .insert(draft, self.clock.now_millis())?
            .clone();
        debug!(id = %expense.id, category = %expense.category, "expense created");
        self.persist()?;
        Ok(expense)
    }

    /// Replaces the editable fields of `id`; the id itself never changes.
    pub fn update(&mut self, id: ExpenseId, draft: ExpenseDraft) -> Result<Expense> {
        if self.ledger.get(id).is_none() {
            return Err(LedgerError::NotFound(id));
        }
        draft.validate()?;
        let expense = self
            .ledger
            .replace(id, draft)
            .cloned()
            .ok_or(LedgerError::NotFound(id))?;
        debug!(id = %expense.id, "expense updated");
        self.persist()?;
        Ok(expense)
    }

    /// Removes `id` if present. Deleting an unknown id is not an error.
    pub fn delete(&mut self, id: ExpenseId) -> Result<()> {
        match self.ledger.remove(id) {
            Some(_) => debug!(id = %id, "expense deleted"),
            None => debug!(id = %id, "delete ignored for unknown expense"),
        }
        self.persist()
    }

    pub fn list(&self) -> &[Expense] {
        self.ledger.expenses()
    }

    pub fn get(&self, id: ExpenseId) -> Option<&Expense> {
        self.ledger.get(id)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn persist(&mut self) -> Result<()> {
        let watermark = self.persist_watermark();
        let payload = encode_expenses(self.ledger.expenses())?;
        self.backend.write(&self.key, &payload).map_err(|err| {
            warn!(key = %self.key, error = %err, "ledger snapshot write failed");
            LedgerError::from(err)
        })?;
        watermark
    }

    fn persist_watermark(&mut self) -> Result<()> {
        let mark = self.ledger.high_water_mark();
        if mark <= self.recorded_watermark {
            return Ok(());
        }
        let payload = encode_id_watermark(mark)?;
        self.backend.write(&self.ids_key, &payload).map_err(|err| {
            warn!(key = %self.ids_key, error = %err, "id watermark write failed");
            LedgerError::from(err)
        })?;
        self.recorded_watermark = mark;
        Ok(())
    }
}
