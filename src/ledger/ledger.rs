use std::fmt;

use crate::errors::{LedgerError, Result};

use super::expense::{Expense, ExpenseDraft, ExpenseId};

/// Issues expense identifiers that are never handed out twice.
///
/// Ids are epoch milliseconds when the clock allows it, bumped past the
/// highest id issued or observed so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdAllocator {
    last_issued: u64,
}

impl IdAllocator {
    /// Allocator that continues after a previously recorded high-water mark.
    pub fn resume(last_issued: u64) -> Self {
        Self { last_issued }
    }

    pub fn observe(&mut self, id: ExpenseId) {
        self.last_issued = self.last_issued.max(id.0);
    }

    /// Returns `None` once every id above the high-water mark is spent.
    pub fn next(&mut self, now_millis: u64) -> Option<ExpenseId> {
        let candidate = now_millis.max(self.last_issued.checked_add(1)?);
        self.last_issued = candidate;
        Some(ExpenseId(candidate))
    }

    pub fn last_issued(&self) -> u64 {
        self.last_issued
    }
}

/// Adjustment made to a loaded snapshot with clashing ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdRepair {
    Reassigned { from: ExpenseId, to: ExpenseId },
    /// No unused id was left for the duplicate, so it was discarded.
    Dropped(ExpenseId),
}

impl fmt::Display for IdRepair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdRepair::Reassigned { from, to } => {
                write!(f, "duplicate expense id {} reassigned to {}", from, to)
            }
            IdRepair::Dropped(id) => {
                write!(f, "duplicate expense id {} dropped: no ids left", id)
            }
        }
    }
}

/// Insertion-ordered collection of expenses.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ledger {
    expenses: Vec<Expense>,
    ids: IdAllocator,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a ledger from a persisted snapshot, continuing from `ids`.
    ///
    /// Records sharing an id with an earlier record receive a fresh id, or are
    /// dropped when the id space is spent.
    pub fn from_snapshot(
        expenses: Vec<Expense>,
        mut ids: IdAllocator,
        now_millis: u64,
    ) -> (Self, Vec<IdRepair>) {
        for expense in &expenses {
            ids.observe(expense.id);
        }
        let mut ledger = Self {
            expenses: Vec::with_capacity(expenses.len()),
            ids,
        };
        let mut repairs = Vec::new();
        for mut expense in expenses {
            if ledger.get(expense.id).is_some() {
                match ledger.ids.next(now_millis) {
                    Some(fresh) => {
                        repairs.push(IdRepair::Reassigned {
                            from: expense.id,
                            to: fresh,
                        });
                        expense.id = fresh;
                    }
                    None => {
                        repairs.push(IdRepair::Dropped(expense.id));
                        continue;
                    }
                }
            }
            ledger.expenses.push(expense);
        }
        (ledger, repairs)
    }

    /// Appends a validated draft under a freshly issued id.
    pub fn insert(&mut self, draft: ExpenseDraft, now_millis: u64) -> Result<&Expense> {
        let id = self
            .ids
            .next(now_millis)
            .ok_or(LedgerError::IdsExhausted(self.ids.last_issued()))?;
        self.expenses.push(draft.into_expense(id));
        let last = self.expenses.len() - 1;
        Ok(&self.expenses[last])
    }

    pub fn get(&self, id: ExpenseId) -> Option<&Expense> {
        self.expenses.iter().find(|expense| expense.id == id)
    }

    /// Overwrites the editable fields of `id`, keeping its position.
    pub fn replace(&mut self, id: ExpenseId, draft: ExpenseDraft) -> Option<&Expense> {
        let slot = self.expenses.iter_mut().find(|expense| expense.id == id)?;
        *slot = draft.into_expense(id);
        Some(&*slot)
    }

    pub fn remove(&mut self, id: ExpenseId) -> Option<Expense> {
        let index = self.expenses.iter().position(|expense| expense.id == id)?;
        Some(self.expenses.remove(index))
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn iter(&self) -> impl Iterator<Item = &Expense> {
        self.expenses.iter()
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    /// Highest id ever issued or observed, including deleted ones.
    pub fn high_water_mark(&self) -> u64 {
        self.ids.last_issued()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{currency::CurrencyCode, ledger::Category};
    use chrono::NaiveDate;

    fn draft(description: &str) -> ExpenseDraft {
        ExpenseDraft::new(
            description,
            10.0,
            Category::Other,
            CurrencyCode::default(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        )
    }

    fn record(id: u64, description: &str) -> Expense {
        draft(description).into_expense(ExpenseId(id))
    }

    #[test]
    fn allocator_never_repeats_within_same_millisecond() {
        let mut ids = IdAllocator::default();
        let first = ids.next(1_000);
        let second = ids.next(1_000);
        let third = ids.next(999);
        assert_eq!(first, Some(ExpenseId(1_000)));
        assert_eq!(second, Some(ExpenseId(1_001)));
        assert_eq!(third, Some(ExpenseId(1_002)));
        assert_eq!(ids.last_issued(), 1_002);
    }

    #[test]
    fn allocator_stops_at_the_top_of_the_id_space() {
        let mut ids = IdAllocator::resume(u64::MAX - 1);
        assert_eq!(ids.next(5), Some(ExpenseId(u64::MAX)));
        assert_eq!(ids.next(5), None);
        assert_eq!(ids.next(u64::MAX), None);
        assert_eq!(ids.last_issued(), u64::MAX);
    }

    #[test]
    fn removed_ids_are_not_reissued() {
        let mut ledger = Ledger::new();
        let id = ledger.insert(draft("Taxi"), 50).unwrap().id;
        ledger.remove(id);
        let next = ledger.insert(draft("Bus"), 50).unwrap().id;
        assert_ne!(id, next);
    }

    #[test]
    fn insert_fails_once_ids_are_spent() {
        let (mut ledger, repairs) =
            Ledger::from_snapshot(vec![record(u64::MAX, "Last")], IdAllocator::default(), 7);
        assert!(repairs.is_empty());
        let err = ledger.insert(draft("Overflow"), 7).unwrap_err();
        assert!(matches!(err, LedgerError::IdsExhausted(u64::MAX)));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn replace_keeps_position_and_id() {
        let mut ledger = Ledger::new();
        let first = ledger.insert(draft("One"), 1).unwrap().id;
        ledger.insert(draft("Two"), 2).unwrap();
        let updated = ledger
            .replace(first, draft("Uno"))
            .expect("record exists")
            .clone();
        assert_eq!(updated.id, first);
        assert_eq!(ledger.expenses()[0].description, "Uno");
        assert_eq!(ledger.expenses()[1].description, "Two");
    }

    #[test]
    fn snapshot_with_duplicate_ids_gets_fresh_ids() {
        let original = record(100, "A");
        let duplicate = record(100, "B");
        let (ledger, repairs) =
            Ledger::from_snapshot(vec![original, duplicate], IdAllocator::default(), 5);
        assert_eq!(ledger.len(), 2);
        assert_eq!(
            repairs,
            vec![IdRepair::Reassigned {
                from: ExpenseId(100),
                to: ExpenseId(101)
            }]
        );
        assert_eq!(ledger.expenses()[0].id, ExpenseId(100));
        assert_eq!(ledger.expenses()[1].id, ExpenseId(101));
    }

    #[test]
    fn duplicate_at_the_top_of_the_id_space_is_dropped() {
        let (ledger, repairs) = Ledger::from_snapshot(
            vec![record(u64::MAX, "Kept"), record(u64::MAX, "Clash")],
            IdAllocator::default(),
            5,
        );
        assert_eq!(repairs, vec![IdRepair::Dropped(ExpenseId(u64::MAX))]);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.expenses()[0].description, "Kept");
    }

    #[test]
    fn snapshot_ids_raise_the_allocator_floor() {
        let (mut ledger, _) =
            Ledger::from_snapshot(vec![record(9_000, "Old")], IdAllocator::default(), 0);
        let id = ledger.insert(draft("New"), 10).unwrap().id;
        assert_eq!(id, ExpenseId(9_001));
    }

    #[test]
    fn resumed_high_water_mark_outlives_deleted_records() {
        let (mut ledger, _) =
            Ledger::from_snapshot(vec![record(500, "Kept")], IdAllocator::resume(800), 0);
        assert_eq!(ledger.high_water_mark(), 800);
        let id = ledger.insert(draft("New"), 10).unwrap().id;
        assert_eq!(id, ExpenseId(801));
    }
}
