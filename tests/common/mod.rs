#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use chrono::NaiveDate;
use expense_ledger::{
    core::{Clock, FixedClock, LedgerStore},
    currency::CurrencyCode,
    ledger::{Category, ExpenseDraft},
    storage::{JsonFileStore, DEFAULT_STORAGE_KEY},
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a unique directory that outlives the calling test.
pub fn temp_root() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock::at_millis(1_704_067_200_000))
}

/// Opens a file-backed store rooted at `root`.
pub fn open_store(root: &Path) -> LedgerStore {
    let backend = JsonFileStore::new(root.join("data")).expect("create json store");
    LedgerStore::open(Box::new(backend), DEFAULT_STORAGE_KEY, fixed_clock())
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn draft(
    description: &str,
    amount: f64,
    category: Category,
    currency: &str,
    on: NaiveDate,
) -> ExpenseDraft {
    ExpenseDraft::new(description, amount, category, CurrencyCode::new(currency), on)
}
