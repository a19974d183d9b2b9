#![doc(test(attr(deny(warnings))))]

//! Expense Ledger records personal expenses, persists them as a JSON snapshot,
//! and derives per-category and per-date totals in a chosen display currency.

pub mod config;
pub mod core;
pub mod currency;
pub mod errors;
pub mod ledger;
pub mod rates;
pub mod storage;
pub mod utils;

pub use crate::core::{ExpenseTracker, LedgerStore};
pub use errors::{LedgerError, PersistenceError, Result};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Expense ledger tracing initialized.");
    });
}
