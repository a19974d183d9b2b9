//! Ledger orchestration: the persisted store, derived summaries, and the tracker facade.

pub mod ledger_store;
pub mod services;
pub mod time;
pub mod tracker;
pub mod utils;

pub use ledger_store::{LedgerStore, LoadReport};
pub use time::{Clock, FixedClock, SystemClock};
pub use tracker::ExpenseTracker;
