//! Expense ledger domain models and persistence-friendly types.

pub mod category;
pub mod expense;
#[allow(clippy::module_inception)]
pub mod ledger;

pub use category::Category;
pub use expense::{Expense, ExpenseDraft, ExpenseId};
pub use ledger::{IdAllocator, IdRepair, Ledger};
