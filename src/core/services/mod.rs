pub mod summary_service;

pub use summary_service::{
    CategoryTotals, ConvertedExpense, DateTotals, Summary, SummaryService,
};
