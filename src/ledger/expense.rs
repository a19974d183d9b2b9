use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
    core::time::Clock,
    currency::CurrencyCode,
    errors::{LedgerError, Result},
};

use super::category::Category;

/// Identifier assigned to an expense when it enters the ledger.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct ExpenseId(pub u64);

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single recorded expense, stored in its own currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Expense {
    pub id: ExpenseId,
    pub description: String,
    pub amount: f64,
    pub category: Category,
    pub currency: CurrencyCode,
    pub date: NaiveDate,
}

impl Expense {
    /// Returns the editable fields of this record.
    pub fn draft(&self) -> ExpenseDraft {
        ExpenseDraft {
            description: self.description.clone(),
            amount: self.amount,
            category: self.category,
            currency: self.currency.clone(),
            date: self.date,
        }
    }
}

/// User-supplied fields for creating or editing an expense.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub description: String,
    pub amount: f64,
    pub category: Category,
    pub currency: CurrencyCode,
    pub date: NaiveDate,
}

impl ExpenseDraft {
    pub fn new(
        description: impl Into<String>,
        amount: f64,
        category: Category,
        currency: CurrencyCode,
        date: NaiveDate,
    ) -> Self {
        Self {
            description: description.into(),
            amount,
            category,
            currency,
            date,
        }
    }

    /// Empty food/USD entry dated today, matching a freshly reset entry form.
    pub fn blank(clock: &dyn Clock) -> Self {
        Self::new(
            String::new(),
            0.0,
            Category::default(),
            CurrencyCode::default(),
            clock.today(),
        )
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_currency(mut self, currency: CurrencyCode) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(LedgerError::Validation(
                "description must not be empty".into(),
            ));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(LedgerError::Validation(format!(
                "amount must be a positive number, got {}",
                self.amount
            )));
        }
        if self.currency.as_str().is_empty() {
            return Err(LedgerError::Validation("currency must not be empty".into()));
        }
        Ok(())
    }

    pub(crate) fn into_expense(self, id: ExpenseId) -> Expense {
        Expense {
            id,
            description: self.description.trim().to_string(),
            amount: self.amount,
            category: self.category,
            currency: self.currency,
            date: self.date,
        }
    }
}
