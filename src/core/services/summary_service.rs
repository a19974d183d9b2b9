use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{
    currency::{ConversionTable, CurrencyCode},
    ledger::{Category, Expense, ExpenseId},
};

/// Converted spend per category; every category is present.
pub type CategoryTotals = BTreeMap<Category, f64>;
/// Converted spend per calendar date, ascending; dates without expenses are absent.
pub type DateTotals = BTreeMap<NaiveDate, f64>;

/// One expense expressed in the display currency.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedExpense {
    pub id: ExpenseId,
    pub date: NaiveDate,
    pub description: String,
    pub category: Category,
    pub amount: f64,
    /// True when no rate was available and `amount` is in the expense's own currency.
    pub degraded: bool,
}

/// Derived views over the ledger for a single display currency.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub display_currency: CurrencyCode,
    pub by_category: CategoryTotals,
    pub by_date: DateTotals,
    pub grand_total: f64,
    /// Number of expenses summed without conversion.
    pub degraded_count: usize,
}

impl Summary {
    /// Categories with a non-zero total, in category order. Used for chart slices.
    pub fn non_zero_categories(&self) -> Vec<(Category, f64)> {
        self.by_category
            .iter()
            .filter(|(_, total)| **total != 0.0)
            .map(|(category, total)| (*category, *total))
            .collect()
    }
}

pub struct SummaryService;

impl SummaryService {
    pub fn totals_by_category(
        expenses: &[Expense],
        rates: &ConversionTable,
        display: &CurrencyCode,
    ) -> CategoryTotals {
        let mut totals: CategoryTotals = Category::ALL
            .iter()
            .map(|category| (*category, 0.0))
            .collect();
        for expense in expenses {
            *totals.entry(expense.category).or_insert(0.0) +=
                rates.convert(expense.amount, &expense.currency, display);
        }
        totals
    }

    pub fn totals_by_date(
        expenses: &[Expense],
        rates: &ConversionTable,
        display: &CurrencyCode,
    ) -> DateTotals {
        let mut totals = DateTotals::new();
        for expense in expenses {
            *totals.entry(expense.date).or_insert(0.0) +=
                rates.convert(expense.amount, &expense.currency, display);
        }
        totals
    }

    /// Per-row display values, in ledger order.
    pub fn converted_expenses(
        expenses: &[Expense],
        rates: &ConversionTable,
        display: &CurrencyCode,
    ) -> Vec<ConvertedExpense> {
        expenses
            .iter()
            .map(|expense| {
                let converted = rates.convert_detailed(expense.amount, &expense.currency, display);
                ConvertedExpense {
                    id: expense.id,
                    date: expense.date,
                    description: expense.description.clone(),
                    category: expense.category,
                    amount: converted.amount,
                    degraded: converted.degraded,
                }
            })
            .collect()
    }

    pub fn summarize(
        expenses: &[Expense],
        rates: &ConversionTable,
        display: &CurrencyCode,
    ) -> Summary {
        let by_category = Self::totals_by_category(expenses, rates, display);
        let by_date = Self::totals_by_date(expenses, rates, display);
        let grand_total = by_category.values().sum();
        let degraded_count = expenses
            .iter()
            .filter(|expense| {
                rates
                    .convert_detailed(expense.amount, &expense.currency, display)
                    .degraded
            })
            .count();
        Summary {
            display_currency: display.clone(),
            by_category,
            by_date,
            grand_total,
            degraded_count,
        }
    }
}
