use std::{path::Path, sync::Arc};

use tracing::debug;

use crate::{
    config::{Config, RatesConfig},
    currency::{ConversionTable, CurrencyCode},
    errors::Result,
    ledger::{Expense, ExpenseDraft, ExpenseId},
    rates::{OpenExchangeRatesClient, RateCache, RateFetchError, RateProvider},
    storage::{JsonFileStore, SnapshotStore},
};

use super::{
    ledger_store::LedgerStore,
    services::{ConvertedExpense, Summary, SummaryService},
    time::{Clock, SystemClock},
};

/// Facade over the ledger, the shared rate cache, and the display currency.
///
/// Totals are derived from the current records and the cache on every read,
/// so rates replaced by a background refresh or another handle show up
/// immediately.
pub struct ExpenseTracker {
    store: LedgerStore,
    rates: RateCache,
    display_currency: CurrencyCode,
}

impl ExpenseTracker {
    pub fn new(store: LedgerStore, rates: RateCache, display_currency: CurrencyCode) -> Self {
        Self {
            store,
            rates,
            display_currency,
        }
    }

    /// Builds a tracker backed by JSON slots under the configured data directory.
    pub fn from_config(config: &Config, base: &Path) -> Result<Self> {
        let backend = JsonFileStore::new(config.resolve_data_dir(base))?;
        Ok(Self::with_backend(
            Box::new(backend),
            config,
            Arc::new(SystemClock),
        ))
    }

    pub fn with_backend(
        backend: Box<dyn SnapshotStore>,
        config: &Config,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let store = LedgerStore::open(backend, config.storage_key.clone(), clock);
        Self::new(store, RateCache::default(), config.display_currency.clone())
    }

    pub fn add_expense(&mut self, draft: ExpenseDraft) -> Result<Expense> {
        log_outcome(self.store.create(draft))
    }

    pub fn update_expense(&mut self, id: ExpenseId, draft: ExpenseDraft) -> Result<Expense> {
        log_outcome(self.store.update(id, draft))
    }

    pub fn delete_expense(&mut self, id: ExpenseId) -> Result<()> {
        log_outcome(self.store.delete(id))
    }

    /// Blank entry form dated today in the tracker's clock.
    pub fn blank_draft(&self) -> ExpenseDraft {
        ExpenseDraft::blank(self.store.clock())
    }

    pub fn set_display_currency(&mut self, currency: CurrencyCode) {
        self.display_currency = currency;
    }

    /// Installs a table obtained out of band.
    pub fn apply_rates(&self, table: ConversionTable) {
        self.rates.replace(table);
    }

    /// Fetches rates for `base`; failures keep the previous table and are returned.
    pub async fn refresh_rates<P: RateProvider>(
        &self,
        provider: &P,
        base: &CurrencyCode,
    ) -> std::result::Result<(), RateFetchError> {
        self.rates.refresh(provider, base).await.map(|_| ())
    }

    /// Refreshes from the configured rate service, quoted against its base currency.
    pub async fn refresh_rates_from_config(
        &self,
        config: &RatesConfig,
    ) -> std::result::Result<(), RateFetchError> {
        let client = OpenExchangeRatesClient::from_config(config)?;
        self.refresh_rates(&client, &config.base_currency).await
    }

    pub fn expenses(&self) -> &[Expense] {
        self.store.list()
    }

    pub fn summary(&self) -> Summary {
        SummaryService::summarize(
            self.store.list(),
            &self.rates.snapshot(),
            &self.display_currency,
        )
    }

    pub fn display_currency(&self) -> &CurrencyCode {
        &self.display_currency
    }

    pub fn rates(&self) -> &RateCache {
        &self.rates
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    pub fn converted_expenses(&self) -> Vec<ConvertedExpense> {
        SummaryService::converted_expenses(
            self.store.list(),
            &self.rates.snapshot(),
            &self.display_currency,
        )
    }

    /// Currencies selectable for entry and display.
    ///
    /// Falls back to the display currency while no rates are known.
    pub fn available_currencies(&self) -> Vec<CurrencyCode> {
        let currencies = self.rates.snapshot().currencies();
        if currencies.is_empty() {
            vec![self.display_currency.clone()]
        } else {
            currencies
        }
    }

}

fn log_outcome<T>(result: Result<T>) -> Result<T> {
    if let Err(err) = &result {
        debug!(error = %err, "mutation reported an error");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::time::FixedClock,
        ledger::Category,
        storage::MemoryStore,
    };
    use chrono::NaiveDate;

    fn tracker() -> ExpenseTracker {
        ExpenseTracker::with_backend(
            Box::new(MemoryStore::new()),
            &Config::default(),
            Arc::new(FixedClock::at_millis(1_704_067_200_000)),
        )
    }

    fn draft(amount: f64, category: Category, currency: &str) -> ExpenseDraft {
        ExpenseDraft::new(
            "Item",
            amount,
            category,
            CurrencyCode::new(currency),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
    }

    #[test]
    fn totals_follow_each_mutation() {
        let mut tracker = tracker();
        let lunch = tracker
            .add_expense(draft(12.0, Category::Food, "USD"))
            .unwrap();
        assert_eq!(tracker.summary().by_category[&Category::Food], 12.0);

        tracker
            .update_expense(lunch.id, draft(12.0, Category::Travel, "USD"))
            .unwrap();
        assert_eq!(tracker.summary().by_category[&Category::Food], 0.0);
        assert_eq!(tracker.summary().by_category[&Category::Travel], 12.0);

        tracker.delete_expense(lunch.id).unwrap();
        assert_eq!(tracker.summary().grand_total, 0.0);
        assert!(tracker.summary().by_date.is_empty());
    }

    #[test]
    fn display_currency_and_rates_rederive_totals() {
        let mut tracker = tracker();
        tracker
            .add_expense(draft(10.0, Category::Food, "USD"))
            .unwrap();
        tracker.set_display_currency(CurrencyCode::new("EUR"));
        assert_eq!(tracker.summary().by_category[&Category::Food], 10.0);
        assert_eq!(tracker.summary().degraded_count, 1);

        tracker.apply_rates(ConversionTable::new(
            CurrencyCode::new("USD"),
            [(CurrencyCode::new("USD"), 1.0), (CurrencyCode::new("EUR"), 0.5)],
        ));
        assert_eq!(tracker.summary().by_category[&Category::Food], 5.0);
        assert_eq!(tracker.summary().degraded_count, 0);
        assert_eq!(
            tracker.available_currencies(),
            vec![CurrencyCode::new("EUR"), CurrencyCode::new("USD")]
        );
    }

    #[test]
    fn summary_reads_rates_replaced_through_a_shared_cache() {
        let cache = RateCache::default();
        let mut tracker = ExpenseTracker::new(
            LedgerStore::open(
                Box::new(MemoryStore::new()),
                "expenses",
                Arc::new(FixedClock::at_millis(1_704_067_200_000)),
            ),
            cache.clone(),
            CurrencyCode::new("USD"),
        );
        tracker
            .add_expense(draft(4.0, Category::Food, "EUR"))
            .unwrap();
        assert_eq!(tracker.summary().by_category[&Category::Food], 4.0);

        cache.replace(ConversionTable::new(
            CurrencyCode::new("USD"),
            [(CurrencyCode::new("USD"), 1.0), (CurrencyCode::new("EUR"), 0.5)],
        ));
        let rows = tracker.converted_expenses();
        let summary = tracker.summary();
        assert_eq!(rows[0].amount, 8.0);
        assert_eq!(summary.by_category[&Category::Food], rows[0].amount);
        assert_eq!(summary.degraded_count, 0);
    }

    #[test]
    fn available_currencies_fall_back_to_display() {
        let tracker = tracker();
        assert_eq!(tracker.available_currencies(), vec![CurrencyCode::new("USD")]);
    }

    #[test]
    fn blank_draft_is_dated_by_the_tracker_clock() {
        let tracker = tracker();
        let blank = tracker.blank_draft();
        assert_eq!(blank.currency, CurrencyCode::new("USD"));
        assert_eq!(blank.category, Category::Food);
        assert_eq!(blank.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert!(blank.validate().is_err());
    }
}
