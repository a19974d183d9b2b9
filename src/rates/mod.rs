//! Exchange rate retrieval and the last-known conversion table.

use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, RwLock},
};

use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::{
    config::RatesConfig,
    currency::{ConversionTable, CurrencyCode},
};

#[derive(Debug, Error)]
pub enum RateFetchError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid endpoint `{0}`")]
    Endpoint(String),
    #[error("rate service responded with status {0}")]
    Status(u16),
    #[error("malformed rates payload: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("rates payload contained no usable rates")]
    MissingRates,
}

/// Source of conversion tables quoted against a base currency.
pub trait RateProvider: Send + Sync {
    fn fetch_rates(
        &self,
        base: &CurrencyCode,
    ) -> impl Future<Output = Result<ConversionTable, RateFetchError>> + Send;
}

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    #[serde(default)]
    base: Option<String>,
    #[serde(default)]
    rates: HashMap<String, f64>,
}

/// Parses a `{ "base": .., "rates": { "EUR": 0.9, .. } }` body into a table.
///
/// Non-finite and non-positive quotes are dropped.
pub fn parse_rates_response(
    body: &str,
    requested_base: &CurrencyCode,
) -> Result<ConversionTable, RateFetchError> {
    let parsed: LatestRatesResponse = serde_json::from_str(body)?;
    let base = parsed
        .base
        .map(CurrencyCode::new)
        .unwrap_or_else(|| requested_base.clone());
    let rates: Vec<(CurrencyCode, f64)> = parsed
        .rates
        .into_iter()
        .filter(|(_, rate)| rate.is_finite() && *rate > 0.0)
        .map(|(code, rate)| (CurrencyCode::new(code), rate))
        .collect();
    if rates.is_empty() {
        return Err(RateFetchError::MissingRates);
    }
    Ok(ConversionTable::new(base, rates))
}

/// HTTP client for an openexchangerates-style `latest.json` endpoint.
#[derive(Debug, Clone)]
pub struct OpenExchangeRatesClient {
    client: Client,
    endpoint: String,
    app_id: Option<String>,
}

impl OpenExchangeRatesClient {
    pub fn new(client: Client, endpoint: impl Into<String>, app_id: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            app_id,
        }
    }

    pub fn from_config(config: &RatesConfig) -> Result<Self, RateFetchError> {
        let mut builder = Client::builder().timeout(config.timeout());
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;
        Ok(Self::new(
            client,
            config.endpoint.clone(),
            config.app_id.clone(),
        ))
    }

    pub fn request_url(&self, base: &CurrencyCode) -> Result<Url, RateFetchError> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|err| RateFetchError::Endpoint(format!("{}: {}", self.endpoint, err)))?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(app_id) = self.app_id.as_deref() {
                query.append_pair("app_id", app_id);
            }
            query.append_pair("base", base.as_str());
        }
        Ok(url)
    }
}

impl RateProvider for OpenExchangeRatesClient {
    async fn fetch_rates(&self, base: &CurrencyCode) -> Result<ConversionTable, RateFetchError> {
        let url = self.request_url(base)?;
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(RateFetchError::Status(resp.status().as_u16()));
        }
        let body = resp.text().await?;
        parse_rates_response(&body, base)
    }
}

/// Shared, last-known conversion table.
///
/// Readers never wait on a fetch; a refresh swaps the whole table when it
/// completes. Overlapping refreshes apply in completion order.
#[derive(Debug, Clone, Default)]
pub struct RateCache {
    table: Arc<RwLock<ConversionTable>>,
}

impl RateCache {
    pub fn new(initial: ConversionTable) -> Self {
        Self {
            table: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn snapshot(&self) -> ConversionTable {
        self.table
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn replace(&self, table: ConversionTable) {
        let mut guard = self
            .table
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = table;
    }

    /// Fetches a fresh table; on failure the current table is kept.
    pub async fn refresh<P: RateProvider>(
        &self,
        provider: &P,
        base: &CurrencyCode,
    ) -> Result<ConversionTable, RateFetchError> {
        match provider.fetch_rates(base).await {
            Ok(table) => {
                info!(base = %table.base(), rates = table.len(), "exchange rates refreshed");
                self.replace(table.clone());
                Ok(table)
            }
            Err(err) => {
                warn!(
                    base = %base,
                    error = %err,
                    "exchange rate refresh failed; keeping previous rates"
                );
                Err(err)
            }
        }
    }

    /// Runs [`RateCache::refresh`] on the tokio runtime without blocking the caller.
    pub fn spawn_refresh<P>(
        &self,
        provider: Arc<P>,
        base: CurrencyCode,
    ) -> JoinHandle<Result<ConversionTable, RateFetchError>>
    where
        P: RateProvider + 'static,
    {
        let cache = self.clone();
        tokio::spawn(async move { cache.refresh(provider.as_ref(), &base).await })
    }
}
