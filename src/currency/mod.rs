use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(from = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("USD")
    }
}

impl From<String> for CurrencyCode {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for CurrencyCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Exchange rates for many currencies, all quoted against one reference currency.
///
/// Tables are replaced wholesale on refresh and never patched in place.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionTable {
    base: CurrencyCode,
    rates: BTreeMap<CurrencyCode, f64>,
}

impl ConversionTable {
    pub fn new(base: CurrencyCode, rates: impl IntoIterator<Item = (CurrencyCode, f64)>) -> Self {
        Self {
            base,
            rates: rates.into_iter().collect(),
        }
    }

    /// A table with no rates; every conversion passes through unchanged.
    pub fn empty(base: CurrencyCode) -> Self {
        Self::new(base, std::iter::empty())
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    /// Rate for `code`, ignoring entries that cannot be divided by.
    pub fn rate(&self, code: &CurrencyCode) -> Option<f64> {
        self.rates
            .get(code)
            .copied()
            .filter(|rate| rate.is_finite() && *rate > 0.0)
    }

    /// Currency codes with a quoted rate, in alphabetical order.
    pub fn currencies(&self) -> Vec<CurrencyCode> {
        self.rates.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Converts `amount` from one currency into another.
    ///
    /// When either rate is unknown the amount is returned unconverted.
    pub fn convert(&self, amount: f64, from: &CurrencyCode, to: &CurrencyCode) -> f64 {
        self.convert_detailed(amount, from, to).amount
    }

    pub fn convert_detailed(
        &self,
        amount: f64,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> ConvertedAmount {
        if from == to {
            return ConvertedAmount {
                amount,
                from: from.clone(),
                to: to.clone(),
                degraded: false,
            };
        }
        match (self.rate(from), self.rate(to)) {
            (Some(from_rate), Some(to_rate)) => ConvertedAmount {
                amount: amount * to_rate / from_rate,
                from: from.clone(),
                to: to.clone(),
                degraded: false,
            },
            _ => ConvertedAmount {
                amount,
                from: from.clone(),
                to: to.clone(),
                degraded: true,
            },
        }
    }
}

impl Default for ConversionTable {
    fn default() -> Self {
        Self::empty(CurrencyCode::default())
    }
}

/// Results of a currency conversion for disclosure.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedAmount {
    pub amount: f64,
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    /// Set when a rate was missing and `amount` is still in `from` units.
    pub degraded: bool,
}

pub fn symbol_for(code: &str) -> String {
    match code {
        "USD" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        "JPY" => "¥".into(),
        "AUD" => "A$".into(),
        _ => code.into(),
    }
}

pub fn minor_units_for(code: &str) -> u8 {
    match code {
        "JPY" => 0,
        "KWD" | "BHD" => 3,
        _ => 2,
    }
}

/// Renders `amount` with the currency's minor units followed by its code, e.g. `15.56 USD`.
pub fn format_amount(amount: f64, code: &CurrencyCode) -> String {
    let precision = minor_units_for(code.as_str()) as usize;
    format!("{:.*} {}", precision, amount, code.as_str())
}

/// Renders `amount` prefixed by the currency symbol, e.g. `$15.56` or `-€3.00`.
pub fn format_with_symbol(amount: f64, code: &CurrencyCode) -> String {
    let precision = minor_units_for(code.as_str()) as usize;
    let symbol = symbol_for(code.as_str());
    let body = format!("{:.*}", precision, amount.abs());
    if amount < 0.0 {
        format!("-{}{}", symbol, body)
    } else {
        format!("{}{}", symbol, body)
    }
}
