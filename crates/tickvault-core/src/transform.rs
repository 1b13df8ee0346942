//! Normalization of provider daily series into ordered [`PriceRecord`]s.

use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use thiserror::Error;

use crate::{PriceRecord, TradingDate};

/// One day of the provider's `Time Series (Daily)` map, fields still string-encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawDailyBar {
    #[serde(rename = "1. open", default)]
    pub open: Option<String>,
    #[serde(rename = "2. high", default)]
    pub high: Option<String>,
    #[serde(rename = "3. low", default)]
    pub low: Option<String>,
    #[serde(rename = "4. close", default)]
    pub close: Option<String>,
    #[serde(rename = "5. volume", default)]
    pub volume: Option<String>,
}

impl RawDailyBar {
    pub fn new(open: &str, high: &str, low: &str, close: &str, volume: &str) -> Self {
        Self {
            open: Some(open.to_owned()),
            high: Some(high.to_owned()),
            low: Some(low.to_owned()),
            close: Some(close.to_owned()),
            volume: Some(volume.to_owned()),
        }
    }
}

/// Date-string keyed series as delivered by the provider.
pub type RawSeries = HashMap<String, RawDailyBar>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("invalid record for {date}: {reason}")]
    InvalidRecord { date: String, reason: String },
}

/// Convert a raw series into records sorted ascending by date.
///
/// Fails on the first unparseable entry; no partial output is returned.
pub fn transform(raw: &RawSeries) -> Result<Vec<PriceRecord>, TransformError> {
    let mut by_date = BTreeMap::new();

    for (key, bar) in raw {
        let record = parse_record(key, bar)?;
        if by_date.insert(record.date, record).is_some() {
            return Err(invalid(key, "duplicate trading date"));
        }
    }

    Ok(by_date.into_values().collect())
}

fn parse_record(key: &str, bar: &RawDailyBar) -> Result<PriceRecord, TransformError> {
    let date = TradingDate::parse_iso(key).map_err(|error| invalid(key, error))?;

    Ok(PriceRecord {
        date,
        open: parse_price(key, "open", bar.open.as_deref())?,
        high: parse_price(key, "high", bar.high.as_deref())?,
        low: parse_price(key, "low", bar.low.as_deref())?,
        close: parse_price(key, "close", bar.close.as_deref())?,
        volume: parse_volume(key, bar.volume.as_deref())?,
    })
}

fn parse_price(key: &str, field: &str, value: Option<&str>) -> Result<f64, TransformError> {
    let raw = value.ok_or_else(|| invalid(key, format_args!("missing {field}")))?;
    let price = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| invalid(key, format_args!("{field} '{raw}' is not a decimal")))?;

    if !price.is_finite() || price < 0.0 {
        return Err(invalid(
            key,
            format_args!("{field} '{raw}' must be a finite non-negative number"),
        ));
    }

    Ok(price)
}

fn parse_volume(key: &str, value: Option<&str>) -> Result<u64, TransformError> {
    let raw = value.ok_or_else(|| invalid(key, "missing volume"))?;
    raw.trim()
        .parse::<u64>()
        .map_err(|_| invalid(key, format_args!("volume '{raw}' is not a non-negative integer")))
}

fn invalid(key: &str, reason: impl std::fmt::Display) -> TransformError {
    TransformError::InvalidRecord {
        date: key.to_owned(),
        reason: reason.to_string(),
    }
}
