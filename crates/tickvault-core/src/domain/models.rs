use serde::{Deserialize, Serialize};

use crate::{Symbol, TradingDate, UtcDateTime};

/// One daily OHLCV record.
///
/// `low <= open, close <= high` is guaranteed by the provider and not checked here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub date: TradingDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Full stored price history for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub symbol: Symbol,
    /// Ascending by date, one record per session.
    #[serde(alias = "data")]
    pub records: Vec<PriceRecord>,
    pub last_updated: UtcDateTime,
    pub record_count: usize,
}

impl CacheEntry {
    pub fn new(symbol: Symbol, records: Vec<PriceRecord>, last_updated: UtcDateTime) -> Self {
        let record_count = records.len();
        Self {
            symbol,
            records,
            last_updated,
            record_count,
        }
    }

    /// Checks the structural invariants a stored entry must satisfy.
    pub fn check_invariants(&self) -> Result<(), String> {
        if self.record_count != self.records.len() {
            return Err(format!(
                "recordCount {} does not match {} stored records",
                self.record_count,
                self.records.len()
            ));
        }

        if let Some(pair) = self
            .records
            .windows(2)
            .find(|pair| pair[0].date >= pair[1].date)
        {
            return Err(format!(
                "records are not strictly ascending: {} precedes {}",
                pair[0].date, pair[1].date
            ));
        }

        Ok(())
    }

    pub fn metadata(&self) -> EntryMetadata {
        EntryMetadata {
            symbol: self.symbol.clone(),
            last_updated: self.last_updated,
            record_count: self.record_count,
        }
    }
}

/// Listing projection of a [`CacheEntry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryMetadata {
    pub symbol: Symbol,
    pub last_updated: UtcDateTime,
    pub record_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, close: f64) -> PriceRecord {
        PriceRecord {
            date: TradingDate::parse_iso(date).expect("valid date"),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn new_entry_counts_its_records() {
        let entry = CacheEntry::new(
            Symbol::parse("VOO").expect("valid symbol"),
            vec![record("2024-01-02", 10.0), record("2024-01-03", 11.0)],
            UtcDateTime::now(),
        );
        assert_eq!(entry.record_count, 2);
        assert!(entry.check_invariants().is_ok());
    }

    #[test]
    fn unordered_records_violate_invariants() {
        let entry = CacheEntry::new(
            Symbol::parse("VOO").expect("valid symbol"),
            vec![record("2024-01-03", 11.0), record("2024-01-02", 10.0)],
            UtcDateTime::now(),
        );
        assert!(entry.check_invariants().is_err());
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let entry = CacheEntry::new(
            Symbol::parse("voo").expect("valid symbol"),
            vec![record("2024-01-02", 10.0)],
            UtcDateTime::parse("2024-01-02T21:00:00Z").expect("valid timestamp"),
        );

        let value = serde_json::to_value(&entry).expect("entry must serialize");
        assert_eq!(value["symbol"], "VOO");
        assert_eq!(value["lastUpdated"], "2024-01-02T21:00:00Z");
        assert_eq!(value["recordCount"], 1);
        assert_eq!(value["records"][0]["date"], "2024-01-02");
        assert_eq!(value["records"][0]["volume"], 1_000);
    }
}
