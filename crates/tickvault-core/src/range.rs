//! Inclusive date-window filtering.

use crate::{PriceRecord, TradingDate};

/// Records of an ascending sequence that fall within `[start, end]`, order preserved.
///
/// Because the input is sorted the window is located by binary search.
pub fn filter(
    records: &[PriceRecord],
    start: Option<TradingDate>,
    end: Option<TradingDate>,
) -> Vec<PriceRecord> {
    let lower = start.map_or(0, |start| records.partition_point(|r| r.date < start));
    let upper = end.map_or(records.len(), |end| records.partition_point(|r| r.date <= end));

    if lower >= upper {
        return Vec::new();
    }
    records[lower..upper].to_vec()
}
