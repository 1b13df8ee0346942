//! # Domain Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PriceRecord`] | One daily OHLCV record |
//! | [`CacheEntry`] | Stored price history for a symbol |
//! | [`EntryMetadata`] | Listing projection of a cache entry |
//! | [`Symbol`] | Canonical uppercase ticker |
//! | [`TradingDate`] | Date-only session key |
//! | [`UtcDateTime`] | UTC timestamp |

mod date;
mod models;
mod symbol;
mod timestamp;

pub use date::TradingDate;
pub use models::{CacheEntry, EntryMetadata, PriceRecord};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
