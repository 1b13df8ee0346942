//! Persistent per-symbol storage of cache entries.
//!
//! Callers depend on the [`RecordStore`] contract only. Two backends exist:
//!
//! | Backend | Use |
//! |---------|-----|
//! | [`FileRecordStore`] | Production; one JSON document per symbol plus a metadata sidecar |
//! | [`MemoryRecordStore`] | Tests and embedding; serialized entries behind an async `RwLock` |
//!
//! Entries are always handed out as owned copies decoded from their stored
//! form, never as references into backend state.

mod file;
mod memory;

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::{CacheEntry, EntryMetadata, Symbol};

pub use file::FileRecordStore;
pub use memory::MemoryRecordStore;

/// Boxed future returned by [`RecordStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Store-layer failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("no cached entry for '{symbol}'")]
    NotFound { symbol: String },

    /// Stored bytes do not decode into a well-formed entry. The store does not
    /// repair them; overwriting with a fresh entry is the caller's decision.
    #[error("cached entry for '{symbol}' is corrupt: {reason}")]
    CorruptEntry { symbol: String, reason: String },

    #[error("storage i/o failure at {path}: {message}")]
    Io { path: String, message: String },
}

impl StoreError {
    pub(crate) fn io(path: impl AsRef<std::path::Path>, error: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            message: error.to_string(),
        }
    }
}

/// Per-symbol storage contract.
///
/// Exactly one entry exists per canonical symbol; `put` replaces it wholesale.
pub trait RecordStore: Send + Sync {
    /// Load the entry stored under `symbol`.
    fn get<'a>(&'a self, symbol: &'a Symbol) -> StoreFuture<'a, CacheEntry>;

    /// Persist `entry` under its own symbol, replacing any previous entry.
    fn put<'a>(&'a self, entry: &'a CacheEntry) -> StoreFuture<'a, ()>;

    /// Metadata of every stored entry, ordered by symbol.
    fn list<'a>(&'a self) -> StoreFuture<'a, Vec<EntryMetadata>>;
}

/// Decode a stored entry and check it against the key it was stored under.
pub(crate) fn decode_entry(symbol: &Symbol, bytes: &[u8]) -> Result<CacheEntry, StoreError> {
    let corrupt = |reason: String| StoreError::CorruptEntry {
        symbol: symbol.to_string(),
        reason,
    };

    let entry: CacheEntry =
        serde_json::from_slice(bytes).map_err(|error| corrupt(error.to_string()))?;

    if entry.symbol != *symbol {
        return Err(corrupt(format!(
            "entry symbol '{}' does not match its key",
            entry.symbol
        )));
    }

    entry.check_invariants().map_err(corrupt)?;
    Ok(entry)
}

pub(crate) fn encode_entry(entry: &CacheEntry) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec_pretty(entry).map_err(|error| StoreError::CorruptEntry {
        symbol: entry.symbol.to_string(),
        reason: format!("entry could not be encoded: {error}"),
    })
}
