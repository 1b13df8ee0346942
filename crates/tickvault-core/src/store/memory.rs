use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{decode_entry, encode_entry, RecordStore, StoreError, StoreFuture};
use crate::{CacheEntry, EntryMetadata, Symbol};

#[derive(Debug, Default)]
struct MemoryInner {
    bodies: HashMap<Symbol, Vec<u8>>,
    metadata: BTreeMap<Symbol, EntryMetadata>,
    writes: u64,
}

/// In-memory [`RecordStore`].
///
/// Entries are kept in their encoded form so reads go through the same
/// decode-and-validate path as the file backend. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    inner: Arc<RwLock<MemoryInner>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw bytes under `symbol` without validation.
    pub async fn put_raw(&self, symbol: &Symbol, body: impl Into<Vec<u8>>) {
        let mut inner = self.inner.write().await;
        inner.bodies.insert(symbol.clone(), body.into());
        inner.metadata.remove(symbol);
        inner.writes += 1;
    }

    /// Number of symbols currently stored.
    pub async fn len(&self) -> usize {
        self.inner.read().await.bodies.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Total number of writes accepted since construction.
    pub async fn write_count(&self) -> u64 {
        self.inner.read().await.writes
    }
}

impl RecordStore for MemoryRecordStore {
    fn get<'a>(&'a self, symbol: &'a Symbol) -> StoreFuture<'a, CacheEntry> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            let body = inner.bodies.get(symbol).ok_or_else(|| StoreError::NotFound {
                symbol: symbol.to_string(),
            })?;
            decode_entry(symbol, body)
        })
    }

    fn put<'a>(&'a self, entry: &'a CacheEntry) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let body = encode_entry(entry)?;
            let mut inner = self.inner.write().await;
            inner.bodies.insert(entry.symbol.clone(), body);
            inner.metadata.insert(entry.symbol.clone(), entry.metadata());
            inner.writes += 1;
            Ok(())
        })
    }

    fn list<'a>(&'a self) -> StoreFuture<'a, Vec<EntryMetadata>> {
        Box::pin(async move {
            let inner = self.inner.read().await;
            let mut listing = Vec::with_capacity(inner.bodies.len());
            for symbol in inner.bodies.keys() {
                match inner.metadata.get(symbol) {
                    Some(metadata) => listing.push(metadata.clone()),
                    // Raw bodies carry no sidecar; fall back to decoding them.
                    None => listing.push(decode_entry(symbol, &inner.bodies[symbol])?.metadata()),
                }
            }
            listing.sort_by(|a, b| a.symbol.cmp(&b.symbol));
            Ok(listing)
        })
    }
}
