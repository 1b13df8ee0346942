//! End-to-end "get daily history for a symbol" operation.
//!
//! ```text
//! serve ─▶ force_refresh? ──yes──────────────────────────▶ refresh ─┐
//!              │ no                                                   │
//!              ▼                                                      │
//!          store.get ─▶ fresh? ──no / not found──────────▶ refresh ─┤
//!                          │ yes                                      │
//!                          ▼                                          ▼
//!                      cached entry ─────────────────────▶ range filter ─▶ response
//! ```
//!
//! `refresh` is single-flight per symbol: concurrent callers needing a fetch
//! for the same symbol await one shared fetch-and-store and all receive its
//! outcome. The fetch-and-store runs as its own task, so it completes (and
//! the entry is saved) even when every caller stops waiting.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::fetcher::AlphaVantageFetcher;
use crate::freshness::FreshnessPolicy;
use crate::range;
use crate::store::{FileRecordStore, RecordStore, StoreError};
use crate::{
    CacheEntry, EntryMetadata, ErrorKind, PriceRecord, RetrievalConfig, RetrievalError, Symbol,
    TradingDate, UtcDateTime,
};

type RefreshOutcome = Result<CacheEntry, RetrievalError>;
/// Receives `Some(outcome)` once the refresh task for a symbol finishes.
type SharedRefresh = watch::Receiver<Option<RefreshOutcome>>;
type InFlight = Arc<Mutex<HashMap<Symbol, SharedRefresh>>>;

/// Caller input for [`RetrievalOrchestrator::serve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeRequest {
    /// Ticker as typed by the caller; canonicalized before use.
    pub symbol: String,
    pub start_date: Option<TradingDate>,
    pub end_date: Option<TradingDate>,
    /// Skip the cache read and always fetch from the provider.
    pub force_refresh: bool,
}

impl ServeRequest {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            start_date: None,
            end_date: None,
            force_refresh: false,
        }
    }

    pub fn with_range(mut self, start_date: Option<TradingDate>, end_date: Option<TradingDate>) -> Self {
        self.start_date = start_date;
        self.end_date = end_date;
        self
    }

    pub fn with_force_refresh(mut self, force_refresh: bool) -> Self {
        self.force_refresh = force_refresh;
        self
    }
}

/// Filtered history plus the metadata of the entry it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServeResponse {
    pub symbol: Symbol,
    pub records: Vec<PriceRecord>,
    pub last_updated: UtcDateTime,
    pub total_records: usize,
    pub filtered_records: usize,
    /// `false` whenever this call performed (or joined) a provider fetch.
    pub from_cache: bool,
}

/// Composes store, freshness policy, fetcher and range filter.
pub struct RetrievalOrchestrator {
    store: Arc<dyn RecordStore>,
    fetcher: AlphaVantageFetcher,
    freshness: FreshnessPolicy,
    in_flight: InFlight,
}

impl RetrievalOrchestrator {
    pub fn new(
        store: Arc<dyn RecordStore>,
        fetcher: AlphaVantageFetcher,
        freshness: FreshnessPolicy,
    ) -> Self {
        Self {
            store,
            fetcher,
            freshness,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Production wiring: JSON file store under `config.data_dir`, reqwest transport.
    pub fn from_config(config: &RetrievalConfig) -> Result<Self, RetrievalError> {
        let store = FileRecordStore::from_config(config)?;
        Ok(Self::new(
            Arc::new(store),
            AlphaVantageFetcher::from_config(config),
            FreshnessPolicy::new(config.ttl),
        ))
    }

    pub fn freshness(&self) -> FreshnessPolicy {
        self.freshness
    }

    pub async fn serve(&self, request: ServeRequest) -> Result<ServeResponse, RetrievalError> {
        let symbol = Symbol::parse(&request.symbol)?;

        let (entry, from_cache) = if request.force_refresh {
            info!(%symbol, "forced refresh requested");
            (self.refresh(&symbol).await?, false)
        } else {
            match self.store.get(&symbol).await {
                Ok(entry) => {
                    let now = UtcDateTime::now();
                    let age_hours = entry.last_updated.age_at(now).as_seconds_f64() / 3_600.0;
                    if self.freshness.is_fresh(&entry, now) {
                        info!(%symbol, age_hours, "using cached data");
                        (entry, true)
                    } else {
                        info!(%symbol, age_hours, "cached data is stale");
                        (self.refresh(&symbol).await?, false)
                    }
                }
                Err(StoreError::NotFound { .. }) => {
                    info!(%symbol, "no cached data");
                    (self.refresh(&symbol).await?, false)
                }
                Err(error) => return Err(error.into()),
            }
        };

        let records = range::filter(&entry.records, request.start_date, request.end_date);
        Ok(ServeResponse {
            filtered_records: records.len(),
            total_records: entry.record_count,
            last_updated: entry.last_updated,
            symbol: entry.symbol,
            records,
            from_cache,
        })
    }

    /// Metadata for every stored symbol.
    pub async fn list(&self) -> Result<Vec<EntryMetadata>, RetrievalError> {
        Ok(self.store.list().await?)
    }

    async fn refresh(&self, symbol: &Symbol) -> RefreshOutcome {
        let mut shared = {
            let mut in_flight = lock_in_flight(&self.in_flight);
            match in_flight.get(symbol) {
                Some(shared) => {
                    debug!(%symbol, "joining in-flight refresh");
                    shared.clone()
                }
                None => {
                    let (sender, shared) = watch::channel(None);
                    in_flight.insert(symbol.clone(), shared.clone());
                    self.spawn_refresh(symbol.clone(), sender, shared.clone());
                    shared
                }
            }
        };

        let outcome = match shared.wait_for(Option::is_some).await {
            Ok(published) => published.clone(),
            Err(_) => None,
        };

        outcome.unwrap_or_else(|| {
            // The task ended without publishing, so its slot is dead.
            let mut in_flight = lock_in_flight(&self.in_flight);
            if in_flight
                .get(symbol)
                .is_some_and(|current| current.same_channel(&shared))
            {
                in_flight.remove(symbol);
            }
            Err(RetrievalError::new(
                ErrorKind::TransportFailure,
                format!("refresh of '{symbol}' ended without a result"),
            ))
        })
    }

    /// Detached fetch-and-store; publishes its outcome, then frees the slot.
    fn spawn_refresh(
        &self,
        symbol: Symbol,
        sender: watch::Sender<Option<RefreshOutcome>>,
        slot: SharedRefresh,
    ) {
        let store = Arc::clone(&self.store);
        let fetcher = self.fetcher.clone();
        let in_flight = Arc::clone(&self.in_flight);

        tokio::spawn(async move {
            let outcome = fetch_and_store(store.as_ref(), &fetcher, &symbol).await;
            if let Err(error) = &outcome {
                warn!(%symbol, %error, "refresh failed");
            }
            sender.send_replace(Some(outcome));

            let mut in_flight = lock_in_flight(&in_flight);
            if in_flight
                .get(&symbol)
                .is_some_and(|current| current.same_channel(&slot))
            {
                in_flight.remove(&symbol);
            }
        });
    }
}

/// The entry is only written after the fetch and transform both succeed.
async fn fetch_and_store(
    store: &dyn RecordStore,
    fetcher: &AlphaVantageFetcher,
    symbol: &Symbol,
) -> RefreshOutcome {
    let entry = fetcher.fetch(symbol).await?;
    store.put(&entry).await?;
    info!(%symbol, records = entry.record_count, "saved entry to cache");
    Ok(entry)
}

fn lock_in_flight(in_flight: &InFlight) -> MutexGuard<'_, HashMap<Symbol, SharedRefresh>> {
    in_flight.lock().unwrap_or_else(PoisonError::into_inner)
}
