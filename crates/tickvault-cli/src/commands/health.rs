use std::path::PathBuf;

use serde::Serialize;
use tickvault_core::{FileRecordStore, RecordStore, RetrievalConfig, UtcDateTime};
use tracing::warn;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub timestamp: UtcDateTime,
    pub cache_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_symbols: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Health never fails; an unreadable cache directory is reported as `degraded`.
/// A cache directory that does not exist yet is healthy and empty, and is left
/// uncreated.
pub async fn run(config: &RetrievalConfig) -> HealthReport {
    let listing = if tokio::fs::try_exists(&config.data_dir).await.unwrap_or(true) {
        match FileRecordStore::open_existing(&config.data_dir) {
            Ok(store) => store.list().await,
            Err(error) => Err(error),
        }
    } else {
        Ok(Vec::new())
    };

    let (status, cached_symbols, detail) = match listing {
        Ok(entries) => ("ok", Some(entries.len()), None),
        Err(error) => {
            warn!(%error, "cache directory is not healthy");
            ("degraded", None, Some(error.to_string()))
        }
    };

    HealthReport {
        status,
        timestamp: UtcDateTime::now(),
        cache_dir: config.data_dir.clone(),
        cached_symbols,
        detail,
    }
}
