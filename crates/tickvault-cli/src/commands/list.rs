use serde::Serialize;
use tickvault_core::{EntryMetadata, RetrievalConfig, RetrievalError, RetrievalOrchestrator};

#[derive(Debug, Serialize)]
pub struct ListResponseData {
    pub stocks: Vec<EntryMetadata>,
}

pub async fn run(config: &RetrievalConfig) -> Result<ListResponseData, RetrievalError> {
    let orchestrator = RetrievalOrchestrator::from_config(config)?;
    let stocks = orchestrator.list().await?;
    Ok(ListResponseData { stocks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickvault_core::{CacheEntry, FileRecordStore, RecordStore, Symbol, UtcDateTime};

    #[tokio::test]
    async fn lists_entries_in_the_configured_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileRecordStore::open(dir.path()).expect("open store");
        store
            .put(&CacheEntry::new(
                Symbol::parse("VOO").expect("valid symbol"),
                Vec::new(),
                UtcDateTime::parse("2024-01-05T21:00:00Z").expect("valid timestamp"),
            ))
            .await
            .expect("put");

        let config = RetrievalConfig::default().with_data_dir(dir.path());
        let data = run(&config).await.expect("list succeeds");

        let value = serde_json::to_value(&data).expect("serializes");
        assert_eq!(value["stocks"][0]["symbol"], "VOO");
        assert_eq!(value["stocks"][0]["recordCount"], 0);
        assert_eq!(value["stocks"][0]["lastUpdated"], "2024-01-05T21:00:00Z");
    }
}
