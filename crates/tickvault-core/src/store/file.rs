use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use super::{decode_entry, encode_entry, RecordStore, StoreError, StoreFuture};
use crate::{CacheEntry, EntryMetadata, RetrievalConfig, Symbol};

const ENTRY_SUFFIX: &str = ".json";
const METADATA_SUFFIX: &str = ".meta.json";

/// JSON-file [`RecordStore`].
///
/// Layout under the data directory:
///
/// ```text
/// <data_dir>/VOO.json        full entry (symbol, records, lastUpdated, recordCount)
/// <data_dir>/VOO.meta.json   metadata sidecar read by `list`
/// ```
///
/// Each file is written to a temporary file in the same directory and renamed
/// into place, so readers only ever see a complete document.
#[derive(Debug)]
pub struct FileRecordStore {
    data_dir: PathBuf,
    write_guard: Mutex<()>,
}

impl FileRecordStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir).map_err(|error| StoreError::io(&data_dir, error))?;
        Ok(Self {
            data_dir,
            write_guard: Mutex::new(()),
        })
    }

    /// Open a store over an existing directory without creating anything.
    pub fn open_existing(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        let metadata = fs::metadata(&data_dir).map_err(|error| StoreError::io(&data_dir, error))?;
        if !metadata.is_dir() {
            return Err(StoreError::io(&data_dir, "not a directory"));
        }
        Ok(Self {
            data_dir,
            write_guard: Mutex::new(()),
        })
    }

    pub fn from_config(config: &RetrievalConfig) -> Result<Self, StoreError> {
        Self::open(config.data_dir.clone())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn entry_path(&self, symbol: &Symbol) -> PathBuf {
        self.data_dir.join(format!("{symbol}{ENTRY_SUFFIX}"))
    }

    fn metadata_path(&self, symbol: &Symbol) -> PathBuf {
        self.data_dir.join(format!("{symbol}{METADATA_SUFFIX}"))
    }

    async fn read_metadata(&self, symbol: &Symbol) -> Result<EntryMetadata, StoreError> {
        let path = self.metadata_path(symbol);
        if !self.sidecar_is_current(symbol).await? {
            return Ok(self.get(symbol).await?.metadata());
        }

        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let metadata: EntryMetadata =
                    serde_json::from_slice(&bytes).map_err(|error| StoreError::CorruptEntry {
                        symbol: symbol.to_string(),
                        reason: format!("metadata sidecar: {error}"),
                    })?;
                if metadata.symbol != *symbol {
                    return Err(StoreError::CorruptEntry {
                        symbol: symbol.to_string(),
                        reason: format!(
                            "metadata sidecar names '{}' instead",
                            metadata.symbol
                        ),
                    });
                }
                Ok(metadata)
            }
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                Ok(self.get(symbol).await?.metadata())
            }
            Err(error) => Err(StoreError::io(&path, error)),
        }
    }

    /// A sidecar is trusted only when it exists and is no older than its entry.
    ///
    /// Entries written before sidecars existed, and entries whose sidecar write
    /// failed after the entry was replaced, are decoded in full instead.
    async fn sidecar_is_current(&self, symbol: &Symbol) -> Result<bool, StoreError> {
        let sidecar_path = self.metadata_path(symbol);
        let sidecar = match tokio::fs::metadata(&sidecar_path).await {
            Ok(sidecar) => sidecar,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(error) => return Err(StoreError::io(&sidecar_path, error)),
        };

        let entry_path = self.entry_path(symbol);
        let entry = tokio::fs::metadata(&entry_path)
            .await
            .map_err(|error| StoreError::io(&entry_path, error))?;

        Ok(match (sidecar.modified(), entry.modified()) {
            (Ok(sidecar_mtime), Ok(entry_mtime)) => sidecar_mtime >= entry_mtime,
            // Without mtimes the write ordering in `put` is all there is to go on.
            _ => true,
        })
    }
}

impl RecordStore for FileRecordStore {
    fn get<'a>(&'a self, symbol: &'a Symbol) -> StoreFuture<'a, CacheEntry> {
        Box::pin(async move {
            let path = self.entry_path(symbol);
            let bytes = match tokio::fs::read(&path).await {
                Ok(bytes) => bytes,
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                    return Err(StoreError::NotFound {
                        symbol: symbol.to_string(),
                    });
                }
                Err(error) => return Err(StoreError::io(&path, error)),
            };
            decode_entry(symbol, &bytes)
        })
    }

    fn put<'a>(&'a self, entry: &'a CacheEntry) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let body = encode_entry(entry)?;
            let metadata =
                serde_json::to_vec_pretty(&entry.metadata()).map_err(|error| {
                    StoreError::CorruptEntry {
                        symbol: entry.symbol.to_string(),
                        reason: format!("metadata could not be encoded: {error}"),
                    }
                })?;

            let dir = self.data_dir.clone();
            let entry_path = self.entry_path(&entry.symbol);
            let metadata_path = self.metadata_path(&entry.symbol);

            let _guard = self.write_guard.lock().await;
            tokio::task::spawn_blocking(move || {
                replace_entry_files(&dir, &entry_path, &body, &metadata_path, &metadata)
            })
            .await
            .map_err(|error| StoreError::io(&self.data_dir, error))?
        })
    }

    fn list<'a>(&'a self) -> StoreFuture<'a, Vec<EntryMetadata>> {
        Box::pin(async move {
            let mut reader = tokio::fs::read_dir(&self.data_dir)
                .await
                .map_err(|error| StoreError::io(&self.data_dir, error))?;

            let mut symbols = Vec::new();
            while let Some(dir_entry) = reader
                .next_entry()
                .await
                .map_err(|error| StoreError::io(&self.data_dir, error))?
            {
                let file_name = dir_entry.file_name();
                let Some(name) = file_name.to_str() else {
                    continue;
                };
                if name.ends_with(METADATA_SUFFIX) {
                    continue;
                }
                let Some(stem) = name.strip_suffix(ENTRY_SUFFIX) else {
                    continue;
                };
                // Stray files that cannot name a symbol are not entries.
                if let Ok(symbol) = Symbol::parse(stem) {
                    if symbol.as_str() == stem {
                        symbols.push(symbol);
                    }
                }
            }
            symbols.sort();

            let mut listing = Vec::with_capacity(symbols.len());
            for symbol in &symbols {
                listing.push(self.read_metadata(symbol).await?);
            }
            Ok(listing)
        })
    }
}

/// Sidecar removed, entry renamed into place, fresh sidecar written.
///
/// A failure part way leaves either the old pair or an entry without a
/// sidecar, never an entry next to a sidecar describing something else.
fn replace_entry_files(
    dir: &Path,
    entry_path: &Path,
    body: &[u8],
    metadata_path: &Path,
    metadata: &[u8],
) -> Result<(), StoreError> {
    match fs::remove_file(metadata_path) {
        Ok(()) => {}
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
        Err(error) => return Err(StoreError::io(metadata_path, error)),
    }
    write_atomically(dir, entry_path, body)?;
    write_atomically(dir, metadata_path, metadata)
}

fn write_atomically(dir: &Path, target: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut staged =
        tempfile::NamedTempFile::new_in(dir).map_err(|error| StoreError::io(dir, error))?;
    staged
        .write_all(bytes)
        .and_then(|()| staged.as_file().sync_all())
        .map_err(|error| StoreError::io(staged.path(), error))?;
    staged
        .persist(target)
        .map_err(|error| StoreError::io(target, error.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PriceRecord, TradingDate, UtcDateTime};

    fn sample_entry(symbol: &str) -> CacheEntry {
        let record = PriceRecord {
            date: TradingDate::parse_iso("2024-01-02").expect("valid date"),
            open: 435.1,
            high: 437.2,
            low: 433.0,
            close: 436.4,
            volume: 5_120_000,
        };
        CacheEntry::new(
            Symbol::parse(symbol).expect("valid symbol"),
            vec![record],
            UtcDateTime::parse("2024-01-02T21:00:00Z").expect("valid timestamp"),
        )
    }

    #[tokio::test]
    async fn writes_entry_and_metadata_sidecar() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = FileRecordStore::open(temp.path()).expect("store opens");

        store.put(&sample_entry("voo")).await.expect("put succeeds");

        assert!(temp.path().join("VOO.json").exists());
        assert!(temp.path().join("VOO.meta.json").exists());
    }

    #[tokio::test]
    async fn open_creates_missing_directories() {
        let temp = tempfile::tempdir().expect("tempdir");
        let nested = temp.path().join("cache").join("data");
        let store = FileRecordStore::open(&nested).expect("store opens");

        assert!(nested.is_dir());
        assert!(store.list().await.expect("list succeeds").is_empty());
    }

    #[tokio::test]
    async fn list_ignores_stray_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = FileRecordStore::open(temp.path()).expect("store opens");
        store.put(&sample_entry("VOO")).await.expect("put succeeds");
        fs::write(temp.path().join("notes.txt"), "hello").expect("write stray file");
        fs::write(temp.path().join("lower.json"), "{}").expect("write stray file");

        let listing = store.list().await.expect("list succeeds");
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].symbol.as_str(), "VOO");
    }

    #[test]
    fn open_existing_never_creates_the_directory() {
        let temp = tempfile::tempdir().expect("tempdir");
        let missing = temp.path().join("absent");

        let error = FileRecordStore::open_existing(&missing).expect_err("must fail");

        assert!(matches!(error, StoreError::Io { .. }));
        assert!(!missing.exists());
    }

    #[tokio::test]
    async fn put_replaces_the_sidecar_along_with_the_entry() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = FileRecordStore::open(temp.path()).expect("store opens");
        store.put(&sample_entry("VOO")).await.expect("first put");

        let mut newer = sample_entry("VOO");
        newer.last_updated = UtcDateTime::parse("2024-01-03T21:00:00Z").expect("valid timestamp");
        store.put(&newer).await.expect("second put");

        let sidecar: EntryMetadata = serde_json::from_slice(
            &fs::read(temp.path().join("VOO.meta.json")).expect("sidecar exists"),
        )
        .expect("sidecar decodes");
        assert_eq!(sidecar, newer.metadata());
    }

    #[tokio::test]
    async fn missing_sidecar_falls_back_to_the_entry() {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = FileRecordStore::open(temp.path()).expect("store opens");
        store.put(&sample_entry("VOO")).await.expect("put succeeds");
        fs::remove_file(temp.path().join("VOO.meta.json")).expect("remove sidecar");

        let listing = store.list().await.expect("list succeeds");

        assert_eq!(listing, vec![sample_entry("VOO").metadata()]);
    }
}
