//! JSON-file-backed record store.
//!
//! One `<upc>.json` file per record under the storage directory. Writes go
//! through a temp file and an atomic rename, serialized by a mutex so
//! concurrent enrichments of the same UPC never interleave partial writes
//! (last writer wins).

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::error::CacheError;
use super::types::EnrichmentRecord;
use super::RecordStore;

#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Opens (creating if needed) the storage directory.
    pub async fn open<P: Into<PathBuf>>(dir: P) -> Result<Self, CacheError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|source| CacheError::Write {
                path: dir.clone(),
                source,
            })?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    fn record_path(&self, upc: &str) -> PathBuf {
        self.dir.join(format!("{}.json", upc))
    }

    fn is_record_file(path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "json")
    }

    async fn read_record(&self, path: &Path) -> Result<EnrichmentRecord, CacheError> {
        let bytes = fs::read(path).await.map_err(|source| CacheError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| CacheError::Corrupt {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn upsert(&self, record: EnrichmentRecord) -> Result<(), CacheError> {
        let json =
            serde_json::to_vec_pretty(&record).map_err(|source| CacheError::Serialize {
                upc: record.upc.clone(),
                source,
            })?;

        let path = self.record_path(&record.upc);
        let tmp_path = path.with_extension("json.tmp");

        let _guard = self.write_lock.lock().await;

        fs::write(&tmp_path, &json)
            .await
            .map_err(|source| CacheError::Write {
                path: tmp_path.clone(),
                source,
            })?;
        fs::rename(&tmp_path, &path)
            .await
            .map_err(|source| CacheError::Write {
                path: path.clone(),
                source,
            })?;

        debug!(upc = %record.upc, path = %path.display(), "Persisted enrichment record");
        Ok(())
    }

    async fn get(&self, upc: &str) -> Result<Option<EnrichmentRecord>, CacheError> {
        let path = self.record_path(upc);
        match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|source| CacheError::Corrupt { path, source }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CacheError::Read { path, source }),
        }
    }

    async fn get_all(&self) -> Result<Vec<EnrichmentRecord>, CacheError> {
        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|source| CacheError::Read {
                path: self.dir.clone(),
                source,
            })?;

        let mut records = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| CacheError::Read {
                path: self.dir.clone(),
                source,
            })?
        {
            let path = entry.path();
            if !Self::is_record_file(&path) {
                continue;
            }
            match self.read_record(&path).await {
                Ok(record) => records.push(record),
                // A corrupt entry should not take the whole listing down.
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable cache entry"),
            }
        }

        records.sort_by(|a, b| a.upc.cmp(&b.upc));
        Ok(records)
    }

    async fn clear(&self) -> Result<usize, CacheError> {
        let _guard = self.write_lock.lock().await;

        let mut entries = fs::read_dir(&self.dir)
            .await
            .map_err(|source| CacheError::Read {
                path: self.dir.clone(),
                source,
            })?;

        let mut removed = 0;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| CacheError::Read {
                path: self.dir.clone(),
                source,
            })?
        {
            let path = entry.path();
            if !Self::is_record_file(&path) {
                continue;
            }
            fs::remove_file(&path)
                .await
                .map_err(|source| CacheError::Delete {
                    path: path.clone(),
                    source,
                })?;
            removed += 1;
        }

        Ok(removed)
    }
}
