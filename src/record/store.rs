//! JSON-file backed record store.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use super::id::{generate_id, is_valid_id};
use super::lock::RecordLocks;
use super::model::FileRecord;
use crate::{LinkdropError, Result};

/// How many fresh ids to draw before giving up on a create.
const MAX_ID_ATTEMPTS: usize = 8;

/// Record store keeping one JSON document per share id.
///
/// Layout:
/// ```text
/// {data_root}/
/// ├── k3j9x0qa1z.json
/// └── 0b7mq2c8rt.json
/// ```
///
/// Counter updates are serialized per id through [`RecordLocks`] and
/// published with write-to-temp + rename, so readers never see a torn file.
#[derive(Debug)]
pub struct RecordStore {
    data_root: PathBuf,
    locks: RecordLocks,
}

impl RecordStore {
    /// Create a store rooted at `data_root`, creating the directory if needed.
    pub fn new(data_root: impl Into<PathBuf>) -> Result<Self> {
        let data_root = data_root.into();
        std::fs::create_dir_all(&data_root)?;

        Ok(Self {
            data_root,
            locks: RecordLocks::new(),
        })
    }

    /// Get the data directory of this store.
    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    /// Create a record with zeroed counters and return its new id.
    pub async fn create_record(
        &self,
        original_name: &str,
        storage_path: &str,
        size_bytes: u64,
    ) -> Result<String> {
        self.create_record_with(generate_id, original_name, storage_path, size_bytes)
            .await
    }

    /// Create a record, drawing candidate ids from `next_id`.
    async fn create_record_with(
        &self,
        mut next_id: impl FnMut() -> String,
        original_name: &str,
        storage_path: &str,
        size_bytes: u64,
    ) -> Result<String> {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let record = FileRecord::new(next_id(), original_name, storage_path, size_bytes);

            match self.write_new(&record).await {
                Ok(()) => {
                    tracing::debug!(id = %record.id, storage_path, "Created file record");
                    return Ok(record.id);
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    tracing::warn!(id = %record.id, attempt, "Record id collision, drawing again");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(LinkdropError::Storage(format!(
            "no free record id after {MAX_ID_ATTEMPTS} attempts"
        )))
    }

    /// Load a record.
    ///
    /// Unknown ids and ids that are not safe file stems are both `NotFound`.
    pub async fn get_record(&self, id: &str) -> Result<FileRecord> {
        Self::check_id(id)?;
        self.read_record(id).await
    }

    /// Count one landing-page view and return the updated record.
    pub async fn increment_view(&self, id: &str) -> Result<FileRecord> {
        self.update(id, FileRecord::record_view).await
    }

    /// Count one download and return the updated record.
    pub async fn increment_download(&self, id: &str) -> Result<FileRecord> {
        self.update(id, FileRecord::record_download).await
    }

    /// Read-modify-write one record while holding its lease.
    async fn update(&self, id: &str, apply: impl FnOnce(&mut FileRecord)) -> Result<FileRecord> {
        Self::check_id(id)?;

        let _lease = self.locks.acquire(id).await;

        let mut record = self.read_record(id).await?;
        apply(&mut record);
        self.replace(&record).await?;

        tracing::debug!(
            id,
            views = record.view_count,
            downloads = record.download_count,
            earnings = %record.earnings,
            "Updated file record"
        );

        Ok(record)
    }

    fn check_id(id: &str) -> Result<()> {
        if is_valid_id(id) {
            Ok(())
        } else {
            Err(LinkdropError::NotFound("record".to_string()))
        }
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.data_root.join(format!("{id}.json"))
    }

    async fn read_record(&self, id: &str) -> Result<FileRecord> {
        let bytes = match fs::read(self.record_path(id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(LinkdropError::NotFound(format!("record {id}")));
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&bytes)
            .map_err(|e| LinkdropError::Storage(format!("corrupt record {id}: {e}")))
    }

    /// Write a brand-new record file; fails with `AlreadyExists` on an id clash.
    ///
    /// The id is not handed out until this returns, so nobody can observe the
    /// file half-written.
    async fn write_new(&self, record: &FileRecord) -> io::Result<()> {
        let bytes = serde_json::to_vec_pretty(record)?;
        let path = self.record_path(&record.id);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;

        let written = async {
            file.write_all(&bytes).await?;
            file.sync_all().await
        }
        .await;

        if written.is_err() {
            drop(file);
            if let Err(e) = fs::remove_file(&path).await {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove partial record");
            }
        }

        written
    }

    /// Atomically replace an existing record file.
    async fn replace(&self, record: &FileRecord) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(record)?;
        let path = self.record_path(&record.id);
        let tmp = self
            .data_root
            .join(format!(".{}.{:08x}.tmp", record.id, rand::random::<u32>()));

        let written = async {
            let mut file = fs::File::create(&tmp).await?;
            file.write_all(&bytes).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&tmp, &path).await
        }
        .await;

        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&tmp).await {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    tracing::warn!(path = %tmp.display(), error = %cleanup, "Failed to remove temp record");
                }
            }
            return Err(e.into());
        }

        Ok(())
    }
}
