//! Blob storage for linkdrop.
//!
//! This module provides physical file storage functionality:
//! - Collision-resistant naming (`<unix-millis>-<random>.<ext>`)
//! - Streaming writes with a size ceiling
//! - Streaming reads by stored name

use std::io;
use std::path::{Path, PathBuf};

use axum::body::Bytes;
use chrono::Utc;
use futures::{Stream, StreamExt};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::{LinkdropError, Result};

/// How many fresh names to draw before giving up on a store.
const MAX_NAME_ATTEMPTS: usize = 8;

/// Longest extension carried over from the original name.
const MAX_EXTENSION_LENGTH: usize = 16;

/// Read buffer size when streaming a blob back out.
const READ_CHUNK_SIZE: usize = 64 * 1024;

/// Result of a successful store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Stored name, relative to the blob root.
    pub storage_path: String,
    /// Number of bytes written.
    pub size_bytes: u64,
}

/// Blob store for uploaded file contents.
///
/// Files are stored flat under the base directory:
/// ```text
/// {base_path}/
/// ├── 1718000000000-2983471923.txt
/// ├── 1718000000123-118273645.pdf
/// └── ...
/// ```
#[derive(Debug, Clone)]
pub struct BlobStore {
    /// Base directory for blobs.
    base_path: PathBuf,
    /// Largest accepted upload in bytes.
    max_size: u64,
}

impl BlobStore {
    /// Create a new BlobStore with the given base path and size ceiling.
    ///
    /// The base directory will be created if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>, max_size: u64) -> Result<Self> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;

        Ok(Self {
            base_path,
            max_size,
        })
    }

    /// Get the base path of this storage.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Largest accepted upload in bytes.
    pub fn max_size(&self) -> u64 {
        self.max_size
    }

    /// Write an incoming byte stream under a fresh stored name.
    ///
    /// Fails with `Validation` once the stream exceeds the size ceiling or
    /// the incoming stream itself errors; the partial file is removed on
    /// every failure path.
    pub async fn store<S, E>(&self, stream: S, original_name: &str) -> Result<StoredBlob>
    where
        S: Stream<Item = std::result::Result<Bytes, E>>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let (storage_path, mut file) = self.create_unique(original_name).await?;

        let mut stream = std::pin::pin!(stream);
        let mut written: u64 = 0;

        let copied: Result<()> = async {
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(|e| {
                    let e: Box<dyn std::error::Error + Send + Sync> = e.into();
                    tracing::warn!(error = %e, "Upload stream failed");
                    LinkdropError::Validation("upload_interrupted".to_string())
                })?;
                written += chunk.len() as u64;
                if written > self.max_size {
                    return Err(LinkdropError::Validation("file_too_large".to_string()));
                }
                file.write_all(&chunk).await?;
            }
            file.sync_all().await?;
            Ok(())
        }
        .await;

        drop(file);

        if let Err(e) = copied {
            self.remove_partial(&storage_path).await;
            return Err(e);
        }

        tracing::debug!(storage_path = %storage_path, size = written, "Stored blob");

        Ok(StoredBlob {
            storage_path,
            size_bytes: written,
        })
    }

    /// Open a stored blob for streaming.
    pub async fn retrieve(&self, storage_path: &str) -> Result<BlobReader> {
        if !Self::is_safe_name(storage_path) {
            return Err(LinkdropError::NotFound("blob".to_string()));
        }

        let file_path = self.get_file_path(storage_path);

        let file = match File::open(&file_path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(LinkdropError::NotFound(format!("blob {storage_path}")));
            }
            Err(e) => return Err(e.into()),
        };

        let len = file.metadata().await?.len();

        Ok(BlobReader { file, len })
    }

    /// Delete a blob from storage.
    ///
    /// Returns `true` if the file was deleted, `false` if it didn't exist.
    pub async fn delete(&self, storage_path: &str) -> Result<bool> {
        if !Self::is_safe_name(storage_path) {
            return Ok(false);
        }

        match fs::remove_file(self.get_file_path(storage_path)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Get the full file path for a stored name.
    fn get_file_path(&self, storage_path: &str) -> PathBuf {
        self.base_path.join(storage_path)
    }

    async fn create_unique(&self, original_name: &str) -> Result<(String, File)> {
        self.create_unique_with(|| Self::generate_stored_name(original_name))
            .await
    }

    /// Open a fresh file, drawing candidate names from `next_name`.
    async fn create_unique_with(
        &self,
        mut next_name: impl FnMut() -> String,
    ) -> Result<(String, File)> {
        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let stored_name = next_name();

            let opened = OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.get_file_path(&stored_name))
                .await;

            match opened {
                Ok(file) => return Ok((stored_name, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    tracing::warn!(
                        stored_name = %stored_name,
                        attempt,
                        "Blob name collision, drawing again"
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(LinkdropError::Storage(format!(
            "no free blob name after {MAX_NAME_ATTEMPTS} attempts"
        )))
    }

    async fn remove_partial(&self, storage_path: &str) {
        if let Err(e) = fs::remove_file(self.get_file_path(storage_path)).await {
            tracing::warn!(storage_path, error = %e, "Failed to remove partial blob");
        }
    }

    /// Generate a new stored name keeping the original extension.
    pub fn generate_stored_name(original_name: &str) -> String {
        format!(
            "{}-{}.{}",
            Utc::now().timestamp_millis(),
            rand::random::<u32>(),
            Self::extract_extension(original_name)
        )
    }

    /// Extract the file extension from a filename.
    ///
    /// Returns "bin" if there is none or it is not a short alphanumeric run.
    fn extract_extension(filename: &str) -> &str {
        Path::new(filename)
            .extension()
            .and_then(|s| s.to_str())
            .filter(|ext| {
                !ext.is_empty()
                    && ext.len() <= MAX_EXTENSION_LENGTH
                    && ext.bytes().all(|b| b.is_ascii_alphanumeric())
            })
            .unwrap_or("bin")
    }

    /// A stored name must be a bare file name inside the base directory.
    fn is_safe_name(storage_path: &str) -> bool {
        !storage_path.is_empty()
            && !storage_path.starts_with('.')
            && storage_path
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
    }
}

/// An opened blob, ready to stream.
#[derive(Debug)]
pub struct BlobReader {
    file: File,
    len: u64,
}

impl BlobReader {
    /// Size of the blob in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the blob is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stream the blob contents in fixed-size chunks.
    pub fn into_stream(self) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
        futures::stream::try_unfold(self.file, |mut file| async move {
            let mut buf = vec![0u8; READ_CHUNK_SIZE];
            let n = file.read(&mut buf).await?;
            if n == 0 {
                return Ok::<_, io::Error>(None);
            }
            buf.truncate(n);
            Ok(Some((Bytes::from(buf), file)))
        })
    }

    /// Read the whole blob into memory.
    #[cfg(test)]
    pub async fn read_all(mut self) -> Result<Vec<u8>> {
        let mut content = Vec::with_capacity(self.len as usize);
        self.file.read_to_end(&mut content).await?;
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use tempfile::TempDir;

    const MAX: u64 = 1024 * 1024;

    fn setup_storage() -> (TempDir, BlobStore) {
        let temp_dir = TempDir::new().unwrap();
        let storage = BlobStore::new(temp_dir.path(), MAX).unwrap();
        (temp_dir, storage)
    }

    fn chunks(parts: &[&[u8]]) -> impl Stream<Item = std::result::Result<Bytes, io::Error>> {
        let parts: Vec<_> = parts
            .iter()
            .map(|p| Ok(Bytes::copy_from_slice(p)))
            .collect();
        futures::stream::iter(parts)
    }

    #[test]
    fn test_new_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let storage_path = temp_dir.path().join("uploads");

        assert!(!storage_path.exists());

        let storage = BlobStore::new(&storage_path, MAX).unwrap();

        assert!(storage_path.exists());
        assert_eq!(storage.base_path(), storage_path);
        assert_eq!(storage.max_size(), MAX);
    }

    #[tokio::test]
    async fn test_store_and_retrieve() {
        let (_temp_dir, storage) = setup_storage();

        let stored = storage
            .store(chunks(&[b"Hello, ", b"World!"]), "test.txt")
            .await
            .unwrap();

        assert!(stored.storage_path.ends_with(".txt"));
        assert_eq!(stored.size_bytes, 13);

        let reader = storage.retrieve(&stored.storage_path).await.unwrap();
        assert_eq!(reader.len(), 13);
        assert_eq!(reader.read_all().await.unwrap(), b"Hello, World!");
    }

    #[tokio::test]
    async fn test_into_stream_yields_all_bytes() {
        let (_temp_dir, storage) = setup_storage();
        let content: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();

        let stored = storage
            .store(chunks(&[&content[..]]), "data.bin")
            .await
            .unwrap();

        let reader = storage.retrieve(&stored.storage_path).await.unwrap();
        let parts: Vec<Bytes> = reader.into_stream().try_collect().await.unwrap();

        assert!(parts.len() > 1);
        assert_eq!(parts.concat(), content);
    }

    #[tokio::test]
    async fn test_identical_uploads_get_distinct_names() {
        let (temp_dir, storage) = setup_storage();

        let a = storage.store(chunks(&[b"same"]), "same.txt").await.unwrap();
        let b = storage.store(chunks(&[b"same"]), "same.txt").await.unwrap();

        assert_ne!(a.storage_path, b.storage_path);
        assert!(temp_dir.path().join(&a.storage_path).is_file());
        assert!(temp_dir.path().join(&b.storage_path).is_file());
    }

    #[tokio::test]
    async fn test_store_empty_stream() {
        let (_temp_dir, storage) = setup_storage();

        let stored = storage.store(chunks(&[]), "empty.txt").await.unwrap();

        assert_eq!(stored.size_bytes, 0);
        let reader = storage.retrieve(&stored.storage_path).await.unwrap();
        assert!(reader.is_empty());
    }

    #[tokio::test]
    async fn test_store_rejects_oversized_and_cleans_up() {
        let temp_dir = TempDir::new().unwrap();
        let storage = BlobStore::new(temp_dir.path(), 8).unwrap();

        let result = storage
            .store(chunks(&[b"12345", b"67890"]), "big.txt")
            .await;

        assert!(matches!(result, Err(LinkdropError::Validation(_))));
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_store_exactly_at_limit() {
        let temp_dir = TempDir::new().unwrap();
        let storage = BlobStore::new(temp_dir.path(), 10).unwrap();

        let stored = storage.store(chunks(&[b"0123456789"]), "a.txt").await.unwrap();
        assert_eq!(stored.size_bytes, 10);
    }

    #[tokio::test]
    async fn test_store_stream_error_cleans_up() {
        let (temp_dir, storage) = setup_storage();

        let stream = futures::stream::iter(vec![
            Ok(Bytes::from_static(b"partial")),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "client went away")),
        ]);

        let result = storage.store(stream, "a.txt").await;

        assert!(
            matches!(result, Err(LinkdropError::Validation(ref reason)) if reason == "upload_interrupted")
        );
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_retrieve_not_found() {
        let (_temp_dir, storage) = setup_storage();

        let result = storage.retrieve("1700000000000-1.txt").await;

        assert!(matches!(result, Err(LinkdropError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_retrieve_rejects_traversal() {
        let (temp_dir, storage) = setup_storage();
        std::fs::write(temp_dir.path().join("secret.txt"), b"nope").unwrap();

        for bad in ["../secret.txt", "/etc/passwd", "..", ".hidden", "a\\b", ""] {
            let result = storage.retrieve(bad).await;
            assert!(
                matches!(result, Err(LinkdropError::NotFound(_))),
                "expected NotFound for {bad:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_delete() {
        let (temp_dir, storage) = setup_storage();

        let stored = storage.store(chunks(&[b"bye"]), "d.txt").await.unwrap();
        assert!(storage.delete(&stored.storage_path).await.unwrap());
        assert!(!temp_dir.path().join(&stored.storage_path).exists());
        assert!(!storage.delete(&stored.storage_path).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_redraws_on_existing_name() {
        let (temp_dir, storage) = setup_storage();
        std::fs::write(temp_dir.path().join("1700000000000-1.txt"), b"keep").unwrap();

        let mut draws = vec!["1700000000000-2.txt", "1700000000000-1.txt"];
        let (name, file) = storage
            .create_unique_with(|| draws.pop().unwrap().to_string())
            .await
            .unwrap();
        drop(file);

        assert_eq!(name, "1700000000000-2.txt");
        assert!(draws.is_empty());
        assert_eq!(
            std::fs::read(temp_dir.path().join("1700000000000-1.txt")).unwrap(),
            b"keep"
        );
    }

    #[tokio::test]
    async fn test_create_gives_up_after_max_attempts() {
        let (temp_dir, storage) = setup_storage();
        std::fs::write(temp_dir.path().join("1700000000000-1.txt"), b"keep").unwrap();

        let mut calls = 0;
        let result = storage
            .create_unique_with(|| {
                calls += 1;
                "1700000000000-1.txt".to_string()
            })
            .await;

        assert!(matches!(result, Err(LinkdropError::Storage(_))));
        assert_eq!(calls, MAX_NAME_ATTEMPTS);
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_extract_extension() {
        assert_eq!(BlobStore::extract_extension("test.txt"), "txt");
        assert_eq!(BlobStore::extract_extension("document.PDF"), "PDF");
        assert_eq!(BlobStore::extract_extension("no_ext"), "bin");
        assert_eq!(BlobStore::extract_extension("file.tar.gz"), "gz");
        assert_eq!(BlobStore::extract_extension(".hidden"), "bin");
        assert_eq!(BlobStore::extract_extension("weird.t x t"), "bin");
        assert_eq!(BlobStore::extract_extension("long.abcdefghijklmnopq"), "bin");
        assert_eq!(BlobStore::extract_extension("日本語ファイル.txt"), "txt");
    }

    #[test]
    fn test_generate_stored_name() {
        let name = BlobStore::generate_stored_name("photo.jpg");

        assert!(name.ends_with(".jpg"));
        assert!(BlobStore::is_safe_name(&name));

        let (millis, rest) = name.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert!(rest.trim_end_matches(".jpg").parse::<u32>().is_ok());
    }
}
