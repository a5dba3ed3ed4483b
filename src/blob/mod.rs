//! Blob storage module for linkdrop.
//!
//! Uploaded bytes live here, addressed by an opaque stored name that the
//! record store keeps in `FileRecord::storage_path`.

mod storage;

pub use storage::{BlobReader, BlobStore, StoredBlob};

/// Default maximum upload size (512MB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 512 * 1024 * 1024;
