//! linkdrop - minimal file hosting
//!
//! Upload a file, get a share link. Every visit to the landing page and
//! every download is counted, and the counters feed a simple earnings figure.

pub mod blob;
pub mod config;
pub mod error;
pub mod logging;
pub mod record;
pub mod web;

pub use blob::{BlobReader, BlobStore, StoredBlob, DEFAULT_MAX_UPLOAD_SIZE};
pub use config::Config;
pub use error::{LinkdropError, Result};
pub use record::{earnings_for, FileRecord, RecordStore, DOWNLOAD_RATE, VIEW_RATE};
pub use web::{AppState, WebServer};
