//! HTTP handlers for the linkdrop web front-end.

pub mod file;
pub mod site;

pub use file::*;
pub use site::*;

use crate::blob::BlobStore;
use crate::config::Config;
use crate::record::RecordStore;
use crate::web::link::LinkBuilder;
use crate::web::page::Pages;
use crate::Result;

/// Application state shared across handlers.
#[derive(Debug)]
pub struct AppState {
    /// Share records.
    pub records: RecordStore,
    /// Uploaded file contents.
    pub blobs: BlobStore,
    /// Compiled HTML pages.
    pub pages: Pages,
    /// Share link builder.
    pub links: LinkBuilder,
}

impl AppState {
    /// Create a new application state from already-opened stores.
    pub fn new(records: RecordStore, blobs: BlobStore, links: LinkBuilder) -> Result<Self> {
        Ok(Self {
            records,
            blobs,
            pages: Pages::new()?,
            links,
        })
    }

    /// Resolve storage roots and open both stores.
    pub fn from_config(config: &Config) -> Result<Self> {
        let roots = config.storage.resolve_roots();

        let records = RecordStore::new(&roots.data)?;
        let blobs = BlobStore::new(&roots.uploads, config.storage.max_upload_size_bytes())?;

        tracing::info!(
            data = %roots.data.display(),
            uploads = %roots.uploads.display(),
            "Storage initialized"
        );

        let links = LinkBuilder::new(
            config.server.public_url.clone(),
            format!("{}:{}", config.server.host, config.server.port),
        );

        Self::new(records, blobs, links)
    }
}
