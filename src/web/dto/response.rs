//! Response DTOs for the web front-end.

use serde::Serialize;

/// Response to a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    /// Always `true`; failures use the error body instead.
    pub success: bool,
    /// Absolute link to the landing page.
    pub link: String,
}

impl UploadResponse {
    /// Create an upload response for the given link.
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            success: true,
            link: link.into(),
        }
    }
}
