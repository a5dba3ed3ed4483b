//! Request DTOs for the web front-end.

use serde::Deserialize;

/// Query parameters for the index page.
#[derive(Debug, Default, Deserialize)]
pub struct IndexQuery {
    /// Set after a form upload to show the banner.
    #[serde(default)]
    pub success: Option<String>,
    /// Share link to show in the banner.
    #[serde(default)]
    pub link: Option<String>,
}

impl IndexQuery {
    /// Whether the success banner should be shown.
    pub fn is_success(&self) -> bool {
        matches!(
            self.success.as_deref().map(str::trim),
            Some(v) if !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false")
        )
    }
}
