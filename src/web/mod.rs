//! Web front-end for linkdrop.
//!
//! Serves the upload form, per-file landing pages and downloads over HTTP.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod link;
pub mod middleware;
pub mod page;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::create_router;
pub use server::WebServer;
