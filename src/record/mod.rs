//! Share records for linkdrop.
//!
//! This module owns the metadata side of an upload:
//! - Share id generation and validation
//! - One JSON record per id with view/download counters
//! - Per-id serialized counter updates

mod id;
mod lock;
mod model;
mod store;

pub use id::{generate_id, is_valid_id, ID_LENGTH, MAX_ID_LENGTH};
pub use lock::{RecordLease, RecordLocks};
pub use model::{earnings_for, FileRecord, DOWNLOAD_RATE, VIEW_RATE};
pub use store::RecordStore;
