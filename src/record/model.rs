//! File record type and earnings rates.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Earnings credited for each landing-page view (0.05).
pub const VIEW_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Earnings credited for each download (0.20).
pub const DOWNLOAD_RATE: Decimal = Decimal::from_parts(20, 0, 0, false, 2);

/// Earnings owed for the given counters.
pub fn earnings_for(view_count: u64, download_count: u64) -> Decimal {
    Decimal::from(view_count) * VIEW_RATE + Decimal::from(download_count) * DOWNLOAD_RATE
}

/// Persisted metadata for one uploaded file.
///
/// Only `view_count`, `download_count` and `earnings` change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Share identifier.
    pub id: String,
    /// Client-supplied filename, used for the download disposition.
    pub original_name: String,
    /// Stored name inside the blob store.
    pub storage_path: String,
    /// Size of the blob in bytes.
    pub size_bytes: u64,
    /// Landing-page visits.
    pub view_count: u64,
    /// Completed downloads.
    pub download_count: u64,
    /// Simulated earnings accrued from views and downloads.
    pub earnings: Decimal,
    /// When the file was uploaded.
    pub created_at: DateTime<Utc>,
}

impl FileRecord {
    /// Create a record with zeroed counters.
    pub fn new(
        id: impl Into<String>,
        original_name: impl Into<String>,
        storage_path: impl Into<String>,
        size_bytes: u64,
    ) -> Self {
        Self {
            id: id.into(),
            original_name: original_name.into(),
            storage_path: storage_path.into(),
            size_bytes,
            view_count: 0,
            download_count: 0,
            earnings: Decimal::ZERO,
            created_at: Utc::now(),
        }
    }

    /// Count one view.
    pub fn record_view(&mut self) {
        self.view_count += 1;
        self.earnings += VIEW_RATE;
    }

    /// Count one download.
    pub fn record_download(&mut self) {
        self.download_count += 1;
        self.earnings += DOWNLOAD_RATE;
    }

    /// Whether `earnings` matches what the counters imply.
    pub fn earnings_consistent(&self) -> bool {
        self.earnings == earnings_for(self.view_count, self.download_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_rates() {
        assert_eq!(VIEW_RATE, Decimal::from_str("0.05").unwrap());
        assert_eq!(DOWNLOAD_RATE, Decimal::from_str("0.20").unwrap());
    }

    #[test]
    fn test_new_record_is_zeroed() {
        let record = FileRecord::new("abc123", "a.txt", "1700000000000-42.txt", 10);

        assert_eq!(record.view_count, 0);
        assert_eq!(record.download_count, 0);
        assert_eq!(record.earnings, Decimal::ZERO);
        assert!(record.earnings_consistent());
    }

    #[test]
    fn test_counters_accrue_exactly() {
        let mut record = FileRecord::new("abc123", "a.txt", "x.txt", 10);

        record.record_view();
        record.record_view();
        assert_eq!(record.earnings, Decimal::from_str("0.10").unwrap());

        record.record_download();
        assert_eq!(record.view_count, 2);
        assert_eq!(record.download_count, 1);
        assert_eq!(record.earnings, Decimal::from_str("0.30").unwrap());
        assert!(record.earnings_consistent());
    }

    #[test]
    fn test_many_views_do_not_drift() {
        let mut record = FileRecord::new("abc123", "a.txt", "x.txt", 10);
        for _ in 0..1000 {
            record.record_view();
        }

        assert_eq!(record.earnings, Decimal::from(50));
        assert_eq!(earnings_for(1000, 0), Decimal::from(50));
    }

    #[test]
    fn test_json_shape() {
        let mut record = FileRecord::new("abc123", "a.txt", "x.txt", 10);
        record.record_download();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["original_name"], "a.txt");
        assert_eq!(json["size_bytes"], 10);
        assert_eq!(json["earnings"], "0.20");

        let back: FileRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
