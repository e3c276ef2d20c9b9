//! Common types used across the tolldata pipeline

use serde::{Deserialize, Serialize};

// ============================================================================
// Staging Area Artifacts
// ============================================================================

/// Well-known files living in a staging area.
///
/// Every artifact has exactly one producing task, so no two tasks ever write
/// the same file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Artifact {
    /// Compressed archive as downloaded
    Archive,
    /// Comma-separated vehicle data
    RawVehicle,
    /// Tab-separated toll plaza data
    RawTollPlaza,
    /// Fixed-width payment data
    RawPayment,
    CsvExtract,
    TsvExtract,
    FixedWidthExtract,
    /// Column-wise join of the three extracts
    Consolidated,
    /// Final pipeline output
    Transformed,
}

impl Artifact {
    /// File name relative to the staging root
    pub fn file_name(self) -> &'static str {
        match self {
            Artifact::Archive => "tolldata.tgz",
            Artifact::RawVehicle => "vehicle-data.csv",
            Artifact::RawTollPlaza => "tollplaza-data.tsv",
            Artifact::RawPayment => "payment-data.txt",
            Artifact::CsvExtract => "csv_data.csv",
            Artifact::TsvExtract => "tsv_data.csv",
            Artifact::FixedWidthExtract => "fixed_width_data.csv",
            Artifact::Consolidated => "extracted_data.csv",
            Artifact::Transformed => "transformed_data.csv",
        }
    }

    /// Raw files the archive must contain
    pub fn raw_sources() -> [Artifact; 3] {
        [Artifact::RawVehicle, Artifact::RawTollPlaza, Artifact::RawPayment]
    }

    pub fn all() -> [Artifact; 9] {
        [
            Artifact::Archive,
            Artifact::RawVehicle,
            Artifact::RawTollPlaza,
            Artifact::RawPayment,
            Artifact::CsvExtract,
            Artifact::TsvExtract,
            Artifact::FixedWidthExtract,
            Artifact::Consolidated,
            Artifact::Transformed,
        ]
    }
}

impl std::fmt::Display for Artifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

// ============================================================================
// Column Layouts
// ============================================================================

/// Positional names assigned to the six raw vehicle fields
pub const RAW_VEHICLE_COLUMNS: [&str; 6] = [
    "Rowid",
    "Timestamp",
    "Anonymized Vehicle number",
    "VehicleType",
    "Number of axles",
    "Vehicle code",
];

/// Columns kept by the vehicle extractor, in output order
pub const CSV_EXTRACT_COLUMNS: [&str; 4] =
    ["Rowid", "Timestamp", "Anonymized Vehicle number", "VehicleType"];

/// Columns of the toll plaza extract
pub const TSV_EXTRACT_COLUMNS: [&str; 3] = ["Number of axles", "Tollplaza id", "Tollplaza code"];

/// Columns of the payment extract
pub const FIXED_WIDTH_EXTRACT_COLUMNS: [&str; 2] = ["Type of Payment code", "Vehicle Code"];

/// Column upper-cased by the transformer
pub const VEHICLE_TYPE_COLUMN: &str = "VehicleType";

/// Byte ranges (end-exclusive) of the payment fields within a fixed-width row
pub const PAYMENT_CODE_RANGE: std::ops::Range<usize> = 61..64;
pub const VEHICLE_CODE_RANGE: std::ops::Range<usize> = 65..70;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_artifact_file_names_are_unique() {
        let names: HashSet<_> = Artifact::all().iter().map(|a| a.file_name()).collect();
        assert_eq!(names.len(), Artifact::all().len());
    }

    #[test]
    fn test_csv_extract_is_prefix_of_raw_columns() {
        assert_eq!(&RAW_VEHICLE_COLUMNS[..4], &CSV_EXTRACT_COLUMNS[..]);
        assert!(CSV_EXTRACT_COLUMNS.contains(&VEHICLE_TYPE_COLUMN));
    }

    #[test]
    fn test_payment_ranges() {
        assert_eq!(PAYMENT_CODE_RANGE.len(), 3);
        assert_eq!(VEHICLE_CODE_RANGE.len(), 5);
    }
}
