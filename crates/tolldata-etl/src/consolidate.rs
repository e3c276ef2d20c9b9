//! Column-wise consolidation of the three extracts
//!
//! Rows are aligned by ordinal position: row `i` of the output is row `i` of
//! the vehicle, toll plaza and payment extracts side by side. No key is
//! compared, so extracts of different lengths produce a result truncated to
//! the shortest one. [`JoinMode::Strict`] turns that case into an error.

use tolldata_common::{Artifact, EtlError, Result};
use tracing::{info, warn};

use crate::config::JoinMode;
use crate::staging::StagingArea;
use crate::table::Table;

/// Row counts seen by one consolidation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsolidationSummary {
    pub csv_rows: usize,
    pub tsv_rows: usize,
    pub fixed_width_rows: usize,
    pub output_rows: usize,
}

impl ConsolidationSummary {
    pub fn is_aligned(&self) -> bool {
        self.csv_rows == self.tsv_rows && self.tsv_rows == self.fixed_width_rows
    }
}

/// Join `csv_data.csv`, `tsv_data.csv` and `fixed_width_data.csv` into
/// `extracted_data.csv`.
pub fn consolidate(staging: &StagingArea, mode: JoinMode) -> Result<ConsolidationSummary> {
    info!(mode = %mode, "Consolidating extracts");

    let csv = Table::read_artifact(staging, Artifact::CsvExtract)?;
    let tsv = Table::read_artifact(staging, Artifact::TsvExtract)?;
    let fixed = Table::read_artifact(staging, Artifact::FixedWidthExtract)?;

    let joined = Table::hconcat(&[&csv, &tsv, &fixed]);
    let summary = ConsolidationSummary {
        csv_rows: csv.len(),
        tsv_rows: tsv.len(),
        fixed_width_rows: fixed.len(),
        output_rows: joined.len(),
    };

    if !summary.is_aligned() {
        let detail = format!(
            "extract row counts differ (csv={}, tsv={}, fixed_width={})",
            summary.csv_rows, summary.tsv_rows, summary.fixed_width_rows
        );
        match mode {
            JoinMode::Strict => return Err(EtlError::Alignment(detail)),
            JoinMode::Positional => {
                warn!(output_rows = summary.output_rows, "{}; truncating", detail);
            },
        }
    }

    joined.write_artifact(staging, Artifact::Consolidated)?;
    info!(
        rows = summary.output_rows,
        columns = joined.width(),
        output = %staging.path(Artifact::Consolidated).display(),
        "Extracts consolidated"
    );
    Ok(summary)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use tolldata_common::ErrorKind;

    fn write(staging: &StagingArea, artifact: Artifact, content: &str) {
        std::fs::write(staging.path(artifact), content).unwrap();
    }

    fn staging_with_extracts(csv_rows: usize, tsv_rows: usize, fixed_rows: usize) -> (tempfile::TempDir, StagingArea) {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::create(dir.path()).unwrap();

        let mut csv = String::from("Rowid,Timestamp,Anonymized Vehicle number,VehicleType\n");
        for i in 1..=csv_rows {
            csv.push_str(&format!("{i},T{i},V{i},car\n"));
        }
        let mut tsv = String::from("Number of axles,Tollplaza id,Tollplaza code\n");
        for i in 1..=tsv_rows {
            tsv.push_str(&format!("{i},{},PC{i}\n", 4000 + i));
        }
        let mut fixed = String::from("Type of Payment code,Vehicle Code\n");
        for i in 1..=fixed_rows {
            fixed.push_str(&format!("PT{i},VC{i:03}\n"));
        }

        write(&staging, Artifact::CsvExtract, &csv);
        write(&staging, Artifact::TsvExtract, &tsv);
        write(&staging, Artifact::FixedWidthExtract, &fixed);
        (dir, staging)
    }

    #[test]
    fn test_aligned_extracts_join_row_by_row() {
        let (_dir, staging) = staging_with_extracts(3, 3, 3);

        let summary = consolidate(&staging, JoinMode::Positional).unwrap();
        assert!(summary.is_aligned());
        assert_eq!(summary.output_rows, 3);

        let out = Table::read_artifact(&staging, Artifact::Consolidated).unwrap();
        assert_eq!(out.width(), 9);
        assert_eq!(
            out.headers(),
            &[
                "Rowid",
                "Timestamp",
                "Anonymized Vehicle number",
                "VehicleType",
                "Number of axles",
                "Tollplaza id",
                "Tollplaza code",
                "Type of Payment code",
                "Vehicle Code",
            ]
        );
        assert_eq!(
            out.rows()[2],
            vec!["3", "T3", "V3", "car", "3", "4003", "PC3", "PT3", "VC003"]
        );
    }

    #[test]
    fn test_positional_mode_truncates_to_shortest() {
        let (_dir, staging) = staging_with_extracts(5, 2, 4);

        let summary = consolidate(&staging, JoinMode::Positional).unwrap();
        assert!(!summary.is_aligned());
        assert_eq!(summary.output_rows, 2);
        assert_eq!(
            Table::read_artifact(&staging, Artifact::Consolidated).unwrap().len(),
            2
        );
    }

    #[test]
    fn test_strict_mode_rejects_mismatch() {
        let (_dir, staging) = staging_with_extracts(3, 3, 2);

        let err = consolidate(&staging, JoinMode::Strict).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Alignment);
        assert!(!staging.exists(Artifact::Consolidated));
    }

    #[test]
    fn test_missing_extract_is_fatal() {
        let (_dir, staging) = staging_with_extracts(1, 1, 1);
        std::fs::remove_file(staging.path(Artifact::TsvExtract)).unwrap();

        let err = consolidate(&staging, JoinMode::Positional).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert!(err.to_string().contains("tsv_data.csv"));
    }
}
