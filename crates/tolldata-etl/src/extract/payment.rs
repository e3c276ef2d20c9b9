//! Payment data (fixed-width) extractor
//!
//! Rows carry no delimiters. The payment type code occupies bytes `[61, 64)`
//! and the vehicle code bytes `[65, 70)` of every row; everything else in the
//! row is ignored.

use std::io::{BufRead, BufReader};
use tolldata_common::types::{FIXED_WIDTH_EXTRACT_COLUMNS, PAYMENT_CODE_RANGE, VEHICLE_CODE_RANGE};
use tolldata_common::{Artifact, EtlError, Result};
use tracing::info;

use crate::staging::StagingArea;
use crate::table::Table;

/// Minimum row length that contains both fields
pub const MIN_ROW_LEN: usize = VEHICLE_CODE_RANGE.end;

/// The two fields sliced out of one fixed-width row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentFields {
    pub payment_code: String,
    pub vehicle_code: String,
}

/// Slice the payment fields out of a single row.
///
/// Trailing line terminators are ignored; field bytes are copied verbatim.
pub fn parse_payment_row(row: &str) -> std::result::Result<PaymentFields, String> {
    let row = row.trim_end_matches(['\r', '\n']);
    if row.len() < MIN_ROW_LEN {
        return Err(format!(
            "row is {} bytes, expected at least {}",
            row.len(),
            MIN_ROW_LEN
        ));
    }

    let slice = |range: std::ops::Range<usize>| {
        row.get(range.clone())
            .map(str::to_string)
            .ok_or_else(|| format!("bytes {}..{} do not fall on character boundaries", range.start, range.end))
    };

    Ok(PaymentFields {
        payment_code: slice(PAYMENT_CODE_RANGE)?,
        vehicle_code: slice(VEHICLE_CODE_RANGE)?,
    })
}

/// Slice `payment-data.txt` into the fixed-width extract.
pub fn extract_payment_data(staging: &StagingArea) -> Result<usize> {
    let input = staging.require(Artifact::RawPayment)?;
    info!(path = %input.display(), "Extracting fixed-width payment data");

    let file = std::fs::File::open(&input).map_err(|e| EtlError::format(&input, e))?;
    let mut table = Table::new(FIXED_WIDTH_EXTRACT_COLUMNS);

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|e| EtlError::format(&input, format!("line {}: {}", line_no, e)))?;
        if line.trim().is_empty() {
            continue;
        }

        let fields = parse_payment_row(&line)
            .map_err(|msg| EtlError::format(&input, format!("line {}: {}", line_no, msg)))?;
        table
            .push_row(vec![fields.payment_code, fields.vehicle_code])
            .map_err(|msg| EtlError::format(&input, msg))?;
    }

    table.write_artifact(staging, Artifact::FixedWidthExtract)?;
    info!(rows = table.len(), "Payment data extracted");
    Ok(table.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Build a row with the given codes at their fixed offsets
    fn row(payment_code: &str, vehicle_code: &str) -> String {
        format!(
            "{:<61}{} {}",
            "1 Thu Aug 19 21:54:38 2021 125094 4856 PC7C042B7",
            payment_code,
            vehicle_code
        )
    }

    #[test]
    fn test_parse_row_at_fixed_offsets() {
        let fields = parse_payment_row(&row("PTE", "VC965")).unwrap();
        assert_eq!(fields.payment_code, "PTE");
        assert_eq!(fields.vehicle_code, "VC965");
    }

    #[test]
    fn test_parse_ignores_trailing_content_and_crlf() {
        let line = format!("{}   extra trailing columns\r\n", row("PTP", "VC332"));
        let fields = parse_payment_row(&line).unwrap();
        assert_eq!(fields.payment_code, "PTP");
        assert_eq!(fields.vehicle_code, "VC332");
    }

    #[test]
    fn test_parse_short_row() {
        let err = parse_payment_row("1 Thu Aug 19 21:54:38 2021 PTE VC965").unwrap_err();
        assert!(err.contains("expected at least 70"));
    }

    #[test]
    fn test_parse_non_boundary_offset() {
        let line = format!("{}é{}", "x".repeat(60), "y".repeat(20));
        assert!(parse_payment_row(&line).is_err());
    }

    #[test]
    fn test_extract_writes_two_columns() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::create(dir.path()).unwrap();
        let raw = format!("{}\n\n{}\n", row("PTE", "VC965"), row("PTC", "VC965"));
        std::fs::write(staging.path(Artifact::RawPayment), raw).unwrap();

        assert_eq!(extract_payment_data(&staging).unwrap(), 2);

        let content =
            std::fs::read_to_string(staging.path(Artifact::FixedWidthExtract)).unwrap();
        assert_eq!(content, "Type of Payment code,Vehicle Code\nPTE,VC965\nPTC,VC965\n");
    }

    #[test]
    fn test_extract_reports_line_number() {
        let dir = tempfile::tempdir().unwrap();
        let staging = StagingArea::create(dir.path()).unwrap();
        let raw = format!("{}\ntoo short\n", row("PTE", "VC965"));
        std::fs::write(staging.path(Artifact::RawPayment), raw).unwrap();

        let err = extract_payment_data(&staging).unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(!staging.exists(Artifact::FixedWidthExtract));
    }

    proptest! {
        #[test]
        fn prop_fields_have_fixed_lengths(row in "[ -~]{70,120}") {
            let fields = parse_payment_row(&row).unwrap();
            prop_assert_eq!(fields.payment_code.len(), 3);
            prop_assert_eq!(fields.vehicle_code.len(), 5);
            prop_assert_eq!(fields.payment_code.as_str(), &row[61..64]);
            prop_assert_eq!(fields.vehicle_code.as_str(), &row[65..70]);
        }

        #[test]
        fn prop_short_rows_rejected(row in "[ -~]{0,69}") {
            prop_assert!(parse_payment_row(&row).is_err());
        }
    }
}
