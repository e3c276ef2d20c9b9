//! Field extractors
//!
//! One extractor per raw source. Each reads its fixed-layout file from the
//! staging area, keeps the fields of interest and writes a headered CSV
//! extract. Extractors never read each other's outputs and may run
//! concurrently.
//!
//! | Extractor | Input | Output |
//! |---|---|---|
//! | [`vehicle`] | `vehicle-data.csv` (6 comma-separated fields) | `csv_data.csv` |
//! | [`plaza`] | `tollplaza-data.tsv` (3 tab-separated fields) | `tsv_data.csv` |
//! | [`payment`] | `payment-data.txt` (fixed width) | `fixed_width_data.csv` |

pub mod payment;
pub mod plaza;
pub mod vehicle;

pub use payment::extract_payment_data;
pub use plaza::extract_toll_plaza_data;
pub use vehicle::extract_vehicle_data;

use std::path::Path;
use tolldata_common::{EtlError, Result};

/// Read a header-less delimited file whose records must all have `expected` fields.
///
/// Blank lines are skipped.
pub(crate) fn read_delimited(
    path: &Path,
    delimiter: u8,
    expected: usize,
) -> Result<Vec<csv::StringRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(|e| EtlError::format(path, e))?;

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| EtlError::format(path, e))?;
        if record.len() != expected {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(EtlError::format(
                path,
                format!(
                    "line {} has {} fields, expected {}",
                    line,
                    record.len(),
                    expected
                ),
            ));
        }
        records.push(record);
    }

    Ok(records)
}
