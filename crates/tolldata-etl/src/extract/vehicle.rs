//! Vehicle data (comma-separated) extractor

use tolldata_common::types::{CSV_EXTRACT_COLUMNS, RAW_VEHICLE_COLUMNS};
use tolldata_common::{Artifact, EtlError, Result};
use tracing::info;

use super::read_delimited;
use crate::staging::StagingArea;
use crate::table::Table;

/// Narrow `vehicle-data.csv` to row id, timestamp, vehicle number and type.
///
/// Returns the number of rows written.
pub fn extract_vehicle_data(staging: &StagingArea) -> Result<usize> {
    let input = staging.require(Artifact::RawVehicle)?;
    info!(path = %input.display(), "Extracting vehicle data");

    let records = read_delimited(&input, b',', RAW_VEHICLE_COLUMNS.len())?;
    let selected = selected_indices();

    let mut table = Table::new(CSV_EXTRACT_COLUMNS);
    for record in &records {
        let row = selected.iter().map(|&i| record[i].to_string()).collect();
        table
            .push_row(row)
            .map_err(|msg| EtlError::format(&input, msg))?;
    }

    table.write_artifact(staging, Artifact::CsvExtract)?;
    info!(
        rows = table.len(),
        output = %staging.path(Artifact::CsvExtract).display(),
        "Vehicle data extracted"
    );
    Ok(table.len())
}

/// Positions of the kept columns within the raw layout
fn selected_indices() -> Vec<usize> {
    CSV_EXTRACT_COLUMNS
        .iter()
        .filter_map(|name| RAW_VEHICLE_COLUMNS.iter().position(|raw| raw == name))
        .collect()
}
