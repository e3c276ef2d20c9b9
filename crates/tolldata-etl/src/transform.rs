//! Vehicle type normalization

use tolldata_common::types::VEHICLE_TYPE_COLUMN;
use tolldata_common::{Artifact, EtlError, Result};
use tracing::info;

use crate::staging::StagingArea;
use crate::table::Table;

/// Upper-case the vehicle type column of a table in place
pub fn uppercase_vehicle_type(table: &mut Table) -> std::result::Result<(), String> {
    let index = table
        .column_index(VEHICLE_TYPE_COLUMN)
        .ok_or_else(|| format!("column '{}' not found", VEHICLE_TYPE_COLUMN))?;
    table.map_column(index, str::to_uppercase);
    Ok(())
}

/// Read `extracted_data.csv`, normalize it and write `transformed_data.csv`.
pub fn transform(staging: &StagingArea) -> Result<usize> {
    let input = staging.require(Artifact::Consolidated)?;
    info!(path = %input.display(), "Transforming consolidated data");

    let mut table = Table::read_csv(&input)?;
    uppercase_vehicle_type(&mut table).map_err(|msg| EtlError::format(&input, msg))?;

    table.write_artifact(staging, Artifact::Transformed)?;
    info!(
        rows = table.len(),
        output = %staging.path(Artifact::Transformed).display(),
        "Transformed data written"
    );
    Ok(table.len())
}
