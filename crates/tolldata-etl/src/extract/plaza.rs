//! Toll plaza data (tab-separated) extractor

use tolldata_common::types::TSV_EXTRACT_COLUMNS;
use tolldata_common::{Artifact, EtlError, Result};
use tracing::info;

use super::read_delimited;
use crate::staging::StagingArea;
use crate::table::Table;

/// Convert `tollplaza-data.tsv` into a headered CSV extract.
pub fn extract_toll_plaza_data(staging: &StagingArea) -> Result<usize> {
    let input = staging.require(Artifact::RawTollPlaza)?;
    info!(path = %input.display(), "Extracting toll plaza data");

    let records = read_delimited(&input, b'\t', TSV_EXTRACT_COLUMNS.len())?;

    let mut table = Table::new(TSV_EXTRACT_COLUMNS);
    for record in &records {
        table
            .push_row(record.iter().map(|f| f.trim_end().to_string()).collect())
            .map_err(|msg| EtlError::format(&input, msg))?;
    }

    table.write_artifact(staging, Artifact::TsvExtract)?;
    info!(rows = table.len(), "Toll plaza data extracted");
    Ok(table.len())
}
