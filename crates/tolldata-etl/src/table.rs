//! In-memory tables backed by headered CSV files
//!
//! Every derived artifact in the staging area is a CSV file with a single
//! header row and no index column; this is the shape all tasks read and write.

use std::path::Path;
use tolldata_common::{Artifact, EtlError, Result};

use crate::staging::StagingArea;

/// Header plus rows of string cells
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Append a row; its width must match the header
    pub fn push_row(&mut self, row: Vec<String>) -> std::result::Result<(), String> {
        if row.len() != self.headers.len() {
            return Err(format!(
                "row has {} fields, expected {}",
                row.len(),
                self.headers.len()
            ));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Apply `f` to every cell of one column
    pub fn map_column<F>(&mut self, index: usize, f: F)
    where
        F: Fn(&str) -> String,
    {
        for row in &mut self.rows {
            if let Some(cell) = row.get_mut(index) {
                *cell = f(cell);
            }
        }
    }

    /// Column-wise concatenation aligned by row position.
    ///
    /// The result has the union of all headers in argument order and as many
    /// rows as the shortest input.
    pub fn hconcat(tables: &[&Table]) -> Table {
        let headers = tables
            .iter()
            .flat_map(|t| t.headers.iter().cloned())
            .collect();
        let row_count = tables.iter().map(|t| t.len()).min().unwrap_or(0);

        let rows = (0..row_count)
            .map(|i| {
                tables
                    .iter()
                    .flat_map(|t| t.rows[i].iter().cloned())
                    .collect()
            })
            .collect();

        Table { headers, rows }
    }

    /// Load a headered CSV file
    pub fn read_csv(path: impl AsRef<Path>) -> Result<Table> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .map_err(|e| EtlError::format(path, e))?;

        let headers = reader
            .headers()
            .map_err(|e| EtlError::format(path, e))?
            .iter()
            .map(str::to_string)
            .collect();

        let rows = reader
            .records()
            .map(|record| {
                record
                    .map(|r| r.iter().map(str::to_string).collect())
                    .map_err(|e| EtlError::format(path, e))
            })
            .collect::<Result<Vec<Vec<String>>>>()?;

        Ok(Table { headers, rows })
    }

    /// Load an artifact that an upstream task must have produced
    pub fn read_artifact(staging: &StagingArea, artifact: Artifact) -> Result<Table> {
        let path = staging.require(artifact)?;
        Self::read_csv(path)
    }

    /// Replace an artifact with this table's CSV rendering
    pub fn write_artifact(&self, staging: &StagingArea, artifact: Artifact) -> Result<()> {
        let target = staging.path(artifact);
        staging.write_atomic(artifact, |file| {
            let mut writer = csv::Writer::from_writer(file);
            writer
                .write_record(&self.headers)
                .map_err(|e| EtlError::format(&target, e))?;
            for row in &self.rows {
                writer
                    .write_record(row)
                    .map_err(|e| EtlError::format(&target, e))?;
            }
            writer.flush().map_err(|e| EtlError::io(&target, e))
        })?;
        Ok(())
    }
}
