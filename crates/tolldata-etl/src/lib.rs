//! Tolldata ETL Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Batch pipeline that downloads the toll-collection archive, unpacks three
//! raw sources, narrows each to its fields of interest, joins them column-wise
//! and normalizes the vehicle type.
//!
//! # Task Graph
//!
//! ```text
//! download_dataset -> untar_dataset -> extract_data_from_csv ----------\
//!                                   -> extract_data_from_tsv ----------+-> consolidate_data -> transform_data
//!                                   -> extract_data_from_fixed_width --/
//! ```
//!
//! Tasks communicate only through files in a run-scoped [`staging::StagingArea`].
//!
//! # Example
//!
//! ```no_run
//! use tolldata_etl::{config::EtlConfig, pipeline};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = EtlConfig::from_env()?;
//!     let report = pipeline::run(config).await?;
//!     assert!(report.succeeded());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod consolidate;
pub mod dag;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod staging;
pub mod table;
pub mod transform;
pub mod unpack;
