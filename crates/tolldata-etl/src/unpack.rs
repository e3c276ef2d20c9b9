//! Archive decompression
//!
//! The whole gzip stream and every tar entry are decoded in memory before
//! anything is written, so a corrupt or incomplete archive fails the task
//! without leaving raw files behind.
//!
//! # Examples
//!
//! ```rust,ignore
//! use tolldata_etl::{staging::StagingArea, unpack::unpack_archive};
//!
//! let staging = StagingArea::create("/tmp/ETL_toll_data_staging")?;
//! let written = unpack_archive(&staging)?;
//! ```

use flate2::read::GzDecoder;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use tolldata_common::{Artifact, EtlError, Result};
use tracing::{debug, info};

use crate::staging::StagingArea;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Decompress the staged archive into the staging root.
///
/// Returns the paths of the files written. The archive itself is only read.
pub fn unpack_archive(staging: &StagingArea) -> Result<Vec<PathBuf>> {
    let archive_path = staging.require(Artifact::Archive)?;
    info!(path = %archive_path.display(), "Unpacking archive");

    let data = std::fs::read(&archive_path).map_err(|e| EtlError::io(&archive_path, e))?;
    let entries = read_tar_gz(&data).map_err(|msg| EtlError::format(&archive_path, msg))?;

    let missing: Vec<&str> = Artifact::raw_sources()
        .iter()
        .map(|a| a.file_name())
        .filter(|name| !entries.contains_key(*name))
        .collect();
    if !missing.is_empty() {
        return Err(EtlError::format(
            &archive_path,
            format!("archive is missing expected files: {}", missing.join(", ")),
        ));
    }

    let mut written = Vec::with_capacity(entries.len());
    for (name, contents) in &entries {
        written.push(staging.write_bytes(name, contents)?);
        debug!(file = %name, bytes = contents.len(), "Extracted archive entry");
    }

    info!(files = written.len(), root = %staging.root().display(), "Archive unpacked");
    Ok(written)
}

/// Decode a gzip-compressed tar archive into `file name -> contents`.
///
/// Directory components of entry paths are dropped; non-file entries are skipped.
/// A member whose name collides with another member, or with an artifact some
/// other task owns, rejects the whole archive.
fn read_tar_gz(data: &[u8]) -> std::result::Result<BTreeMap<String, Vec<u8>>, String> {
    if !data.starts_with(&GZIP_MAGIC) {
        return Err("not a gzip-compressed tar archive".to_string());
    }

    let mut decompressed = Vec::new();
    GzDecoder::new(data)
        .read_to_end(&mut decompressed)
        .map_err(|e| format!("failed to decompress gzip data: {}", e))?;
    debug!("Decompressed {} -> {} bytes", data.len(), decompressed.len());

    let raw_sources = Artifact::raw_sources();
    let reserved: Vec<&str> = Artifact::all()
        .into_iter()
        .filter(|a| !raw_sources.contains(a))
        .map(Artifact::file_name)
        .collect();

    let mut archive = tar::Archive::new(decompressed.as_slice());
    let mut files = BTreeMap::new();

    let entries = archive
        .entries()
        .map_err(|e| format!("failed to read tar entries: {}", e))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| format!("failed to read tar entry: {}", e))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }

        let path = entry
            .path()
            .map_err(|e| format!("invalid tar entry path: {}", e))?
            .into_owned();
        let Some(name) = entry_file_name(&path) else {
            continue;
        };
        if reserved.contains(&name.as_str()) {
            return Err(format!(
                "archive member {} would overwrite staged artifact {}",
                path.display(),
                name
            ));
        }
        if files.contains_key(&name) {
            return Err(format!("archive contains more than one {}", name));
        }

        let mut contents = Vec::new();
        entry
            .read_to_end(&mut contents)
            .map_err(|e| format!("failed to read tar entry {}: {}", name, e))?;
        files.insert(name, contents);
    }

    Ok(files)
}

fn entry_file_name(path: &Path) -> Option<String> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
}
