//! Archive download
//!
//! The body is streamed into a temporary file inside the staging area and only
//! renamed to `tolldata.tgz` once the whole response has been received, so a
//! failed transfer never leaves a truncated archive behind.

use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::PathBuf;
use tolldata_common::checksum::sha256_file;
use tolldata_common::{Artifact, EtlError, Result};
use tracing::{debug, info};

use crate::staging::StagingArea;

/// What a successful download left in the staging area
#[derive(Debug, Clone)]
pub struct FetchedArchive {
    pub path: PathBuf,
    pub bytes: u64,
    pub sha256: String,
}

/// Download `url` into the staging area's archive slot
pub async fn fetch_archive(
    client: &reqwest::Client,
    url: &str,
    staging: &StagingArea,
    show_progress: bool,
) -> Result<FetchedArchive> {
    info!(url = %url, "Downloading archive");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| EtlError::transport(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(EtlError::transport(url, format!("HTTP {}", status)));
    }

    let total_size = response.content_length().unwrap_or(0);
    let pb = progress_bar(total_size, show_progress);

    let mut temp = staging.temp_file()?;
    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| EtlError::transport(url, e))?;
        temp.write_all(&chunk)
            .map_err(|e| EtlError::io(temp.path(), e))?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }
    pb.finish_and_clear();

    debug!(bytes = downloaded, "Response body received");

    let path = staging.persist(temp, Artifact::Archive.file_name())?;
    let sha256 = sha256_file(&path)?;

    info!(
        path = %path.display(),
        bytes = downloaded,
        sha256 = %sha256,
        "Archive downloaded"
    );

    Ok(FetchedArchive {
        path,
        bytes: downloaded,
        sha256,
    })
}

fn progress_bar(total_size: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total_size);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})",
    ) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message(Artifact::Archive.file_name());
    pb
}
