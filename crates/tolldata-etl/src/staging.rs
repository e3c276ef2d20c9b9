//! Run-scoped staging area
//!
//! The staging directory is the only state shared between tasks. Each task
//! reads well-known artifacts from it and replaces its own outputs wholesale;
//! writes go through a temporary file in the same directory followed by a
//! rename, so a reader never sees a half-written artifact.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tolldata_common::{Artifact, EtlError, Result};
use tracing::debug;

/// Handle to one pipeline run's staging directory
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    /// Open a staging area, creating the directory if needed
    pub fn create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| EtlError::io(&root, e))?;
        debug!(root = %root.display(), "Staging area ready");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of an artifact within this staging area
    pub fn path(&self, artifact: Artifact) -> PathBuf {
        self.root.join(artifact.file_name())
    }

    pub fn exists(&self, artifact: Artifact) -> bool {
        self.path(artifact).is_file()
    }

    /// Path of an artifact that must already have been produced
    pub fn require(&self, artifact: Artifact) -> Result<PathBuf> {
        let path = self.path(artifact);
        if path.is_file() {
            Ok(path)
        } else {
            Err(EtlError::format(&path, "required input file is missing"))
        }
    }

    /// Create an empty temporary file next to the artifacts
    pub fn temp_file(&self) -> Result<NamedTempFile> {
        NamedTempFile::new_in(&self.root).map_err(|e| EtlError::io(&self.root, e))
    }

    /// Move a finished temporary file over its target name
    pub fn persist(&self, temp: NamedTempFile, file_name: &str) -> Result<PathBuf> {
        let target = self.root.join(file_name);
        temp.as_file().sync_all().map_err(|e| EtlError::io(temp.path(), e))?;
        temp.persist(&target)
            .map_err(|e| EtlError::io(&target, e.error))?;
        debug!(path = %target.display(), "Artifact written");
        Ok(target)
    }

    /// Replace an artifact with whatever `write` produces
    pub fn write_atomic<F>(&self, artifact: Artifact, write: F) -> Result<PathBuf>
    where
        F: FnOnce(&mut File) -> Result<()>,
    {
        self.write_file_atomic(artifact.file_name(), write)
    }

    /// Replace an arbitrary file in the staging root
    pub fn write_file_atomic<F>(&self, file_name: &str, write: F) -> Result<PathBuf>
    where
        F: FnOnce(&mut File) -> Result<()>,
    {
        let mut temp = self.temp_file()?;
        write(temp.as_file_mut())?;
        temp.as_file_mut()
            .flush()
            .map_err(|e| EtlError::io(temp.path(), e))?;
        self.persist(temp, file_name)
    }

    pub fn write_bytes(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        self.write_file_atomic(file_name, |file| {
            file.write_all(bytes)
                .map_err(|e| EtlError::io(self.root.join(file_name), e))
        })
    }
}
