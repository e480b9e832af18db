use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::board::Job;
use crate::error::SourceError;

/// Collaborator that produces a full job snapshot on demand.
#[async_trait]
pub trait JobSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<Job>, SourceError>;
}

/// Snapshot exported to a JSON file, either a bare array of job rows or an
/// object with a `jobs` array.
pub struct FileJobSource {
    path: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Bare(Vec<serde_json::Value>),
    Wrapped { jobs: Vec<serde_json::Value> },
}

impl FileJobSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse a snapshot file.
    ///
    /// Only a file that is not a job list at all is an error. A row that
    /// cannot be read as a job (no id, wrong shape) is skipped with a
    /// warning and the rest of the snapshot still loads.
    pub fn parse(path: &Path, bytes: &[u8]) -> Result<Vec<Job>, SourceError> {
        let file: SnapshotFile =
            serde_json::from_slice(bytes).map_err(|source| SourceError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let rows = match file {
            SnapshotFile::Bare(rows) | SnapshotFile::Wrapped { jobs: rows } => rows,
        };

        let total = rows.len();
        let jobs: Vec<Job> = rows
            .into_iter()
            .enumerate()
            .filter_map(|(idx, row)| match serde_json::from_value::<Job>(row) {
                Ok(job) => Some(job),
                Err(e) => {
                    warn!("Skipping unreadable job row {} in {}: {}", idx, path.display(), e);
                    None
                }
            })
            .collect();

        if jobs.len() < total {
            warn!(
                "Loaded {} of {} job rows from {}",
                jobs.len(),
                total,
                path.display()
            );
        }
        Ok(jobs)
    }
}

#[async_trait]
impl JobSource for FileJobSource {
    async fn fetch(&self) -> Result<Vec<Job>, SourceError> {
        debug!("Reading job snapshot from {}", self.path.display());

        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| SourceError::ReadFile {
                path: self.path.clone(),
                source,
            })?;

        let jobs = Self::parse(&self.path, &bytes)?;
        debug!("Read {} jobs from {}", jobs.len(), self.path.display());
        Ok(jobs)
    }
}
