use std::io;
use std::path::PathBuf;

use thiserror::Error;
use voxsort_audio::ScorerError;
use voxsort_domain::DomainError;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("cannot create output directory {path:?}: {source}")]
    Layout { path: PathBuf, source: io::Error },
    #[error("run directory {0:?} already exists")]
    RunDirectoryExists(PathBuf),
    #[error("cannot list input directory {path:?}: {source}")]
    Scan { path: PathBuf, source: io::Error },
    #[error("scoring worker unavailable: {0}")]
    ScorerStart(#[source] ScorerError),
    #[error("scoring {file} failed: {source}")]
    Scoring { file: String, source: ScorerError },
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("copying {file} failed: {source}")]
    Copy { file: String, source: io::Error },
}
