use std::io;
use std::path::PathBuf;

use thiserror::Error;
use voxsort_classifier::ClassifierError;

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("reference directory {0:?} not found")]
    DirectoryNotFound(PathBuf),
    #[error("no .wav files found in {0:?}")]
    NoCandidatesFound(PathBuf),
    #[error("cannot read reference directory {path:?}: {source}")]
    ReferenceDirUnreadable { path: PathBuf, source: io::Error },
    #[error("cancelled by user")]
    Cancelled,
    #[error("threshold {0:?} is not a decimal number")]
    InvalidThreshold(String),
    #[error("threshold must be between 0 and 1, got {0}")]
    ThresholdOutOfRange(f64),
    #[error("input directory {0:?} does not exist")]
    InputDirMissing(PathBuf),
    #[error("choice {0} is not in the list")]
    InvalidChoice(usize),
    #[error("prompt failed: {0}")]
    Prompt(#[from] io::Error),
    #[error("cannot start {program:?}: {source}")]
    Launch { program: PathBuf, source: io::Error },
    #[error("classifier process exited with status {0:?}")]
    Subprocess(Option<i32>),
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
}

impl CollectError {
    /// Problems with the user's input, caught before any processing starts.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CollectError::DirectoryNotFound(_)
                | CollectError::NoCandidatesFound(_)
                | CollectError::ReferenceDirUnreadable { .. }
                | CollectError::InvalidThreshold(_)
                | CollectError::ThresholdOutOfRange(_)
                | CollectError::InputDirMissing(_)
        )
    }
}
