use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::OffsetDateTime;

use crate::threshold::Threshold;
use crate::DomainError;

pub const DEFAULT_DEVICE: &str = "cuda";
pub const DEVICE_CHOICES: [&str; 2] = ["cpu", "cuda"];

/// Everything the batch classifier needs for one run.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RunParameters {
    pub target: PathBuf,
    pub input_dir: PathBuf,
    pub threshold: Threshold,
    /// Passed through to the scoring worker untouched.
    pub device: String,
}

impl RunParameters {
    pub fn new(
        target: impl Into<PathBuf>,
        input_dir: impl Into<PathBuf>,
        threshold: Threshold,
        device: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into(),
            input_dir: input_dir.into(),
            threshold,
            device: device.into(),
        }
    }

    /// File name of the reference clip, as recorded in the report.
    pub fn target_speaker(&self) -> String {
        file_name_of(&self.target)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateFile {
    pub name: String,
    pub path: PathBuf,
}

impl CandidateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            name: file_name_of(&path),
            path,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub target: usize,
    pub other: usize,
    pub skipped: usize,
    pub run_dir: PathBuf,
    pub report_path: PathBuf,
}

/// Instant a run started; names the run directory and stamps the report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunStamp(OffsetDateTime);

impl RunStamp {
    /// Local wall-clock time, falling back to UTC when the offset is unknown.
    pub fn now() -> Self {
        Self(OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc()))
    }

    pub fn at(instant: OffsetDateTime) -> Self {
        Self(instant)
    }

    /// `YYYYMMDD_HHMMSS`
    pub fn dir_suffix(&self) -> Result<String, DomainError> {
        self.0
            .format(format_description!("[year][month][day]_[hour][minute][second]"))
            .map_err(|err| DomainError::Serialization(err.to_string()))
    }

    /// `YYYY-MM-DD HH:MM:SS`
    pub fn report_timestamp(&self) -> Result<String, DomainError> {
        self.0
            .format(format_description!(
                "[year]-[month]-[day] [hour]:[minute]:[second]"
            ))
            .map_err(|err| DomainError::Serialization(err.to_string()))
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
