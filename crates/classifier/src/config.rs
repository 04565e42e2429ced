use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;
use voxsort_audio::{CandidateOrder, WorkerCommand};

pub const DEFAULT_CONFIG_FILE: &str = "voxsort.yaml";

/// What happens when the scorer fails on a single candidate.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the run; no report is written.
    #[default]
    FailFast,
    /// Log the failure, leave the file out of the report and the copies.
    SkipAndContinue,
}

/// How the interactive front-end hands a run to the classifier.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LaunchMode {
    #[default]
    InProcess,
    /// Runs `voxsort-classify` as a child process.
    Subprocess,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub reference_dir: PathBuf,
    pub output_root: PathBuf,
    pub candidate_order: CandidateOrder,
    pub failure_policy: FailurePolicy,
    pub launch: LaunchMode,
    pub scorer: WorkerCommand,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            reference_dir: PathBuf::from("spk_labels"),
            output_root: PathBuf::from("output"),
            candidate_order: CandidateOrder::default(),
            failure_policy: FailurePolicy::default(),
            launch: LaunchMode::default(),
            scorer: WorkerCommand::default(),
        }
    }
}

impl AppConfig {
    /// An explicit path must exist; otherwise `voxsort.yaml` is used when present.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("open config {:?}", path))?;
        let config: AppConfig = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("parse config {:?}", path))?;
        info!(?path, "loaded configuration");
        Ok(config)
    }

    pub fn classifier(&self) -> ClassifierConfig {
        ClassifierConfig {
            output_root: self.output_root.clone(),
            order: self.candidate_order,
            failure_policy: self.failure_policy,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierConfig {
    pub output_root: PathBuf,
    pub order: CandidateOrder,
    pub failure_policy: FailurePolicy,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        AppConfig::default().classifier()
    }
}
