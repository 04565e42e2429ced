pub mod config;
pub mod copy;
pub mod error;
pub mod layout;
pub mod pipeline;

pub use config::{AppConfig, ClassifierConfig, FailurePolicy, LaunchMode, DEFAULT_CONFIG_FILE};
pub use error::ClassifierError;
pub use layout::OutputLayout;
pub use pipeline::{BatchClassifier, RunPhase};

use voxsort_audio::WorkerScorer;
use voxsort_domain::{RunParameters, RunStamp, RunSummary};

/// Runs one batch against the configured scoring worker.
pub fn classify(params: &RunParameters, config: &AppConfig) -> Result<RunSummary, ClassifierError> {
    let scorer =
        WorkerScorer::spawn(&config.scorer, &params.device).map_err(ClassifierError::ScorerStart)?;
    let mut classifier = BatchClassifier::new(scorer, config.classifier());
    classifier.run(params, RunStamp::now())
}
