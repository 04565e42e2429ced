pub mod io;
pub mod scan;
pub mod scorer;

pub use io::{AudioInfo, AudioProbe, MIN_REFERENCE_SECS};
pub use scan::{is_candidate_wav, is_wav, scan_candidates, scan_references, CandidateOrder};
pub use scorer::{
    Score, ScorerError, SpeakerScorer, WorkerCommand, WorkerScorer, DEFAULT_MODEL_ID,
    DEFAULT_MODEL_REVISION, DEFAULT_WORKER_SCRIPT,
};
