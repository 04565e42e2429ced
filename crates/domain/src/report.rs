use serde::{Deserialize, Serialize};

use crate::threshold::Threshold;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Verdict {
    Target,
    Other,
}

impl Verdict {
    pub fn from_same_speaker(same_speaker: bool) -> Self {
        if same_speaker {
            Verdict::Target
        } else {
            Verdict::Other
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Verdict::Target => "TARGET",
            Verdict::Other => "OTHER",
        }
    }

    /// Name of the run subdirectory receiving files with this verdict.
    pub fn bucket(self) -> &'static str {
        match self {
            Verdict::Target => "target",
            Verdict::Other => "other",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ClassificationResult {
    pub file: String,
    pub score: f64,
    pub is_target_speaker: bool,
}

impl ClassificationResult {
    pub fn new(file: impl Into<String>, score: f64, verdict: Verdict) -> Self {
        Self {
            file: file.into(),
            score,
            is_target_speaker: verdict == Verdict::Target,
        }
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::from_same_speaker(self.is_target_speaker)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub target_speaker: String,
    pub threshold: Threshold,
    pub run_timestamp: String,
    pub classifications: Vec<ClassificationResult>,
}

impl RunReport {
    pub fn new(
        target_speaker: impl Into<String>,
        threshold: Threshold,
        run_timestamp: impl Into<String>,
    ) -> Self {
        Self {
            target_speaker: target_speaker.into(),
            threshold,
            run_timestamp: run_timestamp.into(),
            classifications: Vec::new(),
        }
    }

    pub fn push(&mut self, result: ClassificationResult) {
        self.classifications.push(result);
    }

    pub fn counts(&self) -> VerdictCounts {
        let target = self
            .classifications
            .iter()
            .filter(|entry| entry.is_target_speaker)
            .count();
        VerdictCounts {
            target,
            other: self.classifications.len() - target,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VerdictCounts {
    pub target: usize,
    pub other: usize,
}

impl VerdictCounts {
    pub fn total(&self) -> usize {
        self.target + self.other
    }
}
