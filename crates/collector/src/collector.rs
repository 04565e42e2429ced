use std::path::{Path, PathBuf};

use tracing::{info, warn};
use voxsort_domain::threshold::is_decimal_entry;
use voxsort_domain::{RunParameters, Threshold, DEFAULT_DEVICE, DEVICE_CHOICES};

use crate::discovery::discover_references;
use crate::error::CollectError;
use crate::prompt::Prompter;

pub const DEFAULT_THRESHOLD_ENTRY: &str = "0.6";
pub const DEFAULT_INPUT_DIR: &str = "input";

pub struct Collector {
    reference_dir: PathBuf,
}

impl Collector {
    pub fn new(reference_dir: impl Into<PathBuf>) -> Self {
        Self {
            reference_dir: reference_dir.into(),
        }
    }

    pub fn reference_dir(&self) -> &Path {
        &self.reference_dir
    }

    /// Asks for reference, device, threshold and input directory, in that order.
    pub fn collect<P: Prompter + ?Sized>(
        &self,
        prompter: &mut P,
    ) -> Result<RunParameters, CollectError> {
        let references = discover_references(&self.reference_dir)?;
        let labels: Vec<String> = references.iter().map(|r| r.label()).collect();
        let message = format!(
            "Pick the clip that represents the target speaker (place clips in {})",
            self.reference_dir.display()
        );
        let index = prompter
            .select(&message, &labels, 0)?
            .ok_or(CollectError::Cancelled)?;
        let reference = references
            .get(index)
            .ok_or(CollectError::InvalidChoice(index))?;
        if let Some(info) = reference.info.filter(|info| info.is_short_reference()) {
            warn!(
                reference = %reference.name,
                seconds = info.duration_secs,
                "short reference clips give unreliable verdicts"
            );
        }

        let devices: Vec<String> = DEVICE_CHOICES.iter().map(|d| d.to_string()).collect();
        let default_device = DEVICE_CHOICES
            .iter()
            .position(|d| *d == DEFAULT_DEVICE)
            .unwrap_or(0);
        let device_index = prompter
            .select("Choose the inference device", &devices, default_device)?
            .ok_or(CollectError::Cancelled)?;
        let device = devices
            .get(device_index)
            .cloned()
            .ok_or(CollectError::InvalidChoice(device_index))?;

        let threshold_entry = prompter
            .text(
                "Threshold; clips scoring above it match the target speaker",
                DEFAULT_THRESHOLD_ENTRY,
                &is_decimal_entry,
            )?
            .ok_or(CollectError::Cancelled)?;
        let input_dir = prompter
            .text(
                "Directory holding the clips to classify",
                DEFAULT_INPUT_DIR,
                &|entry: &str| Path::new(entry).exists(),
            )?
            .ok_or(CollectError::Cancelled)?;

        let threshold = resolve_threshold(&threshold_entry)?;
        let input_dir = PathBuf::from(input_dir);
        if !input_dir.exists() {
            return Err(CollectError::InputDirMissing(input_dir));
        }

        info!(reference = %reference.name, %device, %threshold, ?input_dir, "parameters collected");
        Ok(RunParameters::new(
            reference.path.clone(),
            input_dir,
            threshold,
            device,
        ))
    }
}

/// Digit-rule check, then the inclusive `[0, 1]` range check.
pub fn resolve_threshold(entry: &str) -> Result<Threshold, CollectError> {
    if !is_decimal_entry(entry) {
        return Err(CollectError::InvalidThreshold(entry.to_string()));
    }
    let value: f64 = entry
        .parse()
        .map_err(|_| CollectError::InvalidThreshold(entry.to_string()))?;
    Threshold::new(value).map_err(|_| CollectError::ThresholdOutOfRange(value))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::fs;
    use std::io;

    pub(crate) enum Answer {
        Pick(usize),
        Text(String),
        Cancel,
    }

    /// Replays canned answers; text answers must pass the validator.
    pub(crate) struct ScriptedPrompter {
        answers: VecDeque<Answer>,
    }

    impl ScriptedPrompter {
        pub(crate) fn new(answers: Vec<Answer>) -> Self {
            Self {
                answers: answers.into(),
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn select(
            &mut self,
            _message: &str,
            choices: &[String],
            _default: usize,
        ) -> io::Result<Option<usize>> {
            match self.answers.pop_front() {
                Some(Answer::Pick(index)) => {
                    assert!(index < choices.len());
                    Ok(Some(index))
                }
                Some(Answer::Cancel) | None => Ok(None),
                Some(Answer::Text(_)) => panic!("expected a selection"),
            }
        }

        fn text(
            &mut self,
            _message: &str,
            _default: &str,
            validate: &dyn Fn(&str) -> bool,
        ) -> io::Result<Option<String>> {
            match self.answers.pop_front() {
                Some(Answer::Text(text)) => {
                    assert!(validate(&text), "{text:?} rejected by validator");
                    Ok(Some(text))
                }
                Some(Answer::Cancel) | None => Ok(None),
                Some(Answer::Pick(_)) => panic!("expected text"),
            }
        }
    }

    pub(crate) struct Workspace {
        pub(crate) root: tempfile::TempDir,
    }

    impl Workspace {
        pub(crate) fn new() -> Self {
            let root = tempfile::tempdir().unwrap();
            let labels = root.path().join("spk_labels");
            fs::create_dir(&labels).unwrap();
            fs::write(labels.join("alice.wav"), b"").unwrap();
            fs::write(labels.join("bob.wav"), b"").unwrap();
            fs::create_dir(root.path().join("input")).unwrap();
            Self { root }
        }

        pub(crate) fn collector(&self) -> Collector {
            Collector::new(self.root.path().join("spk_labels"))
        }

        pub(crate) fn input(&self) -> String {
            self.root.path().join("input").to_string_lossy().into_owned()
        }
    }

    pub(crate) fn text(value: impl Into<String>) -> Answer {
        Answer::Text(value.into())
    }

    #[test]
    fn collects_all_four_parameters() {
        let ws = Workspace::new();
        let mut prompter = ScriptedPrompter::new(vec![
            Answer::Pick(1),
            Answer::Pick(0),
            text("0.75"),
            text(ws.input()),
        ]);
        let params = ws.collector().collect(&mut prompter).unwrap();
        assert_eq!(params.target_speaker(), "bob.wav");
        assert_eq!(params.device, "cpu");
        assert_eq!(params.threshold.value(), 0.75);
        assert_eq!(params.input_dir, PathBuf::from(ws.input()));
    }

    #[test]
    fn boundary_thresholds_are_accepted() {
        for entry in ["0", "1", "1.0", "0.0"] {
            let ws = Workspace::new();
            let mut prompter = ScriptedPrompter::new(vec![
                Answer::Pick(0),
                Answer::Pick(1),
                text(entry),
                text(ws.input()),
            ]);
            assert!(ws.collector().collect(&mut prompter).is_ok(), "{entry}");
        }
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let ws = Workspace::new();
        let mut prompter = ScriptedPrompter::new(vec![
            Answer::Pick(0),
            Answer::Pick(1),
            text("1.01"),
            text(ws.input()),
        ]);
        let err = ws.collector().collect(&mut prompter).unwrap_err();
        assert!(matches!(err, CollectError::ThresholdOutOfRange(v) if v == 1.01));
        assert!(err.is_configuration());
    }

    #[test]
    fn negative_threshold_fails_the_digit_rule() {
        assert!(matches!(
            resolve_threshold("-0.01"),
            Err(CollectError::InvalidThreshold(_))
        ));
        assert!(matches!(
            resolve_threshold("1.2.3"),
            Err(CollectError::InvalidThreshold(_))
        ));
        assert_eq!(resolve_threshold("0.6").unwrap().value(), 0.6);
    }

    #[test]
    fn cancelling_any_question_stops_collection() {
        for answered in 0..4 {
            let ws = Workspace::new();
            let input = ws.input();
            let mut answers = vec![
                Answer::Pick(0),
                Answer::Pick(1),
                text("0.6"),
                text(input),
            ];
            answers.truncate(answered);
            answers.push(Answer::Cancel);
            let mut prompter = ScriptedPrompter::new(answers);
            let err = ws.collector().collect(&mut prompter).unwrap_err();
            assert!(matches!(err, CollectError::Cancelled));
        }
    }

    #[test]
    fn missing_reference_dir_stops_before_prompting() {
        let root = tempfile::tempdir().unwrap();
        let collector = Collector::new(root.path().join("spk_labels"));
        let mut prompter = ScriptedPrompter::new(Vec::new());
        assert!(matches!(
            collector.collect(&mut prompter),
            Err(CollectError::DirectoryNotFound(_))
        ));
    }
}
