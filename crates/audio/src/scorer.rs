//! The speaker-verification model sits behind [`SpeakerScorer`]. Production
//! runs talk to a long-lived worker process over JSON lines: one request
//! `{"reference", "candidate", "threshold"}` per candidate, answered by
//! `{"score": f64, "text": "yes" | "no"}` or `{"error": "..."}`.

use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};
use voxsort_domain::Threshold;

/// Environment variable naming the model cache directory, set on the worker only.
pub const MODEL_CACHE_ENV: &str = "MODELSCOPE_CACHE";

/// Worker adapter shipped in `tools/`, run from the workspace root.
pub const DEFAULT_WORKER_SCRIPT: &str = "tools/sv_worker.py";
pub const DEFAULT_MODEL_ID: &str = "damo/speech_eres2net_sv_zh-cn_16k-common";
pub const DEFAULT_MODEL_REVISION: &str = "v1.0.5";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub score: f64,
    pub same_speaker: bool,
}

#[derive(Debug, Error)]
pub enum ScorerError {
    #[error("failed to start scoring worker `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("scoring worker i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("unexpected reply from scoring worker: {0}")]
    Protocol(String),
    #[error("scoring worker reported: {0}")]
    Worker(String),
    #[error("scoring worker exited (status {0:?})")]
    WorkerExited(Option<i32>),
}

/// Compares one candidate clip against the reference voice.
///
/// The verdict is the oracle's own thresholded decision; callers do not
/// recompute it from `score`.
pub trait SpeakerScorer {
    fn score(
        &mut self,
        reference: &Path,
        candidate: &Path,
        threshold: Threshold,
    ) -> Result<Score, ScorerError>;
}

impl<S: SpeakerScorer + ?Sized> SpeakerScorer for Box<S> {
    fn score(
        &mut self,
        reference: &Path,
        candidate: &Path,
        threshold: Threshold,
    ) -> Result<Score, ScorerError> {
        (**self).score(reference, candidate, threshold)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkerCommand {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub model_cache_dir: Option<PathBuf>,
}

impl Default for WorkerCommand {
    fn default() -> Self {
        Self {
            program: "python".to_string(),
            args: vec![
                DEFAULT_WORKER_SCRIPT.to_string(),
                "--model".to_string(),
                DEFAULT_MODEL_ID.to_string(),
                "--revision".to_string(),
                DEFAULT_MODEL_REVISION.to_string(),
            ],
            model_cache_dir: Some(PathBuf::from("pretrained")),
        }
    }
}

#[derive(Serialize)]
struct ScoreRequest<'a> {
    reference: &'a Path,
    candidate: &'a Path,
    threshold: Threshold,
}

#[derive(Deserialize)]
struct ScoreReply {
    score: Option<f64>,
    text: Option<String>,
    error: Option<String>,
}

pub struct WorkerScorer {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

impl WorkerScorer {
    /// Starts the worker with `--device <device>` appended to its arguments.
    pub fn spawn(command: &WorkerCommand, device: &str) -> Result<Self, ScorerError> {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .arg("--device")
            .arg(device)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());
        if let Some(cache) = &command.model_cache_dir {
            cmd.env(MODEL_CACHE_ENV, cache);
        }
        info!(program = %command.program, device, "starting scoring worker");
        let mut child = cmd.spawn().map_err(|source| ScorerError::Spawn {
            program: command.program.clone(),
            source,
        })?;
        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ScorerError::Protocol("worker stdout not captured".to_string()))?;
        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    fn exit_code(&mut self) -> Option<i32> {
        self.child.try_wait().ok().flatten().and_then(|status| status.code())
    }
}

impl SpeakerScorer for WorkerScorer {
    fn score(
        &mut self,
        reference: &Path,
        candidate: &Path,
        threshold: Threshold,
    ) -> Result<Score, ScorerError> {
        let request = ScoreRequest {
            reference,
            candidate,
            threshold,
        };
        let mut line = serde_json::to_string(&request)
            .map_err(|err| ScorerError::Protocol(err.to_string()))?;
        line.push('\n');

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| ScorerError::Protocol("worker stdin closed".to_string()))?;
        if let Err(err) = stdin.write_all(line.as_bytes()).and_then(|_| stdin.flush()) {
            if err.kind() == io::ErrorKind::BrokenPipe {
                return Err(ScorerError::WorkerExited(self.exit_code()));
            }
            return Err(err.into());
        }

        let mut reply = String::new();
        if self.stdout.read_line(&mut reply)? == 0 {
            return Err(ScorerError::WorkerExited(self.exit_code()));
        }
        debug!(candidate = ?candidate, reply = reply.trim_end(), "worker replied");
        parse_reply(&reply)
    }
}

impl Drop for WorkerScorer {
    fn drop(&mut self) {
        // closing stdin is the worker's signal to exit
        drop(self.stdin.take());
        if let Err(err) = self.child.wait() {
            warn!(%err, "failed to reap scoring worker");
        }
    }
}

fn parse_reply(line: &str) -> Result<Score, ScorerError> {
    let reply: ScoreReply = serde_json::from_str(line.trim())
        .map_err(|err| ScorerError::Protocol(format!("{err}: {}", line.trim())))?;
    if let Some(message) = reply.error {
        return Err(ScorerError::Worker(message));
    }
    let score = reply
        .score
        .ok_or_else(|| ScorerError::Protocol("reply has no score".to_string()))?;
    let same_speaker = match reply.text.as_deref() {
        Some("yes") => true,
        Some("no") => false,
        other => {
            return Err(ScorerError::Protocol(format!(
                "verdict must be \"yes\" or \"no\", got {other:?}"
            )))
        }
    };
    Ok(Score {
        score,
        same_speaker,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_verdicts() {
        let yes = parse_reply("{\"score\": 0.82, \"text\": \"yes\"}\n").unwrap();
        assert_eq!(yes, Score { score: 0.82, same_speaker: true });
        let no = parse_reply("{\"score\": 0.31, \"text\": \"no\"}").unwrap();
        assert!(!no.same_speaker);
    }

    #[test]
    fn rejects_malformed_replies() {
        assert!(matches!(parse_reply("not json"), Err(ScorerError::Protocol(_))));
        assert!(matches!(
            parse_reply("{\"score\": 0.5, \"text\": \"maybe\"}"),
            Err(ScorerError::Protocol(_))
        ));
        assert!(matches!(parse_reply("{\"text\": \"yes\"}"), Err(ScorerError::Protocol(_))));
        assert!(matches!(
            parse_reply("{\"error\": \"cuda unavailable\"}"),
            Err(ScorerError::Worker(message)) if message == "cuda unavailable"
        ));
    }

    #[test]
    fn default_worker_ships_with_the_workspace() {
        let command = WorkerCommand::default();
        assert_eq!(
            command.args,
            vec![
                DEFAULT_WORKER_SCRIPT,
                "--model",
                "damo/speech_eres2net_sv_zh-cn_16k-common",
                "--revision",
                "v1.0.5",
            ]
        );
        let script = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("../..")
            .join(DEFAULT_WORKER_SCRIPT);
        assert!(script.is_file(), "{script:?} missing");
        let source = std::fs::read_to_string(script).unwrap();
        assert!(source.contains("--device"));
        assert!(source.contains("thr="));
    }

    #[test]
    fn spawn_failure_names_program() {
        let command = WorkerCommand {
            program: "voxsort-no-such-worker".to_string(),
            args: Vec::new(),
            model_cache_dir: None,
        };
        match WorkerScorer::spawn(&command, "cpu") {
            Err(ScorerError::Spawn { program, .. }) => assert_eq!(program, "voxsort-no-such-worker"),
            other => panic!("expected spawn error, got {:?}", other.err()),
        }
    }

    #[cfg(unix)]
    fn shell_worker(script: &str) -> WorkerCommand {
        WorkerCommand {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            model_cache_dir: None,
        }
    }

    #[cfg(unix)]
    #[test]
    fn worker_answers_each_request() {
        let command = shell_worker(
            "while read line; do echo '{\"score\": 0.9, \"text\": \"yes\"}'; done",
        );
        let mut scorer = WorkerScorer::spawn(&command, "cpu").unwrap();
        let threshold = Threshold::default();
        for _ in 0..3 {
            let score = scorer
                .score(Path::new("ref.wav"), Path::new("a.wav"), threshold)
                .unwrap();
            assert!(score.same_speaker);
            assert_eq!(score.score, 0.9);
        }
    }

    #[cfg(unix)]
    #[test]
    fn worker_receives_cache_dir_and_device() {
        let command = WorkerCommand {
            model_cache_dir: Some(PathBuf::from("models-here")),
            ..shell_worker(
                "read line; if [ \"$MODELSCOPE_CACHE\" = models-here ] && [ \"$1\" = --device ] && [ \"$2\" = cpu ]; \
                 then echo '{\"score\": 1.0, \"text\": \"yes\"}'; \
                 else echo '{\"error\": \"bad environment\"}'; fi",
            )
        };
        // sh -c binds the first trailing argument to $0, so pad it
        let command = WorkerCommand {
            args: vec![command.args[0].clone(), command.args[1].clone(), "worker".to_string()],
            ..command
        };
        let mut scorer = WorkerScorer::spawn(&command, "cpu").unwrap();
        let score = scorer
            .score(Path::new("ref.wav"), Path::new("a.wav"), Threshold::default())
            .unwrap();
        assert!(score.same_speaker);
    }

    #[cfg(unix)]
    #[test]
    fn worker_exit_is_an_error() {
        let command = shell_worker("exit 3");
        let mut scorer = WorkerScorer::spawn(&command, "cpu").unwrap();
        let result = scorer.score(Path::new("ref.wav"), Path::new("a.wav"), Threshold::default());
        assert!(result.is_err());
    }
}
