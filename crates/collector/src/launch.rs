use std::env;
use std::path::PathBuf;
use std::process::Command;

use tracing::{debug, info};
use voxsort_classifier::AppConfig;
use voxsort_domain::RunParameters;

use crate::error::CollectError;

pub const CLASSIFIER_BIN: &str = "voxsort-classify";

/// Hands collected parameters to the batch classifier.
pub trait RunLauncher {
    fn launch(&mut self, params: &RunParameters) -> Result<(), CollectError>;
}

/// Calls the classifier directly in this process.
pub struct InProcessLauncher {
    config: AppConfig,
}

impl InProcessLauncher {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }
}

impl RunLauncher for InProcessLauncher {
    fn launch(&mut self, params: &RunParameters) -> Result<(), CollectError> {
        let summary = voxsort_classifier::classify(params, &self.config)?;
        debug!(?summary, "in-process run finished");
        Ok(())
    }
}

/// Runs `voxsort-classify` as a child process so a crashing model runtime
/// cannot take the front-end down with it.
pub struct SubprocessLauncher {
    program: PathBuf,
    config_path: Option<PathBuf>,
}

impl SubprocessLauncher {
    pub fn new(program: impl Into<PathBuf>, config_path: Option<PathBuf>) -> Self {
        Self {
            program: program.into(),
            config_path,
        }
    }

    /// Prefers the worker binary installed next to the running executable.
    pub fn sibling(config_path: Option<PathBuf>) -> Self {
        let name = format!("{CLASSIFIER_BIN}{}", env::consts::EXE_SUFFIX);
        let program = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(&name)))
            .filter(|candidate| candidate.is_file())
            .unwrap_or_else(|| PathBuf::from(name));
        Self::new(program, config_path)
    }

    pub fn command(&self, params: &RunParameters) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--target")
            .arg(&params.target)
            .arg("--input_dir")
            .arg(&params.input_dir)
            .arg("--threshold")
            .arg(params.threshold.to_string())
            .arg("--device")
            .arg(&params.device);
        if let Some(config) = &self.config_path {
            cmd.arg("--config").arg(config);
        }
        cmd
    }
}

impl RunLauncher for SubprocessLauncher {
    fn launch(&mut self, params: &RunParameters) -> Result<(), CollectError> {
        info!(program = ?self.program, "launching classifier process");
        let status = self
            .command(params)
            .status()
            .map_err(|source| CollectError::Launch {
                program: self.program.clone(),
                source,
            })?;
        if !status.success() {
            return Err(CollectError::Subprocess(status.code()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use voxsort_domain::Threshold;

    fn params() -> RunParameters {
        RunParameters::new(
            "spk_labels/alice.wav",
            "input",
            Threshold::new(0.65).unwrap(),
            "cuda",
        )
    }

    #[test]
    fn command_carries_all_four_parameters() {
        let launcher = SubprocessLauncher::new("voxsort-classify", Some(PathBuf::from("vs.yaml")));
        let cmd = launcher.command(&params());
        let args: Vec<&OsStr> = cmd.get_args().collect();
        assert_eq!(
            args,
            vec![
                "--target",
                "spk_labels/alice.wav",
                "--input_dir",
                "input",
                "--threshold",
                "0.65",
                "--device",
                "cuda",
                "--config",
                "vs.yaml",
            ]
        );
    }

    #[test]
    fn missing_program_is_a_launch_error() {
        let mut launcher = SubprocessLauncher::new("voxsort-no-such-binary", None);
        assert!(matches!(
            launcher.launch(&params()),
            Err(CollectError::Launch { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_a_subprocess_error() {
        let mut launcher = SubprocessLauncher::new("false", None);
        assert!(matches!(
            launcher.launch(&params()),
            Err(CollectError::Subprocess(Some(1)))
        ));
    }
}
