use std::path::{Path, PathBuf};

use tracing::debug;
use voxsort_audio::{scan_references, AudioInfo, AudioProbe};
use voxsort_domain::CandidateFile;

use crate::error::CollectError;

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceChoice {
    pub name: String,
    pub path: PathBuf,
    /// `None` when the clip could not be probed; it stays selectable.
    pub info: Option<AudioInfo>,
}

impl ReferenceChoice {
    fn probe(candidate: CandidateFile) -> Self {
        let info = match AudioProbe::open(&candidate.path) {
            Ok(info) => Some(info),
            Err(err) => {
                debug!(path = ?candidate.path, %err, "cannot probe reference clip");
                None
            }
        };
        Self {
            name: candidate.name,
            path: candidate.path,
            info,
        }
    }

    pub fn label(&self) -> String {
        match self.info {
            Some(info) => format!("{} ({:.1}s)", self.name, info.duration_secs),
            None => self.name.clone(),
        }
    }
}

/// Reference clips available in `dir`, sorted by name.
pub fn discover_references(dir: &Path) -> Result<Vec<ReferenceChoice>, CollectError> {
    if !dir.exists() {
        return Err(CollectError::DirectoryNotFound(dir.to_path_buf()));
    }
    let files = scan_references(dir).map_err(|source| {
        CollectError::ReferenceDirUnreadable {
            path: dir.to_path_buf(),
            source,
        }
    })?;
    if files.is_empty() {
        return Err(CollectError::NoCandidatesFound(dir.to_path_buf()));
    }
    Ok(files.into_iter().map(ReferenceChoice::probe).collect())
}
