use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use voxsort_domain::CandidateFile;

/// Processing order for the files found in an input directory.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CandidateOrder {
    /// Whatever order the filesystem listing yields.
    Listing,
    /// Sorted by file name.
    #[default]
    Lexicographic,
}

/// Any-case `.wav` match, used for reference clips.
pub fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("wav"))
        .unwrap_or(false)
}

/// Only `.wav` and `.WAV`; mixed-case extensions are not candidates.
pub fn is_candidate_wav(path: &Path) -> bool {
    matches!(path.extension().and_then(|ext| ext.to_str()), Some("wav" | "WAV"))
}

/// Non-recursive listing of the candidate clips directly under `dir`.
pub fn scan_candidates(dir: &Path, order: CandidateOrder) -> io::Result<Vec<CandidateFile>> {
    scan_with(dir, order, is_candidate_wav)
}

/// Reference clips directly under `dir`, any extension case, sorted by name.
pub fn scan_references(dir: &Path) -> io::Result<Vec<CandidateFile>> {
    scan_with(dir, CandidateOrder::Lexicographic, is_wav)
}

fn scan_with(
    dir: &Path,
    order: CandidateOrder,
    accept: fn(&Path) -> bool,
) -> io::Result<Vec<CandidateFile>> {
    let mut candidates = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && accept(&path) {
            candidates.push(CandidateFile::new(path));
        }
    }
    if order == CandidateOrder::Lexicographic {
        candidates.sort_by(|a, b| a.name.cmp(&b.name));
    }
    debug!(dir = ?dir, count = candidates.len(), ?order, "scanned candidates");
    Ok(candidates)
}
