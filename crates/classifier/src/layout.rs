use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use voxsort_domain::{RunStamp, Verdict, REPORT_FILE_NAME};

use crate::error::ClassifierError;

/// `<output_root>/run_<YYYYMMDD_HHMMSS>/{target,other}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub run_dir: PathBuf,
    pub target_dir: PathBuf,
    pub other_dir: PathBuf,
}

impl OutputLayout {
    /// Never reuses an existing run directory.
    pub fn create(output_root: &Path, stamp: &RunStamp) -> Result<Self, ClassifierError> {
        fs::create_dir_all(output_root).map_err(|source| ClassifierError::Layout {
            path: output_root.to_path_buf(),
            source,
        })?;
        let run_dir = output_root.join(format!("run_{}", stamp.dir_suffix()?));
        match fs::create_dir(&run_dir) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
                return Err(ClassifierError::RunDirectoryExists(run_dir));
            }
            Err(source) => {
                return Err(ClassifierError::Layout {
                    path: run_dir,
                    source,
                })
            }
        }

        let layout = Self {
            target_dir: run_dir.join(Verdict::Target.bucket()),
            other_dir: run_dir.join(Verdict::Other.bucket()),
            run_dir,
        };
        for dir in [&layout.target_dir, &layout.other_dir] {
            fs::create_dir(dir).map_err(|source| ClassifierError::Layout {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(layout)
    }

    pub fn bucket(&self, verdict: Verdict) -> &Path {
        match verdict {
            Verdict::Target => &self.target_dir,
            Verdict::Other => &self.other_dir,
        }
    }

    pub fn report_path(&self) -> PathBuf {
        self.run_dir.join(REPORT_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn creates_run_tree() {
        let root = tempfile::tempdir().unwrap();
        let output = root.path().join("output");
        let stamp = RunStamp::at(datetime!(2024-06-01 10:20:30 UTC));
        let layout = OutputLayout::create(&output, &stamp).unwrap();
        assert_eq!(layout.run_dir, output.join("run_20240601_102030"));
        assert!(layout.bucket(Verdict::Target).is_dir());
        assert!(layout.bucket(Verdict::Other).is_dir());
        assert_eq!(
            layout.report_path(),
            output.join("run_20240601_102030").join("classification_results.json")
        );
    }

    #[test]
    fn same_second_collides() {
        let root = tempfile::tempdir().unwrap();
        let stamp = RunStamp::at(datetime!(2024-06-01 10:20:30 UTC));
        OutputLayout::create(root.path(), &stamp).unwrap();
        let second = OutputLayout::create(root.path(), &stamp);
        assert!(matches!(second, Err(ClassifierError::RunDirectoryExists(_))));
    }
}
