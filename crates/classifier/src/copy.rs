use std::fs::{self, File, FileTimes};
use std::io;
use std::path::Path;

use tracing::debug;

/// Copies `src` to `dst` keeping permissions and access/modification times.
/// The source is left untouched.
pub fn copy_preserving(src: &Path, dst: &Path) -> io::Result<u64> {
    let bytes = fs::copy(src, dst)?;
    let metadata = fs::metadata(src)?;
    let mut times = FileTimes::new();
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    // timestamps are best effort; some platforms refuse them on read-only copies
    if let Err(err) = File::open(dst).and_then(|file| file.set_times(times)) {
        debug!(?dst, %err, "could not carry over file times");
    }
    Ok(bytes)
}
