use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::PipelineError;

/// Mutual exclusion between pipeline runs on one host.
///
/// The lock is a file created with `O_CREAT|O_EXCL` holding the owner's PID;
/// it is unlinked (best effort) when the guard drops. A stale lock left by a
/// killed process must be removed by hand.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    pub fn acquire(path: &Path) -> Result<RunLock, PipelineError> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(PipelineError::AlreadyRunning(path.to_path_buf()));
            }
            Err(e) => {
                return Err(PipelineError::Lock {
                    path: path.to_path_buf(),
                    source: e,
                });
            }
        };

        if let Err(e) = writeln!(file, "{}", std::process::id()) {
            let _ = std::fs::remove_file(path);
            return Err(PipelineError::Lock {
                path: path.to_path_buf(),
                source: e,
            });
        }

        Ok(RunLock {
            path: path.to_path_buf(),
        })
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            log::debug!("failed to remove lock file {}: {e}", self.path.display());
        }
    }
}
