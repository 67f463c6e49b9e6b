use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::error::GateError;

/// Deterministic SHA-256 digest of the dataset content, hex-encoded.
///
/// Fingerprints relate to each other only by equality; equal bytes always
/// produce equal fingerprints regardless of machine or run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetFingerprint(String);

impl DatasetFingerprint {
    pub fn from_hex(hex: impl Into<String>) -> Self {
        DatasetFingerprint(hex.into())
    }

    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the fingerprint of the dataset at `path`.
///
/// A file is hashed over its raw bytes. A directory is hashed over a sorted
/// recursive walk, feeding each file's relative path and content into one
/// hasher, so the result is independent of filesystem iteration order.
/// Access is strictly read-only; any I/O failure surfaces as
/// [`GateError::DataUnavailable`] naming the path that could not be read.
pub fn fingerprint_dataset(path: &Path) -> Result<DatasetFingerprint, GateError> {
    let mut hasher = Sha256::new();

    let meta = std::fs::metadata(path).map_err(|e| unavailable(path, e))?;
    if meta.is_dir() {
        let mut files = Vec::new();
        collect_files(path, path, &mut files).map_err(|(p, e)| unavailable(&p, e))?;
        files.sort();
        for rel in files {
            hasher.update(rel.to_string_lossy().as_bytes());
            hasher.update([0u8]);
            hash_file(&mut hasher, &path.join(&rel)).map_err(|e| unavailable(&path.join(&rel), e))?;
            hasher.update([0u8]);
        }
    } else {
        hash_file(&mut hasher, path).map_err(|e| unavailable(path, e))?;
    }

    Ok(DatasetFingerprint(format!("{:x}", hasher.finalize())))
}

fn unavailable(path: &Path, source: io::Error) -> GateError {
    GateError::DataUnavailable {
        path: path.to_path_buf(),
        source,
    }
}

fn hash_file(hasher: &mut Sha256, path: &Path) -> io::Result<()> {
    let mut file = File::open(path)?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(())
}

/// Gather file paths relative to `root`, recursing into subdirectories.
fn collect_files(
    root: &Path,
    dir: &Path,
    out: &mut Vec<PathBuf>,
) -> Result<(), (PathBuf, io::Error)> {
    let entries = std::fs::read_dir(dir).map_err(|e| (dir.to_path_buf(), e))?;
    for entry in entries {
        let entry = entry.map_err(|e| (dir.to_path_buf(), e))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|e| (path.clone(), e))?;
        if file_type.is_dir() {
            collect_files(root, &path, out)?;
        } else {
            let rel = path
                .strip_prefix(root)
                .expect("walked path is under root")
                .to_path_buf();
            out.push(rel);
        }
    }
    Ok(())
}
