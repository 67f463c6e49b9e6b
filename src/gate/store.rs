use std::io;
use std::path::{Path, PathBuf};

use crate::error::GateError;
use crate::gate::fingerprint::DatasetFingerprint;

/// File-backed store for the single checksum record.
///
/// Holds at most one fingerprint: the dataset state of the last successfully
/// completed training run. Writes go through a temp file and an atomic
/// rename, so readers never observe a torn record.
pub struct ChecksumStore {
    path: PathBuf,
}

impl ChecksumStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ChecksumStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored fingerprint. Absent store reads as `None`, which is
    /// never equal to a real fingerprint.
    pub fn read(&self) -> Result<Option<DatasetFingerprint>, GateError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let trimmed = content.trim();
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(DatasetFingerprint::from_hex(trimmed)))
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GateError::ChecksumRead {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    /// Overwrite the record atomically (temp file + rename).
    pub fn write(&self, fingerprint: &DatasetFingerprint) -> Result<(), GateError> {
        let write_err = |e| GateError::ChecksumWrite {
            path: self.path.clone(),
            source: e,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(write_err)?;
            }
        }

        let tmp = self.tmp_path();
        std::fs::write(&tmp, format!("{fingerprint}\n")).map_err(write_err)?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(write_err(e));
        }
        Ok(())
    }

    /// Write `new` only if the current record equals `expected`.
    ///
    /// Returns whether the swap happened. This is the seam where a hardened
    /// deployment would hold a mutual-exclusion lock across decide→commit.
    pub fn compare_and_swap(
        &self,
        expected: Option<&DatasetFingerprint>,
        new: &DatasetFingerprint,
    ) -> Result<bool, GateError> {
        if self.read()?.as_ref() == expected {
            self.write(new)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Delete the record. Missing file is not an error.
    pub fn remove(&self) -> Result<(), GateError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(GateError::ChecksumWrite {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(s: &str) -> DatasetFingerprint {
        DatasetFingerprint::from_hex(s)
    }

    #[test]
    fn test_absent_store_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChecksumStore::new(dir.path().join("last_retrain.txt"));
        assert_eq!(store.read().unwrap(), None);
    }

    #[test]
    fn test_write_then_read_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChecksumStore::new(dir.path().join("last_retrain.txt"));

        store.write(&fp("abc123")).unwrap();
        assert_eq!(store.read().unwrap(), Some(fp("abc123")));
    }

    #[test]
    fn test_write_overwrites_not_appends() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChecksumStore::new(dir.path().join("last_retrain.txt"));

        store.write(&fp("first")).unwrap();
        store.write(&fp("second")).unwrap();
        assert_eq!(store.read().unwrap(), Some(fp("second")));

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(raw.trim(), "second");
    }

    #[test]
    fn test_write_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChecksumStore::new(dir.path().join("data/last_retrain.txt"));
        store.write(&fp("abc")).unwrap();
        assert_eq!(store.read().unwrap(), Some(fp("abc")));
    }

    #[test]
    fn test_write_leaves_no_temp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChecksumStore::new(dir.path().join("last_retrain.txt"));
        store.write(&fp("abc")).unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["last_retrain.txt".to_string()]);
    }

    #[test]
    fn test_compare_and_swap_on_expected_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChecksumStore::new(dir.path().join("last_retrain.txt"));

        // Absent store: expected None swaps in the first record.
        assert!(store.compare_and_swap(None, &fp("v1")).unwrap());
        assert_eq!(store.read().unwrap(), Some(fp("v1")));

        assert!(store.compare_and_swap(Some(&fp("v1")), &fp("v2")).unwrap());
        assert_eq!(store.read().unwrap(), Some(fp("v2")));
    }

    #[test]
    fn test_compare_and_swap_rejects_stale_expectation() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChecksumStore::new(dir.path().join("last_retrain.txt"));
        store.write(&fp("current")).unwrap();

        assert!(!store.compare_and_swap(Some(&fp("stale")), &fp("new")).unwrap());
        assert_eq!(store.read().unwrap(), Some(fp("current")));

        assert!(!store.compare_and_swap(None, &fp("new")).unwrap());
        assert_eq!(store.read().unwrap(), Some(fp("current")));
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = ChecksumStore::new(dir.path().join("last_retrain.txt"));

        store.remove().unwrap();
        store.write(&fp("abc")).unwrap();
        store.remove().unwrap();
        assert_eq!(store.read().unwrap(), None);
        store.remove().unwrap();
    }
}
