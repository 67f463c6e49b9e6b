use std::io;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::model_store::clock::Clock;
use crate::model_store::tag::VersionTag;

const CURRENT_LINK: &str = "latest_model.pkl";

/// Manages saving, listing, and pointing at versioned model artifacts.
///
/// Artifacts are append-only: `save` refuses to overwrite an existing
/// version, and nothing short of an explicit [`clean`](Self::clean) removes
/// one. The current-model pointer is a `latest_model.pkl` symlink inside the
/// store directory.
pub struct ModelVersionStore {
    dir: PathBuf,
    clock: Box<dyn Clock>,
}

impl ModelVersionStore {
    pub fn new(dir: impl Into<PathBuf>, clock: Box<dyn Clock>) -> Self {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).ok();
        ModelVersionStore { dir, clock }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn artifact_path(&self, tag: &VersionTag) -> PathBuf {
        self.dir.join(artifact_file_name(tag))
    }

    /// Copy the trainer's output into the store under a fresh tag.
    ///
    /// The destination is written via a temp file and an atomic rename; a
    /// collision on the derived tag fails with [`StoreError::VersionCollision`]
    /// and leaves nothing behind.
    pub fn save(&self, artifact_src: &Path) -> Result<VersionTag, StoreError> {
        if !artifact_src.is_file() {
            return Err(StoreError::SourceMissing(artifact_src.to_path_buf()));
        }

        let tag = VersionTag::from_datetime(self.clock.now_utc());
        let dst = self.artifact_path(&tag);
        if dst.exists() {
            return Err(StoreError::VersionCollision(tag.to_string()));
        }

        let tmp = dst.with_extension("pkl.tmp");
        if let Err(e) = std::fs::copy(artifact_src, &tmp).and_then(|_| std::fs::rename(&tmp, &dst))
        {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }

        log::info!("saved model artifact {}", dst.display());
        Ok(tag)
    }

    /// Repoint the current-model symlink at `tag`. Only meaningful after a
    /// successful `save` of that tag.
    pub fn set_current(&self, tag: &VersionTag) -> Result<(), StoreError> {
        if !self.artifact_path(tag).is_file() {
            return Err(StoreError::ArtifactMissing(tag.to_string()));
        }

        let link = self.dir.join(CURRENT_LINK);
        if link.symlink_metadata().is_ok() {
            std::fs::remove_file(&link)?;
        }
        std::os::unix::fs::symlink(artifact_file_name(tag), &link)?;
        Ok(())
    }

    /// The tag the current-model pointer references, or `None` if no
    /// training run has ever succeeded.
    pub fn current(&self) -> Result<Option<VersionTag>, StoreError> {
        let link = self.dir.join(CURRENT_LINK);
        let target = match std::fs::read_link(&link) {
            Ok(target) => target,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match parse_artifact_name(&name) {
            Some(tag) => Ok(Some(tag)),
            None => Err(StoreError::BadPointer(name)),
        }
    }

    /// Resolved path of the current artifact, verified to exist on disk.
    pub fn current_artifact(&self) -> Result<Option<PathBuf>, StoreError> {
        match self.current()? {
            Some(tag) => {
                let path = self.artifact_path(&tag);
                if path.is_file() {
                    Ok(Some(path))
                } else {
                    Err(StoreError::ArtifactMissing(tag.to_string()))
                }
            }
            None => Ok(None),
        }
    }

    /// All stored versions, oldest first. Lexical tag order is time order.
    pub fn list(&self) -> Result<Vec<VersionTag>, StoreError> {
        let mut tags = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_type()?.is_symlink() {
                continue;
            }
            let name = entry.file_name();
            if let Some(tag) = parse_artifact_name(&name.to_string_lossy()) {
                tags.push(tag);
            }
        }
        tags.sort();
        Ok(tags)
    }

    /// Delete every artifact and the current pointer. Destructive; returns
    /// the number of artifacts removed.
    pub fn clean(&self) -> Result<usize, StoreError> {
        let link = self.dir.join(CURRENT_LINK);
        if link.symlink_metadata().is_ok() {
            std::fs::remove_file(&link)?;
        }

        let mut removed = 0;
        for tag in self.list()? {
            std::fs::remove_file(self.artifact_path(&tag))?;
            removed += 1;
        }
        Ok(removed)
    }
}

fn artifact_file_name(tag: &VersionTag) -> String {
    format!("model_{tag}.pkl")
}

fn parse_artifact_name(name: &str) -> Option<VersionTag> {
    let tag = name.strip_prefix("model_")?.strip_suffix(".pkl")?;
    VersionTag::parse(tag)
}
