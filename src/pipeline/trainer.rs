use std::path::{Path, PathBuf};

use crate::config::TrainerConfig;
use crate::error::PipelineError;
use crate::pipeline::command::ExternalCommand;

/// The external training collaborator.
///
/// Invoked with the dataset location appended to the configured command; on
/// success it must leave one artifact at the configured output path. The
/// pipeline never inspects the artifact beyond its existence.
pub struct Trainer {
    command: Vec<String>,
    artifact: PathBuf,
}

impl Trainer {
    pub fn new(config: &TrainerConfig) -> Self {
        Trainer {
            command: config.command.clone(),
            artifact: config.artifact.clone(),
        }
    }

    /// Run one training round. A nonzero exit maps to
    /// [`PipelineError::TrainingFailed`]; a clean exit without an artifact
    /// on disk is [`PipelineError::ArtifactMissing`].
    pub fn run(&self, dataset: &Path) -> Result<PathBuf, PipelineError> {
        log::info!(
            "launching training: {} {}",
            self.command.join(" "),
            dataset.display()
        );

        let result = ExternalCommand::from_argv(&self.command)
            .arg(dataset.to_string_lossy().into_owned())
            .run();
        match result {
            Ok(_) => {}
            Err(PipelineError::CommandFailed { status, stderr, .. }) => {
                return Err(PipelineError::TrainingFailed { status, stderr });
            }
            Err(other) => return Err(other),
        }

        if !self.artifact.is_file() {
            return Err(PipelineError::ArtifactMissing(self.artifact.clone()));
        }
        Ok(self.artifact.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trainer_with(dir: &Path, script: &str) -> Trainer {
        Trainer::new(&TrainerConfig {
            command: vec!["/bin/sh".to_string(), "-c".to_string(), script.to_string()],
            artifact: dir.join("model.pkl"),
        })
    }

    #[test]
    fn test_successful_run_returns_artifact_path() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("add.csv");
        std::fs::write(&dataset, "rows").unwrap();

        // The appended dataset path arrives as $0 inside the shell snippet.
        let trainer = trainer_with(
            dir.path(),
            &format!("cp \"$0\" {}", dir.path().join("model.pkl").display()),
        );
        let artifact = trainer.run(&dataset).unwrap();
        assert_eq!(std::fs::read(artifact).unwrap(), b"rows");
    }

    #[test]
    fn test_nonzero_exit_is_training_failed() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("add.csv");
        std::fs::write(&dataset, "rows").unwrap();

        let trainer = trainer_with(dir.path(), "echo diverged >&2; exit 1");
        let err = trainer.run(&dataset).unwrap_err();
        match err {
            PipelineError::TrainingFailed { status, stderr } => {
                assert_eq!(status, "exit code 1");
                assert_eq!(stderr, "diverged");
            }
            other => panic!("expected TrainingFailed, got: {other}"),
        }
    }

    #[test]
    fn test_clean_exit_without_artifact_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = dir.path().join("add.csv");
        std::fs::write(&dataset, "rows").unwrap();

        let trainer = trainer_with(dir.path(), "true");
        let err = trainer.run(&dataset).unwrap_err();
        assert!(matches!(err, PipelineError::ArtifactMissing(_)));
    }
}
