use std::path::PathBuf;

/// Errors raised by the retraining gate (fingerprinting and checksum store).
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("dataset unavailable at {path}: {source}")]
    DataUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read checksum file {path}: {source}")]
    ChecksumRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write checksum file {path}: {source}")]
    ChecksumWrite {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Errors raised by the model version store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("version {0} already exists; refusing to overwrite")]
    VersionCollision(String),

    #[error("artifact source not found: {0}")]
    SourceMissing(PathBuf),

    #[error("version {0} has no artifact on disk")]
    ArtifactMissing(String),

    #[error("current-model pointer is corrupt: {0}")]
    BadPointer(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while sequencing a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to launch {program}: {source}")]
    CommandLaunch {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} failed ({status}): {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("training failed ({status}): {stderr}")]
    TrainingFailed { status: String, stderr: String },

    #[error("trainer reported success but produced no artifact at {0}")]
    ArtifactMissing(PathBuf),

    #[error("no current model to build an image from; run retrain first")]
    NoCurrentModel,

    #[error("another pipeline run is active (lock file {0} exists)")]
    AlreadyRunning(PathBuf),

    #[error("failed to manage lock file {path}: {source}")]
    Lock {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("gate error: {0}")]
    Gate(#[from] GateError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors raised when replacing the running service container.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("failed to launch {program}: {source}")]
    RuntimeLaunch {
        program: String,
        source: std::io::Error,
    },

    #[error("container {name} failed to start ({status}): {stderr}")]
    StartFailed {
        name: String,
        status: String,
        stderr: String,
    },
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_error_display() {
        let err = GateError::DataUnavailable {
            path: PathBuf::from("data/add.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "dataset unavailable at data/add.csv: gone");
    }

    #[test]
    fn test_store_error_display() {
        let err = StoreError::VersionCollision("20260101T000000Z".to_string());
        assert_eq!(
            err.to_string(),
            "version 20260101T000000Z already exists; refusing to overwrite"
        );
    }

    #[test]
    fn test_pipeline_error_display() {
        let err = PipelineError::TrainingFailed {
            status: "exit code 1".to_string(),
            stderr: "loss diverged".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "training failed (exit code 1): loss diverged"
        );
    }

    #[test]
    fn test_deploy_error_display() {
        let err = DeployError::StartFailed {
            name: "cicd-sales-app".to_string(),
            status: "exit code 125".to_string(),
            stderr: "port is already allocated".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "container cicd-sales-app failed to start (exit code 125): port is already allocated"
        );
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Validation("deploy.port must be > 0".to_string());
        assert_eq!(
            err.to_string(),
            "config validation error: deploy.port must be > 0"
        );
    }
}
