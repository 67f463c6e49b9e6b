use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Dataset location and checksum persistence.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// File or directory whose content gates retraining.
    pub path: PathBuf,
    /// File holding the fingerprint of the last successful training run.
    pub checksum_file: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            path: PathBuf::from("data/add.csv"),
            checksum_file: PathBuf::from("data/last_retrain.txt"),
        }
    }
}

/// External trainer invocation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    /// Command argv; the dataset path is appended as the final argument.
    pub command: Vec<String>,
    /// Where the trainer writes its artifact on success.
    pub artifact: PathBuf,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            command: vec!["python".to_string(), "train_model.py".to_string()],
            artifact: PathBuf::from("model.pkl"),
        }
    }
}

/// Versioned model storage.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ModelStoreConfig {
    pub dir: PathBuf,
}

impl Default for ModelStoreConfig {
    fn default() -> Self {
        ModelStoreConfig {
            dir: PathBuf::from("models"),
        }
    }
}

/// Pipeline sequencing: dependency install, run lock, watch interval.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub install_command: Vec<String>,
    pub lock_file: PathBuf,
    pub poll_interval_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            install_command: vec![
                "pip".to_string(),
                "install".to_string(),
                "-r".to_string(),
                "requirements.txt".to_string(),
            ],
            lock_file: PathBuf::from(".retrain.lock"),
            poll_interval_secs: 300,
        }
    }
}

/// Image build settings shared with deployment.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Container runtime binary (docker or compatible).
    pub runtime: String,
    pub tag: String,
    /// Build context directory.
    pub context: PathBuf,
}

impl Default for ImageConfig {
    fn default() -> Self {
        ImageConfig {
            runtime: "docker".to_string(),
            tag: "cicd-sales-app:latest".to_string(),
            context: PathBuf::from("."),
        }
    }
}

/// Replace-in-place deployment target.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    pub container_name: String,
    /// Host port mapped onto the service's port 5000.
    pub port: u16,
}

impl Default for DeployConfig {
    fn default() -> Self {
        DeployConfig {
            container_name: "cicd-sales-app".to_string(),
            port: 5000,
        }
    }
}

/// Top-level application configuration, loadable from TOML.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub data: DataConfig,
    pub trainer: TrainerConfig,
    pub models: ModelStoreConfig,
    pub pipeline: PipelineConfig,
    pub image: ImageConfig,
    pub deploy: DeployConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            data: DataConfig::default(),
            trainer: TrainerConfig::default(),
            models: ModelStoreConfig::default(),
            pipeline: PipelineConfig::default(),
            image: ImageConfig::default(),
            deploy: DeployConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the file
    /// does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            log::warn!(
                "config file '{}' not found, using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trainer.command.is_empty() {
            return Err(ConfigError::Validation(
                "trainer.command must not be empty".into(),
            ));
        }
        if self.pipeline.install_command.is_empty() {
            return Err(ConfigError::Validation(
                "pipeline.install_command must not be empty".into(),
            ));
        }
        if self.pipeline.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "pipeline.poll_interval_secs must be > 0".into(),
            ));
        }
        if self.image.runtime.is_empty() {
            return Err(ConfigError::Validation(
                "image.runtime must not be empty".into(),
            ));
        }
        if self.image.tag.is_empty() {
            return Err(ConfigError::Validation(
                "image.tag must not be empty".into(),
            ));
        }
        if self.deploy.container_name.is_empty() {
            return Err(ConfigError::Validation(
                "deploy.container_name must not be empty".into(),
            ));
        }
        if self.deploy.port == 0 {
            return Err(ConfigError::Validation("deploy.port must be > 0".into()));
        }
        Ok(())
    }

    /// Generate a TOML string with all default values (useful for creating
    /// example config files).
    pub fn default_toml() -> String {
        toml::to_string_pretty(&AppConfig::default()).expect("default config serializes")
    }
}
