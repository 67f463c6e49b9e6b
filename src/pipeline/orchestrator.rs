use crate::config::AppConfig;
use crate::error::PipelineError;
use crate::gate::{ChecksumStore, Decision, RetrainDecisionEngine};
use crate::model_store::{Clock, ModelVersionStore, SystemClock, VersionTag};
use crate::pipeline::command::ExternalCommand;
use crate::pipeline::lock::RunLock;
use crate::pipeline::trainer::Trainer;

/// What a retrain cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrainOutcome {
    /// Dataset unchanged; nothing trained, nothing committed.
    Skipped,
    /// A new model was trained, versioned, and committed.
    Trained(VersionTag),
}

/// Sequences the pipeline steps with hard-stop-on-failure semantics.
///
/// The orchestrator holds no state across runs; everything persistent lives
/// in the checksum store and the model version store.
pub struct PipelineOrchestrator {
    config: AppConfig,
    engine: RetrainDecisionEngine,
    trainer: Trainer,
    store: ModelVersionStore,
}

impl PipelineOrchestrator {
    pub fn new(config: AppConfig) -> Self {
        Self::with_clock(config, Box::new(SystemClock))
    }

    pub fn with_clock(config: AppConfig, clock: Box<dyn Clock>) -> Self {
        let engine = RetrainDecisionEngine::new(ChecksumStore::new(&config.data.checksum_file));
        let trainer = Trainer::new(&config.trainer);
        let store = ModelVersionStore::new(&config.models.dir, clock);
        PipelineOrchestrator {
            config,
            engine,
            trainer,
            store,
        }
    }

    /// Take the run lock for this pipeline's lock file.
    pub fn lock(&self) -> Result<RunLock, PipelineError> {
        RunLock::acquire(&self.config.pipeline.lock_file)
    }

    /// Install service dependencies via the configured installer.
    pub fn install(&self) -> Result<(), PipelineError> {
        log::info!("installing dependencies");
        ExternalCommand::from_argv(&self.config.pipeline.install_command).run()?;
        Ok(())
    }

    /// One check-and-retrain cycle: decide, train, version, commit.
    ///
    /// The commit order is the crux: artifact save, then pointer repoint,
    /// then checksum write. A crash before the final write leaves the next
    /// run deciding Train again, never silently skipping a needed retrain.
    pub fn retrain(&self, force: bool) -> Result<RetrainOutcome, PipelineError> {
        let eval = self.engine.decide(&self.config.data.path, force)?;
        if eval.decision == Decision::Skip {
            return Ok(RetrainOutcome::Skipped);
        }

        let artifact = self.trainer.run(&self.config.data.path)?;
        let tag = self.store.save(&artifact)?;
        self.store.set_current(&tag)?;
        self.engine.commit(&eval)?;

        log::info!("retrain complete, current model is {tag}");
        Ok(RetrainOutcome::Trained(tag))
    }

    /// Build the service image from the current model.
    pub fn build(&self) -> Result<(), PipelineError> {
        let artifact = self
            .store
            .current_artifact()?
            .ok_or(PipelineError::NoCurrentModel)?;

        let image = &self.config.image;
        log::info!(
            "building image {} (current model {})",
            image.tag,
            artifact.display()
        );
        let argv = vec![
            image.runtime.clone(),
            "build".to_string(),
            "-t".to_string(),
            image.tag.clone(),
            image.context.to_string_lossy().into_owned(),
        ];
        ExternalCommand::from_argv(&argv).run()?;
        Ok(())
    }

    /// Full pipeline run: install, retrain gate, image build. The first
    /// failing step aborts the rest and its error propagates unmodified.
    pub fn run(&self, force: bool) -> Result<RetrainOutcome, PipelineError> {
        self.install()?;
        let outcome = self.retrain(force)?;
        self.build()?;
        Ok(outcome)
    }

    /// Destructive: delete all artifacts, the current pointer, and the
    /// checksum record, so the next run starts the lineage from scratch.
    pub fn clean(&self) -> Result<usize, PipelineError> {
        let removed = self.store.clean()?;
        self.engine.store().remove()?;
        log::info!("removed {removed} model artifacts and reset the checksum record");
        Ok(removed)
    }
}
