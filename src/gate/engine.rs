use std::path::Path;

use crate::error::GateError;
use crate::gate::fingerprint::{fingerprint_dataset, DatasetFingerprint};
use crate::gate::store::ChecksumStore;

/// Outcome of a gate evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Dataset unchanged since the last successful run; nothing to do.
    Skip,
    /// Dataset changed (or never trained, or forced); the caller runs the
    /// trainer and commits only on success.
    Train,
}

/// A decision together with the fingerprints it was derived from.
///
/// The caller hands this back to [`RetrainDecisionEngine::commit`] after a
/// successful training run; nothing is persisted before that.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub decision: Decision,
    pub current: DatasetFingerprint,
    pub stored: Option<DatasetFingerprint>,
}

/// Decides whether retraining is required by comparing the current dataset
/// fingerprint with the persisted checksum record.
pub struct RetrainDecisionEngine {
    store: ChecksumStore,
}

impl RetrainDecisionEngine {
    pub fn new(store: ChecksumStore) -> Self {
        RetrainDecisionEngine { store }
    }

    pub fn store(&self) -> &ChecksumStore {
        &self.store
    }

    /// Evaluate the gate. Read-only: fingerprints the dataset, reads the
    /// store, and returns the decision. `force` skips the comparison and
    /// always yields [`Decision::Train`].
    pub fn decide(&self, dataset: &Path, force: bool) -> Result<Evaluation, GateError> {
        let current = fingerprint_dataset(dataset)?;
        let stored = self.store.read()?;

        let decision = if force {
            log::info!("forced run: retraining regardless of checksum");
            Decision::Train
        } else if stored.as_ref() == Some(&current) {
            log::info!("no data change detected, retrain not required");
            Decision::Skip
        } else {
            match &stored {
                Some(old) => log::info!("data change detected ({old} -> {current})"),
                None => log::info!("no checksum record found, first training run"),
            }
            Decision::Train
        };

        Ok(Evaluation {
            decision,
            current,
            stored,
        })
    }

    /// Persist the fingerprint that was just trained on. Must only be called
    /// after the trainer succeeded and the artifact is durably stored; a
    /// crash before this point leaves the next run deciding Train again.
    pub fn commit(&self, eval: &Evaluation) -> Result<(), GateError> {
        if !self
            .store
            .compare_and_swap(eval.stored.as_ref(), &eval.current)?
        {
            // Another run committed in between. Last writer wins; the
            // artifact for this run is already durable either way.
            log::warn!("checksum record changed during the run, overwriting with the trained fingerprint");
            self.store.write(&eval.current)?;
        }
        log::info!("checksum record updated to {}", eval.current);
        Ok(())
    }
}
