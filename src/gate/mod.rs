//! The retraining gate: dataset fingerprinting, the persisted checksum
//! record, and the train/skip decision engine.

mod engine;
mod fingerprint;
mod store;

pub use engine::{Decision, Evaluation, RetrainDecisionEngine};
pub use fingerprint::{fingerprint_dataset, DatasetFingerprint};
pub use store::ChecksumStore;
