use std::time::Duration;

use crate::error::PipelineError;
use crate::pipeline::orchestrator::{PipelineOrchestrator, RetrainOutcome};

/// One watcher cycle: take the run lock, run the retrain gate, release.
///
/// Lock contention means another run is active and the cycle is skipped;
/// cycle errors are logged and swallowed so the watcher keeps polling.
pub fn watch_cycle(orchestrator: &PipelineOrchestrator) -> Option<RetrainOutcome> {
    let _guard = match orchestrator.lock() {
        Ok(guard) => guard,
        Err(PipelineError::AlreadyRunning(path)) => {
            log::info!(
                "another retrain is active ({} exists), skipping this cycle",
                path.display()
            );
            return None;
        }
        Err(e) => {
            log::error!("could not acquire run lock: {e}");
            return None;
        }
    };

    match orchestrator.retrain(false) {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            log::error!("retrain cycle failed: {e}");
            None
        }
    }
}

/// Poll loop: run a cycle, sleep the interval, repeat until killed.
pub fn watch(orchestrator: &PipelineOrchestrator, interval: Duration) -> ! {
    log::info!("starting watch mode (poll every {} seconds)", interval.as_secs());
    loop {
        watch_cycle(orchestrator);
        std::thread::sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::model_store::FixedClock;
    use crate::pipeline::lock::RunLock;
    use chrono::{TimeZone, Utc};
    use std::path::Path;

    fn test_config(root: &Path) -> AppConfig {
        let artifact = root.join("model.pkl");
        let mut config = AppConfig::default();
        config.data.path = root.join("data/add.csv");
        config.data.checksum_file = root.join("data/last_retrain.txt");
        config.trainer.command = vec![
            "/bin/sh".to_string(),
            "-c".to_string(),
            format!("cp \"$0\" {}", artifact.display()),
        ];
        config.trainer.artifact = artifact;
        config.models.dir = root.join("models");
        config.pipeline.lock_file = root.join(".retrain.lock");
        config
    }

    fn orchestrator_at(root: &Path) -> PipelineOrchestrator {
        std::fs::create_dir_all(root.join("data")).unwrap();
        std::fs::write(root.join("data/add.csv"), "month,sales\n1,100\n").unwrap();
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2026, 3, 15, 14, 20, 5).unwrap());
        PipelineOrchestrator::with_clock(test_config(root), Box::new(clock))
    }

    #[test]
    fn test_cycle_trains_then_skips() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator_at(dir.path());

        assert!(matches!(
            watch_cycle(&orch),
            Some(RetrainOutcome::Trained(_))
        ));
        assert_eq!(watch_cycle(&orch), Some(RetrainOutcome::Skipped));
    }

    #[test]
    fn test_cycle_skips_when_lock_is_held() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator_at(dir.path());

        let _held = RunLock::acquire(&dir.path().join(".retrain.lock")).unwrap();
        assert_eq!(watch_cycle(&orch), None);

        // And the held lock was not stolen or released.
        assert!(dir.path().join(".retrain.lock").exists());
    }

    #[test]
    fn test_cycle_swallows_retrain_errors() {
        let dir = tempfile::tempdir().unwrap();
        let orch = orchestrator_at(dir.path());
        std::fs::remove_file(dir.path().join("data/add.csv")).unwrap();

        assert_eq!(watch_cycle(&orch), None);
        // The lock was released, so the next cycle can run.
        assert!(!dir.path().join(".retrain.lock").exists());
    }
}
