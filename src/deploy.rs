//! Replace-in-place container deployment: remove the old container by name,
//! then start a new one from the freshly built image. There is a window
//! where the service is unavailable between removal and start.

use std::process::{Command, ExitStatus};

use crate::error::DeployError;

/// Drives the container runtime (docker or compatible) to swap the running
/// service container.
pub struct DeploymentManager {
    runtime: String,
}

impl DeploymentManager {
    pub fn new(runtime: impl Into<String>) -> Self {
        DeploymentManager {
            runtime: runtime.into(),
        }
    }

    /// Replace the container named `name` with one serving `image`, binding
    /// host `port` onto the service's port 5000.
    pub fn deploy(&self, image: &str, name: &str, port: u16) -> Result<(), DeployError> {
        self.remove_existing(name);
        self.start(image, name, port)
    }

    /// Idempotent removal: a container that does not exist is an expected
    /// non-error, and any other removal failure is only logged since the
    /// subsequent start fails loudly on a surviving name conflict.
    fn remove_existing(&self, name: &str) {
        log::info!("removing existing container {name} (if any)");
        match Command::new(&self.runtime)
            .args(["rm", "-f", name])
            .output()
        {
            Ok(output) if output.status.success() => {
                log::info!("removed container {name}");
            }
            Ok(output) => {
                log::warn!(
                    "could not remove container {name} ({}): {}",
                    status_text(output.status),
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }
            Err(e) => {
                log::warn!(
                    "could not invoke {} to remove container {name}: {e}",
                    self.runtime
                );
            }
        }
    }

    fn start(&self, image: &str, name: &str, port: u16) -> Result<(), DeployError> {
        log::info!("starting container {name} from {image} on port {port}");
        let output = Command::new(&self.runtime)
            .args([
                "run",
                "-d",
                "--name",
                name,
                "-p",
                &format!("{port}:5000"),
                image,
            ])
            .output()
            .map_err(|e| DeployError::RuntimeLaunch {
                program: self.runtime.clone(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(DeployError::StartFailed {
                name: name.to_string(),
                status: status_text(output.status),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let id = String::from_utf8_lossy(&output.stdout);
        let id = id.trim();
        if id.is_empty() {
            log::info!("container {name} started");
        } else {
            log::info!("container {name} started ({id})");
        }
        Ok(())
    }
}

fn status_text(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}
