use std::process::{Command, ExitStatus, Output};

use crate::error::PipelineError;

/// An external collaborator invoked as a blocking subprocess.
///
/// Output is captured and logged; a nonzero exit becomes
/// [`PipelineError::CommandFailed`] with stderr surfaced verbatim.
pub struct ExternalCommand {
    program: String,
    args: Vec<String>,
}

impl ExternalCommand {
    /// Build from a configured argv. The config layer rejects empty argvs.
    pub fn from_argv(argv: &[String]) -> Self {
        let (program, args) = argv.split_first().expect("command argv is validated non-empty");
        ExternalCommand {
            program: program.clone(),
            args: args.to_vec(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Run to completion and return the captured output.
    pub fn run(&self) -> Result<Output, PipelineError> {
        log::debug!("running: {} {}", self.program, self.args.join(" "));
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| PipelineError::CommandLaunch {
                program: self.program.clone(),
                source: e,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            log::info!("{} stdout:\n{}", self.program, stdout.trim());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            log::warn!("{} stderr:\n{}", self.program, stderr.trim());
        }

        if !output.status.success() {
            return Err(PipelineError::CommandFailed {
                program: self.program.clone(),
                status: describe_status(output.status),
                stderr: stderr.trim().to_string(),
            });
        }
        Ok(output)
    }
}

fn describe_status(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_successful_command_returns_output() {
        let out = ExternalCommand::from_argv(&argv(&["/bin/sh", "-c", "echo hi"]))
            .run()
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "hi");
    }

    #[test]
    fn test_nonzero_exit_surfaces_stderr() {
        let err = ExternalCommand::from_argv(&argv(&[
            "/bin/sh",
            "-c",
            "echo boom >&2; exit 3",
        ]))
        .run()
        .unwrap_err();
        match err {
            PipelineError::CommandFailed {
                program,
                status,
                stderr,
            } => {
                assert_eq!(program, "/bin/sh");
                assert_eq!(status, "exit code 3");
                assert_eq!(stderr, "boom");
            }
            other => panic!("expected CommandFailed, got: {other}"),
        }
    }

    #[test]
    fn test_missing_program_is_a_launch_error() {
        let err = ExternalCommand::from_argv(&argv(&["/nonexistent/definitely-not-a-program"]))
            .run()
            .unwrap_err();
        assert!(matches!(err, PipelineError::CommandLaunch { .. }));
    }

    #[test]
    fn test_extra_arg_is_appended() {
        let out = ExternalCommand::from_argv(&argv(&["/bin/sh", "-c", "echo \"$0\""]))
            .arg("data/add.csv")
            .run()
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "data/add.csv");
    }
}
