//! Subprocess seam for container-runtime and host queries

use crate::error::ProbeError;
use std::io::ErrorKind;
use std::process::Command;

/// Runs a short-lived command and returns its standard output
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, ProbeError>;
}

/// Spawns real processes; blocks until they exit
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, ProbeError> {
        let label = command_label(program, args);
        let output = Command::new(program).args(args).output().map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                ProbeError::unavailable(&label, format!("{} not installed", program))
            } else {
                ProbeError::unavailable(&label, e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProbeError::unavailable(
                &label,
                format!("{}: {}", output.status, stderr.trim()),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Human-readable command line used in error messages
pub fn command_label(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
