//! Subprocess execution
//!
//! Every external tool invocation goes through `CommandRunner` so the driver
//! can be exercised without a cluster.

use super::DeployError;
use async_trait::async_trait;
use std::fmt;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// A program plus its argument list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Runs external commands
///
/// Both methods treat a non-zero exit status as `DeployError::CommandFailed`.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion with stdout/stderr passed through to the terminal
    async fn run(&self, command: &CommandSpec) -> Result<(), DeployError>;

    /// Run to completion and return captured stdout
    async fn output(&self, command: &CommandSpec) -> Result<String, DeployError>;
}

/// `CommandRunner` backed by real processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(spec: &CommandSpec) -> Command {
        let mut command = Command::new(&spec.program);
        command.args(&spec.args).kill_on_drop(true);
        command
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<(), DeployError> {
        debug!(command = %spec, "Running command");

        let status = Self::command(spec)
            .status()
            .await
            .map_err(|source| DeployError::Spawn {
                command: spec.to_string(),
                source,
            })?;

        if !status.success() {
            return Err(DeployError::CommandFailed {
                command: spec.to_string(),
                status: status.to_string(),
                stderr: String::new(),
            });
        }

        Ok(())
    }

    async fn output(&self, spec: &CommandSpec) -> Result<String, DeployError> {
        debug!(command = %spec, "Capturing command output");

        let output = Self::command(spec)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| DeployError::Spawn {
                command: spec.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(DeployError::CommandFailed {
                command: spec.to_string(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| DeployError::InvalidOutput {
            command: spec.to_string(),
        })
    }
}
