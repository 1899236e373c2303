//! Scripted `CommandRunner` for driver tests

use super::{CommandRunner, CommandSpec, DeployError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays canned results and records every invocation
///
/// `run` calls succeed unless the command line is listed in `failing`.
/// `output` calls pop the next scripted reply; an empty script is a test bug.
#[derive(Default)]
pub(crate) struct ScriptedRunner {
    calls: Mutex<Vec<String>>,
    outputs: Mutex<VecDeque<Result<String, String>>>,
    failing: Vec<String>,
}

#[allow(clippy::unwrap_used)]
impl ScriptedRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_output(self, stdout: &str) -> Self {
        self.outputs
            .lock()
            .unwrap()
            .push_back(Ok(stdout.to_string()));
        self
    }

    pub(crate) fn with_failed_output(self, stderr: &str) -> Self {
        self.outputs
            .lock()
            .unwrap()
            .push_back(Err(stderr.to_string()));
        self
    }

    pub(crate) fn failing_on(mut self, command_line: &str) -> Self {
        self.failing.push(command_line.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
#[allow(clippy::unwrap_used)]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &CommandSpec) -> Result<(), DeployError> {
        let line = command.to_string();
        self.calls.lock().unwrap().push(line.clone());
        if self.failing.contains(&line) {
            return Err(DeployError::CommandFailed {
                command: line,
                status: "exit status: 1".to_string(),
                stderr: String::new(),
            });
        }
        Ok(())
    }

    async fn output(&self, command: &CommandSpec) -> Result<String, DeployError> {
        let line = command.to_string();
        self.calls.lock().unwrap().push(line.clone());
        match self.outputs.lock().unwrap().pop_front() {
            Some(Ok(stdout)) => Ok(stdout),
            Some(Err(stderr)) => Err(DeployError::CommandFailed {
                command: line,
                status: "exit status: 1".to_string(),
                stderr,
            }),
            None => panic!("no scripted output left for `{}`", line),
        }
    }
}
