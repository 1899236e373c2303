//! Deployment driver
//!
//! Brings the storefront up on a local minikube cluster by shelling out to
//! the cluster and container tooling:
//! - `command`: the subprocess seam (`CommandRunner`)
//! - `driver`: the ordered start/build/push/install/wait sequence
//! - `readiness`: fixed-budget pod status polling
//! - `endpoint`: NodePort URL resolution

pub mod command;
pub mod driver;
pub mod endpoint;
pub mod readiness;

pub use command::{CommandRunner, CommandSpec, SystemRunner};
pub use driver::{DeployOutcome, DeployPhase, Deployer, PlannedCommand};
pub use endpoint::{parse_endpoint, resolve_endpoint, ServiceEndpoint};
pub use readiness::{missing_markers, wait_for_pods, RUNNING_MARKER};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DeployError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed with {status}{}", stderr_suffix(.stderr))]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("`{command}` produced non-UTF-8 output")]
    InvalidOutput { command: String },

    #[error("pods not ready after {attempts} attempts (missing: {missing})")]
    PodsNotReady { attempts: u32, missing: String },

    #[error("failed to resolve service URL: {0}")]
    Resolve(String),
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

#[cfg(test)]
pub(crate) mod fake;
