//! Pod readiness polling
//!
//! Runs `kubectl get pods` on a fixed delay until the aggregate status text
//! mentions every expected pod and the `Running` phase, or the attempt
//! budget runs out. Any not-ready state is treated the same way.

use super::{CommandRunner, CommandSpec, DeployError};
use crate::config::PollConfig;
use tokio::time::sleep;
use tracing::{debug, info};

/// Status column value that must appear alongside the pod names
pub const RUNNING_MARKER: &str = "Running";

/// Markers from `markers` (plus `RUNNING_MARKER`) absent from `status_text`
pub fn missing_markers<'a>(status_text: &str, markers: &'a [String]) -> Vec<&'a str> {
    markers
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(RUNNING_MARKER))
        .filter(|marker| !status_text.contains(marker))
        .collect()
}

/// Poll pod status until ready; returns the number of attempts used
pub async fn wait_for_pods(
    runner: &dyn CommandRunner,
    kubectl: &str,
    markers: &[String],
    poll: PollConfig,
) -> Result<u32, DeployError> {
    let query = CommandSpec::new(kubectl).args(["get", "pods"]);
    let mut missing = Vec::new();

    for attempt in 1..=poll.attempts {
        let status_text = runner.output(&query).await?;
        missing = missing_markers(&status_text, markers);

        if missing.is_empty() {
            info!(attempt = attempt, "Pods running");
            return Ok(attempt);
        }

        debug!(
            attempt = attempt,
            max_attempts = poll.attempts,
            missing = ?missing,
            "Pods not ready yet"
        );

        if attempt < poll.attempts {
            sleep(poll.delay()).await;
        }
    }

    Err(DeployError::PodsNotReady {
        attempts: poll.attempts,
        missing: missing.join(", "),
    })
}
