//! Endpoint availability polling
//!
//! Issues a lightweight GET against a known path until the storefront
//! answers. Connection-level failures (refused, reset, timed out) are
//! retried on a fixed delay; whether a response counts as "up" is decided
//! by the configured `ReadyPolicy`.

use crate::config::ProbeConfig;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("service at {url} not ready after {attempts} attempts")]
    NotReady { url: String, attempts: u32 },

    #[error("probe request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Failures that say nothing about the request itself, only that the
/// service could not be reached or did not answer in time
fn is_transient(error: &reqwest::Error) -> bool {
    !(error.is_builder() || error.is_redirect() || error.is_decode())
}

/// Poll `base_url` + `config.path` until ready; returns the attempts used
pub async fn wait_for_service(
    client: &reqwest::Client,
    base_url: &str,
    config: &ProbeConfig,
) -> Result<u32, ProbeError> {
    let url = format!("{}{}", base_url.trim_end_matches('/'), config.path);

    for attempt in 1..=config.attempts {
        match client
            .get(&url)
            .timeout(config.request_timeout())
            .send()
            .await
        {
            Ok(response) => {
                let status = response.status().as_u16();
                if config.policy.accepts(status) {
                    info!(url = %url, status = status, attempt = attempt, "Service is up");
                    return Ok(attempt);
                }
                debug!(
                    url = %url,
                    status = status,
                    attempt = attempt,
                    "Service answered with a status outside the ready policy"
                );
            }
            Err(e) if is_transient(&e) => {
                debug!(url = %url, attempt = attempt, error = %e, "Service not reachable yet");
            }
            Err(source) => return Err(ProbeError::Http { url, source }),
        }

        if attempt < config.attempts {
            sleep(config.delay()).await;
        }
    }

    Err(ProbeError::NotReady {
        url,
        attempts: config.attempts,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[path = "probe_test.rs"]
mod tests;
