//! CDEvents emission for deployment observability
//!
//! Two events per successful deployment:
//! - `service.deployed` once every expected pod is running
//! - `service.published` once the resolved endpoint answers
//!
//! Events are sent as CloudEvents JSON over HTTP POST. Callers log emission
//! failures; they never abort a run.

use cloudevents::Event;
use serde_json::json;
use thiserror::Error;

use crate::config::EventsConfig;

#[cfg(test)]
use std::sync::{Arc, Mutex};

#[derive(Debug, Error)]
pub enum EventsError {
    #[error("cdevents error: {0}")]
    Generic(String),
}

/// Details of a deployment shared by every event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentInfo {
    pub image: String,
    pub deployment: String,
    pub service: String,
}

impl DeploymentInfo {
    fn environment_id(&self) -> String {
        format!("minikube/{}", self.deployment)
    }

    fn environment_source(&self) -> String {
        format!(
            "/apis/apps/v1/namespaces/default/deployments/{}",
            self.deployment
        )
    }
}

/// CDEvents sink
pub struct CDEventsSink {
    enabled: bool,
    sink_url: Option<String>,
    #[cfg_attr(test, allow(dead_code))]
    http: reqwest::Client,
    #[cfg(test)]
    mock_events: Arc<Mutex<Vec<Event>>>,
}

impl CDEventsSink {
    pub fn from_config(config: &EventsConfig) -> Self {
        CDEventsSink {
            enabled: config.enabled,
            sink_url: config.sink_url.clone(),
            http: reqwest::Client::new(),
            #[cfg(test)]
            mock_events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Whether events will actually leave the process
    pub fn is_active(&self) -> bool {
        self.enabled && self.sink_url.is_some()
    }

    #[cfg(test)]
    pub fn new_mock() -> Self {
        Self::from_config(&EventsConfig {
            enabled: true,
            sink_url: Some("http://sink.invalid/events".to_string()),
        })
    }

    #[cfg(test)]
    #[allow(clippy::unwrap_used)]
    pub fn get_emitted_events(&self) -> Vec<Event> {
        self.mock_events.lock().unwrap().clone()
    }

    #[cfg(test)]
    #[allow(clippy::unwrap_used)]
    async fn send_event(&self, event: Event) -> Result<(), EventsError> {
        if self.is_active() {
            self.mock_events.lock().unwrap().push(event);
        }
        Ok(())
    }

    #[cfg(not(test))]
    async fn send_event(&self, event: Event) -> Result<(), EventsError> {
        if !self.enabled {
            return Ok(());
        }

        let Some(url) = &self.sink_url else {
            return Ok(());
        };

        self.http
            .post(url)
            .header("Content-Type", "application/cloudevents+json")
            .json(&event)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| EventsError::Generic(format!("HTTP POST failed: {}", e)))?;

        Ok(())
    }
}

/// Emit `service.deployed` after the pods came up
pub async fn emit_service_deployed(
    sink: &CDEventsSink,
    info: &DeploymentInfo,
    pod_poll_attempts: u32,
) -> Result<(), EventsError> {
    if !sink.is_active() {
        return Ok(());
    }
    let event = build_service_deployed_event(info, pod_poll_attempts)?;
    sink.send_event(event).await
}

/// Emit `service.published` after the endpoint answered
pub async fn emit_service_published(
    sink: &CDEventsSink,
    info: &DeploymentInfo,
    url: &str,
) -> Result<(), EventsError> {
    if !sink.is_active() {
        return Ok(());
    }
    let event = build_service_published_event(info, url)?;
    sink.send_event(event).await
}

/// Build a service.deployed CDEvent
fn build_service_deployed_event(
    info: &DeploymentInfo,
    pod_poll_attempts: u32,
) -> Result<Event, EventsError> {
    use cdevents_sdk::latest::service_deployed;
    use cdevents_sdk::{CDEvent, Subject};

    let cdevent = CDEvent::from(
        Subject::from(service_deployed::Content {
            artifact_id: info
                .image
                .clone()
                .try_into()
                .map_err(|e| EventsError::Generic(format!("Invalid artifact_id: {}", e)))?,
            environment: service_deployed::ContentEnvironment {
                id: info.environment_id().try_into().map_err(|e| {
                    EventsError::Generic(format!("Invalid environment id: {}", e))
                })?,
                source: Some(info.environment_source().try_into().map_err(|e| {
                    EventsError::Generic(format!("Invalid environment source: {}", e))
                })?),
            },
        })
        .with_id(
            format!("/deployments/{}/deployed", info.deployment)
                .try_into()
                .map_err(|e| EventsError::Generic(format!("Invalid subject id: {}", e)))?,
        )
        .with_source(
            "https://storefront-e2e.local/driver"
                .try_into()
                .map_err(|e| EventsError::Generic(format!("Invalid subject source: {}", e)))?,
        ),
    )
    .with_id(
        uuid::Uuid::new_v4()
            .to_string()
            .try_into()
            .map_err(|e| EventsError::Generic(format!("Invalid event id: {}", e)))?,
    )
    .with_source(
        "https://storefront-e2e.local"
            .try_into()
            .map_err(|e| EventsError::Generic(format!("Invalid event source: {}", e)))?,
    )
    .with_custom_data(build_custom_data(
        info,
        json!({ "pod_poll_attempts": pod_poll_attempts }),
    ));

    let cloudevent: Event = cdevent
        .try_into()
        .map_err(|e| EventsError::Generic(format!("Failed to convert to CloudEvent: {}", e)))?;

    Ok(cloudevent)
}

/// Build a service.published CDEvent
fn build_service_published_event(info: &DeploymentInfo, url: &str) -> Result<Event, EventsError> {
    use cdevents_sdk::latest::service_published;
    use cdevents_sdk::{CDEvent, Subject};

    let cdevent = CDEvent::from(
        Subject::from(service_published::Content {
            environment: Some(service_published::ContentEnvironment {
                id: info.environment_id().try_into().map_err(|e| {
                    EventsError::Generic(format!("Invalid environment id: {}", e))
                })?,
                source: Some(info.environment_source().try_into().map_err(|e| {
                    EventsError::Generic(format!("Invalid environment source: {}", e))
                })?),
            }),
        })
        .with_id(
            format!("/services/{}/published", info.service)
                .try_into()
                .map_err(|e| EventsError::Generic(format!("Invalid subject id: {}", e)))?,
        )
        .with_source(
            "https://storefront-e2e.local/driver"
                .try_into()
                .map_err(|e| EventsError::Generic(format!("Invalid subject source: {}", e)))?,
        ),
    )
    .with_id(
        uuid::Uuid::new_v4()
            .to_string()
            .try_into()
            .map_err(|e| EventsError::Generic(format!("Invalid event id: {}", e)))?,
    )
    .with_source(
        "https://storefront-e2e.local"
            .try_into()
            .map_err(|e| EventsError::Generic(format!("Invalid event source: {}", e)))?,
    )
    .with_custom_data(build_custom_data(info, json!({ "url": url })));

    let cloudevent: Event = cdevent
        .try_into()
        .map_err(|e| EventsError::Generic(format!("Failed to convert to CloudEvent: {}", e)))?;

    Ok(cloudevent)
}

fn build_custom_data(info: &DeploymentInfo, detail: serde_json::Value) -> serde_json::Value {
    json!({
        "storefront": {
            "version": "v1",
            "image": info.image,
            "deployment": info.deployment,
            "service": info.service,
            "detail": detail
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[path = "events_test.rs"]
mod tests;
