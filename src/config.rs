//! Run configuration
//!
//! Layered as: built-in defaults → optional TOML file → `STOREFRONT_*`
//! environment variables. CLI flags are applied on top by `main`.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration for a deploy/test run
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub tools: ToolsConfig,
    pub deploy: DeployConfig,
    pub probe: ProbeConfig,
    pub suite: SuiteConfig,
    pub events: EventsConfig,
    /// Prometheus textfile written at the end of a run
    pub metrics_file: Option<PathBuf>,
}

/// Executable names for the external tooling
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    pub minikube: String,
    pub docker: String,
    pub kubectl: String,
    pub helm: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            minikube: "minikube".to_string(),
            docker: "docker".to_string(),
            kubectl: "kubectl".to_string(),
            helm: "helm".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DeployConfig {
    /// Image tag built and pushed before install
    pub image: String,
    pub build_context: PathBuf,
    pub skip_build: bool,
    pub skip_push: bool,
    pub install: InstallMethod,
    /// Deployment whose `available` condition gates the rollout wait
    pub deployment: String,
    /// NodePort service exposing the storefront
    pub service: String,
    pub rollout_timeout_secs: u64,
    /// Pod name substrings that must all show up in `kubectl get pods`
    pub pod_markers: Vec<String>,
    pub pod_poll: PollConfig,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            image: "malcolmcfraser/mf-node-app-template:latest".to_string(),
            build_context: PathBuf::from("."),
            skip_build: false,
            skip_push: false,
            install: InstallMethod::default(),
            deployment: "mf-node-app".to_string(),
            service: "mf-node-app-service".to_string(),
            rollout_timeout_secs: 300,
            pod_markers: vec!["mysql-0".to_string(), "node-app".to_string()],
            pod_poll: PollConfig::default(),
        }
    }
}

/// How the application is installed into the cluster
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum InstallMethod {
    /// `kubectl apply -f` each manifest in order
    Manifests { paths: Vec<PathBuf> },
    /// `helm upgrade --install`
    Helm {
        release: String,
        chart: String,
        #[serde(default)]
        values: Option<PathBuf>,
    },
}

impl Default for InstallMethod {
    fn default() -> Self {
        InstallMethod::Manifests {
            paths: vec![
                PathBuf::from("./node-app-template-artifacts/mysql-statefulset.yaml"),
                PathBuf::from("./node-app-template-artifacts/node-app.yaml"),
            ],
        }
    }
}

/// Fixed-delay polling budget
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PollConfig {
    pub attempts: u32,
    pub delay_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            attempts: 30,
            delay_secs: 5,
        }
    }
}

impl PollConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

/// Which responses count as "the service is up"
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReadyPolicy {
    /// Any HTTP response at all
    #[default]
    Any,
    /// Only the listed status codes
    Status { codes: Vec<u16> },
}

impl ReadyPolicy {
    pub fn accepts(&self, status: u16) -> bool {
        match self {
            ReadyPolicy::Any => true,
            ReadyPolicy::Status { codes } => codes.contains(&status),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProbeConfig {
    pub path: String,
    pub attempts: u32,
    pub delay_ms: u64,
    pub request_timeout_ms: u64,
    pub policy: ReadyPolicy,
}

impl ProbeConfig {
    /// Budget used by the test phase when it resolves the URL itself
    pub fn for_test_phase() -> Self {
        Self {
            path: "/register".to_string(),
            attempts: 30,
            delay_ms: 1_000,
            request_timeout_ms: 2_000,
            policy: ReadyPolicy::Status {
                codes: vec![200, 400, 404],
            },
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            path: "/register".to_string(),
            attempts: 30,
            delay_ms: 10_000,
            request_timeout_ms: 10_000,
            policy: ReadyPolicy::Any,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SuiteConfig {
    pub username: String,
    pub password: String,
    pub request_timeout_secs: u64,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            username: "testuser7".to_string(),
            password: "testpassword".to_string(),
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EventsConfig {
    pub enabled: bool,
    pub sink_url: Option<String>,
}

impl Config {
    /// Load defaults, then the TOML file (if any), then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Apply `STOREFRONT_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(image) = lookup("STOREFRONT_IMAGE") {
            self.deploy.image = image;
        }
        if let Some(deployment) = lookup("STOREFRONT_DEPLOYMENT") {
            self.deploy.deployment = deployment;
        }
        if let Some(service) = lookup("STOREFRONT_SERVICE") {
            self.deploy.service = service;
        }
        if let Some(username) = lookup("STOREFRONT_USERNAME") {
            self.suite.username = username;
        }
        if let Some(password) = lookup("STOREFRONT_PASSWORD") {
            self.suite.password = password;
        }
        if let Some(enabled) = lookup("STOREFRONT_CDEVENTS_ENABLED") {
            self.events.enabled = match enabled.as_str() {
                "true" => true,
                "false" => false,
                other => {
                    return Err(ConfigError::Invalid(format!(
                        "STOREFRONT_CDEVENTS_ENABLED must be true or false, got {:?}",
                        other
                    )))
                }
            };
        }
        if let Some(url) = lookup("STOREFRONT_CDEVENTS_SINK_URL") {
            self.events.sink_url = Some(url);
        }
        if let Some(file) = lookup("STOREFRONT_METRICS_FILE") {
            self.metrics_file = Some(PathBuf::from(file));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.deploy.pod_poll.attempts == 0 {
            return Err(ConfigError::Invalid(
                "deploy.pod_poll.attempts must be at least 1".to_string(),
            ));
        }
        if self.probe.attempts == 0 {
            return Err(ConfigError::Invalid(
                "probe.attempts must be at least 1".to_string(),
            ));
        }
        if !self.probe.path.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "probe.path must start with '/', got {:?}",
                self.probe.path
            )));
        }
        if let InstallMethod::Manifests { paths } = &self.deploy.install {
            if paths.is_empty() {
                return Err(ConfigError::Invalid(
                    "deploy.install.paths must list at least one manifest".to_string(),
                ));
            }
        }
        if let ReadyPolicy::Status { codes } = &self.probe.policy {
            if codes.is_empty() {
                return Err(ConfigError::Invalid(
                    "probe.policy.codes must not be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[path = "config_test.rs"]
mod tests;
