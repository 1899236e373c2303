//! Deploy-then-test orchestration
//!
//! The deploy phase must finish with a reachable service before the test
//! phase starts. Both phases run strictly sequentially.

use crate::api::{ApiError, StoreClient};
use crate::config::{Config, ProbeConfig};
use crate::deploy::{resolve_endpoint, CommandRunner, DeployError, Deployer};
use crate::events::{emit_service_deployed, emit_service_published, CDEventsSink, DeploymentInfo};
use crate::metrics::RunMetrics;
use crate::probe::{wait_for_service, ProbeError};
use crate::suite::{Report, Session, Suite};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("deployment failed: {0}")]
    Deploy(#[from] DeployError),

    #[error("service readiness check failed: {0}")]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub struct Pipeline<'a> {
    config: &'a Config,
    runner: &'a dyn CommandRunner,
    metrics: RunMetrics,
    events: CDEventsSink,
    http: reqwest::Client,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, runner: &'a dyn CommandRunner, metrics: RunMetrics) -> Self {
        Self {
            config,
            runner,
            metrics,
            events: CDEventsSink::from_config(&config.events),
            http: reqwest::Client::new(),
        }
    }

    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    fn deployment_info(&self) -> DeploymentInfo {
        DeploymentInfo {
            image: self.config.deploy.image.clone(),
            deployment: self.config.deploy.deployment.clone(),
            service: self.config.deploy.service.clone(),
        }
    }

    /// Deploy, resolve the service URL and wait until it answers
    pub async fn deploy(&self) -> Result<String, PipelineError> {
        let deployer = Deployer::new(
            self.runner,
            &self.config.tools,
            &self.config.deploy,
            self.metrics.clone(),
        );
        let outcome = deployer.deploy().await?;

        let info = self.deployment_info();
        if let Err(e) = emit_service_deployed(&self.events, &info, outcome.pod_poll_attempts).await
        {
            warn!(error = %e, "Failed to emit service.deployed event");
        }

        let url = self.reachable_url(&self.config.probe).await?;

        if let Err(e) = emit_service_published(&self.events, &info, &url).await {
            warn!(error = %e, "Failed to emit service.published event");
        }
        Ok(url)
    }

    /// Resolve the URL of an already deployed storefront and wait for it
    pub async fn discover(&self) -> Result<String, PipelineError> {
        self.reachable_url(&ProbeConfig::for_test_phase()).await
    }

    async fn reachable_url(&self, probe: &ProbeConfig) -> Result<String, PipelineError> {
        let endpoint =
            resolve_endpoint(self.runner, &self.config.tools, &self.config.deploy.service).await?;
        let url = endpoint.url();

        let attempts = wait_for_service(&self.http, &url, probe).await?;
        self.metrics.set_poll_attempts("endpoint", attempts);
        info!(url = %url, "Service URL ready");
        Ok(url)
    }

    /// Run the API suite against `base_url`
    pub async fn test(&self, base_url: &str) -> Result<Report, PipelineError> {
        let client = StoreClient::new(
            base_url,
            Duration::from_secs(self.config.suite.request_timeout_secs),
        )?;
        let mut session = Session::new(client, &self.config.suite);
        let report = Suite::standard(self.metrics.clone())
            .run(&mut session)
            .await;

        info!(
            passed = report.passed(),
            failed = report.failed(),
            errored = report.errored(),
            "API suite finished"
        );
        Ok(report)
    }
}
