//! Deployment sequence
//!
//! Start cluster → build image → push image → install → rollout wait →
//! pod readiness poll. Every command must exit zero; the first failure
//! aborts the whole run.

use super::readiness::wait_for_pods;
use super::{CommandRunner, CommandSpec, DeployError};
use crate::config::{DeployConfig, InstallMethod, ToolsConfig};
use crate::metrics::RunMetrics;
use std::time::Instant;
use tracing::info;

/// Coarse stage of the deployment, used for logging and phase metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployPhase {
    Cluster,
    Build,
    Push,
    Install,
    Rollout,
    Pods,
}

impl DeployPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployPhase::Cluster => "cluster",
            DeployPhase::Build => "build",
            DeployPhase::Push => "push",
            DeployPhase::Install => "install",
            DeployPhase::Rollout => "rollout",
            DeployPhase::Pods => "pods",
        }
    }
}

/// One command of the deployment plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCommand {
    pub phase: DeployPhase,
    pub command: CommandSpec,
}

/// Result of a successful deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOutcome {
    /// `kubectl get pods` queries needed before every pod was running
    pub pod_poll_attempts: u32,
}

pub struct Deployer<'a> {
    runner: &'a dyn CommandRunner,
    tools: &'a ToolsConfig,
    config: &'a DeployConfig,
    metrics: RunMetrics,
}

impl<'a> Deployer<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        tools: &'a ToolsConfig,
        config: &'a DeployConfig,
        metrics: RunMetrics,
    ) -> Self {
        Self {
            runner,
            tools,
            config,
            metrics,
        }
    }

    /// Commands run before pod polling, in order
    pub fn plan(&self) -> Vec<PlannedCommand> {
        let tools = self.tools;
        let config = self.config;
        let mut plan = Vec::new();
        let mut push = |phase, command| plan.push(PlannedCommand { phase, command });

        push(
            DeployPhase::Cluster,
            CommandSpec::new(&tools.minikube).arg("start"),
        );
        push(
            DeployPhase::Cluster,
            CommandSpec::new(&tools.minikube).arg("ip"),
        );

        if !config.skip_build {
            push(
                DeployPhase::Build,
                CommandSpec::new(&tools.docker)
                    .args(["build", "-t", config.image.as_str()])
                    .arg(config.build_context.display().to_string()),
            );
        }
        if !config.skip_push {
            push(
                DeployPhase::Push,
                CommandSpec::new(&tools.docker).args(["push", config.image.as_str()]),
            );
        }

        match &config.install {
            InstallMethod::Manifests { paths } => {
                for path in paths {
                    push(
                        DeployPhase::Install,
                        CommandSpec::new(&tools.kubectl)
                            .args(["apply", "-f"])
                            .arg(path.display().to_string()),
                    );
                }
            }
            InstallMethod::Helm {
                release,
                chart,
                values,
            } => {
                let mut command = CommandSpec::new(&tools.helm).args([
                    "upgrade",
                    "--install",
                    release.as_str(),
                    chart.as_str(),
                ]);
                if let Some(values) = values {
                    command = command.arg("--values").arg(values.display().to_string());
                }
                push(DeployPhase::Install, command);
            }
        }

        push(
            DeployPhase::Install,
            CommandSpec::new(&tools.kubectl).args(["get", "pods"]),
        );
        push(
            DeployPhase::Rollout,
            CommandSpec::new(&tools.kubectl).args([
                "wait".to_string(),
                "--for=condition=available".to_string(),
                format!("--timeout={}s", config.rollout_timeout_secs),
                format!("deployment/{}", config.deployment),
            ]),
        );

        plan
    }

    /// Run the full deployment sequence
    pub async fn deploy(&self) -> Result<DeployOutcome, DeployError> {
        let plan = self.plan();
        info!(
            image = %self.config.image,
            deployment = %self.config.deployment,
            commands = plan.len(),
            "Deploying storefront"
        );

        let mut current: Option<(DeployPhase, Instant)> = None;
        for step in &plan {
            match current {
                Some((phase, _)) if phase == step.phase => {}
                _ => {
                    if let Some((phase, started)) = current.take() {
                        self.finish_phase(phase, started);
                    }
                    info!(phase = step.phase.as_str(), "Starting deployment phase");
                    current = Some((step.phase, Instant::now()));
                }
            }

            info!(command = %step.command, "Running");
            self.runner.run(&step.command).await?;
        }
        if let Some((phase, started)) = current {
            self.finish_phase(phase, started);
        }

        let started = Instant::now();
        let pod_poll_attempts = wait_for_pods(
            self.runner,
            &self.tools.kubectl,
            &self.config.pod_markers,
            self.config.pod_poll,
        )
        .await?;
        self.finish_phase(DeployPhase::Pods, started);
        self.metrics.set_poll_attempts("pods", pod_poll_attempts);

        Ok(DeployOutcome { pod_poll_attempts })
    }

    fn finish_phase(&self, phase: DeployPhase, started: Instant) {
        let elapsed = started.elapsed().as_secs_f64();
        self.metrics.record_phase(phase.as_str(), elapsed);
        info!(
            phase = phase.as_str(),
            duration_secs = elapsed,
            "Deployment phase complete"
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[path = "driver_test.rs"]
mod tests;
