//! API assertion suite
//!
//! A fixed, ordered list of steps run against one storefront deployment.
//! Steps share a `Session` carrying the fixtures earlier steps produce
//! (bearer token, created product, cart entry). A failed step never stops
//! the run; a step whose fixture is missing is reported as errored without
//! touching the API.

pub mod expect;
mod report;
mod steps;

pub use report::{Outcome, Report, StepResult};
pub use steps::standard_steps;

use crate::api::{ApiError, CartAdd, Product, StoreClient};
use crate::config::SuiteConfig;
use crate::metrics::RunMetrics;
use async_trait::async_trait;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum StepError {
    #[error("{0}")]
    Assertion(String),

    #[error("fixture `{0}` was not produced by an earlier step")]
    MissingFixture(&'static str),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// State threaded through the steps of one run
pub struct Session {
    pub client: StoreClient,
    pub username: String,
    pub password: String,
    token: Option<String>,
    product: Option<Product>,
    cart_entry: Option<CartAdd>,
}

impl Session {
    pub fn new(client: StoreClient, config: &SuiteConfig) -> Self {
        Self {
            client,
            username: config.username.clone(),
            password: config.password.clone(),
            token: None,
            product: None,
            cart_entry: None,
        }
    }

    pub fn token(&self) -> Result<&str, StepError> {
        self.token
            .as_deref()
            .ok_or(StepError::MissingFixture("token"))
    }

    pub fn product(&self) -> Result<&Product, StepError> {
        self.product
            .as_ref()
            .ok_or(StepError::MissingFixture("product"))
    }

    pub fn cart_entry(&self) -> Result<&CartAdd, StepError> {
        self.cart_entry
            .as_ref()
            .ok_or(StepError::MissingFixture("cart entry"))
    }

    pub(crate) fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub(crate) fn set_product(&mut self, product: Product) {
        self.product = Some(product);
    }

    pub(crate) fn set_cart_entry(&mut self, entry: CartAdd) {
        self.cart_entry = Some(entry);
    }
}

/// One assertion step
#[async_trait]
pub trait Step: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, session: &mut Session) -> Result<(), StepError>;
}

/// Ordered collection of steps
pub struct Suite {
    steps: Vec<Box<dyn Step>>,
    metrics: RunMetrics,
}

impl Suite {
    /// The storefront contract: register → login → products → cart → unregister
    pub fn standard(metrics: RunMetrics) -> Self {
        Self::with_steps(standard_steps(), metrics)
    }

    pub fn with_steps(steps: Vec<Box<dyn Step>>, metrics: RunMetrics) -> Self {
        Self { steps, metrics }
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Run every step in order and collect the results
    pub async fn run(&self, session: &mut Session) -> Report {
        let mut report = Report::new(session.client.base_url());
        info!(
            base_url = %session.client.base_url(),
            steps = self.steps.len(),
            "Running API suite"
        );

        for step in &self.steps {
            let started = Instant::now();
            let outcome = match step.run(session).await {
                Ok(()) => Outcome::Passed,
                Err(StepError::MissingFixture(fixture)) => Outcome::Errored(format!(
                    "fixture `{}` was not produced by an earlier step",
                    fixture
                )),
                Err(e) => Outcome::Failed(e.to_string()),
            };
            let duration = started.elapsed();

            match &outcome {
                Outcome::Passed => info!(step = step.name(), "PASSED"),
                Outcome::Failed(reason) => warn!(step = step.name(), reason = %reason, "FAILED"),
                Outcome::Errored(reason) => {
                    warn!(step = step.name(), reason = %reason, "ERROR")
                }
            }

            self.metrics
                .record_step(step.name(), outcome.label(), duration.as_secs_f64());
            report.push(StepResult {
                name: step.name(),
                outcome,
                duration,
            });
        }

        report.finish();
        report
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[path = "suite_test.rs"]
mod tests;
