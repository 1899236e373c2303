use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    /// Assertion mismatch or API transport failure
    Failed(String),
    /// Required fixture missing; no request was made
    Errored(String),
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "passed",
            Outcome::Failed(_) => "failed",
            Outcome::Errored(_) => "errored",
        }
    }
}

#[derive(Debug, Clone)]
pub struct StepResult {
    pub name: &'static str,
    pub outcome: Outcome,
    pub duration: Duration,
}

/// Results of one suite run
#[derive(Debug, Clone)]
pub struct Report {
    pub base_url: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub results: Vec<StepResult>,
}

impl Report {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            started_at: Utc::now(),
            finished_at: None,
            results: Vec::new(),
        }
    }

    pub fn push(&mut self, result: StepResult) {
        self.results.push(result);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    fn count(&self, label: &str) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome.label() == label)
            .count()
    }

    pub fn passed(&self) -> usize {
        self.count("passed")
    }

    pub fn failed(&self) -> usize {
        self.count("failed")
    }

    pub fn errored(&self) -> usize {
        self.count("errored")
    }

    pub fn is_success(&self) -> bool {
        self.passed() == self.results.len()
    }

    /// Process exit status for this run: 0 all passed, 1 otherwise
    pub fn exit_code(&self) -> u8 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    pub fn outcome_of(&self, step: &str) -> Option<&Outcome> {
        self.results
            .iter()
            .find(|r| r.name == step)
            .map(|r| &r.outcome)
    }

    fn total_duration(&self) -> Duration {
        self.results.iter().map(|r| r.duration).sum()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "storefront API suite against {}", self.base_url)?;
        for result in &self.results {
            match &result.outcome {
                Outcome::Passed => writeln!(f, "  {} PASSED", result.name)?,
                Outcome::Failed(reason) => writeln!(f, "  {} FAILED - {}", result.name, reason)?,
                Outcome::Errored(reason) => writeln!(f, "  {} ERROR - {}", result.name, reason)?,
            }
        }

        let mut parts = vec![format!("{} passed", self.passed())];
        if self.failed() > 0 {
            parts.push(format!("{} failed", self.failed()));
        }
        if self.errored() > 0 {
            parts.push(format!("{} errored", self.errored()));
        }
        write!(
            f,
            "== {} in {:.2}s ==",
            parts.join(", "),
            self.total_duration().as_secs_f64()
        )
    }
}
