use super::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

fn session() -> Session {
    let client = StoreClient::with_client(reqwest::Client::new(), "http://127.0.0.1:9");
    Session::new(client, &SuiteConfig::default())
}

struct Passes(&'static str);

#[async_trait]
impl Step for Passes {
    fn name(&self) -> &'static str {
        self.0
    }

    async fn run(&self, _session: &mut Session) -> Result<(), StepError> {
        Ok(())
    }
}

struct Fails(&'static str);

#[async_trait]
impl Step for Fails {
    fn name(&self) -> &'static str {
        self.0
    }

    async fn run(&self, _session: &mut Session) -> Result<(), StepError> {
        Err(StepError::Assertion("expected status 201, got 500".to_string()))
    }
}

/// Stores a token so later steps can use it
struct IssuesToken;

#[async_trait]
impl Step for IssuesToken {
    fn name(&self) -> &'static str {
        "issues_token"
    }

    async fn run(&self, session: &mut Session) -> Result<(), StepError> {
        session.set_token("t0k3n".to_string());
        Ok(())
    }
}

/// Needs the token; counts how often it actually ran past the fixture check
struct NeedsToken(Arc<AtomicU32>);

#[async_trait]
impl Step for NeedsToken {
    fn name(&self) -> &'static str {
        "needs_token"
    }

    async fn run(&self, session: &mut Session) -> Result<(), StepError> {
        let token = session.token()?;
        assert_eq!(token, "t0k3n");
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_standard_steps_follow_the_endpoint_contract_order() {
    let suite = Suite::standard(RunMetrics::new().unwrap());
    assert_eq!(
        suite.step_names(),
        vec![
            "register_success",
            "register_duplicate",
            "register_missing_fields",
            "login_success",
            "login_invalid_password",
            "login_nonexistent_user",
            "add_product",
            "list_products",
            "add_to_cart",
            "list_cart",
            "unregister",
        ]
    );
}

#[tokio::test]
async fn test_failure_does_not_stop_sibling_steps() {
    let metrics = RunMetrics::new().unwrap();
    let suite = Suite::with_steps(
        vec![
            Box::new(Passes("first")),
            Box::new(Fails("second")),
            Box::new(Passes("third")),
        ],
        metrics.clone(),
    );

    let report = suite.run(&mut session()).await;

    assert_eq!(report.passed(), 2);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.exit_code(), 1);
    assert_eq!(
        report.outcome_of("second"),
        Some(&Outcome::Failed("expected status 201, got 500".to_string()))
    );
    assert!(report.finished_at.is_some());

    let exposition = metrics.encode().unwrap();
    assert!(exposition.contains("storefront_steps_total{outcome=\"passed\"} 2"));
    assert!(exposition.contains("storefront_steps_total{outcome=\"failed\"} 1"));
}

#[tokio::test]
async fn test_missing_fixture_is_reported_as_errored() {
    let ran = Arc::new(AtomicU32::new(0));
    let suite = Suite::with_steps(
        vec![Box::new(NeedsToken(ran.clone()))],
        RunMetrics::new().unwrap(),
    );

    let report = suite.run(&mut session()).await;

    assert_eq!(report.errored(), 1);
    assert_eq!(ran.load(Ordering::SeqCst), 0);
    match report.outcome_of("needs_token") {
        Some(Outcome::Errored(reason)) => assert!(reason.contains("token")),
        other => panic!("expected errored outcome, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fixture_is_shared_with_later_steps() {
    let ran = Arc::new(AtomicU32::new(0));
    let suite = Suite::with_steps(
        vec![
            Box::new(IssuesToken),
            Box::new(NeedsToken(ran.clone())),
            Box::new(NeedsToken(ran.clone())),
        ],
        RunMetrics::new().unwrap(),
    );

    let report = suite.run(&mut session()).await;

    assert!(report.is_success());
    assert_eq!(report.exit_code(), 0);
    assert_eq!(ran.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_report_renders_verbose_summary() {
    let suite = Suite::with_steps(
        vec![Box::new(Passes("register_success")), Box::new(Fails("login_success"))],
        RunMetrics::new().unwrap(),
    );

    let report = suite.run(&mut session()).await;
    let rendered = report.to_string();

    assert!(rendered.starts_with("storefront API suite against http://127.0.0.1:9"));
    assert!(rendered.contains("  register_success PASSED\n"));
    assert!(rendered.contains("  login_success FAILED - expected status 201, got 500\n"));
    assert!(rendered.contains("== 1 passed, 1 failed in "));
}

#[test]
fn test_session_fixtures_start_empty() {
    let session = session();
    assert!(matches!(session.token(), Err(StepError::MissingFixture("token"))));
    assert!(matches!(session.product(), Err(StepError::MissingFixture("product"))));
    assert!(matches!(
        session.cart_entry(),
        Err(StepError::MissingFixture("cart entry"))
    ));
    assert_eq!(session.username, "testuser7");
}
