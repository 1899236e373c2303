//! Assertion helpers for API responses
//!
//! Each helper turns a mismatch into `StepError::Assertion` with enough
//! context to diagnose the failure from the report alone.

use super::StepError;
use crate::api::ApiResponse;
use std::fmt::Debug;

/// Longest response body quoted in a failure message
const BODY_PREVIEW: usize = 200;

fn preview(body: &str) -> String {
    if body.chars().count() <= BODY_PREVIEW {
        body.to_string()
    } else {
        let cut: String = body.chars().take(BODY_PREVIEW).collect();
        format!("{}...", cut)
    }
}

pub fn expect_status(response: &ApiResponse, expected: u16) -> Result<(), StepError> {
    if response.status != expected {
        return Err(StepError::Assertion(format!(
            "expected status {}, got {}: {:?}",
            expected,
            response.status,
            preview(&response.body)
        )));
    }
    Ok(())
}

pub fn expect_body(response: &ApiResponse, expected: &str) -> Result<(), StepError> {
    if response.body != expected {
        return Err(StepError::Assertion(format!(
            "expected body {:?}, got {:?}",
            expected,
            preview(&response.body)
        )));
    }
    Ok(())
}

/// Status and exact body text together
pub fn expect_reply(response: &ApiResponse, status: u16, body: &str) -> Result<(), StepError> {
    expect_status(response, status)?;
    expect_body(response, body)
}

pub fn expect_eq<T>(what: &str, expected: &T, actual: &T) -> Result<(), StepError>
where
    T: PartialEq + Debug + ?Sized,
{
    if expected != actual {
        return Err(StepError::Assertion(format!(
            "{} mismatch: expected {:?}, got {:?}",
            what, expected, actual
        )));
    }
    Ok(())
}
