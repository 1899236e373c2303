//! Storefront REST API client
//!
//! Thin typed wrapper over the endpoints the assertion suite exercises.
//! Responses are returned raw (status + body) because the suite asserts on
//! exact status codes and body text.

mod client;
mod types;

pub use client::{ApiResponse, StoreClient};
pub use types::{CartAdd, CartItem, Credentials, LoginResponse, NewProduct, Product};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("{method} {path} failed: {source}")]
    Request {
        method: &'static str,
        path: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("response body is not the expected JSON: {0}")]
    Decode(#[from] serde_json::Error),
}
