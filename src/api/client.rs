use super::types::{CartAdd, Credentials, NewProduct};
use super::ApiError;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// Status and body of one API call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Client for one storefront deployment
#[derive(Debug, Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    base_url: String,
}

impl StoreClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::Client)?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn register(&self, credentials: &Credentials) -> Result<ApiResponse, ApiError> {
        let request = self.request(Method::POST, "/register").json(credentials);
        self.send("POST", "/register", request).await
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<ApiResponse, ApiError> {
        let request = self.request(Method::POST, "/login").json(credentials);
        self.send("POST", "/login", request).await
    }

    pub async fn add_product(
        &self,
        token: &str,
        product: &NewProduct,
    ) -> Result<ApiResponse, ApiError> {
        let request = self
            .request(Method::POST, "/products")
            .bearer_auth(token)
            .json(product);
        self.send("POST", "/products", request).await
    }

    pub async fn list_products(&self) -> Result<ApiResponse, ApiError> {
        let request = self.request(Method::GET, "/products");
        self.send("GET", "/products", request).await
    }

    pub async fn add_to_cart(&self, token: &str, item: &CartAdd) -> Result<ApiResponse, ApiError> {
        let request = self
            .request(Method::POST, "/cart")
            .bearer_auth(token)
            .json(item);
        self.send("POST", "/cart", request).await
    }

    pub async fn list_cart(&self, token: &str) -> Result<ApiResponse, ApiError> {
        let request = self.request(Method::GET, "/cart").bearer_auth(token);
        self.send("GET", "/cart", request).await
    }

    pub async fn unregister(&self, token: &str) -> Result<ApiResponse, ApiError> {
        let request = self
            .request(Method::DELETE, "/unregister")
            .bearer_auth(token);
        self.send("DELETE", "/unregister", request).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    async fn send(
        &self,
        method: &'static str,
        path: &'static str,
        request: RequestBuilder,
    ) -> Result<ApiResponse, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|source| ApiError::Request {
                method,
                path,
                source,
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|source| ApiError::Request {
                method,
                path,
                source,
            })?;

        debug!(method = method, path = path, status = status, "API response");
        Ok(ApiResponse { status, body })
    }
}
