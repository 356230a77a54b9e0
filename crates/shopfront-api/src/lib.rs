//! REST client for the Shopfront storefront API.
//!
//! Provides an [`ApiClient`] bound to the API base URL and implementations
//! of the commerce core's remote service traits on top of it.
//!
//! # Example
//!
//! ```rust,ignore
//! use shopfront_api::{ApiClient, ApiConfig, HttpCartService, HttpCatalog, HttpOrderService};
//! use shopfront_commerce::prelude::*;
//! use std::sync::Arc;
//!
//! let client = Arc::new(ApiClient::from_config(&ApiConfig::default())?.with_token(token));
//! let cart_service = Arc::new(HttpCartService::new(client.clone(), Currency::USD));
//! let catalog = Arc::new(HttpCatalog::new(client.clone(), Currency::USD));
//! let orders = Arc::new(HttpOrderService::new(client));
//!
//! let cart = CartStore::new(cart_service, catalog, identity, Currency::USD);
//! cart.refresh().await?;
//! ```

mod error;
mod request;
mod response;
mod services;
mod wire;

pub use error::FetchError;
pub use request::{Method, RequestBuilder};
pub use response::Response;
pub use services::{HttpCartService, HttpCatalog, HttpOrderService};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default API base URL for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Connection settings for the storefront API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every path is appended to.
    pub base_url: String,
    /// Bearer token for the signed-in user.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Request timeout in seconds. `None` uses the transport default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout_secs: None,
        }
    }
}

/// HTTP client for the storefront API.
///
/// Cheap to share behind an `Arc`; the underlying connection pool is reused
/// across requests.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create a client for `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Create a client from config.
    pub fn from_config(config: &ApiConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build()?;

        let mut client = Self {
            http,
            base_url: config.base_url.clone(),
            token: None,
        };
        if let Some(token) = &config.token {
            client = client.with_token(token.clone());
        }
        Ok(client)
    }

    /// Send a bearer token with every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Create a GET request.
    pub fn get(&self, path: impl Into<String>) -> RequestBuilder {
        self.request(Method::Get, path)
    }

    /// Create a POST request.
    pub fn post(&self, path: impl Into<String>) -> RequestBuilder {
        self.request(Method::Post, path)
    }

    /// Create a PUT request.
    pub fn put(&self, path: impl Into<String>) -> RequestBuilder {
        self.request(Method::Put, path)
    }

    /// Create a DELETE request.
    pub fn delete(&self, path: impl Into<String>) -> RequestBuilder {
        self.request(Method::Delete, path)
    }

    /// Create a request with a custom method.
    pub fn request(&self, method: Method, path: impl Into<String>) -> RequestBuilder {
        let mut builder = RequestBuilder::new(self.http.clone(), method, self.url_for(&path.into()))
            .header("Accept", "application/json");
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        ApiClient, ApiConfig, FetchError, HttpCartService, HttpCatalog, HttpOrderService,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("http://localhost:5000/api/");
        assert_eq!(client.url_for("/cart"), "http://localhost:5000/api/cart");
        assert_eq!(client.url_for("cart/add"), "http://localhost:5000/api/cart/add");
        assert_eq!(
            client.url_for("https://cdn.example.com/x"),
            "https://cdn.example.com/x"
        );
    }

    #[test]
    fn test_request_headers() {
        let client = ApiClient::new(DEFAULT_BASE_URL)
            .with_token("abc");
        let request = client.post("/orders");
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url, "http://localhost:5000/api/orders");
        assert_eq!(request.headers["Authorization"], "Bearer abc");
        assert_eq!(request.headers["Accept"], "application/json");
    }

    #[test]
    fn test_json_body_sets_content_type() {
        let request = ApiClient::new(DEFAULT_BASE_URL)
            .put("/cart/update")
            .json(&serde_json::json!({"productId": "p1", "quantity": 2}))
            .unwrap();
        assert_eq!(request.headers["Content-Type"], "application/json");
        assert!(request.body.is_some());
    }

    #[test]
    fn test_config_defaults() {
        let config: ApiConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.token.is_none());
    }
}
