//! HTTP fetch abstraction.
//!
//! The client never talks to `reqwest` directly; it hands a [`FetchRequest`]
//! to a [`Fetch`] implementation and inspects the returned [`FetchResponse`].
//! This keeps transport concerns (auth headers, proxies, timeouts) with the
//! host that constructs the fetch capability.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::PagerDutyError;

/// Options for a single HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// HTTP method.
    pub method: Method,
    /// Request headers.
    pub headers: BTreeMap<String, String>,
    /// Optional request body.
    pub body: Option<String>,
}

impl FetchRequest {
    /// Create a request with no headers and no body.
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Response of an HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl FetchResponse {
    /// Create a response from a status and body.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, PagerDutyError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Body as (lossy) UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Performs HTTP exchanges on behalf of the client.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Send `request` to `url` and return the response, whatever its status.
    ///
    /// Only transport failures are errors here; status handling belongs to
    /// the caller.
    async fn fetch(&self, url: &str, request: FetchRequest)
        -> Result<FetchResponse, PagerDutyError>;
}

/// [`Fetch`] implementation backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestFetch {
    client: Client,
}

impl ReqwestFetch {
    /// Create a fetcher with a default `reqwest` client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fetcher around an existing `reqwest` client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetch for ReqwestFetch {
    async fn fetch(
        &self,
        url: &str,
        request: FetchRequest,
    ) -> Result<FetchResponse, PagerDutyError> {
        debug!(method = %request.method, url = %url, "Sending request");

        let mut builder = self.client.request(request.method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(FetchResponse::new(status, body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_covers_2xx_only() {
        assert!(FetchResponse::new(200, Vec::new()).ok());
        assert!(FetchResponse::new(202, Vec::new()).ok());
        assert!(!FetchResponse::new(199, Vec::new()).ok());
        assert!(!FetchResponse::new(302, Vec::new()).ok());
        assert!(!FetchResponse::new(500, Vec::new()).ok());
    }

    #[test]
    fn test_json_accessor() {
        let response = FetchResponse::new(200, br#"{"status":"success"}"#.to_vec());
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["status"], "success");

        let bad = FetchResponse::new(200, b"not json".to_vec());
        assert!(matches!(
            bad.json::<serde_json::Value>(),
            Err(PagerDutyError::Serialization(_))
        ));
    }

    #[test]
    fn test_request_builder() {
        let request = FetchRequest::new(Method::POST)
            .with_header("Content-Type", "application/json")
            .with_body("{}");
        assert_eq!(request.method, Method::POST);
        assert_eq!(
            request.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(request.body.as_deref(), Some("{}"));
    }
}
