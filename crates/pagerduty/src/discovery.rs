//! Base URL discovery.

use async_trait::async_trait;

use crate::error::PagerDutyError;

/// Resolves a logical backend service name to its current base URL.
///
/// Implementations may return a different URL on every call; the client
/// never caches the result.
#[async_trait]
pub trait Discovery: Send + Sync {
    /// Get the base URL for `service_name` (e.g. `proxy`).
    async fn get_base_url(&self, service_name: &str) -> Result<String, PagerDutyError>;
}

/// Discovery that serves every service from one backend root.
///
/// `StaticDiscovery::new("http://localhost:7007/api")` resolves `proxy` to
/// `http://localhost:7007/api/proxy`.
#[derive(Debug, Clone)]
pub struct StaticDiscovery {
    base_url: String,
}

impl StaticDiscovery {
    /// Create a discovery rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Discovery for StaticDiscovery {
    async fn get_base_url(&self, service_name: &str) -> Result<String, PagerDutyError> {
        if service_name.is_empty() {
            return Err(PagerDutyError::Discovery(
                "service name must not be empty".to_string(),
            ));
        }
        Ok(format!("{}/{service_name}", self.base_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_discovery_appends_service() {
        let discovery = StaticDiscovery::new("http://backend/api/");
        let url = discovery.get_base_url("proxy").await.unwrap();
        assert_eq!(url, "http://backend/api/proxy");
    }

    #[tokio::test]
    async fn test_static_discovery_rejects_empty_name() {
        let discovery = StaticDiscovery::new("http://backend/api");
        let err = discovery.get_base_url("").await.unwrap_err();
        assert!(matches!(err, PagerDutyError::Discovery(_)));
    }
}
