//! Configuration for the `PagerDuty` client.

use std::env;

/// Default Events API v2 base URL.
pub const DEFAULT_EVENTS_BASE_URL: &str = "https://events.pagerduty.com/v2";

/// Default backend URL used by the CLI when no discovery service is available.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:7007/api";

/// Environment variable overriding the Events API base URL.
const ENV_EVENTS_BASE_URL: &str = "PAGERDUTY_EVENTS_BASE_URL";

/// Environment variable for the backend URL.
const ENV_BACKEND_URL: &str = "PAGERDUTY_BACKEND_URL";

/// `PagerDuty` client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagerDutyConfig {
    /// Base URL for the events-ingestion endpoint (without `/enqueue`).
    pub events_base_url: String,
    /// Backend base URL serving the `proxy` service.
    pub backend_url: String,
}

impl Default for PagerDutyConfig {
    fn default() -> Self {
        Self::from_overrides(
            env::var(ENV_EVENTS_BASE_URL).ok(),
            env::var(ENV_BACKEND_URL).ok(),
        )
    }
}

impl PagerDutyConfig {
    /// Build a configuration from optional overrides, falling back to defaults.
    ///
    /// Blank overrides count as unset. Trailing slashes are stripped so paths
    /// can be appended with a single `/`.
    #[must_use]
    pub fn from_overrides(events_base_url: Option<String>, backend_url: Option<String>) -> Self {
        let pick = |value: Option<String>, default: &str| {
            value
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Self {
            events_base_url: pick(events_base_url, DEFAULT_EVENTS_BASE_URL),
            backend_url: pick(backend_url, DEFAULT_BACKEND_URL),
        }
    }

    /// Load configuration from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default()
    }
}
