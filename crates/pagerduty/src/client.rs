//! `PagerDuty` API client implementation.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::api::PagerDutyApi;
use crate::config::PagerDutyConfig;
use crate::discovery::Discovery;
use crate::entity::{pager_duty_reference, Entity};
use crate::error::PagerDutyError;
use crate::fetch::{Fetch, FetchRequest, FetchResponse};
use crate::models::{
    AlarmDetails, AlarmEvent, AlarmPayload, ChangeEventsResponse, ErrorBody, EventAction,
    EventSeverity, IncidentsResponse, OnCallsResponse, Service, ServiceReference,
    ServiceResponse, ServicesResponse, TriggerAlarmRequest, User,
};

/// Discovery name of the backend proxy fronting the `PagerDuty` REST API.
const PROXY_SERVICE: &str = "proxy";

/// Path under the proxy that forwards to `PagerDuty`.
const PROXY_PATH: &str = "/pagerduty";

/// Accept header pinning REST API v2.
const REST_ACCEPT: &str = "application/vnd.pagerduty+json;version=2";

/// Accept header for the Events API.
const EVENTS_ACCEPT: &str = "application/json, text/plain, */*";

const CONTENT_TYPE_JSON: &str = "application/json";

/// Client name reported on triggered events.
const EVENT_CLIENT: &str = "Backstage";

/// Event class for alarms raised by hand.
const MANUAL_TRIGGER_CLASS: &str = "manual trigger";

/// `PagerDuty` client.
///
/// Holds no mutable state; clones share the same collaborators.
#[derive(Clone)]
pub struct PagerDutyClient {
    /// Base URL of the Events API (without `/enqueue`).
    events_base_url: String,
    /// Resolves the proxy base URL on every call.
    discovery: Arc<dyn Discovery>,
    /// Performs the HTTP exchanges.
    fetch: Arc<dyn Fetch>,
}

impl std::fmt::Debug for PagerDutyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PagerDutyClient")
            .field("events_base_url", &self.events_base_url)
            .finish_non_exhaustive()
    }
}

impl PagerDutyClient {
    /// Create a new client.
    ///
    /// # Arguments
    /// * `events_base_url` - Events API base URL, e.g. `https://events.pagerduty.com/v2`
    /// * `discovery` - Resolves the `proxy` backend
    /// * `fetch` - Performs HTTP requests
    pub fn new(
        events_base_url: impl Into<String>,
        discovery: Arc<dyn Discovery>,
        fetch: Arc<dyn Fetch>,
    ) -> Self {
        let events_base_url: String = events_base_url.into();
        Self {
            events_base_url: events_base_url.trim_end_matches('/').to_string(),
            discovery,
            fetch,
        }
    }

    /// Create a client from configuration.
    pub fn from_config(
        config: &PagerDutyConfig,
        discovery: Arc<dyn Discovery>,
        fetch: Arc<dyn Fetch>,
    ) -> Self {
        Self::new(config.events_base_url.clone(), discovery, fetch)
    }

    /// Events API base URL in use.
    #[must_use]
    pub fn events_base_url(&self) -> &str {
        &self.events_base_url
    }

    /// Base URL for REST calls, resolved fresh on every call.
    async fn api_url(&self) -> Result<String, PagerDutyError> {
        let proxy = self.discovery.get_base_url(PROXY_SERVICE).await?;
        Ok(format!("{}{PROXY_PATH}", proxy.trim_end_matches('/')))
    }

    /// GET a REST resource and decode its JSON body.
    async fn get_by_url<T: DeserializeOwned>(&self, url: &str) -> Result<T, PagerDutyError> {
        let request = FetchRequest::new(Method::GET)
            .with_header("Accept", REST_ACCEPT)
            .with_header("Content-Type", CONTENT_TYPE_JSON);

        let response = self.request(url, request).await?;
        response.json().map_err(|e| {
            warn!(url = %url, error = %e, "Failed to parse response");
            e
        })
    }

    /// Send a request and map failure statuses to errors.
    ///
    /// 401, 403 and 404 map to their dedicated variants in that order; any
    /// other non-2xx becomes [`PagerDutyError::Api`]. Success responses are
    /// returned untouched.
    async fn request(
        &self,
        url: &str,
        request: FetchRequest,
    ) -> Result<FetchResponse, PagerDutyError> {
        debug!(method = %request.method, url = %url, "PagerDuty request");

        let response = self.fetch.fetch(url, request).await?;

        match response.status {
            401 => Err(PagerDutyError::Unauthorized),
            403 => Err(PagerDutyError::Forbidden),
            404 => Err(PagerDutyError::NotFound(url.to_string())),
            _ if !response.ok() => {
                let status = response.status;
                let errors = error_messages(&response);
                warn!(status, url = %url, errors = %errors, "PagerDuty request failed");
                Err(PagerDutyError::Api {
                    status,
                    message: format!("Request failed with {status}, {errors}"),
                })
            }
            _ => Ok(response),
        }
    }
}

/// Join the `errors` list of a failure body with spaces.
///
/// Bodies that are not JSON, or carry a missing or empty error list, yield
/// the nested `error.errors` or `error.message` when present and an empty
/// string otherwise.
fn error_messages(response: &FetchResponse) -> String {
    let Ok(body) = response.json::<ErrorBody>() else {
        return String::new();
    };

    let join = |errors: Vec<serde_json::Value>| {
        errors
            .into_iter()
            .map(|e| match e {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    };

    if let Some(errors) = body.errors.filter(|errors| !errors.is_empty()) {
        return join(errors);
    }

    match body.error {
        Some(detail) => match (detail.errors, detail.message) {
            (Some(errors), _) if !errors.is_empty() => join(errors),
            (_, Some(message)) => message,
            _ => String::new(),
        },
        None => String::new(),
    }
}

/// Service envelope that may be missing its `service` key.
#[derive(Deserialize)]
struct MaybeServiceResponse {
    #[serde(default)]
    service: Option<Service>,
}

#[async_trait]
impl PagerDutyApi for PagerDutyClient {
    async fn get_service_by_reference(
        &self,
        reference: &ServiceReference,
    ) -> Result<ServiceResponse, PagerDutyError> {
        if let Some(integration_key) = reference.integration_key_value() {
            let url = format!(
                "{}/services?integration_key={integration_key}",
                self.api_url().await?
            );
            let response: ServicesResponse = self.get_by_url(&url).await?;

            return response
                .services
                .into_iter()
                .next()
                .map(|service| ServiceResponse { service })
                .ok_or_else(|| {
                    PagerDutyError::NotFound(format!(
                        "no service for integration key {integration_key}"
                    ))
                });
        }

        if let Some(service_id) = reference.service_id_value() {
            let url = format!("{}/services/{service_id}", self.api_url().await?);
            let response: MaybeServiceResponse = self.get_by_url(&url).await?;

            return response
                .service
                .map(|service| ServiceResponse { service })
                .ok_or_else(|| PagerDutyError::NotFound(format!("service {service_id}")));
        }

        Err(PagerDutyError::NotFound(
            "service reference has neither integration key nor service id".to_string(),
        ))
    }

    async fn get_service_by_entity(
        &self,
        entity: &Entity,
    ) -> Result<ServiceResponse, PagerDutyError> {
        let reference = pager_duty_reference(entity);
        debug!(entity = %entity.metadata.name, ?reference, "Resolving entity service");
        self.get_service_by_reference(&reference).await
    }

    async fn get_incidents_by_service(
        &self,
        service_id: &str,
    ) -> Result<IncidentsResponse, PagerDutyError> {
        let url = format!("{}/incidents?service_ids[]={service_id}", self.api_url().await?);
        self.get_by_url(&url).await
    }

    async fn get_change_events_by_service(
        &self,
        service_id: &str,
    ) -> Result<ChangeEventsResponse, PagerDutyError> {
        let url = format!(
            "{}/services/{service_id}/change_events",
            self.api_url().await?
        );
        self.get_by_url(&url).await
    }

    async fn get_on_call_by_policy_id(
        &self,
        policy_id: &str,
    ) -> Result<Vec<User>, PagerDutyError> {
        let url = format!(
            "{}/oncalls?time_zone=UTC&include[]=users&escalation_policy_ids[]={policy_id}",
            self.api_url().await?
        );
        let response: OnCallsResponse = self.get_by_url(&url).await?;
        Ok(response.oncalls.into_iter().map(|oncall| oncall.user).collect())
    }

    async fn trigger_alarm(
        &self,
        request: &TriggerAlarmRequest,
    ) -> Result<FetchResponse, PagerDutyError> {
        let event = AlarmEvent {
            event_action: EventAction::Trigger,
            routing_key: request.integration_key.clone(),
            client: EVENT_CLIENT.to_string(),
            client_url: request.source.clone(),
            payload: AlarmPayload {
                summary: request.description.clone(),
                source: request.source.clone(),
                severity: EventSeverity::Error,
                class: MANUAL_TRIGGER_CLASS.to_string(),
                custom_details: AlarmDetails {
                    user: request.user_name.clone(),
                },
            },
        };

        let body = serde_json::to_string(&event)?;
        let fetch_request = FetchRequest::new(Method::POST)
            .with_header("Accept", EVENTS_ACCEPT)
            .with_header("Content-Type", CONTENT_TYPE_JSON)
            .with_body(body);

        info!(source = %request.source, user = %request.user_name, "Triggering PagerDuty alarm");

        let url = format!("{}/enqueue", self.events_base_url);
        self.request(&url, fetch_request).await
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::discovery::StaticDiscovery;

    /// Fetch double that records requests and replays canned responses.
    #[derive(Default)]
    struct RecordingFetch {
        responses: Mutex<VecDeque<FetchResponse>>,
        calls: Mutex<Vec<(String, FetchRequest)>>,
    }

    impl RecordingFetch {
        fn replying(status: u16, body: &str) -> Arc<Self> {
            let fetch = Self::default();
            fetch
                .responses
                .lock()
                .unwrap()
                .push_back(FetchResponse::new(status, body.as_bytes().to_vec()));
            Arc::new(fetch)
        }

        fn calls(&self) -> Vec<(String, FetchRequest)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetch for RecordingFetch {
        async fn fetch(
            &self,
            url: &str,
            request: FetchRequest,
        ) -> Result<FetchResponse, PagerDutyError> {
            self.calls.lock().unwrap().push((url.to_string(), request));
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| FetchResponse::new(200, b"{}".to_vec())))
        }
    }

    /// Discovery double that hands out a new backend on every lookup.
    #[derive(Default)]
    struct RotatingDiscovery {
        lookups: AtomicUsize,
    }

    #[async_trait]
    impl Discovery for RotatingDiscovery {
        async fn get_base_url(&self, service_name: &str) -> Result<String, PagerDutyError> {
            let n = self.lookups.fetch_add(1, Ordering::SeqCst);
            Ok(format!("http://backend-{n}/api/{service_name}"))
        }
    }

    fn client(fetch: Arc<RecordingFetch>) -> PagerDutyClient {
        PagerDutyClient::new(
            "https://events.example.com/v2",
            Arc::new(StaticDiscovery::new("http://backend/api")),
            fetch,
        )
    }

    #[tokio::test]
    async fn test_empty_reference_issues_no_request() {
        let fetch = Arc::new(RecordingFetch::default());
        let err = client(fetch.clone())
            .get_service_by_reference(&ServiceReference::default())
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(fetch.calls().is_empty());
    }

    #[tokio::test]
    async fn test_service_by_id_url_and_headers() {
        let fetch = RecordingFetch::replying(200, r#"{"service":{"id":"S1"}}"#);
        let response = client(fetch.clone())
            .get_service_by_reference(&ServiceReference::service_id("S1"))
            .await
            .unwrap();

        assert_eq!(response.service.id, "S1");
        let calls = fetch.calls();
        assert_eq!(calls.len(), 1);
        let (url, request) = &calls[0];
        assert_eq!(url, "http://backend/api/proxy/pagerduty/services/S1");
        assert_eq!(request.method, Method::GET);
        assert_eq!(
            request.headers.get("Accept").map(String::as_str),
            Some("application/vnd.pagerduty+json;version=2")
        );
        assert_eq!(
            request.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(request.body, None);
    }

    #[tokio::test]
    async fn test_base_url_resolved_on_every_call() {
        let fetch = Arc::new(RecordingFetch::default());
        let discovery = Arc::new(RotatingDiscovery::default());
        let client = PagerDutyClient::new(
            "https://events.example.com/v2",
            discovery.clone(),
            fetch.clone(),
        );

        client.get_incidents_by_service("S1").await.unwrap();
        client.get_change_events_by_service("S1").await.unwrap();

        let urls: Vec<_> = fetch.calls().into_iter().map(|(url, _)| url).collect();
        assert_eq!(
            urls,
            [
                "http://backend-0/api/proxy/pagerduty/incidents?service_ids[]=S1",
                "http://backend-1/api/proxy/pagerduty/services/S1/change_events",
            ]
        );
        assert_eq!(discovery.lookups.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_integration_key_takes_precedence() {
        let fetch = RecordingFetch::replying(200, r#"{"services":[{"id":"S9"}]}"#);
        let reference = ServiceReference {
            integration_key: Some("K1".to_string()),
            service_id: Some("S1".to_string()),
        };
        let response = client(fetch.clone())
            .get_service_by_reference(&reference)
            .await
            .unwrap();

        assert_eq!(response.service.id, "S9");
        assert_eq!(
            fetch.calls()[0].0,
            "http://backend/api/proxy/pagerduty/services?integration_key=K1"
        );
    }

    #[tokio::test]
    async fn test_service_id_missing_service_is_not_found() {
        let fetch = RecordingFetch::replying(200, "{}");
        let err = client(fetch)
            .get_service_by_reference(&ServiceReference::service_id("S1"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_status_mapping() {
        for (status, body) in [(401, "{}"), (403, r#"{"errors":["x"]}"#), (404, "")] {
            let fetch = RecordingFetch::replying(status, body);
            let err = client(fetch)
                .get_incidents_by_service("S1")
                .await
                .unwrap_err();
            match status {
                401 => assert!(matches!(err, PagerDutyError::Unauthorized)),
                403 => assert!(matches!(err, PagerDutyError::Forbidden)),
                _ => assert!(err.is_not_found()),
            }
        }
    }

    #[tokio::test]
    async fn test_generic_error_joins_messages() {
        let fetch = RecordingFetch::replying(500, r#"{"errors":["Service","unavailable"]}"#);
        let err = client(fetch)
            .get_change_events_by_service("S1")
            .await
            .unwrap_err();

        match err {
            PagerDutyError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Request failed with 500, Service unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generic_error_tolerates_unexpected_body() {
        let fetch = RecordingFetch::replying(502, "<html>bad gateway</html>");
        let err = client(fetch)
            .get_change_events_by_service("S1")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(502));
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn test_error_messages_nested_error_object() {
        let response = FetchResponse::new(
            400,
            br#"{"error":{"message":"Invalid Input Provided","code":2001,"errors":["Service Ids is invalid."]}}"#.to_vec(),
        );
        assert_eq!(error_messages(&response), "Service Ids is invalid.");

        let response = FetchResponse::new(400, br#"{"error":{"message":"Invalid"}}"#.to_vec());
        assert_eq!(error_messages(&response), "Invalid");

        let response = FetchResponse::new(
            400,
            br#"{"errors":[],"error":{"message":"Invalid"}}"#.to_vec(),
        );
        assert_eq!(error_messages(&response), "Invalid");
    }

    #[tokio::test]
    async fn test_on_call_unwraps_users() {
        let fetch = RecordingFetch::replying(
            200,
            r#"{"oncalls":[
                {"user":{"id":"U1","name":"Ada"},"escalation_level":1},
                {"user":{"id":"U2","name":"Grace"},"escalation_level":2}
            ]}"#,
        );
        let users = client(fetch.clone())
            .get_on_call_by_policy_id("P1")
            .await
            .unwrap();

        let ids: Vec<_> = users.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, ["U1", "U2"]);
        assert_eq!(
            fetch.calls()[0].0,
            "http://backend/api/proxy/pagerduty/oncalls?time_zone=UTC&include[]=users&escalation_policy_ids[]=P1"
        );
    }

    #[tokio::test]
    async fn test_trigger_alarm_body() {
        let fetch = RecordingFetch::replying(202, r#"{"status":"success"}"#);
        let response = client(fetch.clone())
            .trigger_alarm(&TriggerAlarmRequest {
                integration_key: "K1".to_string(),
                source: "host1".to_string(),
                description: "d".to_string(),
                user_name: "u".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.status, 202);
        let calls = fetch.calls();
        let (url, request) = &calls[0];
        assert_eq!(url, "https://events.example.com/v2/enqueue");
        assert_eq!(request.method, Method::POST);
        assert_eq!(
            request.headers.get("Accept").map(String::as_str),
            Some("application/json, text/plain, */*")
        );
        assert_eq!(
            request.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );

        let body: serde_json::Value =
            serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["event_action"], "trigger");
        assert_eq!(body["routing_key"], "K1");
        assert_eq!(body["client"], "Backstage");
        assert_eq!(body["client_url"], "host1");
        assert_eq!(body["payload"]["summary"], "d");
        assert_eq!(body["payload"]["source"], "host1");
        assert_eq!(body["payload"]["severity"], "error");
        assert_eq!(body["payload"]["class"], "manual trigger");
        assert_eq!(body["payload"]["custom_details"]["user"], "u");
    }
}
