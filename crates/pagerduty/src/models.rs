//! `PagerDuty` API models.
//!
//! Response types mirror the JSON returned by the `PagerDuty` REST API v2.
//! Fields the portal does not use are ignored on decode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Requests
// ============================================================================

/// Identifies a `PagerDuty` service, by integration key or by service id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceReference {
    /// Events API integration key attached to the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_key: Option<String>,
    /// `PagerDuty` service id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
}

impl ServiceReference {
    /// Reference a service by integration key.
    pub fn integration_key(key: impl Into<String>) -> Self {
        Self {
            integration_key: Some(key.into()),
            service_id: None,
        }
    }

    /// Reference a service by id.
    pub fn service_id(id: impl Into<String>) -> Self {
        Self {
            integration_key: None,
            service_id: Some(id.into()),
        }
    }

    /// Integration key, treating an empty string as absent.
    #[must_use]
    pub fn integration_key_value(&self) -> Option<&str> {
        self.integration_key.as_deref().filter(|k| !k.is_empty())
    }

    /// Service id, treating an empty string as absent.
    #[must_use]
    pub fn service_id_value(&self) -> Option<&str> {
        self.service_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// A manual alarm raised from the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerAlarmRequest {
    /// Integration key used as the event routing key.
    pub integration_key: String,
    /// Where the alarm was raised from (usually the portal page URL).
    pub source: String,
    /// Human-readable summary.
    pub description: String,
    /// User raising the alarm.
    pub user_name: String,
}

// ============================================================================
// Resources
// ============================================================================

/// A `PagerDuty` service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    /// Service id.
    pub id: String,
    /// Service name.
    #[serde(default)]
    pub name: String,
    /// Link to the service in the `PagerDuty` web UI.
    #[serde(default)]
    pub html_url: String,
    /// Integration key, when known.
    #[serde(default, rename = "integrationKey", skip_serializing_if = "Option::is_none")]
    pub integration_key: Option<String>,
    /// Escalation policy for the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_policy: Option<EscalationPolicy>,
}

/// Escalation policy reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationPolicy {
    /// Policy id.
    pub id: String,
    /// Policy summary.
    #[serde(default)]
    pub summary: String,
    /// Link to the policy in the `PagerDuty` web UI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
    /// Policy owner, when included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// A `PagerDuty` user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User id.
    pub id: String,
    /// Short description, usually the user's name.
    #[serde(default)]
    pub summary: String,
    /// Email address.
    #[serde(default)]
    pub email: String,
    /// Link to the user in the `PagerDuty` web UI.
    #[serde(default)]
    pub html_url: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
}

/// Assignee of an incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignee {
    /// Assignee id.
    pub id: String,
    /// Assignee name.
    #[serde(default)]
    pub summary: String,
    /// Link to the assignee.
    #[serde(default)]
    pub html_url: String,
}

/// Incident assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Assigned user.
    pub assignee: Assignee,
}

/// A `PagerDuty` incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    /// Incident id.
    pub id: String,
    /// Incident title.
    #[serde(default)]
    pub title: String,
    /// Incident status (`triggered`, `acknowledged`, `resolved`).
    #[serde(default)]
    pub status: String,
    /// Link to the incident in the `PagerDuty` web UI.
    #[serde(default)]
    pub html_url: String,
    /// Current assignments.
    #[serde(default)]
    pub assignments: Vec<Assignment>,
    /// Owning service id, when present.
    #[serde(default, rename = "serviceId", skip_serializing_if = "Option::is_none")]
    pub service_id: Option<String>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Link attached to a change event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEventLink {
    /// Link target.
    pub href: String,
    /// Link text.
    #[serde(default)]
    pub text: String,
}

/// Integration a change event arrived through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEventIntegration {
    /// Integration id.
    pub id: String,
    /// Integration summary.
    #[serde(default)]
    pub summary: String,
    /// Integration type.
    #[serde(default, rename = "type")]
    pub integration_type: String,
}

/// A change event (deploy, config change, ...) recorded on a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Change event id.
    pub id: String,
    /// Source that reported the change.
    #[serde(default)]
    pub source: String,
    /// Summary text.
    #[serde(default)]
    pub summary: String,
    /// Link to the change in the `PagerDuty` web UI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
    /// Links attached by the reporter.
    #[serde(default)]
    pub links: Vec<ChangeEventLink>,
    /// Integrations the event arrived through.
    #[serde(default)]
    pub integration: Vec<ChangeEventIntegration>,
    /// When the change happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// An on-call entry for an escalation policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnCall {
    /// User on call.
    pub user: User,
    /// Escalation level of this entry.
    #[serde(default)]
    pub escalation_level: u32,
}

// ============================================================================
// Envelopes
// ============================================================================

/// Single service envelope (`GET /services/{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceResponse {
    /// The service.
    pub service: Service,
}

/// Service list envelope (`GET /services?integration_key=...`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServicesResponse {
    /// Matching services.
    #[serde(default)]
    pub services: Vec<Service>,
}

/// Incident list envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentsResponse {
    /// Incidents.
    #[serde(default)]
    pub incidents: Vec<Incident>,
}

/// Change event list envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEventsResponse {
    /// Change events.
    #[serde(default)]
    pub change_events: Vec<ChangeEvent>,
}

/// On-call list envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnCallsResponse {
    /// On-call entries.
    #[serde(default)]
    pub oncalls: Vec<OnCall>,
}

/// Error body returned by the REST API on failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub errors: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<Vec<serde_json::Value>>,
}

// ============================================================================
// Events API
// ============================================================================

/// Event action for the Events API v2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventAction {
    /// Trigger a new alert.
    Trigger,
}

/// Event severity for the Events API v2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSeverity {
    /// Error severity
    Error,
}

/// Custom details attached to a manual alarm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmDetails {
    /// User who raised the alarm.
    pub user: String,
}

/// Payload section of an alarm event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmPayload {
    /// Brief summary of the alarm.
    pub summary: String,
    /// Where the alarm came from.
    pub source: String,
    /// Severity level.
    pub severity: EventSeverity,
    /// Class/type of event.
    pub class: String,
    /// Custom details.
    pub custom_details: AlarmDetails,
}

/// Body posted to `<events base>/enqueue`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmEvent {
    /// Event action.
    pub event_action: EventAction,
    /// Routing key (the integration key).
    pub routing_key: String,
    /// Name of the reporting client.
    pub client: String,
    /// Link back to the reporting client.
    pub client_url: String,
    /// Event payload.
    pub payload: AlarmPayload,
}
