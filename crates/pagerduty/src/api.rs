//! The `PagerDutyApi` trait consumed by portal pages and the CLI.

use async_trait::async_trait;

use crate::entity::Entity;
use crate::error::PagerDutyError;
use crate::fetch::FetchResponse;
use crate::models::{
    ChangeEventsResponse, IncidentsResponse, ServiceReference, ServiceResponse,
    TriggerAlarmRequest, User,
};

/// Operations offered by a `PagerDuty` client.
#[async_trait]
pub trait PagerDutyApi: Send + Sync {
    /// Resolve a service from an integration key or a service id.
    ///
    /// The integration key wins when both are set. Fails with
    /// [`PagerDutyError::NotFound`] without issuing a request when neither is.
    async fn get_service_by_reference(
        &self,
        reference: &ServiceReference,
    ) -> Result<ServiceResponse, PagerDutyError>;

    /// Resolve the service annotated on a catalog entity.
    async fn get_service_by_entity(
        &self,
        entity: &Entity,
    ) -> Result<ServiceResponse, PagerDutyError>;

    /// List incidents for a service.
    async fn get_incidents_by_service(
        &self,
        service_id: &str,
    ) -> Result<IncidentsResponse, PagerDutyError>;

    /// List change events for a service.
    async fn get_change_events_by_service(
        &self,
        service_id: &str,
    ) -> Result<ChangeEventsResponse, PagerDutyError>;

    /// List the users on call for an escalation policy.
    async fn get_on_call_by_policy_id(&self, policy_id: &str)
        -> Result<Vec<User>, PagerDutyError>;

    /// Trigger an alarm through the Events API.
    ///
    /// Returns the raw response; interpreting its body is up to the caller.
    async fn trigger_alarm(
        &self,
        request: &TriggerAlarmRequest,
    ) -> Result<FetchResponse, PagerDutyError>;
}
