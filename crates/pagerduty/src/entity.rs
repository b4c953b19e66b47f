//! Catalog entity adapter.
//!
//! Portal catalog entities carry `PagerDuty` identifiers as metadata
//! annotations. This module maps an [`Entity`] to a [`ServiceReference`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::ServiceReference;

/// Annotation holding the Events API integration key.
pub const PAGERDUTY_INTEGRATION_KEY_ANNOTATION: &str = "pagerduty.com/integration-key";

/// Annotation holding the `PagerDuty` service id.
pub const PAGERDUTY_SERVICE_ID_ANNOTATION: &str = "pagerduty.com/service-id";

/// Entity metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// Entity name.
    pub name: String,
    /// Namespace, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Annotations.
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

/// A catalog entity, reduced to what this crate reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// API version of the entity descriptor.
    #[serde(default)]
    pub api_version: String,
    /// Entity kind (`Component`, `System`, ...).
    #[serde(default)]
    pub kind: String,
    /// Metadata.
    pub metadata: EntityMetadata,
}

impl Entity {
    /// Create an entity with the given name and no annotations.
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            api_version: "backstage.io/v1alpha1".to_string(),
            kind: kind.into(),
            metadata: EntityMetadata {
                name: name.into(),
                ..EntityMetadata::default()
            },
        }
    }

    /// Add an annotation.
    #[must_use]
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.annotations.insert(key.into(), value.into());
        self
    }

    fn annotation(&self, key: &str) -> Option<String> {
        self.metadata
            .annotations
            .get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Whether the entity carries any `PagerDuty` annotation.
#[must_use]
pub fn is_pager_duty_available(entity: &Entity) -> bool {
    entity.annotation(PAGERDUTY_INTEGRATION_KEY_ANNOTATION).is_some()
        || entity.annotation(PAGERDUTY_SERVICE_ID_ANNOTATION).is_some()
}

/// Map an entity to the service reference its annotations describe.
#[must_use]
pub fn pager_duty_reference(entity: &Entity) -> ServiceReference {
    ServiceReference {
        integration_key: entity.annotation(PAGERDUTY_INTEGRATION_KEY_ANNOTATION),
        service_id: entity.annotation(PAGERDUTY_SERVICE_ID_ANNOTATION),
    }
}
