//! `PagerDuty` client for the developer portal.
//!
//! This crate provides:
//! - Service lookup by integration key, service id or catalog entity
//! - Incident, change event and on-call listing
//! - Manual alarm triggering through the Events API v2
//! - The empty-state placeholder shown for services without change events
//!
//! ## Architecture
//!
//! ```text
//! caller ──► PagerDutyClient ──► Discovery ("proxy" base URL)
//!                  │
//!                  └──────────► Fetch ──► <proxy>/pagerduty/...
//!                                    └──► <events base>/enqueue
//! ```
//!
//! Every operation issues at most one request. Status codes 401, 403 and 404
//! map to [`PagerDutyError::Unauthorized`], [`PagerDutyError::Forbidden`] and
//! [`PagerDutyError::NotFound`]; any other failure becomes
//! [`PagerDutyError::Api`].
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use pagerduty::{PagerDutyApi, PagerDutyClient, PagerDutyConfig, ReqwestFetch, ServiceReference, StaticDiscovery};
//!
//! let config = PagerDutyConfig::from_env();
//! let client = PagerDutyClient::from_config(
//!     &config,
//!     Arc::new(StaticDiscovery::new(&config.backend_url)),
//!     Arc::new(ReqwestFetch::new()),
//! );
//!
//! let service = client
//!     .get_service_by_reference(&ServiceReference::service_id("PSERVICE"))
//!     .await?;
//! let incidents = client.get_incidents_by_service(&service.service.id).await?;
//! ```

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod api;
pub mod client;
pub mod config;
pub mod discovery;
pub mod empty_state;
pub mod entity;
pub mod error;
pub mod fetch;
pub mod models;

pub use api::PagerDutyApi;
pub use client::PagerDutyClient;
pub use config::PagerDutyConfig;
pub use discovery::{Discovery, StaticDiscovery};
pub use empty_state::EmptyState;
pub use entity::{is_pager_duty_available, pager_duty_reference, Entity};
pub use error::PagerDutyError;
pub use fetch::{Fetch, FetchRequest, FetchResponse, ReqwestFetch};
pub use models::*;
