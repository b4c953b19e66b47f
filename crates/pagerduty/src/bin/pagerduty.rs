//! `PagerDuty` CLI - query services and trigger alarms from the terminal.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pagerduty::{
    EmptyState, PagerDutyApi, PagerDutyClient, PagerDutyConfig, ReqwestFetch, ServiceReference,
    StaticDiscovery, TriggerAlarmRequest,
};

/// `PagerDuty` CLI - Inspect services, incidents and on-call users.
#[derive(Parser)]
#[command(name = "pagerduty")]
#[command(about = "Query PagerDuty through the portal backend and trigger alarms")]
struct Cli {
    /// Portal backend URL serving the `proxy` service.
    #[arg(long, env = "PAGERDUTY_BACKEND_URL", default_value = "")]
    backend_url: String,

    /// Events API base URL.
    #[arg(long, env = "PAGERDUTY_EVENTS_BASE_URL", default_value = "")]
    events_base_url: String,

    /// Enable verbose logging.
    #[arg(short, long, default_value = "false")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a service by integration key or service id.
    Service {
        /// Events API integration key.
        #[arg(long)]
        integration_key: Option<String>,

        /// Service ID.
        #[arg(long)]
        service_id: Option<String>,
    },

    /// List incidents for a service.
    Incidents {
        /// Service ID.
        #[arg(long)]
        service_id: String,
    },

    /// List change events for a service.
    Changes {
        /// Service ID.
        #[arg(long)]
        service_id: String,
    },

    /// List users on call for an escalation policy.
    Oncall {
        /// Escalation policy ID.
        #[arg(long)]
        policy_id: String,
    },

    /// Trigger an alarm.
    Trigger {
        /// Events API integration key.
        #[arg(long)]
        integration_key: String,

        /// Source of the alarm.
        #[arg(long)]
        source: String,

        /// Alarm description.
        #[arg(long)]
        description: String,

        /// User raising the alarm.
        #[arg(long, env = "USER")]
        user_name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = PagerDutyConfig::from_overrides(
        Some(cli.events_base_url.clone()),
        Some(cli.backend_url.clone()),
    );
    let client = PagerDutyClient::from_config(
        &config,
        Arc::new(StaticDiscovery::new(config.backend_url.clone())),
        Arc::new(ReqwestFetch::new()),
    );

    match cli.command {
        Commands::Service {
            integration_key,
            service_id,
        } => {
            let reference = ServiceReference {
                integration_key,
                service_id,
            };
            let response = client
                .get_service_by_reference(&reference)
                .await
                .context("Failed to resolve service")?;
            let service = response.service;

            println!("\n📟 Service: {}", service.name);
            println!("   ID:   {}", service.id);
            println!("   URL:  {}", service.html_url);
            if let Some(policy) = &service.escalation_policy {
                println!("   Escalation policy: {} ({})", policy.summary, policy.id);
            }
        }

        Commands::Incidents { service_id } => {
            let response = client
                .get_incidents_by_service(&service_id)
                .await
                .context("Failed to list incidents")?;

            if response.incidents.is_empty() {
                println!("\n✅ No incidents for service {service_id}");
                return Ok(());
            }

            println!("\n{:<16} {:<14} {:<50}", "ID", "STATUS", "TITLE");
            println!("{}", "-".repeat(82));
            for incident in response.incidents {
                let status_emoji = match incident.status.as_str() {
                    "triggered" => "🔴",
                    "acknowledged" => "🟡",
                    "resolved" => "🟢",
                    _ => "⚪",
                };
                println!(
                    "{:<16} {} {:<11} {:<50}",
                    incident.id, status_emoji, incident.status, incident.title
                );
                for assignment in &incident.assignments {
                    println!("{:<19}↳ {}", "", assignment.assignee.summary);
                }
            }
            println!();
        }

        Commands::Changes { service_id } => {
            let response = client
                .get_change_events_by_service(&service_id)
                .await
                .context("Failed to list change events")?;

            if response.change_events.is_empty() {
                println!("\n{}\n", EmptyState::change_events());
                return Ok(());
            }

            for event in response.change_events {
                let when = event
                    .timestamp
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                    .unwrap_or_default();
                println!("\n🔧 {} ({})", event.summary, event.source);
                println!("   {when}");
                for link in &event.links {
                    println!("   🔗 {} {}", link.text, link.href);
                }
            }
            println!();
        }

        Commands::Oncall { policy_id } => {
            let users = client
                .get_on_call_by_policy_id(&policy_id)
                .await
                .context("Failed to list on-call users")?;

            if users.is_empty() {
                println!("\n⚠️  Nobody is on call for policy {policy_id}");
                return Ok(());
            }

            println!("\n{:<12} {:<25} {:<30}", "ID", "NAME", "EMAIL");
            println!("{}", "-".repeat(67));
            for user in users {
                println!("{:<12} {:<25} {:<30}", user.id, user.name, user.email);
            }
            println!();
        }

        Commands::Trigger {
            integration_key,
            source,
            description,
            user_name,
        } => {
            info!(source = %source, "Triggering alarm");
            let response = client
                .trigger_alarm(&TriggerAlarmRequest {
                    integration_key,
                    source,
                    description,
                    user_name,
                })
                .await
                .context("Failed to trigger alarm")?;

            println!("\n✅ Alarm accepted (HTTP {})", response.status);
            println!("   {}", response.text());
        }
    }

    Ok(())
}
