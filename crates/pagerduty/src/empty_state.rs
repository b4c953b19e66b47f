//! Empty-state placeholder for change-event lists.

use std::fmt;

/// Documentation explaining how to send change events to `PagerDuty`.
pub const CHANGE_EVENTS_DOCS_URL: &str =
    "https://support.pagerduty.com/docs/change-events";

/// Static placeholder shown when a service has no change events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyState {
    /// Headline.
    pub title: &'static str,
    /// Supporting text.
    pub description: &'static str,
    /// Illustration asset name.
    pub illustration: &'static str,
    /// Call-to-action label.
    pub action_label: &'static str,
    /// Call-to-action target.
    pub action_url: &'static str,
}

impl EmptyState {
    /// The change-events placeholder.
    #[must_use]
    pub const fn change_events() -> Self {
        Self {
            title: "No change events to display",
            description: "Change events are informational events about recent changes \
                          to a service, such as deploys and configuration updates.",
            illustration: "create-component",
            action_label: "Read more",
            action_url: CHANGE_EVENTS_DOCS_URL,
        }
    }
}

impl Default for EmptyState {
    fn default() -> Self {
        Self::change_events()
    }
}

impl fmt::Display for EmptyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "-".repeat(self.title.len()))?;
        writeln!(f, "{}", self.description)?;
        write!(f, "{}: {}", self.action_label, self.action_url)
    }
}
