use serde::Deserialize;

/// What the device authentication decorator does when recording a host's
/// check-in time fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeenFailurePolicy {
    /// Fail the request with [`Error::HostSeenUpdate`](crate::Error::HostSeenUpdate).
    #[default]
    Abort,
    /// Log a warning and call the wrapped endpoint anyway.
    LogAndContinue,
}

/// Settings for [`AuthenticatedHost`](crate::AuthenticatedHost).
///
/// Embeds into a host application's own configuration file; every field has
/// a default.
///
/// # Examples
///
/// ```
/// use fleet_guard::{HostAuthConfig, SeenFailurePolicy};
///
/// let config: HostAuthConfig =
///     serde_json::from_str(r#"{ "seen_failure": "log_and_continue" }"#).unwrap();
/// assert_eq!(config.seen_failure, SeenFailurePolicy::LogAndContinue);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HostAuthConfig {
    /// Handling of failed "last seen" updates
    pub seen_failure: SeenFailurePolicy,
}
