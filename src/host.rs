use chrono::{DateTime, Utc};

use crate::credential::Credential;

/// A managed device enrolled in the fleet.
///
/// Once the device authentication decorator validates a node key, the
/// matching `Host` is attached to the request context and handlers can read
/// it with [`Ctx::host`](crate::Ctx::host).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    /// Stable identifier
    pub id: u64,
    /// Display name reported by the agent
    pub host_name: String,
    /// Hardware UUID reported by the agent
    pub uuid: String,
    /// Operating system family
    pub platform: String,
    /// Secret the agent authenticates with
    pub node_key: Credential,
    /// Last time the host checked in
    pub seen_time: DateTime<Utc>,
}

impl Host {
    /// Creates a host with the given identity and node key.
    ///
    /// `seen_time` starts at the Unix epoch until the first check-in.
    pub fn new(id: u64, host_name: impl Into<String>, node_key: impl Into<String>) -> Self {
        Self {
            id,
            host_name: host_name.into(),
            uuid: String::new(),
            platform: String::new(),
            node_key: Credential::new(node_key),
            seen_time: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// Sets the hardware UUID.
    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = uuid.into();
        self
    }

    /// Sets the platform.
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_host_has_never_been_seen() {
        let host = Host::new(1, "foo!", "goodkey")
            .with_uuid("uuid-1")
            .with_platform("darwin");

        assert_eq!(host.seen_time, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(host.uuid, "uuid-1");
        assert_eq!(host.platform, "darwin");
        assert!(!format!("{:?}", host).contains("goodkey"));
    }
}
