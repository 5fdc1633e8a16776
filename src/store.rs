//! Host store interface and an in-memory implementation.
//!
//! The device authentication decorator only needs two things from durable
//! storage: resolve a node key to a host, and record that the host was seen.
//! [`HostStore`] captures that contract; [`MemoryStore`] is a thread-safe
//! in-memory version for tests and single-process deployments.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::host::Host;

/// Storage operations the device authentication decorator depends on.
///
/// Both calls are single-attempt: implementations may block on I/O, but the
/// decorator never retries them.
pub trait HostStore {
    /// Resolves a node key to the host that owns it.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the key is empty, unknown or revoked, or if
    /// the backend fails.
    fn authenticate_host(&self, node_key: &str) -> Result<Host, StoreError>;

    /// Records that `host` checked in at `seen`.
    fn mark_host_seen(&self, host: &Host, seen: DateTime<Utc>) -> Result<(), StoreError>;
}

impl<S: HostStore + ?Sized> HostStore for &S {
    fn authenticate_host(&self, node_key: &str) -> Result<Host, StoreError> {
        (**self).authenticate_host(node_key)
    }

    fn mark_host_seen(&self, host: &Host, seen: DateTime<Utc>) -> Result<(), StoreError> {
        (**self).mark_host_seen(host, seen)
    }
}

impl<S: HostStore + ?Sized> HostStore for Arc<S> {
    fn authenticate_host(&self, node_key: &str) -> Result<Host, StoreError> {
        (**self).authenticate_host(node_key)
    }

    fn mark_host_seen(&self, host: &Host, seen: DateTime<Utc>) -> Result<(), StoreError> {
        (**self).mark_host_seen(host, seen)
    }
}

/// Error returned by a [`HostStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    kind: StoreErrorKind,
    message: String,
}

impl StoreError {
    /// Creates a store error of the given kind.
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The requested record does not exist.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::NotFound, message)
    }

    /// The backend failed.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Backend, message)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> StoreErrorKind {
        self.kind
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message, self.kind)
    }
}

impl std::error::Error for StoreError {}

/// Category of [`StoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// No matching record
    NotFound,
    /// Storage backend failure
    Backend,
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreErrorKind::NotFound => write!(f, "not found"),
            StoreErrorKind::Backend => write!(f, "backend"),
        }
    }
}

/// In-memory [`HostStore`].
///
/// Hosts are indexed by id; node-key lookups scan the table, which is fine
/// for the fleet sizes this store is meant for.
///
/// # Examples
///
/// ```
/// use fleet_guard::{Host, HostStore, MemoryStore};
///
/// let store = MemoryStore::new();
/// store.enroll_host(Host::new(1, "foo!", "goodkey"));
///
/// assert_eq!(store.authenticate_host("goodkey").unwrap().host_name, "foo!");
/// assert!(store.authenticate_host("").is_err());
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    hosts: RwLock<HashMap<u64, Host>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a host.
    pub fn enroll_host(&self, host: Host) {
        self.hosts.write().insert(host.id, host);
    }

    /// Removes a host, revoking its node key.
    pub fn remove_host(&self, id: u64) -> Option<Host> {
        self.hosts.write().remove(&id)
    }

    /// Returns a snapshot of the host with the given id.
    pub fn host_by_id(&self, id: u64) -> Option<Host> {
        self.hosts.read().get(&id).cloned()
    }

    /// Returns the number of enrolled hosts.
    pub fn len(&self) -> usize {
        self.hosts.read().len()
    }

    /// Returns `true` if no hosts are enrolled.
    pub fn is_empty(&self) -> bool {
        self.hosts.read().is_empty()
    }
}

impl HostStore for MemoryStore {
    fn authenticate_host(&self, node_key: &str) -> Result<Host, StoreError> {
        if node_key.is_empty() {
            return Err(StoreError::not_found("empty node key"));
        }

        self.hosts
            .read()
            .values()
            .find(|h| h.node_key.ct_eq(node_key))
            .cloned()
            .ok_or_else(|| StoreError::not_found("no host found"))
    }

    fn mark_host_seen(&self, host: &Host, seen: DateTime<Utc>) -> Result<(), StoreError> {
        let mut hosts = self.hosts.write();
        let stored = hosts
            .get_mut(&host.id)
            .ok_or_else(|| StoreError::not_found(format!("host {} not found", host.id)))?;
        stored.seen_time = seen;
        Ok(())
    }
}
