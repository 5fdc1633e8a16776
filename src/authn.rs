//! Device authentication decorator.
//!
//! [`AuthenticatedHost`] guards agent-facing endpoints. For every call it:
//!
//! 1. pulls the node key off the request ([`ExtractCredential`])
//! 2. resolves the key to a [`Host`] through the [`HostStore`]
//! 3. records the check-in time with [`HostStore::mark_host_seen`]
//! 4. attaches the host to the context and calls the wrapped endpoint
//!
//! Any failure in steps 1-2 stops the call before the wrapped endpoint runs.
//! Step 3 failures follow the configured [`SeenFailurePolicy`]. Nothing is
//! retried.

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::config::{HostAuthConfig, SeenFailurePolicy};
use crate::context::Ctx;
use crate::credential::Credential;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::extract::ExtractCredential;
use crate::host::Host;
use crate::store::{HostStore, StoreError};

/// Decorator that authenticates the calling device by node key.
///
/// # Examples
///
/// ```
/// use fleet_guard::{authenticated_host, endpoint_fn, Ctx, Endpoint, Error, Host, MemoryStore};
/// use serde_json::json;
///
/// let store = MemoryStore::new();
/// store.enroll_host(Host::new(1, "foo!", "goodkey"));
///
/// let endpoint = authenticated_host(&store, endpoint_fn(|ctx: &Ctx, _req: serde_json::Value| {
///     Ok::<_, Error>(ctx.host().map(|h| h.host_name.clone()))
/// }));
///
/// let name = endpoint.call(&Ctx::new("req-1"), json!({ "node_key": "goodkey" })).unwrap();
/// assert_eq!(name.as_deref(), Some("foo!"));
///
/// let err = endpoint.call(&Ctx::new("req-2"), json!({ "node_key": "" })).unwrap_err();
/// assert!(err.node_invalid());
/// ```
#[derive(Debug, Clone)]
pub struct AuthenticatedHost<S, E> {
    store: S,
    inner: E,
    clock: Arc<dyn Clock>,
    config: HostAuthConfig,
}

impl<S, E> AuthenticatedHost<S, E> {
    /// Wraps `inner`, resolving node keys through `store`.
    pub fn new(store: S, inner: E) -> Self {
        Self {
            store,
            inner,
            clock: Arc::new(SystemClock),
            config: HostAuthConfig::default(),
        }
    }

    /// Uses `clock` for check-in timestamps.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Applies `config`.
    pub fn with_config(mut self, config: HostAuthConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets how failed check-in updates are handled.
    pub fn with_seen_failure(mut self, policy: SeenFailurePolicy) -> Self {
        self.config.seen_failure = policy;
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &HostAuthConfig {
        &self.config
    }
}

impl<S: HostStore, E> AuthenticatedHost<S, E> {
    fn authenticate(&self, ctx: &Ctx, node_key: &Credential) -> Result<Host, Error> {
        // Empty keys are refused here so every store behaves the same way.
        let found = if node_key.is_empty() {
            Err(StoreError::not_found("empty node key"))
        } else {
            self.store.authenticate_host(node_key.expose())
        };

        let mut host = found.map_err(|cause| {
            ctx.log()
                .warn(format_args!("host authentication failed: {}", cause));
            Error::DeviceAuthentication { cause }
        })?;

        let now = self.clock.now();
        match self.store.mark_host_seen(&host, now) {
            Ok(()) => host.seen_time = now,
            Err(cause) => match self.config.seen_failure {
                SeenFailurePolicy::Abort => {
                    ctx.log().error(format_args!(
                        "failed to mark host {} seen: {}",
                        host.id, cause
                    ));
                    return Err(Error::HostSeenUpdate { cause });
                }
                SeenFailurePolicy::LogAndContinue => {
                    ctx.log().warn(format_args!(
                        "failed to mark host {} seen, continuing: {}",
                        host.id, cause
                    ));
                }
            },
        }

        Ok(host)
    }
}

impl<S, E, Req> Endpoint<Req> for AuthenticatedHost<S, E>
where
    S: HostStore,
    Req: ExtractCredential,
    E: Endpoint<Req>,
    E::Error: From<Error>,
{
    type Response = E::Response;
    type Error = E::Error;

    fn call(&self, ctx: &Ctx, req: Req) -> Result<Self::Response, Self::Error> {
        let node_key = ctx.log().span().in_scope(|| req.node_key()).map_err(|e| {
            ctx.log()
                .warn(format_args!("rejecting agent request: {}", e));
            Error::from(e)
        })?;

        let host = self.authenticate(ctx, &node_key)?;
        let ctx = ctx.with_host(host);
        ctx.log().debug(format_args!("host authenticated"));

        self.inner.call(&ctx, req)
    }
}

/// Only requests carrying a valid node key may call `next`.
pub fn authenticated_host<S, E>(store: S, next: E) -> AuthenticatedHost<S, E> {
    AuthenticatedHost::new(store, next)
}
