//! Authorization and device authentication middleware for fleet management endpoints.
//!
//! This crate provides composable endpoint decorators that run before a
//! request reaches business logic:
//! - **Viewer authorization**: [`must_be_admin`], [`can_read_user`] and
//!   [`can_modify_user`] check the authenticated user against the target user
//! - **Device authentication**: [`authenticated_host`] validates an agent's
//!   node key and attaches the resolved [`Host`] to the context
//! - **Explicit context**: identities travel in an immutable [`Ctx`] with
//!   typed slots, never in globals
//!
//! Every check fails closed: a request that is missing an identity, or whose
//! identity is rejected, never reaches the wrapped endpoint.
//!
//! # Core Types
//!
//! - [`Ctx`]: Immutable execution context carrying viewer, host and target user
//! - [`Endpoint`]: The handler abstraction decorators wrap
//! - [`Error`]: Typed failures, mapped to HTTP with [`Error::status_code`]
//! - [`HostStore`]: Storage contract for node-key lookups
//! - [`Credential`]: Wrapper that redacts node keys in logs
//!
//! # Examples
//!
//! ```
//! use fleet_guard::{Ctx, Endpoint, EndpointExt, Error, Nop, Session, User, Viewer};
//!
//! let endpoint = Nop.must_be_admin();
//!
//! let user = User::new(2, "user1");
//! let session = Session::new(1, &user, "user1");
//! let ctx = Ctx::new("req-123").with_viewer(Viewer::new(user, session));
//!
//! let err = endpoint.call(&ctx, ()).unwrap_err();
//! assert_eq!(err.to_string(), "must be an admin");
//! assert_eq!(err.status_code(), http::StatusCode::FORBIDDEN);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod authn;
mod authz;
mod clock;
mod config;
mod context;
mod credential;
mod endpoint;
mod error;
mod extract;
mod host;
mod logging;
mod store;
mod user;

pub use authn::{authenticated_host, AuthenticatedHost};
pub use authz::{can_modify_user, can_read_user, must_be_admin, Authorize, Policy};
pub use clock::{Clock, MockClock, SystemClock};
pub use config::{HostAuthConfig, SeenFailurePolicy};
pub use context::Ctx;
pub use credential::Credential;
pub use endpoint::{endpoint_fn, Endpoint, EndpointExt, Nop};
pub use error::{Error, ErrorKind, ExtractionError, ExtractionFailure, PermissionError};
pub use extract::{extract_field, extract_node_key, ExtractCredential, NODE_KEY_FIELD};
pub use host::Host;
pub use logging::RequestLog;
pub use store::{HostStore, MemoryStore, StoreError, StoreErrorKind};
pub use user::{Session, User, Viewer};
