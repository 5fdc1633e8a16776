use std::sync::Arc;

use crate::host::Host;
use crate::logging::RequestLog;
use crate::user::Viewer;

/// Execution context for a single request.
///
/// `Ctx` carries the request id plus three typed slots:
/// - the **viewer** (authenticated human), attached by session resolution
/// - the **host** (authenticated device), attached by
///   [`AuthenticatedHost`](crate::AuthenticatedHost)
/// - the **target user id**, attached by the routing layer
///
/// # Immutability
///
/// A `Ctx` is never modified in place. Every `with_*` method returns a new
/// context and leaves the receiver untouched, so requests that share a parent
/// context can attach their own identities concurrently.
///
/// # Examples
///
/// ```
/// use fleet_guard::{Ctx, Session, User, Viewer};
///
/// let root = Ctx::new("req-123");
///
/// let user = User::new(1, "admin1").with_admin(true);
/// let session = Session::new(1, &user, "admin1");
/// let ctx = root.with_viewer(Viewer::new(user, session)).with_target_user(2);
///
/// assert!(root.viewer().is_none());
/// assert_eq!(ctx.viewer().map(|v| v.user_id()), Some(1));
/// assert_eq!(ctx.target_user(), Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct Ctx {
    request_id: Arc<str>,
    viewer: Option<Arc<Viewer>>,
    host: Option<Arc<Host>>,
    target_user: Option<u64>,
}

impl Ctx {
    /// Creates an empty context for the given request id.
    pub fn new(request_id: impl Into<Arc<str>>) -> Self {
        Self {
            request_id: request_id.into(),
            viewer: None,
            host: None,
            target_user: None,
        }
    }

    /// Creates an empty context with no request id.
    pub fn background() -> Self {
        Self::new("")
    }

    /// Returns the request id.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns a copy of this context with `viewer` attached.
    pub fn with_viewer(&self, viewer: Viewer) -> Self {
        Self {
            viewer: Some(Arc::new(viewer)),
            ..self.clone()
        }
    }

    /// Returns the viewer, if one was attached.
    pub fn viewer(&self) -> Option<&Viewer> {
        self.viewer.as_deref()
    }

    /// Returns a copy of this context with the authenticated `host` attached.
    ///
    /// Only the device authentication decorator should call this; handlers
    /// trust whatever host they find here.
    pub fn with_host(&self, host: Host) -> Self {
        Self {
            host: Some(Arc::new(host)),
            ..self.clone()
        }
    }

    /// Returns the authenticated host, if one was attached.
    pub fn host(&self) -> Option<&Host> {
        self.host.as_deref()
    }

    /// Returns a copy of this context targeting user `id`.
    pub fn with_target_user(&self, id: u64) -> Self {
        Self {
            target_user: Some(id),
            ..self.clone()
        }
    }

    /// Returns the id of the user resource the operation acts on.
    ///
    /// `None` means no specific user is targeted. `Some(0)` is a real id.
    pub fn target_user(&self) -> Option<u64> {
        self.target_user
    }

    /// Returns a logger that tags every event with this request's identity.
    pub fn log(&self) -> RequestLog<'_> {
        RequestLog::new(self)
    }
}
