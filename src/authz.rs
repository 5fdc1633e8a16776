//! Viewer authorization decorators.
//!
//! Three policies guard user-facing endpoints:
//!
//! | Policy | Allows | Denial |
//! |---|---|---|
//! | [`Policy::AdminOnly`] | administrators | `must be an admin` |
//! | [`Policy::ModifyUser`] | administrators, or the target user themselves | `no write permissions on user` |
//! | [`Policy::ReadUser`] | administrators, the target user themselves, or any enabled viewer | `no read permissions on user` |
//!
//! All three first require a viewer in the context and fail with
//! [`Error::NoViewerInContext`] otherwise. None of them look at the request
//! payload: the viewer and the target user id come from the [`Ctx`] only.

use std::fmt;

use crate::context::Ctx;
use crate::endpoint::Endpoint;
use crate::error::{Error, PermissionError};
use crate::user::Viewer;

/// An authorization rule applied to the viewer of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Viewer must be an administrator
    AdminOnly,
    /// Viewer must be allowed to modify the target user
    ModifyUser,
    /// Viewer must be allowed to read the target user
    ReadUser,
}

impl Policy {
    /// Decides whether `viewer` may act on `target`.
    ///
    /// `target` is `None` when the operation does not name a specific user.
    /// Administrators pass every policy without any target comparison. A
    /// viewer whose session was issued to a different user fails every
    /// policy, and reading someone else's record needs
    /// [`Viewer::is_logged_in`].
    ///
    /// # Errors
    ///
    /// Returns the policy's fixed [`PermissionError`] on denial.
    ///
    /// # Examples
    ///
    /// ```
    /// use fleet_guard::{Policy, Session, User, Viewer};
    ///
    /// let user = User::new(3, "user1");
    /// let session = Session::new(1, &user, "user1");
    /// let viewer = Viewer::new(user, session);
    ///
    /// assert!(Policy::ModifyUser.check(&viewer, Some(3)).is_ok());
    /// let denied = Policy::ModifyUser.check(&viewer, Some(1)).unwrap_err();
    /// assert_eq!(denied.message(), "no write permissions on user");
    /// ```
    pub fn check(self, viewer: &Viewer, target: Option<u64>) -> Result<(), PermissionError> {
        let allowed = viewer.holds_own_session()
            && (viewer.user.admin || self.allows_non_admin(viewer, target));

        if allowed {
            Ok(())
        } else {
            Err(PermissionError::new(self.denial_message()))
        }
    }

    fn allows_non_admin(self, viewer: &Viewer, target: Option<u64>) -> bool {
        let is_target = target.is_some_and(|id| viewer.is_user_id(id));
        match self {
            Policy::AdminOnly => false,
            Policy::ModifyUser => is_target,
            Policy::ReadUser => is_target || viewer.is_logged_in(),
        }
    }

    /// Returns the message carried by this policy's denials.
    pub fn denial_message(self) -> &'static str {
        match self {
            Policy::AdminOnly => PermissionError::MUST_BE_ADMIN,
            Policy::ModifyUser => PermissionError::NO_WRITE,
            Policy::ReadUser => PermissionError::NO_READ,
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::AdminOnly => write!(f, "admin-only"),
            Policy::ModifyUser => write!(f, "modify-user"),
            Policy::ReadUser => write!(f, "read-user"),
        }
    }
}

/// Decorator enforcing a [`Policy`] before calling the wrapped endpoint.
///
/// Build one with [`must_be_admin`], [`can_read_user`], [`can_modify_user`]
/// or the matching [`EndpointExt`](crate::EndpointExt) methods.
#[derive(Debug, Clone)]
pub struct Authorize<E> {
    policy: Policy,
    inner: E,
}

impl<E> Authorize<E> {
    /// Wraps `inner` with `policy`.
    pub fn new(policy: Policy, inner: E) -> Self {
        Self { policy, inner }
    }

    /// Returns the enforced policy.
    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Unwraps the decorator.
    pub fn into_inner(self) -> E {
        self.inner
    }

    fn authorize(&self, ctx: &Ctx) -> Result<(), Error> {
        let viewer = match ctx.viewer() {
            Some(v) => v,
            None => {
                ctx.log()
                    .warn(format_args!("{} check without viewer in context", self.policy));
                return Err(Error::NoViewerInContext);
            }
        };

        self.policy
            .check(viewer, ctx.target_user())
            .map_err(|denied| {
                ctx.log().warn(format_args!(
                    "{} check denied for {} on target {:?}: {}",
                    self.policy,
                    viewer.username(),
                    ctx.target_user(),
                    denied
                ));
                Error::PermissionDenied(denied)
            })
    }
}

impl<E, Req> Endpoint<Req> for Authorize<E>
where
    E: Endpoint<Req>,
    E::Error: From<Error>,
{
    type Response = E::Response;
    type Error = E::Error;

    fn call(&self, ctx: &Ctx, req: Req) -> Result<Self::Response, Self::Error> {
        self.authorize(ctx)?;
        self.inner.call(ctx, req)
    }
}

/// Only administrators may call `next`.
pub fn must_be_admin<E>(next: E) -> Authorize<E> {
    Authorize::new(Policy::AdminOnly, next)
}

/// Only viewers allowed to modify the target user may call `next`.
pub fn can_modify_user<E>(next: E) -> Authorize<E> {
    Authorize::new(Policy::ModifyUser, next)
}

/// Only viewers allowed to read the target user may call `next`.
pub fn can_read_user<E>(next: E) -> Authorize<E> {
    Authorize::new(Policy::ReadUser, next)
}
