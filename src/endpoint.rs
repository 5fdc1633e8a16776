//! The handler type the decorators wrap.
//!
//! An [`Endpoint`] takes the request context and a request and produces a
//! response or an error. Any `Fn(&Ctx, Req) -> Result<Resp, Err>` is an
//! endpoint, and so is every decorator, which is what makes them compose:
//!
//! ```text
//! request ──► AuthenticatedHost ──► Authorize ──► handler
//!               attaches host         checks viewer
//! ```
//!
//! Decorators require the wrapped endpoint's error type to implement
//! `From<Error>`, so middleware failures and business failures travel in the
//! same error type.

use crate::authn::AuthenticatedHost;
use crate::authz::{self, Authorize};
use crate::context::Ctx;
use crate::error::Error;
use crate::store::HostStore;

/// A request handler.
pub trait Endpoint<Req> {
    /// Successful result type
    type Response;
    /// Failure type
    type Error;

    /// Handles `req` within `ctx`.
    fn call(&self, ctx: &Ctx, req: Req) -> Result<Self::Response, Self::Error>;
}

impl<F, Req, Resp, Err> Endpoint<Req> for F
where
    F: Fn(&Ctx, Req) -> Result<Resp, Err>,
{
    type Response = Resp;
    type Error = Err;

    fn call(&self, ctx: &Ctx, req: Req) -> Result<Resp, Err> {
        self(ctx, req)
    }
}

/// Pins a closure to the endpoint signature so its argument types are inferred.
///
/// # Examples
///
/// ```
/// use fleet_guard::{endpoint_fn, Ctx, Endpoint, Error};
///
/// let echo = endpoint_fn(|_ctx, req: String| Ok::<_, Error>(req));
/// assert_eq!(echo.call(&Ctx::background(), "hi".to_string()).unwrap(), "hi");
/// ```
pub fn endpoint_fn<F, Req, Resp, Err>(f: F) -> F
where
    F: Fn(&Ctx, Req) -> Result<Resp, Err>,
{
    f
}

/// An endpoint that accepts any request and does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nop;

impl<Req> Endpoint<Req> for Nop {
    type Response = ();
    type Error = Error;

    fn call(&self, _ctx: &Ctx, _req: Req) -> Result<(), Error> {
        Ok(())
    }
}

/// Builder-style decorator chaining.
///
/// Each method wraps `self`, so the last call becomes the outermost check.
/// Authentication should therefore be applied last.
///
/// The trait is implemented for every type, not only endpoints. An endpoint
/// may accept many request types ([`Nop`] accepts all of them), so the
/// request type is only known once `call` is used, and that is where a
/// decorator around a non-endpoint is rejected:
///
/// ```compile_fail
/// use fleet_guard::{Ctx, Endpoint, EndpointExt};
///
/// // A String is not an endpoint, so the wrapped value has no `call`.
/// let wrapped = String::from("not an endpoint").must_be_admin();
/// let _ = wrapped.call(&Ctx::background(), ());
/// ```
///
/// # Examples
///
/// ```
/// use fleet_guard::{Ctx, Endpoint, EndpointExt, Error, Nop, Session, User, Viewer};
///
/// let endpoint = Nop.can_modify_user();
///
/// let user = User::new(1, "user1");
/// let session = Session::new(1, &user, "user1");
/// let ctx = Ctx::new("req-1")
///     .with_viewer(Viewer::new(user, session))
///     .with_target_user(1);
///
/// assert!(endpoint.call(&ctx, ()).is_ok());
/// assert!(matches!(
///     endpoint.call(&ctx.with_target_user(2), ()),
///     Err(Error::PermissionDenied(_))
/// ));
/// ```
pub trait EndpointExt: Sized {
    /// Requires an administrator viewer.
    fn must_be_admin(self) -> Authorize<Self> {
        authz::must_be_admin(self)
    }

    /// Requires a viewer allowed to read the target user.
    fn can_read_user(self) -> Authorize<Self> {
        authz::can_read_user(self)
    }

    /// Requires a viewer allowed to modify the target user.
    fn can_modify_user(self) -> Authorize<Self> {
        authz::can_modify_user(self)
    }

    /// Requires a valid node key, resolved through `store`.
    fn authenticated_host<S: HostStore>(self, store: S) -> AuthenticatedHost<S, Self> {
        AuthenticatedHost::new(store, self)
    }
}

impl<E> EndpointExt for E {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_endpoints() {
        let double = endpoint_fn(|_ctx, n: u32| Ok::<_, Error>(n * 2));
        assert_eq!(double.call(&Ctx::background(), 21).unwrap(), 42);
    }

    #[test]
    fn endpoint_sees_context() {
        let read_id = endpoint_fn(|ctx: &Ctx, _req: ()| Ok::<_, Error>(ctx.request_id().to_string()));
        assert_eq!(read_id.call(&Ctx::new("req-9"), ()).unwrap(), "req-9");
    }

    #[test]
    fn nop_accepts_anything() {
        assert!(Endpoint::<()>::call(&Nop, &Ctx::background(), ()).is_ok());
        assert!(Nop.call(&Ctx::background(), "payload").is_ok());
    }
}
