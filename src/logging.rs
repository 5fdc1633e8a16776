use std::fmt;

use crate::context::Ctx;

/// A logger bound to one request's context.
///
/// `RequestLog` is obtained from [`Ctx::log`]. Every event it emits carries
/// the request id plus the viewer's user id and the authenticated host id
/// when those are present, so denials and check-ins can be correlated
/// without handlers repeating the fields.
///
/// Credentials print as `[REDACTED]`, so passing one through `format_args!`
/// is safe.
#[derive(Debug)]
pub struct RequestLog<'a> {
    request_id: &'a str,
    user_id: Option<u64>,
    host_id: Option<u64>,
}

impl<'a> RequestLog<'a> {
    pub(crate) fn new(ctx: &'a Ctx) -> Self {
        Self {
            request_id: ctx.request_id(),
            user_id: ctx.viewer().map(|v| v.user_id()),
            host_id: ctx.host().map(|h| h.id),
        }
    }

    /// Returns the request id associated with this logger.
    pub fn request_id(&self) -> &str {
        self.request_id
    }

    /// Returns an info-level span carrying the same request fields.
    ///
    /// Code without a [`Ctx`] of its own, such as the node key extractor,
    /// logs through plain `tracing` macros; run it inside this span so its
    /// events stay correlated with the request.
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "request",
            request_id = %self.request_id,
            user_id = ?self.user_id,
            host_id = ?self.host_id
        )
    }

    /// Logs an info-level message.
    pub fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(
            request_id = %self.request_id,
            user_id = ?self.user_id,
            host_id = ?self.host_id,
            "{}",
            args
        );
    }

    /// Logs a warning-level message.
    pub fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(
            request_id = %self.request_id,
            user_id = ?self.user_id,
            host_id = ?self.host_id,
            "{}",
            args
        );
    }

    /// Logs an error-level message.
    pub fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!(
            request_id = %self.request_id,
            user_id = ?self.user_id,
            host_id = ?self.host_id,
            "{}",
            args
        );
    }

    /// Logs a debug-level message.
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(
            request_id = %self.request_id,
            user_id = ?self.user_id,
            host_id = ?self.host_id,
            "{}",
            args
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Host;

    #[test]
    fn log_picks_up_context_identity() {
        let ctx = Ctx::new("req-log").with_host(Host::new(4, "foo!", "goodkey"));
        let log = ctx.log();

        assert_eq!(log.request_id(), "req-log");
        assert_eq!(log.host_id, Some(4));
        assert_eq!(log.user_id, None);

        // No subscriber installed; emitting must still be a no-op rather than a panic.
        log.info(format_args!("host {} checked in", 4));
        log.debug(format_args!("node key {}", ctx.host().map(|h| &h.node_key).unwrap()));
    }
}
