use std::fmt;

use http::StatusCode;

use crate::store::StoreError;

/// Errors produced by the authentication and authorization decorators.
///
/// Every variant is a plain data carrier. The transport layer matches on the
/// variant (or on [`Error::kind`]) to pick a wire response; use
/// [`Error::status_code`] for the conventional HTTP mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An authorization decorator ran but no viewer was attached to the context.
    NoViewerInContext,
    /// A viewer is present but the decorator's policy rejected it.
    PermissionDenied(PermissionError),
    /// The node key could not be located on the request.
    CredentialExtraction(ExtractionError),
    /// The store rejected the supplied node key.
    DeviceAuthentication {
        /// Why the store refused the key
        cause: StoreError,
    },
    /// Recording the host's "last seen" time failed and the decorator is
    /// configured to abort in that case.
    HostSeenUpdate {
        /// The store failure
        cause: StoreError,
    },
}

impl Error {
    /// Returns the discriminant of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NoViewerInContext => ErrorKind::NoViewerInContext,
            Error::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Error::CredentialExtraction(_) => ErrorKind::CredentialExtraction,
            Error::DeviceAuthentication { .. } => ErrorKind::DeviceAuthentication,
            Error::HostSeenUpdate { .. } => ErrorKind::HostSeenUpdate,
        }
    }

    /// Maps the error to the HTTP status a transport should answer with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NoViewerInContext => StatusCode::UNAUTHORIZED,
            Error::PermissionDenied(_) => StatusCode::FORBIDDEN,
            Error::CredentialExtraction(_) | Error::DeviceAuthentication { .. } => {
                StatusCode::UNAUTHORIZED
            }
            Error::HostSeenUpdate { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` when the agent's node key is unusable.
    ///
    /// Agents receiving such an error are expected to re-enroll.
    pub fn node_invalid(&self) -> bool {
        matches!(
            self,
            Error::CredentialExtraction(_) | Error::DeviceAuthentication { .. }
        )
    }

    /// Returns the permission error if this is a policy denial.
    pub fn as_permission(&self) -> Option<&PermissionError> {
        match self {
            Error::PermissionDenied(p) => Some(p),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NoViewerInContext => write!(f, "no viewer in context"),
            Error::PermissionDenied(p) => write!(f, "{}", p),
            Error::CredentialExtraction(e) => write!(f, "failed to extract node key: {}", e),
            Error::DeviceAuthentication { cause } => write!(f, "authentication error: {}", cause),
            Error::HostSeenUpdate { cause } => write!(f, "failed to mark host seen: {}", cause),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::PermissionDenied(p) => Some(p),
            Error::CredentialExtraction(e) => Some(e),
            Error::DeviceAuthentication { cause } | Error::HostSeenUpdate { cause } => Some(cause),
            Error::NoViewerInContext => None,
        }
    }
}

impl From<PermissionError> for Error {
    fn from(p: PermissionError) -> Self {
        Error::PermissionDenied(p)
    }
}

impl From<ExtractionError> for Error {
    fn from(e: ExtractionError) -> Self {
        Error::CredentialExtraction(e)
    }
}

/// Discriminant of [`Error`], handy for assertions and metrics labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`Error::NoViewerInContext`]
    NoViewerInContext,
    /// See [`Error::PermissionDenied`]
    PermissionDenied,
    /// See [`Error::CredentialExtraction`]
    CredentialExtraction,
    /// See [`Error::DeviceAuthentication`]
    DeviceAuthentication,
    /// See [`Error::HostSeenUpdate`]
    HostSeenUpdate,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::NoViewerInContext => write!(f, "no_viewer_in_context"),
            ErrorKind::PermissionDenied => write!(f, "permission_denied"),
            ErrorKind::CredentialExtraction => write!(f, "credential_extraction"),
            ErrorKind::DeviceAuthentication => write!(f, "device_authentication"),
            ErrorKind::HostSeenUpdate => write!(f, "host_seen_update"),
        }
    }
}

/// A viewer was present but not allowed to perform the operation.
///
/// The message is one of a fixed set of strings and is safe to show to the
/// caller as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionError {
    message: &'static str,
}

impl PermissionError {
    /// Denial issued by the admin-only decorator.
    pub const MUST_BE_ADMIN: &'static str = "must be an admin";
    /// Denial issued by the write-permission decorator.
    pub const NO_WRITE: &'static str = "no write permissions on user";
    /// Denial issued by the read-permission decorator.
    pub const NO_READ: &'static str = "no read permissions on user";

    pub(crate) fn new(message: &'static str) -> Self {
        Self { message }
    }

    /// Returns the human-readable denial message.
    pub fn message(&self) -> &'static str {
        self.message
    }
}

impl fmt::Display for PermissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message)
    }
}

impl std::error::Error for PermissionError {}

/// The node key could not be pulled out of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionError {
    field: String,
    reason: ExtractionFailure,
}

impl ExtractionError {
    /// Creates a new extraction error for the named field.
    pub fn new(field: impl Into<String>, reason: ExtractionFailure) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }

    /// Returns the field name that was looked up.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Returns why extraction failed.
    pub fn reason(&self) -> ExtractionFailure {
        self.reason
    }
}

impl fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field '{}' {}", self.field, self.reason)
    }
}

impl std::error::Error for ExtractionError {}

/// Why the credential extractor failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionFailure {
    /// No field with the conventional name exists on the value
    FieldAbsent,
    /// The field exists but does not hold a string
    WrongType,
}

impl fmt::Display for ExtractionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionFailure::FieldAbsent => write!(f, "not found"),
            ExtractionFailure::WrongType => write!(f, "is not a string"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_error_displays_bare_message() {
        let err = Error::from(PermissionError::new(PermissionError::NO_WRITE));
        assert_eq!(err.to_string(), "no write permissions on user");
        assert_eq!(
            err.as_permission().map(PermissionError::message),
            Some("no write permissions on user")
        );
    }

    #[test]
    fn kinds_are_distinguishable() {
        let errors = [
            Error::NoViewerInContext,
            Error::PermissionDenied(PermissionError::new(PermissionError::MUST_BE_ADMIN)),
            Error::CredentialExtraction(ExtractionError::new(
                "NodeKey",
                ExtractionFailure::FieldAbsent,
            )),
            Error::DeviceAuthentication {
                cause: StoreError::not_found("no host found"),
            },
            Error::HostSeenUpdate {
                cause: StoreError::backend("disk full"),
            },
        ];

        let kinds: Vec<ErrorKind> = errors.iter().map(Error::kind).collect();
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn status_codes_follow_failure_class() {
        assert_eq!(Error::NoViewerInContext.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            Error::from(PermissionError::new(PermissionError::NO_READ)).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            Error::DeviceAuthentication {
                cause: StoreError::not_found("gone"),
            }
            .status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn only_device_failures_invalidate_node() {
        assert!(Error::from(ExtractionError::new("NodeKey", ExtractionFailure::WrongType))
            .node_invalid());
        assert!(Error::DeviceAuthentication {
            cause: StoreError::not_found("gone"),
        }
        .node_invalid());
        assert!(!Error::NoViewerInContext.node_invalid());
        assert!(!Error::HostSeenUpdate {
            cause: StoreError::backend("timeout"),
        }
        .node_invalid());
    }

    #[test]
    fn extraction_reasons_render_differently() {
        let absent = ExtractionError::new("NodeKey", ExtractionFailure::FieldAbsent);
        let wrong = ExtractionError::new("NodeKey", ExtractionFailure::WrongType);
        assert_eq!(absent.to_string(), "field 'NodeKey' not found");
        assert_eq!(wrong.to_string(), "field 'NodeKey' is not a string");
    }
}
