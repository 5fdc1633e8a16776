//! User, session and viewer records.
//!
//! These are the identities the viewer authorization decorators reason
//! about. They are produced by upstream session resolution; this crate only
//! reads them.

use chrono::{DateTime, Utc};

use crate::credential::Credential;

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique identifier of the account
    pub id: u64,
    /// Login name
    pub username: String,
    /// Display name
    pub name: String,
    /// Contact address
    pub email: String,
    /// Whether the account has administrative rights
    pub admin: bool,
    /// Disabled accounts keep their record but lose most access
    pub enabled: bool,
}

impl User {
    /// Creates an enabled, non-admin user.
    pub fn new(id: u64, username: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            id,
            name: username.clone(),
            email: format!("{}@example.com", username),
            username,
            admin: false,
            enabled: true,
        }
    }

    /// Marks the user as an administrator.
    pub fn with_admin(mut self, admin: bool) -> Self {
        self.admin = admin;
        self
    }

    /// Enables or disables the account.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// A login session tied to a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Session identifier
    pub id: u64,
    /// Owner of the session
    pub user_id: u64,
    /// Session token
    pub key: Credential,
    /// Last time the session was used
    pub accessed_at: DateTime<Utc>,
}

impl Session {
    /// Creates a session for `user` with the given key.
    pub fn new(id: u64, user: &User, key: impl Into<String>) -> Self {
        Self {
            id,
            user_id: user.id,
            key: Credential::new(key),
            accessed_at: Utc::now(),
        }
    }
}

/// The authenticated human making the current request.
///
/// # Examples
///
/// ```
/// use fleet_guard::{Session, User, Viewer};
///
/// let user = User::new(7, "alice");
/// let session = Session::new(1, &user, "session-key");
/// let viewer = Viewer::new(user, session);
///
/// assert_eq!(viewer.user_id(), 7);
/// assert!(viewer.is_logged_in());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    /// The user behind the session
    pub user: User,
    /// The session the request was made with
    pub session: Session,
}

impl Viewer {
    /// Pairs a user with its session.
    pub fn new(user: User, session: Session) -> Self {
        Self { user, session }
    }

    /// Returns the viewer's user id.
    pub fn user_id(&self) -> u64 {
        self.user.id
    }

    /// Returns the viewer's login name.
    pub fn username(&self) -> &str {
        &self.user.username
    }

    /// Returns the session id.
    pub fn session_id(&self) -> u64 {
        self.session.id
    }

    /// Returns `true` if the viewer is `id`.
    pub fn is_user_id(&self, id: u64) -> bool {
        self.user.id == id
    }

    /// The session was issued to this viewer's user.
    ///
    /// A viewer failing this check is inconsistent and is refused by every
    /// authorization policy, admin or not.
    pub fn holds_own_session(&self) -> bool {
        self.session.user_id == self.user.id
    }

    /// An enabled user holding a session that belongs to them.
    pub fn is_logged_in(&self) -> bool {
        self.user.enabled && self.holds_own_session()
    }
}
