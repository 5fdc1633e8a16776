use std::fmt;

use subtle::ConstantTimeEq;

/// A node key or session key that must never show up in logs.
///
/// `Credential` is how device secrets travel through the middleware: the
/// extractor produces one, the store compares against one, and hosts keep
/// theirs in one. Debug and Display always print `[REDACTED]`; the raw value
/// is only reachable through [`expose`](Self::expose).
///
/// # Examples
///
/// ```
/// use fleet_guard::Credential;
///
/// let key = Credential::new("foo bar baz bing bang boom");
///
/// assert_eq!(format!("{:?}", key), "[REDACTED]");
/// assert_eq!(key.to_string(), "[REDACTED]");
/// assert_eq!(key.expose(), "foo bar baz bing bang boom");
/// ```
// Do NOT derive Debug or implement Deref/AsRef<str>: either would let the key
// reach a log line without an explicit expose() call. PartialEq is manual so
// comparisons stay constant time.
#[derive(Clone)]
pub struct Credential {
    inner: String,
}

impl Credential {
    /// Wraps a raw credential value.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            inner: value.into(),
        }
    }

    /// Returns the raw credential.
    ///
    /// Callers must not log or display the returned value.
    pub fn expose(&self) -> &str {
        &self.inner
    }

    /// Returns `true` if the credential is the empty string.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Compares against a presented key in constant time.
    ///
    /// Only the length comparison can short-circuit; equal-length keys are
    /// compared byte for byte without an early exit.
    pub fn ct_eq(&self, presented: &str) -> bool {
        let stored = self.inner.as_bytes();
        let presented = presented.as_bytes();

        if stored.len() != presented.len() {
            return false;
        }
        stored.ct_eq(presented).into()
    }
}

impl PartialEq for Credential {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(&other.inner)
    }
}

impl Eq for Credential {}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_redacts_debug_and_display() {
        let key = Credential::new("hunter2");

        let debug_output = format!("{:?}", key);
        let display_output = format!("{}", key);

        assert_eq!(debug_output, "[REDACTED]");
        assert_eq!(display_output, "[REDACTED]");
        assert!(!debug_output.contains("hunter2"));
        assert!(!debug_output.contains("String"));
    }

    #[test]
    fn credential_redacts_inside_containers() {
        let keys = vec![Credential::new("k1"), Credential::new("k2")];
        assert_eq!(format!("{:?}", keys), "[[REDACTED], [REDACTED]]");
    }

    #[test]
    fn credential_exposes_when_explicit() {
        let key = Credential::new(String::from("goodkey"));
        assert_eq!(key.expose(), "goodkey");
        assert!(!key.is_empty());
        assert!(Credential::new("").is_empty());
    }

    #[test]
    fn credential_compares_presented_keys() {
        let key = Credential::new("goodkey");

        assert!(key.ct_eq("goodkey"));
        assert!(!key.ct_eq("goodkez"));
        assert!(!key.ct_eq("badkey!"));
        assert!(!key.ct_eq("goodkey2"));
        assert!(!key.ct_eq("good"));
        assert!(!key.ct_eq(""));
        assert!(Credential::new("").ct_eq(""));
    }

    #[test]
    fn credential_equality_uses_key_contents() {
        assert_eq!(Credential::new("goodkey"), Credential::new("goodkey"));
        assert_ne!(Credential::new("goodkey"), Credential::new("badkey!"));
        assert_ne!(Credential::new("goodkey"), Credential::new("goodkeygoodkey"));
    }
}
