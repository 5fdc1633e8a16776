//! Locating the node key on agent requests.
//!
//! Agent requests do not share a base type, so the device authentication
//! decorator asks for a capability instead: the request must implement
//! [`ExtractCredential`]. Most request types implement it by returning their
//! own field; types that only exist as serializable payloads can delegate to
//! [`extract_node_key`], which looks the field up by name on the serialized
//! form.

use serde::Serialize;
use serde_json::Value;

use crate::credential::Credential;
use crate::error::{ExtractionError, ExtractionFailure};

/// Conventional name of the node key field on agent requests.
pub const NODE_KEY_FIELD: &str = "NodeKey";

/// A request that carries a node key.
///
/// # Examples
///
/// ```
/// use fleet_guard::{Credential, ExtractCredential, ExtractionError};
///
/// struct DistributedReadRequest {
///     node_key: String,
/// }
///
/// impl ExtractCredential for DistributedReadRequest {
///     fn node_key(&self) -> Result<Credential, ExtractionError> {
///         Ok(Credential::new(self.node_key.clone()))
///     }
/// }
///
/// let req = DistributedReadRequest { node_key: "fookey".to_string() };
/// assert_eq!(req.node_key().unwrap().expose(), "fookey");
/// ```
pub trait ExtractCredential {
    /// Returns the node key carried by the request.
    ///
    /// # Errors
    ///
    /// Returns an [`ExtractionError`] if the key is missing or malformed.
    fn node_key(&self) -> Result<Credential, ExtractionError>;
}

impl<T: ExtractCredential + ?Sized> ExtractCredential for &T {
    fn node_key(&self) -> Result<Credential, ExtractionError> {
        (**self).node_key()
    }
}

impl ExtractCredential for Value {
    fn node_key(&self) -> Result<Credential, ExtractionError> {
        field_in_value(self, NODE_KEY_FIELD)
    }
}

/// Extracts the [`NODE_KEY_FIELD`] from any serializable request.
///
/// See [`extract_field`] for the matching rules.
///
/// # Examples
///
/// ```
/// use fleet_guard::{extract_node_key, ExtractionFailure};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// #[serde(rename_all = "PascalCase")]
/// struct Foo { foo: String, node_key: String }
///
/// #[derive(Serialize)]
/// struct Almost { node_key: i32 }
///
/// let key = extract_node_key(&Foo { foo: "foo".into(), node_key: "fookey".into() }).unwrap();
/// assert_eq!(key.expose(), "fookey");
///
/// let err = extract_node_key(&Almost { node_key: 10 }).unwrap_err();
/// assert_eq!(err.reason(), ExtractionFailure::WrongType);
/// ```
pub fn extract_node_key<T: Serialize + ?Sized>(value: &T) -> Result<Credential, ExtractionError> {
    extract_field(value, NODE_KEY_FIELD)
}

/// Extracts a string field named `name` from the top level of `value`.
///
/// Field names match when they are equal after dropping `_` and `-` and
/// ignoring ASCII case, so `NodeKey`, `node_key` and `nodeKey` all match
/// `"NodeKey"`. Only depth-zero fields are searched and the first match in
/// the serialized field order wins, which for derived `Serialize` impls is
/// declaration order. A second match is logged as a warning since the
/// request type is then ambiguous; callers that run extraction inside
/// [`RequestLog::span`](crate::RequestLog::span) get the request fields on
/// that warning.
///
/// # Errors
///
/// - [`ExtractionFailure::FieldAbsent`] if no field matches, or `value` does
///   not serialize to a map-like value.
/// - [`ExtractionFailure::WrongType`] if the field exists but is not a string.
pub fn extract_field<T: Serialize + ?Sized>(
    value: &T,
    name: &str,
) -> Result<Credential, ExtractionError> {
    let value = serde_json::to_value(value)
        .map_err(|_| ExtractionError::new(name, ExtractionFailure::FieldAbsent))?;
    field_in_value(&value, name)
}

fn field_in_value(value: &Value, name: &str) -> Result<Credential, ExtractionError> {
    let fields = value
        .as_object()
        .ok_or_else(|| ExtractionError::new(name, ExtractionFailure::FieldAbsent))?;

    let mut matches = fields.iter().filter(|(k, _)| names_match(k, name));

    let (field, found) = matches
        .next()
        .ok_or_else(|| ExtractionError::new(name, ExtractionFailure::FieldAbsent))?;

    if let Some((other, _)) = matches.next() {
        tracing::warn!(
            field = %field,
            other = %other,
            "request exposes more than one {} field; using the first",
            name
        );
    }

    match found {
        Value::String(s) => Ok(Credential::new(s.as_str())),
        _ => Err(ExtractionError::new(name, ExtractionFailure::WrongType)),
    }
}

fn names_match(field: &str, name: &str) -> bool {
    let normalize = |s: &str| -> Vec<char> {
        s.chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect()
    };
    normalize(field) == normalize(name)
}
