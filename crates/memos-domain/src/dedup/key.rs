//! Canonical request keys.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// Key identifying a deduplicable request: an operation name plus the
/// parameters that distinguish one request of that operation from another.
///
/// Parameters are kept sorted by name and rendered as compact JSON, so the
/// order in which they are added never changes the key. A missing optional
/// parameter renders as `null`, which keeps it distinct from an empty
/// string.
///
/// - `RequestKey::new("fetchUsers")` → `fetchUsers`
/// - `RequestKey::new("fetchUserStats").param("user", Some("users/1"))`
///   → `fetchUserStats:{"user":"users/1"}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestKey {
    operation: String,
    params: BTreeMap<String, Value>,
}

impl RequestKey {
    /// Creates a key for an operation without parameters.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            params: BTreeMap::new(),
        }
    }

    /// Adds a parameter. Adding the same name twice keeps the last value.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// The operation name.
    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.operation)?;
        if self.params.is_empty() {
            return Ok(());
        }

        f.write_str(":{")?;
        for (index, (name, value)) in self.params.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", Value::String(name.clone()), value)?;
        }
        f.write_str("}")
    }
}

impl From<RequestKey> for String {
    fn from(key: RequestKey) -> Self {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_without_params_is_operation_name() {
        assert_eq!(RequestKey::new("fetchUsers").to_string(), "fetchUsers");
    }

    #[test]
    fn test_params_render_as_sorted_json() {
        let key = RequestKey::new("listMemos")
            .param("state", "NORMAL")
            .param("parent", "users/1")
            .param("page_size", 20);

        assert_eq!(
            key.to_string(),
            r#"listMemos:{"page_size":20,"parent":"users/1","state":"NORMAL"}"#
        );
    }

    #[test]
    fn test_param_order_does_not_change_key() {
        let a = RequestKey::new("op").param("a", 1).param("b", 2);
        let b = RequestKey::new("op").param("b", 2).param("a", 1);

        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_absent_param_is_stable_and_distinct_from_empty() {
        let absent = RequestKey::new("fetchUserStats").param("user", None::<&str>);
        let again = RequestKey::new("fetchUserStats").param("user", None::<&str>);
        let empty = RequestKey::new("fetchUserStats").param("user", Some(""));

        assert_eq!(absent.to_string(), r#"fetchUserStats:{"user":null}"#);
        assert_eq!(absent.to_string(), again.to_string());
        assert_ne!(absent.to_string(), empty.to_string());
    }

    #[test]
    fn test_param_values_are_escaped() {
        let key = RequestKey::new("getUser").param("name", "users/\"quoted\"");

        assert_eq!(key.to_string(), r#"getUser:{"name":"users/\"quoted\""}"#);
        assert_eq!(key.operation(), "getUser");
    }
}
