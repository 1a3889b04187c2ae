//! Typed JSON request bodies.
//!
//! Most services take a provider DTO as their request type. [`JsonBody`] is
//! for the cases where the body is assembled at the call site instead: fields
//! are added one by one and `None` values are skipped.
//!
//! # Example
//!
//! ```rust
//! use crud_client::rest::JsonBody;
//!
//! let body = JsonBody::builder()
//!     .field("model", "gpt-4o")
//!     .field("temperature", 0.2)
//!     .optional("user", None::<String>)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(body.len(), 2);
//! assert_eq!(body.get("model").unwrap(), "gpt-4o");
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A JSON object request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonBody(Map<String, Value>);

impl JsonBody {
    /// Creates a new builder.
    #[must_use]
    pub fn builder() -> JsonBodyBuilder {
        JsonBodyBuilder::default()
    }

    /// Returns the value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the body has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the underlying map.
    #[must_use]
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for JsonBody {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Builder for [`JsonBody`].
///
/// The first serialization error is kept and returned from
/// [`build`](Self::build); later fields are ignored once an error occurred.
#[derive(Debug, Default)]
pub struct JsonBodyBuilder {
    fields: Map<String, Value>,
    error: Option<serde_json::Error>,
}

impl JsonBodyBuilder {
    /// Sets `key` to `value`, replacing any previous value.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if self.error.is_some() {
            return self;
        }
        match serde_json::to_value(value) {
            Ok(value) => {
                self.fields.insert(key.into(), value);
            }
            Err(e) => self.error = Some(e),
        }
        self
    }

    /// Sets `key` to `value` if it is `Some`.
    #[must_use]
    pub fn optional<T: Serialize>(self, key: impl Into<String>, value: Option<T>) -> Self {
        match value {
            Some(value) => self.field(key, value),
            None => self,
        }
    }

    /// Merges every field of a serializable struct or map into the body.
    ///
    /// `null` merges nothing. Any other non-object value is recorded as an
    /// error and returned from [`build`](Self::build).
    #[must_use]
    pub fn extend(mut self, value: impl Serialize) -> Self {
        if self.error.is_some() {
            return self;
        }
        match serde_json::to_value(value) {
            Ok(Value::Object(map)) => self.fields.extend(map),
            Ok(Value::Null) => {}
            Ok(other) => {
                self.error = Some(<serde_json::Error as serde::ser::Error>::custom(format!(
                    "cannot merge a non-object value into a JSON body: {other}"
                )));
            }
            Err(e) => self.error = Some(e),
        }
        self
    }

    /// Builds the body.
    ///
    /// # Errors
    ///
    /// Returns the first serialization error encountered.
    pub fn build(self) -> Result<JsonBody, serde_json::Error> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(JsonBody(self.fields)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[derive(Serialize)]
    struct Defaults {
        model: &'static str,
        stream: bool,
    }

    #[test]
    fn test_optional_skips_none() {
        let body = JsonBody::builder()
            .optional("name", Some("assistant"))
            .optional("description", None::<&str>)
            .build()
            .unwrap();

        assert_eq!(body.len(), 1);
        assert!(body.get("description").is_none());
    }

    #[test]
    fn test_field_replaces_previous_value() {
        let body = JsonBody::builder()
            .field("model", "a")
            .field("model", "b")
            .build()
            .unwrap();
        assert_eq!(body.get("model"), Some(&json!("b")));
    }

    #[test]
    fn test_extend_merges_struct_fields() {
        let body = JsonBody::builder()
            .extend(Defaults {
                model: "gpt-4o",
                stream: false,
            })
            .field("stream", true)
            .build()
            .unwrap();

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"model": "gpt-4o", "stream": true})
        );
    }

    #[test]
    fn test_extend_rejects_non_object_values() {
        let scalar = JsonBody::builder().field("model", "a").extend(5).build();
        let message = scalar.unwrap_err().to_string();
        assert!(message.contains("non-object"), "{message}");

        let list = JsonBody::builder().extend(["a", "b"]).build();
        assert!(list.is_err());
    }

    #[test]
    fn test_extend_with_null_merges_nothing() {
        let body = JsonBody::builder()
            .field("model", "a")
            .extend(None::<Defaults>)
            .build()
            .unwrap();
        assert_eq!(serde_json::to_value(&body).unwrap(), json!({"model": "a"}));
    }

    #[test]
    fn test_serialization_error_is_reported() {
        let mut bad = HashMap::new();
        bad.insert(vec![1u8], "non-string key");

        let result = JsonBody::builder().field("ok", 1).field("bad", bad).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_body_serializes_to_empty_object() {
        let body = JsonBody::builder().build().unwrap();
        assert!(body.is_empty());
        assert_eq!(serde_json::to_string(&body).unwrap(), "{}");
    }
}
