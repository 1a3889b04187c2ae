//! Pagination queries and list responses.
//!
//! Two pagination styles are supported:
//!
//! - **Token-based** ([`TokenQuery`]): the provider returns an opaque page
//!   token that is sent back to fetch the next page.
//! - **Cursor-based** ([`CursorQuery`]): `after`/`before` object-id cursors
//!   plus a sort order.
//!
//! Any type implementing [`Query`] can be used as a service's list query.
//! Query fields become query-string entries: `None` fields are skipped and
//! `include_archived` is only sent when `true`.
//!
//! # Deref Pattern
//!
//! [`QueryResponse<T>`] implements `Deref<Target = [T]>`, so the page can be
//! used like a slice:
//!
//! ```rust
//! use crud_client::rest::QueryResponse;
//!
//! let page: QueryResponse<String> = serde_json::from_str(
//!     r#"{"data": ["a", "b"], "has_more": true, "last_id": "b"}"#,
//! )
//! .unwrap();
//!
//! assert_eq!(page.len(), 2);
//! assert_eq!(page[0], "a");
//! assert!(page.has_more());
//! assert_eq!(page.last_id(), Some("b"));
//! ```

use std::ops::Deref;

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::rest::path::PathParam;

/// A list query.
///
/// Implementors are serialized into query-string parameters when a list
/// call is dispatched. Override [`to_path_params`](Query::to_path_params) to
/// control the wire names.
pub trait Query: Serialize + Send + Sync {
    /// Page size; `None` uses the provider default.
    fn page_size(&self) -> Option<u32>;

    /// Whether archived resources are included.
    fn archived(&self) -> bool;

    /// Converts the query into query-string parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be serialized.
    fn to_path_params(&self) -> Result<Vec<PathParam>, serde_json::Error> {
        serialize_to_query(self)
    }
}

/// Sort order for cursor-based pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest first.
    Asc,
    /// Newest first.
    Desc,
}

/// Token-based pagination query.
///
/// # Example
///
/// ```rust
/// use crud_client::rest::{Query, TokenQuery};
///
/// let query = TokenQuery::new().size(50).page_token("CiAKGjBpNDd2Nm");
/// let params = query.to_path_params().unwrap();
/// assert_eq!(params.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenQuery {
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none", rename = "pageSize")]
    pub size: Option<u32>,
    /// Include archived resources.
    #[serde(default, skip_serializing_if = "is_false")]
    pub include_archived: bool,
    /// Opaque continuation token from the previous page.
    #[serde(skip_serializing_if = "Option::is_none", rename = "pageToken")]
    pub page_token: Option<String>,
}

impl TokenQuery {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page size.
    #[must_use]
    pub const fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Includes archived resources.
    #[must_use]
    pub const fn include_archived(mut self, include: bool) -> Self {
        self.include_archived = include;
        self
    }

    /// Sets the page token.
    #[must_use]
    pub fn page_token(mut self, token: impl Into<String>) -> Self {
        self.page_token = Some(token.into());
        self
    }
}

impl Query for TokenQuery {
    fn page_size(&self) -> Option<u32> {
        self.size
    }

    fn archived(&self) -> bool {
        self.include_archived
    }
}

/// Cursor-based pagination query.
///
/// # Example
///
/// ```rust
/// use crud_client::rest::{CursorQuery, PathParam, Query, SortOrder};
///
/// let query = CursorQuery::new().size(20).order(SortOrder::Desc).after("asst_abc");
/// let params = query.to_path_params().unwrap();
/// assert!(params.contains(&PathParam::query("limit", 20)));
/// assert!(params.contains(&PathParam::query("order", "desc")));
/// assert!(params.contains(&PathParam::query("after", "asst_abc")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorQuery {
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none", rename = "limit")]
    pub size: Option<u32>,
    /// Include archived resources.
    #[serde(default, skip_serializing_if = "is_false")]
    pub include_archived: bool,
    /// Sort order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
    /// Return objects after this id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    /// Return objects before this id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
}

impl CursorQuery {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page size.
    #[must_use]
    pub const fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Includes archived resources.
    #[must_use]
    pub const fn include_archived(mut self, include: bool) -> Self {
        self.include_archived = include;
        self
    }

    /// Sets the sort order.
    #[must_use]
    pub const fn order(mut self, order: SortOrder) -> Self {
        self.order = Some(order);
        self
    }

    /// Sets the `after` cursor.
    #[must_use]
    pub fn after(mut self, id: impl Into<String>) -> Self {
        self.after = Some(id.into());
        self
    }

    /// Sets the `before` cursor.
    #[must_use]
    pub fn before(mut self, id: impl Into<String>) -> Self {
        self.before = Some(id.into());
        self
    }
}

impl Query for CursorQuery {
    fn page_size(&self) -> Option<u32> {
        self.size
    }

    fn archived(&self) -> bool {
        self.include_archived
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

/// Serializes a struct into query parameters, sorted by key.
///
/// `null` fields are skipped, arrays are joined with commas and nested
/// objects are sent as JSON text.
fn serialize_to_query<T: Serialize + ?Sized>(params: &T) -> Result<Vec<PathParam>, serde_json::Error> {
    let value = serde_json::to_value(params)?;

    let mut query = Vec::new();

    if let Value::Object(map) = value {
        for (key, val) in map {
            match val {
                Value::Null => {}
                Value::String(s) => query.push(PathParam::query(key, s)),
                Value::Number(n) => query.push(PathParam::query(key, n)),
                Value::Bool(b) => query.push(PathParam::query(key, b)),
                Value::Array(arr) => {
                    let values: Vec<String> = arr
                        .iter()
                        .filter_map(|v| match v {
                            Value::String(s) => Some(s.clone()),
                            Value::Number(n) => Some(n.to_string()),
                            _ => None,
                        })
                        .collect();
                    if !values.is_empty() {
                        query.push(PathParam::query(key, values.join(",")));
                    }
                }
                Value::Object(_) => query.push(PathParam::query(key, val)),
            }
        }
    }

    Ok(query)
}

/// One page of a list response.
///
/// Items come from the `data` (or `items`) field; a bare JSON array is also
/// accepted. Every other top-level field is kept as opaque continuation data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResponse<T> {
    data: Vec<T>,
    #[serde(flatten)]
    continuation: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum QueryWire<T> {
    Bare(Vec<T>),
    Page {
        #[serde(default = "Vec::new", alias = "items")]
        data: Vec<T>,
        #[serde(flatten)]
        continuation: Map<String, Value>,
    },
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for QueryResponse<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match QueryWire::deserialize(deserializer)? {
            QueryWire::Bare(data) => Self::new(data, Map::new()),
            QueryWire::Page { data, continuation } => Self::new(data, continuation),
        })
    }
}

impl<T> QueryResponse<T> {
    /// Creates a page from items and continuation data.
    #[must_use]
    pub const fn new(data: Vec<T>, continuation: Map<String, Value>) -> Self {
        Self { data, continuation }
    }

    /// The continuation data.
    #[must_use]
    pub const fn continuation(&self) -> &Map<String, Value> {
        &self.continuation
    }

    /// Returns `has_more` when the provider sends it.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.continuation
            .get("has_more")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// The first object id of a cursor page.
    #[must_use]
    pub fn first_id(&self) -> Option<&str> {
        self.read_str(&["first_id"])
    }

    /// The last object id of a cursor page.
    #[must_use]
    pub fn last_id(&self) -> Option<&str> {
        self.read_str(&["last_id"])
    }

    /// The token for the next page of a token page.
    #[must_use]
    pub fn next_page_token(&self) -> Option<&str> {
        self.read_str(&["next_page_token", "nextPageToken"])
    }

    /// Consumes the page and returns the items.
    #[must_use]
    pub fn into_inner(self) -> Vec<T> {
        self.data
    }

    fn read_str(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .find_map(|key| self.continuation.get(*key))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

impl<T> Default for QueryResponse<T> {
    fn default() -> Self {
        Self::new(Vec::new(), Map::new())
    }
}

impl<T> Deref for QueryResponse<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl<T> IntoIterator for QueryResponse<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a QueryResponse<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Model {
        id: String,
    }

    #[test]
    fn test_token_query_skips_unset_fields() {
        let params = TokenQuery::new().to_path_params().unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn test_token_query_wire_names() {
        let params = TokenQuery::new()
            .size(10)
            .page_token("abc")
            .to_path_params()
            .unwrap();
        assert_eq!(
            params,
            vec![
                PathParam::query("pageSize", 10),
                PathParam::query("pageToken", "abc"),
            ]
        );
    }

    #[test]
    fn test_include_archived_only_sent_when_true() {
        let off = CursorQuery::new().to_path_params().unwrap();
        assert!(off.is_empty());

        let on = CursorQuery::new().include_archived(true).to_path_params().unwrap();
        assert_eq!(on, vec![PathParam::query("include_archived", true)]);
    }

    #[test]
    fn test_cursor_query_accessors() {
        let query = CursorQuery::new().size(5).before("msg_1");
        assert_eq!(query.page_size(), Some(5));
        assert!(!query.archived());
        assert_eq!(query.before.as_deref(), Some("msg_1"));
    }

    #[test]
    fn test_builders_and_accessors_coexist_on_concrete_types() {
        fn generic_size<Q: Query>(query: &Q) -> Option<u32> {
            query.page_size()
        }

        let token = TokenQuery::new().size(50).include_archived(true);
        assert_eq!(token.page_size(), Some(50));
        assert!(token.archived());
        assert_eq!(generic_size(&CursorQuery::new().size(7)), Some(7));
    }

    #[test]
    fn test_serialize_to_query_handles_arrays_and_objects() {
        #[derive(Serialize)]
        struct Filter {
            ids: Vec<u32>,
            empty: Vec<String>,
            meta: serde_json::Value,
        }

        let params = serialize_to_query(&Filter {
            ids: vec![1, 2, 3],
            empty: vec![],
            meta: json!({"a": 1}),
        })
        .unwrap();

        assert!(params.contains(&PathParam::query("ids", "1,2,3")));
        assert!(params.contains(&PathParam::query("meta", r#"{"a":1}"#)));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_query_response_reads_data_and_continuation() {
        let page: QueryResponse<Model> = serde_json::from_value(json!({
            "object": "list",
            "data": [{"id": "gpt-4"}, {"id": "gpt-4o"}],
            "first_id": "gpt-4",
            "last_id": "gpt-4o",
            "has_more": false
        }))
        .unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page[1].id, "gpt-4o");
        assert_eq!(page.first_id(), Some("gpt-4"));
        assert!(!page.has_more());
        assert_eq!(page.continuation().get("object"), Some(&json!("list")));
        assert!(page.continuation().get("data").is_none());
    }

    #[test]
    fn test_query_response_accepts_items_alias_and_page_token() {
        let page: QueryResponse<Model> = serde_json::from_value(json!({
            "items": [{"id": "voice-1"}],
            "nextPageToken": "tok"
        }))
        .unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(page.next_page_token(), Some("tok"));
    }

    #[test]
    fn test_query_response_accepts_bare_array() {
        let page: QueryResponse<Model> = serde_json::from_value(json!([{"id": "a"}])).unwrap();
        assert_eq!(page.into_inner(), vec![Model { id: "a".to_string() }]);
    }

    #[test]
    fn test_query_response_without_items_is_empty() {
        let page: QueryResponse<Model> =
            serde_json::from_value(json!({"models": [], "nextPageToken": ""})).unwrap();
        assert!(page.is_empty());
        assert!(page.next_page_token().is_none());
    }

    #[test]
    fn test_query_response_iterates() {
        let page = QueryResponse::new(vec![1, 2, 3], Map::new());
        let sum: i32 = (&page).into_iter().sum();
        assert_eq!(sum, 6);
        assert_eq!(page.into_iter().count(), 3);
    }
}
