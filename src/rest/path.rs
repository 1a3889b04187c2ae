//! Route building from endpoint templates.
//!
//! An endpoint template is a relative path that may contain placeholders:
//!
//! - `{ver}`: replaced by the first [`PathParam::Version`]
//! - `{0}`, `{1}`, ...: replaced by [`PathParam::Id`] values in order,
//!   percent-encoded so an id always stays a single path segment
//!
//! [`PathParam::Method`] appends a `:method` suffix to the path, and every
//! [`PathParam::Query`] becomes a url-encoded query-string entry. Order of
//! the parameter list is significant for positional placeholders and for the
//! query string.
//!
//! # Example
//!
//! ```rust
//! use crud_client::rest::{build_route, PathParam};
//!
//! let params = vec![
//!     PathParam::version("v1beta"),
//!     PathParam::id("gemini-pro"),
//!     PathParam::method("generateContent"),
//!     PathParam::query("key", "AIza"),
//! ];
//!
//! let route = build_route("{ver}/models/{0}", &params).unwrap();
//! assert_eq!(route, "v1beta/models/gemini-pro:generateContent?key=AIza");
//! ```

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::config::BaseUrl;
use crate::rest::errors::RouteError;

/// Version placeholder in endpoint templates.
pub const VERSION_PLACEHOLDER: &str = "{ver}";

/// A directive consumed when turning an endpoint template into a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathParam {
    /// A positional resource id for `{n}`.
    Id(String),
    /// A query-string entry.
    Query {
        /// Query key.
        key: String,
        /// Query value, url-encoded when the route is built.
        value: String,
    },
    /// The API version for `{ver}`.
    Version(String),
    /// A `:method` suffix, e.g. `:generateContent`.
    Method(String),
}

impl PathParam {
    /// Creates an id parameter.
    #[must_use]
    pub fn id(value: impl Display) -> Self {
        Self::Id(value.to_string())
    }

    /// Creates a query parameter.
    #[must_use]
    pub fn query(key: impl Into<String>, value: impl Display) -> Self {
        Self::Query {
            key: key.into(),
            value: value.to_string(),
        }
    }

    /// Creates a version parameter.
    #[must_use]
    pub fn version(value: impl Into<String>) -> Self {
        Self::Version(value.into())
    }

    /// Creates a method-suffix parameter.
    #[must_use]
    pub fn method(value: impl Into<String>) -> Self {
        Self::Method(value.into())
    }

    /// Returns `true` for [`PathParam::Version`].
    #[must_use]
    pub const fn is_version(&self) -> bool {
        matches!(self, Self::Version(_))
    }
}

impl Display for PathParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(value) => write!(f, "id({value})"),
            Self::Query { key, value } => write!(f, "query({key}={value})"),
            Self::Version(value) => write!(f, "version({value})"),
            Self::Method(value) => write!(f, "method({value})"),
        }
    }
}

/// Builds a relative route from `template` and `params`.
///
/// # Errors
///
/// Returns [`RouteError::UnresolvedPlaceholder`] if `{ver}` or a positional
/// `{n}` placeholder has no matching parameter.
///
/// # Example
///
/// ```rust
/// use crud_client::rest::{build_route, PathParam};
///
/// let route = build_route(
///     "{ver}/models/{0}",
///     &[PathParam::version("v1"), PathParam::id("gpt-4")],
/// )
/// .unwrap();
/// assert_eq!(route, "v1/models/gpt-4");
/// ```
pub fn build_route(template: &str, params: &[PathParam]) -> Result<String, RouteError> {
    let ids: Vec<&str> = params
        .iter()
        .filter_map(|p| match p {
            PathParam::Id(v) => Some(v.as_str()),
            _ => None,
        })
        .collect();

    // Single pass over the template so substituted values are never rescanned.
    let mut route = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        route.push_str(&rest[..open]);
        let tail = &rest[open..];
        let Some(close) = tail.find('}') else {
            route.push_str(tail);
            rest = "";
            break;
        };
        let placeholder = &tail[..=close];
        let inner = &placeholder[1..placeholder.len() - 1];
        if placeholder == VERSION_PLACEHOLDER {
            let version = params
                .iter()
                .find_map(|p| match p {
                    PathParam::Version(v) => Some(v.as_str()),
                    _ => None,
                })
                .ok_or_else(|| unresolved(template, VERSION_PLACEHOLDER))?;
            route.push_str(version);
        } else if !inner.is_empty() && inner.bytes().all(|b| b.is_ascii_digit()) {
            let id = inner
                .parse::<usize>()
                .ok()
                .and_then(|index| ids.get(index))
                .ok_or_else(|| unresolved(template, placeholder))?;
            route.push_str(&urlencoding::encode(id));
        } else {
            route.push_str(placeholder);
        }
        rest = &tail[close + 1..];
    }
    route.push_str(rest);

    if let Some(method) = params.iter().rev().find_map(|p| match p {
        PathParam::Method(m) => Some(m.as_str()),
        _ => None,
    }) {
        route.push(':');
        route.push_str(method.trim_start_matches(':'));
    }

    let query: Vec<String> = params
        .iter()
        .filter_map(|p| match p {
            PathParam::Query { key, value } => Some(format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )),
            _ => None,
        })
        .collect();

    if !query.is_empty() {
        route.push(if route.contains('?') { '&' } else { '?' });
        route.push_str(&query.join("&"));
    }

    Ok(route)
}

/// Builds absolute URLs for a provider's base URL.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteBuilder;

impl RouteBuilder {
    /// Builds the route for `template` and joins it onto `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError`] if the template cannot be resolved.
    ///
    /// # Example
    ///
    /// ```rust
    /// use crud_client::config::BaseUrl;
    /// use crud_client::rest::{PathParam, RouteBuilder};
    ///
    /// let base = BaseUrl::new("https://api.openai.com/v1/").unwrap();
    /// let url = RouteBuilder::build(&base, "models/{0}", &[PathParam::id("gpt-4")]).unwrap();
    /// assert_eq!(url, "https://api.openai.com/v1/models/gpt-4");
    /// ```
    pub fn build(
        base_url: &BaseUrl,
        template: &str,
        params: &[PathParam],
    ) -> Result<String, RouteError> {
        build_route(template, params).map(|route| base_url.join(&route))
    }
}

fn unresolved(template: &str, placeholder: &str) -> RouteError {
    RouteError::UnresolvedPlaceholder {
        template: template.to_string(),
        placeholder: placeholder.to_string(),
    }
}

// Verify types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PathParam>();
    assert_send_sync::<RouteBuilder>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_and_id_substitution() {
        let route = build_route(
            "{ver}/models/{0}",
            &[PathParam::version("v1"), PathParam::id("gpt-4")],
        )
        .unwrap();
        assert_eq!(route, "v1/models/gpt-4");
    }

    #[test]
    fn test_path_template_interpolation_multiple_ids() {
        let route = build_route(
            "threads/{0}/messages/{1}",
            &[PathParam::id("thread_1"), PathParam::id("msg_2")],
        )
        .unwrap();
        assert_eq!(route, "threads/thread_1/messages/msg_2");
    }

    #[test]
    fn test_ids_are_positional_regardless_of_other_params() {
        let route = build_route(
            "threads/{0}/runs/{1}",
            &[
                PathParam::id("thread_1"),
                PathParam::query("limit", 10),
                PathParam::id("run_2"),
            ],
        )
        .unwrap();
        assert_eq!(route, "threads/thread_1/runs/run_2?limit=10");
    }

    #[test]
    fn test_handles_numeric_ids() {
        let route = build_route("fine_tuning/jobs/{0}", &[PathParam::id(123u64)]).unwrap();
        assert_eq!(route, "fine_tuning/jobs/123");
    }

    #[test]
    fn test_missing_id_is_an_error() {
        let result = build_route("models/{0}", &[]);
        assert_eq!(
            result,
            Err(RouteError::UnresolvedPlaceholder {
                template: "models/{0}".to_string(),
                placeholder: "{0}".to_string(),
            })
        );
    }

    #[test]
    fn test_missing_version_is_an_error() {
        let result = build_route("{ver}/models", &[PathParam::id("x")]);
        assert!(matches!(
            result,
            Err(RouteError::UnresolvedPlaceholder { placeholder, .. }) if placeholder == "{ver}"
        ));
    }

    #[test]
    fn test_version_without_placeholder_is_ignored() {
        let route = build_route("models", &[PathParam::version("v1")]).unwrap();
        assert_eq!(route, "models");
    }

    #[test]
    fn test_non_positional_braces_are_left_alone() {
        let route = build_route("voices/{voice_id}", &[]).unwrap();
        assert_eq!(route, "voices/{voice_id}");
    }

    #[test]
    fn test_ids_are_encoded_as_single_segments() {
        let route = build_route(
            "files/{0}/content",
            &[PathParam::id("a/b?purpose=x#frag"), PathParam::query("key", "k")],
        )
        .unwrap();
        assert_eq!(route, "files/a%2Fb%3Fpurpose%3Dx%23frag/content?key=k");
    }

    #[test]
    fn test_id_values_are_not_rescanned_for_placeholders() {
        let route = build_route(
            "threads/{0}/messages/{1}",
            &[PathParam::id("{1}"), PathParam::id("msg_2")],
        )
        .unwrap();
        assert_eq!(route, "threads/%7B1%7D/messages/msg_2");
    }

    #[test]
    fn test_unclosed_brace_is_kept() {
        let route = build_route("models/{0}/{x", &[PathParam::id("m")]).unwrap();
        assert_eq!(route, "models/m/{x");
    }

    #[test]
    fn test_method_suffix() {
        let route = build_route(
            "models/{0}",
            &[PathParam::id("gemini-pro"), PathParam::method("countTokens")],
        )
        .unwrap();
        assert_eq!(route, "models/gemini-pro:countTokens");
    }

    #[test]
    fn test_query_values_are_url_encoded() {
        let route = build_route(
            "files",
            &[
                PathParam::query("purpose", "fine tune"),
                PathParam::query("updateMask", "display_name,description"),
            ],
        )
        .unwrap();
        assert_eq!(
            route,
            "files?purpose=fine%20tune&updateMask=display_name%2Cdescription"
        );
    }

    #[test]
    fn test_query_appends_to_existing_query_string() {
        let route = build_route("models?alt=json", &[PathParam::query("key", "k")]).unwrap();
        assert_eq!(route, "models?alt=json&key=k");
    }

    #[test]
    fn test_route_builder_joins_base_url() {
        let base = BaseUrl::new("https://generativelanguage.googleapis.com").unwrap();
        let url = RouteBuilder::build(
            &base,
            "{ver}/models/{0}",
            &[PathParam::version("v1beta"), PathParam::id("gemini-pro")],
        )
        .unwrap();
        assert_eq!(
            url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro"
        );
    }

    #[test]
    fn test_path_param_display() {
        assert_eq!(PathParam::id("a").to_string(), "id(a)");
        assert_eq!(PathParam::query("k", "v").to_string(), "query(k=v)");
        assert_eq!(PathParam::version("v1").to_string(), "version(v1)");
        assert_eq!(PathParam::method("m").to_string(), "method(m)");
    }
}
