//! Routing table mapping (method, path pattern) pairs to response functions.
//!
//! Each [`crate::MockServer`] owns exactly one table. Registration writes to
//! it; the dispatch path takes a read snapshot per request, so a request is
//! never served from a partially updated mapping.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::request::StubRequest;
use crate::response::StubResponse;

/// A response-producing function: maps an incoming request to a canned
/// response. May read fixture data; must not touch the routing table.
pub type ResponseFn = Arc<dyn Fn(&StubRequest) -> StubResponse + Send + Sync + 'static>;

/// Wrap a closure as a [`ResponseFn`].
///
/// # Example
///
/// ```
/// use stubnet::{respond_with, HttpMethod, StubRequest, StubResponse};
///
/// let ok = respond_with(|_req| StubResponse::ok());
/// let response = ok(&StubRequest::new(HttpMethod::Get, "/health"));
/// assert_eq!(response.status(), 200);
/// ```
pub fn respond_with<F>(f: F) -> ResponseFn
where
    F: Fn(&StubRequest) -> StubResponse + Send + Sync + 'static,
{
    Arc::new(f)
}

/// HTTP methods the mock server routes on.
///
/// Used purely as a routing key; requests with any other method fall through
/// to the not-found path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Patch,
    Head,
}

impl HttpMethod {
    /// The method's canonical uppercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
        }
    }

    pub(crate) fn from_http(method: &axum::http::Method) -> Option<Self> {
        use axum::http::Method;
        match *method {
            Method::GET => Some(HttpMethod::Get),
            Method::PUT => Some(HttpMethod::Put),
            Method::POST => Some(HttpMethod::Post),
            Method::DELETE => Some(HttpMethod::Delete),
            Method::PATCH => Some(HttpMethod::Patch),
            Method::HEAD => Some(HttpMethod::Head),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite routing key: method plus normalized path pattern.
///
/// Patterns may contain single-segment wildcards, e.g.
/// `api/orders/*/status` matches `api/orders/42/status`. Leading and
/// trailing slashes are insignificant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey {
    method: HttpMethod,
    pattern: String,
}

impl RouteKey {
    pub fn new(method: HttpMethod, pattern: &str) -> Self {
        Self {
            method,
            pattern: normalize(pattern),
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn wildcard_count(&self) -> usize {
        self.pattern.split('/').filter(|s| *s == "*").count()
    }

    fn matches(&self, method: HttpMethod, path_segments: &[&str]) -> bool {
        if self.method != method {
            return false;
        }
        let pattern_segments: Vec<&str> = self.pattern.split('/').collect();
        if pattern_segments.len() != path_segments.len() {
            return false;
        }
        pattern_segments
            .iter()
            .zip(path_segments)
            .all(|(pattern, actual)| *pattern == "*" || pattern == actual)
    }
}

fn normalize(path: &str) -> String {
    path.trim_matches('/').to_string()
}

/// The (method, pattern) → response-function mapping owned by one server.
///
/// Last registration wins: inserting an existing key silently replaces the
/// previous function.
#[derive(Default)]
pub struct RoutingTable {
    routes: HashMap<RouteKey, ResponseFn>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the mapping for `key`.
    pub fn insert(&mut self, key: RouteKey, response: ResponseFn) {
        self.routes.insert(key, response);
    }

    /// Resolve the best-matching response function for a request.
    ///
    /// Exact matches are preferred over wildcard matches; among wildcard
    /// candidates the pattern with the fewest wildcard segments wins, with a
    /// lexicographic tie-break so resolution is deterministic.
    pub fn lookup(&self, method: HttpMethod, path: &str) -> Option<ResponseFn> {
        let normalized = normalize(path);
        if let Some(response) = self.routes.get(&RouteKey::new(method, &normalized)) {
            return Some(Arc::clone(response));
        }

        let segments: Vec<&str> = normalized.split('/').collect();
        self.routes
            .iter()
            .filter(|(key, _)| key.pattern.contains('*') && key.matches(method, &segments))
            .min_by(|(a, _), (b, _)| {
                (a.wildcard_count(), a.pattern()).cmp(&(b.wildcard_count(), b.pattern()))
            })
            .map(|(_, response)| Arc::clone(response))
    }
}

impl fmt::Debug for RoutingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingTable")
            .field("routes", &self.routes.keys().collect::<Vec<_>>())
            .finish()
    }
}
