//! Owned view of an incoming request, handed to response functions.

use crate::routing::HttpMethod;

/// The request a [`crate::ResponseFn`] is invoked with.
///
/// Built by the dispatch path from the raw listener request: the path is
/// percent-decoded, the query string is split into pairs, and the body is
/// fully buffered. Stub authors never see the listener's own types.
#[derive(Debug, Clone)]
pub struct StubRequest {
    method: HttpMethod,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl StubRequest {
    /// Build a bare request, mostly useful for exercising response functions
    /// directly in tests.
    pub fn new(method: HttpMethod, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            query: Vec::new(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Attach a body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Attach a query pair.
    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    /// Attach a header pair.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub(crate) fn from_parts(
        method: HttpMethod,
        path: String,
        raw_query: Option<&str>,
        headers: &axum::http::HeaderMap,
        body: Vec<u8>,
    ) -> Self {
        let query = raw_query.map(parse_query).unwrap_or_default();
        let headers = headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        Self {
            method,
            path,
            query,
            headers,
            body,
        }
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// The percent-decoded request path, including the leading slash.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// All query pairs in request order.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// First query value with the given name, if any.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// All header pairs as received.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First header value with the given name (case-insensitive), if any.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The buffered request body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Parse the body as JSON.
    pub fn body_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_slice(&self.body)
    }
}

fn parse_query(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(name), decode(value))
        })
        .collect()
}

fn decode(component: &str) -> String {
    urlencoding::decode(component)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| component.to_string())
}
