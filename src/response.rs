//! Canned HTTP responses returned by response functions.

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

const CONTENT_TYPE: &str = "content-type";

/// A mocked HTTP response: status, headers and a fully materialized body.
///
/// Bodies are either opaque bytes or a JSON-serialized value; JSON bodies get
/// a `content-type: application/json` header automatically.
///
/// # Example
///
/// ```
/// use stubnet::StubResponse;
///
/// let response = StubResponse::ok().json(serde_json::json!({"id": 1}));
/// assert_eq!(response.status(), 200);
/// ```
#[derive(Debug, Clone)]
pub struct StubResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl StubResponse {
    /// 200 with an empty body.
    pub fn ok() -> Self {
        Self::with_status(200)
    }

    /// 204 with an empty body.
    pub fn no_content() -> Self {
        Self::with_status(204)
    }

    /// 404 with an empty body.
    pub fn not_found() -> Self {
        Self::with_status(404)
    }

    /// An empty response with an arbitrary status code.
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Set an opaque byte body. No content type is implied.
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Serialize `value` as the JSON body and set the JSON content type.
    ///
    /// # Panics
    ///
    /// Panics if `value` cannot be serialized to JSON (a programmer error in
    /// the stub definition, e.g. a map with non-string keys).
    pub fn json(mut self, value: impl Serialize) -> Self {
        self.body = serde_json::to_vec(&value).expect("stub response value serializes to JSON");
        self.header(CONTENT_TYPE, "application/json")
    }

    /// Append a header pair.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Shorthand for setting the `content-type` header.
    pub fn content_type(self, value: &str) -> Self {
        self.header(CONTENT_TYPE, value)
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn body_bytes(&self) -> &[u8] {
        &self.body
    }

    pub(crate) fn into_axum(self) -> axum::response::Response {
        let mut builder = axum::http::Response::builder().status(self.status);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
            .body(Body::from(self.body))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }
}
