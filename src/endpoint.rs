//! Typed endpoint declarations and their closed sets of response variants.
//!
//! Instead of copy-pasting paths and payloads across tests, each logical
//! endpoint is declared once as a plain value implementing [`EndpointStub`],
//! and its possible responses as an enum implementing [`ResponseSet`]. A test
//! then picks a scenario by name and mounts it:
//!
//! ```
//! use stubnet::{
//!     respond_with, EndpointStub, FixtureStore, HttpMethod, ResponseFn, ResponseSet,
//!     StubResponse,
//! };
//!
//! struct OrdersGet {
//!     response: OrdersResponse,
//! }
//!
//! enum OrdersResponse {
//!     Empty,
//!     Backordered,
//! }
//!
//! impl ResponseSet for OrdersResponse {
//!     fn resolve(&self) -> ResponseFn {
//!         match self {
//!             OrdersResponse::Empty => respond_with(|_| {
//!                 StubResponse::ok().json(serde_json::json!({"orders": []}))
//!             }),
//!             OrdersResponse::Backordered => respond_with(|_| {
//!                 let fixtures = FixtureStore::new("tests/fixtures");
//!                 fixtures
//!                     .json_response("orders_backordered")
//!                     .expect("orders_backordered fixture")
//!             }),
//!         }
//!     }
//! }
//!
//! impl EndpointStub for OrdersGet {
//!     type Response = OrdersResponse;
//!
//!     fn method(&self) -> HttpMethod {
//!         HttpMethod::Get
//!     }
//!
//!     fn path(&self) -> &str {
//!         "api/orders/*/status"
//!     }
//!
//!     fn response_kind(&self) -> &Self::Response {
//!         &self.response
//!     }
//! }
//! ```
//!
//! Mounting `OrdersGet { response: OrdersResponse::Empty }` on a server stubs
//! `GET api/orders/<anything>/status` with the empty-list payload.

use crate::routing::{HttpMethod, ResponseFn};

/// A closed set of named response variants for one endpoint family.
///
/// Implemented by pattern-matching over an enum, so the set is fixed at
/// compile time: an unknown variant is unrepresentable, and every declared
/// variant must produce a function. `resolve` is pure and total; it never
/// fails and has no side effects.
pub trait ResponseSet {
    /// Resolve this variant to its response function.
    fn resolve(&self) -> ResponseFn;
}

/// A typed declaration of one stubbed endpoint: method, path pattern and the
/// chosen response variant.
///
/// Implementations are plain data values created per test scenario; they only
/// live for the duration of the [`crate::MockServer::mount`] call that
/// registers them.
pub trait EndpointStub {
    /// The response-variant set for this endpoint family.
    type Response: ResponseSet;

    /// HTTP method to match.
    fn method(&self) -> HttpMethod;

    /// Path pattern to match, e.g. `categories/1` or `api/orders/*/status`.
    fn path(&self) -> &str;

    /// The variant selected for this scenario.
    fn response_kind(&self) -> &Self::Response;

    /// The response function for the selected variant.
    ///
    /// Provided; implementations declare `response_kind` and this resolves it.
    fn response(&self) -> ResponseFn {
        self.response_kind().resolve()
    }
}
