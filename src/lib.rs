//! Embeddable HTTP mock server for test suites.
//!
//! `stubnet` stands up a localhost HTTP server that answers registered
//! (method, path) pairs with canned responses, so tests can point a system
//! under test at `http://localhost:<port>` instead of a real backend.
//!
//! Every stubbed request is described once as a type-safe [`EndpointStub`],
//! and its possible responses as a closed [`ResponseSet`] enum. Instead of
//! copy-pasting URIs and payloads across the project, a test picks a scenario
//! by name. Response bodies can be materialized from pre-authored JSON
//! fixtures via [`FixtureStore`].
//!
//! # Quick Start
//!
//! ```no_run
//! use stubnet::{respond_with, FixtureStore, HttpMethod, MockServer, StubResponse};
//!
//! #[tokio::main]
//! async fn main() -> stubnet::Result<()> {
//!     let fixtures = FixtureStore::new("tests/fixtures");
//!
//!     let mut server = MockServer::new();
//!     server.register(
//!         HttpMethod::Get,
//!         "api/orders/*/status",
//!         respond_with(move |_req| {
//!             fixtures
//!                 .json_response("orders_backordered")
//!                 .expect("orders_backordered fixture")
//!         }),
//!     );
//!
//!     server.start().await?;
//!     println!("stubbed backend at {}", server.base_url());
//!     server.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`MockServer`] owns one routing table and its lifecycle: start on a free
//!   port with bounded retry, stop, restart. Instances are independent, so
//!   parallel tests can each run their own server.
//! - [`EndpointStub`] + [`ResponseSet`] form the typed registration model:
//!   one plain value per logical endpoint, one enum variant per canned
//!   scenario, resolved to a [`ResponseFn`] at mount time.
//! - [`FixtureStore`] loads named JSON resources as raw bytes or parsed
//!   values, failing loudly when a fixture is missing or malformed.

mod endpoint;
mod error;
mod fixtures;
mod request;
mod response;
mod routing;
mod server;

// Re-export core types
pub use error::{Result, StubError};
pub use server::{MockServer, StartConfig};

// Re-export the registration model
pub use endpoint::{EndpointStub, ResponseSet};
pub use routing::{respond_with, HttpMethod, ResponseFn, RouteKey};

// Re-export request/response surface
pub use fixtures::FixtureStore;
pub use request::StubRequest;
pub use response::StubResponse;
