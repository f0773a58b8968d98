//! The mock server: routing-table ownership, lifecycle and dispatch glue.
//!
//! Each [`MockServer`] owns its own routing table, so multiple independent
//! instances can run in one process on different ports for test isolation.
//! The listener's accept loop runs on a spawned tokio task, concurrently with
//! the test that configured it.

use std::collections::HashSet;
use std::io;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::endpoint::EndpointStub;
use crate::error::{Result, StubError};
use crate::request::StubRequest;
use crate::routing::{HttpMethod, ResponseFn, RouteKey, RoutingTable};

/// Candidate ports are drawn from this range when no preferred port is given.
const PORT_RANGE: std::ops::Range<u16> = 8080..10000;

const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// The accept loop starts asynchronously on the spawned task, so a brief
/// pause after a successful bind keeps the server from racing its first
/// request.
const SETTLE_DELAY: Duration = Duration::from_millis(50);

type SharedTable = Arc<RwLock<RoutingTable>>;

/// Startup parameters for [`MockServer::start_with`].
#[derive(Debug, Clone)]
pub struct StartConfig {
    /// First candidate port; a random one from the ephemeral range if unset.
    pub preferred_port: Option<u16>,
    /// Bind-attempt budget before startup is declared exhausted.
    pub max_attempts: u32,
}

impl Default for StartConfig {
    fn default() -> Self {
        Self {
            preferred_port: None,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

struct Bound {
    port: u16,
    handle: JoinHandle<()>,
}

/// An embeddable HTTP mock server for test suites.
///
/// Stubs are registered as (method, path pattern) pairs mapped to response
/// functions, either directly via [`register`](Self::register) or through a
/// typed [`EndpointStub`] via [`mount`](Self::mount). Registration works
/// before and while the server is running; routes survive a stop/start
/// cycle.
///
/// # Example
///
/// ```no_run
/// use stubnet::{respond_with, HttpMethod, MockServer, StubResponse};
///
/// # async fn example() -> stubnet::Result<()> {
/// let mut server = MockServer::new();
/// server.register(
///     HttpMethod::Get,
///     "categories/1",
///     respond_with(|_| StubResponse::ok().json(serde_json::json!({"id": 1}))),
/// );
/// let port = server.start().await?;
/// let url = format!("{}/categories/1", server.base_url());
/// // ... point the system under test at `url` ...
/// server.stop().await;
/// # Ok(())
/// # }
/// ```
pub struct MockServer {
    table: SharedTable,
    bound: Option<Bound>,
}

impl MockServer {
    /// Create an unbound server with an empty routing table.
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(RoutingTable::new())),
            bound: None,
        }
    }

    /// Start on a random free port from the ephemeral range.
    ///
    /// Equivalent to [`start_with`](Self::start_with) with default
    /// [`StartConfig`]. Returns the bound port.
    pub async fn start(&mut self) -> Result<u16> {
        self.start_with(StartConfig::default()).await
    }

    /// Start the server, retrying on port conflicts.
    ///
    /// Each "address already in use" failure consumes one attempt and retries
    /// on a newly drawn candidate port, never one that already failed. Any
    /// other bind failure is surfaced immediately as [`StubError::Bind`].
    /// Exhausting the budget yields [`StubError::StartupExhausted`], which a
    /// test run cannot recover from.
    ///
    /// Starting an already-running server is a no-op returning the bound
    /// port.
    #[tracing::instrument(skip(self))]
    pub async fn start_with(&mut self, config: StartConfig) -> Result<u16> {
        if let Some(bound) = &self.bound {
            return Ok(bound.port);
        }

        let mut conflicted = HashSet::new();
        let mut candidate = config.preferred_port.unwrap_or_else(random_candidate);
        let mut remaining = config.max_attempts;

        while remaining > 0 {
            remaining -= 1;
            match TcpListener::bind(("127.0.0.1", candidate)).await {
                Ok(listener) => {
                    let handle = self.serve(listener);
                    // Let the accept loop spin up before the caller fires
                    // its first request.
                    tokio::time::sleep(SETTLE_DELAY).await;
                    self.bound = Some(Bound {
                        port: candidate,
                        handle,
                    });
                    tracing::info!(port = candidate, "mock server started");
                    return Ok(candidate);
                }
                Err(error) if error.kind() == io::ErrorKind::AddrInUse => {
                    tracing::warn!(
                        port = candidate,
                        remaining,
                        "port already in use, retrying on a new candidate"
                    );
                    conflicted.insert(candidate);
                    candidate = next_candidate(&conflicted);
                }
                Err(source) => {
                    tracing::error!(port = candidate, %source, "mock server bind failed");
                    return Err(StubError::Bind {
                        port: candidate,
                        source,
                    });
                }
            }
        }

        tracing::error!(
            attempts = config.max_attempts,
            "unable to start mock server"
        );
        Err(StubError::StartupExhausted {
            attempts: config.max_attempts,
        })
    }

    /// Stop the server.
    ///
    /// Aborts the serve task; in-flight requests may be cut short. Idempotent:
    /// stopping an already-stopped server is a no-op. The instance can be
    /// started again afterwards (possibly on a different port), keeping its
    /// registered routes.
    pub async fn stop(&mut self) {
        if let Some(bound) = self.bound.take() {
            bound.handle.abort();
            let _ = bound.handle.await;
            tracing::info!(port = bound.port, "mock server stopped");
        }
    }

    /// Insert or overwrite the stub for (method, path pattern).
    ///
    /// Registering the same pair twice keeps only the second function. Path
    /// patterns support single-segment wildcards (`*`); exact matches win
    /// over wildcard matches at dispatch time.
    pub fn register(&self, method: HttpMethod, path: &str, response: ResponseFn) {
        tracing::debug!(%method, path, "registering stub");
        let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
        table.insert(RouteKey::new(method, path), response);
    }

    /// Register a typed endpoint declaration.
    ///
    /// Extracts method and path from the stub and resolves its response kind
    /// to the concrete function, then delegates to
    /// [`register`](Self::register).
    pub fn mount<E: EndpointStub>(&self, endpoint: &E) {
        self.register(endpoint.method(), endpoint.path(), endpoint.response());
    }

    /// Base URL of the running server, `http://localhost:<port>`.
    ///
    /// # Panics
    ///
    /// Panics if the server has not been started; requesting the URL of an
    /// unbound server is a programmer error.
    pub fn base_url(&self) -> String {
        let port = self
            .port()
            .expect("mock server is not running; call start() first");
        format!("http://localhost:{port}")
    }

    /// The bound port, if running.
    pub fn port(&self) -> Option<u16> {
        self.bound.as_ref().map(|bound| bound.port)
    }

    pub fn is_running(&self) -> bool {
        self.bound.is_some()
    }

    fn serve(&self, listener: TcpListener) -> JoinHandle<()> {
        let app = Router::new()
            .fallback(dispatch)
            .with_state(Arc::clone(&self.table));
        tokio::spawn(async move {
            if let Err(error) = axum::serve(listener, app).await {
                tracing::error!(%error, "mock server terminated");
            }
        })
    }
}

impl Default for MockServer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(bound) = self.bound.take() {
            bound.handle.abort();
        }
    }
}

fn random_candidate() -> u16 {
    fastrand::u16(PORT_RANGE)
}

fn next_candidate(conflicted: &HashSet<u16>) -> u16 {
    loop {
        let candidate = random_candidate();
        if !conflicted.contains(&candidate) {
            return candidate;
        }
    }
}

/// Fallback handler wired into the listener: resolves the request against a
/// consistent snapshot of the routing table and invokes the matched function.
/// Unmatched requests get the listener's plain 404.
async fn dispatch(State(table): State<SharedTable>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let Some(method) = HttpMethod::from_http(&parts.method) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let path = urlencoding::decode(parts.uri.path())
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| parts.uri.path().to_string());

    let response_fn = {
        let table = table.read().unwrap_or_else(PoisonError::into_inner);
        table.lookup(method, &path)
    };
    let Some(response_fn) = response_fn else {
        tracing::debug!(%method, path, "no stub registered");
        return StatusCode::NOT_FOUND.into_response();
    };

    let body = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes.to_vec(),
        Err(error) => {
            tracing::error!(%error, "failed to buffer request body");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };

    let stub_request =
        StubRequest::from_parts(method, path, parts.uri.query(), &parts.headers, body);
    response_fn(&stub_request).into_axum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::StubResponse;
    use crate::routing::respond_with;

    #[tokio::test]
    async fn test_start_assigns_port_in_range() {
        let mut server = MockServer::new();
        let port = server.start().await.expect("server starts");

        assert!(PORT_RANGE.contains(&port));
        assert_eq!(server.port(), Some(port));
        assert!(server.is_running());
        assert_eq!(server.base_url(), format!("http://localhost:{port}"));

        server.stop().await;
    }

    #[tokio::test]
    async fn test_start_while_running_is_a_no_op() {
        let mut server = MockServer::new();
        let first = server.start().await.expect("server starts");
        let second = server.start().await.expect("second start");

        assert_eq!(first, second);
        server.stop().await;
    }

    #[tokio::test]
    async fn test_stop_is_idempotent_and_server_restartable() {
        let mut server = MockServer::new();
        server.register(
            HttpMethod::Get,
            "health",
            respond_with(|_| StubResponse::ok()),
        );

        server.start().await.expect("first start");
        server.stop().await;
        server.stop().await;
        assert!(!server.is_running());
        assert_eq!(server.port(), None);

        // Routes survive the stop/start cycle.
        server.start().await.expect("restart");
        assert!(server.is_running());
        server.stop().await;
    }

    #[tokio::test]
    async fn test_exhausted_budget_is_fatal() {
        let mut occupier = MockServer::new();
        let taken = occupier.start().await.expect("occupier starts");

        let mut server = MockServer::new();
        let result = server
            .start_with(StartConfig {
                preferred_port: Some(taken),
                max_attempts: 1,
            })
            .await;

        match result {
            Err(StubError::StartupExhausted { attempts }) => assert_eq!(attempts, 1),
            other => panic!("expected StartupExhausted, got {other:?}"),
        }
        assert!(!server.is_running());

        occupier.stop().await;
    }

    #[tokio::test]
    async fn test_conflicted_port_is_not_reused() {
        let mut occupier = MockServer::new();
        let taken = occupier.start().await.expect("occupier starts");

        let mut server = MockServer::new();
        let port = server
            .start_with(StartConfig {
                preferred_port: Some(taken),
                max_attempts: DEFAULT_MAX_ATTEMPTS,
            })
            .await
            .expect("retry lands on a free port");

        assert_ne!(port, taken);

        occupier.stop().await;
        server.stop().await;
    }

    #[tokio::test]
    async fn test_preferred_port_used_when_free() {
        // Draw a candidate, prove it free by binding and releasing it.
        let probe = TcpListener::bind(("127.0.0.1", 0)).await.expect("probe");
        let free_port = probe.local_addr().expect("probe addr").port();
        drop(probe);

        let mut server = MockServer::new();
        let port = server
            .start_with(StartConfig {
                preferred_port: Some(free_port),
                max_attempts: 1,
            })
            .await
            .expect("binds the preferred port");

        assert_eq!(port, free_port);
        server.stop().await;
    }

    #[test]
    #[should_panic(expected = "mock server is not running")]
    fn test_base_url_before_start_panics() {
        MockServer::new().base_url();
    }
}
