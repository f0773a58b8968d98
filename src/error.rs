//! Error types for mock server and fixture operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while standing up a mock server or loading fixtures.
#[derive(Debug, Error)]
pub enum StubError {
    /// The port-retry budget was exhausted without a successful bind.
    ///
    /// Fatal for a test run: callers are expected to abort rather than
    /// recover.
    #[error("unable to start mock server: no free port after {attempts} bind attempts")]
    StartupExhausted {
        /// How many bind attempts were made before giving up.
        attempts: u32,
    },

    /// A bind failure other than "address already in use". Not retried.
    #[error("failed to bind mock server on port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    /// No fixture with the given name exists under the store's root.
    #[error("fixture '{name}' not found under {root}")]
    FixtureNotFound { name: String, root: PathBuf },

    /// The fixture exists but could not be read.
    #[error("failed to read fixture '{name}': {source}")]
    FixtureRead {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The fixture was read but is not valid JSON.
    #[error("fixture '{name}' is not valid JSON: {source}")]
    FixtureParse {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Result type alias for stubnet operations.
pub type Result<T> = core::result::Result<T, StubError>;
