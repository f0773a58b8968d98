//! Disk-backed fixture store used to materialize canned response bodies.
//!
//! A [`FixtureStore`] is scoped to one directory of pre-authored resources
//! (JSON by default) addressed by logical name: `store.load_raw("sample")`
//! reads `<root>/sample.json`. Loads are synchronous and re-read the file on
//! every call.
//!
//! Failures are loud. A stub that serves a fixture which turns out to be
//! missing or malformed must fail the test, not hand the system under test a
//! silently empty payload.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, StubError};
use crate::response::StubResponse;

const DEFAULT_EXTENSION: &str = "json";

/// Resolves logical fixture names to payloads within a configured root.
#[derive(Debug, Clone)]
pub struct FixtureStore {
    root: PathBuf,
}

impl FixtureStore {
    /// Create a store rooted at `root`. The directory is not required to
    /// exist until a fixture is first loaded.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read the named `.json` fixture fully into memory.
    pub fn load_raw(&self, name: &str) -> Result<Vec<u8>> {
        self.load_raw_with_ext(name, DEFAULT_EXTENSION)
    }

    /// Read a fixture with an explicit extension, e.g. `("banner", "html")`.
    pub fn load_raw_with_ext(&self, name: &str, extension: &str) -> Result<Vec<u8>> {
        let path = self
            .locate(name, extension)
            .ok_or_else(|| StubError::FixtureNotFound {
                name: name.to_string(),
                root: self.root.clone(),
            })?;
        fs::read(&path).map_err(|source| StubError::FixtureRead {
            name: name.to_string(),
            source,
        })
    }

    /// Read and parse the named `.json` fixture.
    pub fn load_json(&self, name: &str) -> Result<serde_json::Value> {
        let bytes = self.load_raw(name)?;
        serde_json::from_slice(&bytes).map_err(|source| StubError::FixtureParse {
            name: name.to_string(),
            source,
        })
    }

    /// A 200 response whose body is the fixture's raw bytes, served as JSON.
    pub fn raw_response(&self, name: &str) -> Result<StubResponse> {
        let bytes = self.load_raw(name)?;
        Ok(StubResponse::ok().body(bytes).content_type("application/json"))
    }

    /// A 200 response built from the parsed fixture, re-serialized as JSON.
    ///
    /// Unlike [`raw_response`](Self::raw_response) this validates the fixture
    /// up front, so a malformed file surfaces as [`StubError::FixtureParse`]
    /// instead of reaching the client as-is.
    pub fn json_response(&self, name: &str) -> Result<StubResponse> {
        let value = self.load_json(name)?;
        Ok(StubResponse::ok().json(value))
    }

    fn locate(&self, name: &str, extension: &str) -> Option<PathBuf> {
        let path = self.root.join(format!("{name}.{extension}"));
        path.is_file().then_some(path)
    }
}
