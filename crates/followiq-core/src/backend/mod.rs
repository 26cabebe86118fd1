//! Hosted backend-as-a-service boundary
//!
//! The account pages only ever need table-style CRUD on two tables and a
//! handful of session calls. [`RestBackend`] speaks the hosted service's
//! HTTP API; [`MemoryBackend`] keeps everything in process for tests and
//! offline use.

mod memory;
mod query;
mod rest;

pub use memory::MemoryBackend;
pub use query::{Order, Query, CONTACT_SUBMISSIONS, PROFILES};
pub use rest::RestBackend;

use std::sync::Arc;

use serde_json::Value;

use crate::auth::{Credentials, OAuthProvider, Session, SignUpOutcome};
use crate::config::AppConfig;
use crate::Result;

/// Table CRUD and session calls against the hosted backend
#[async_trait::async_trait]
pub trait Backend: Send + Sync {
    /// Rows of `query.table` matching the query
    async fn select(&self, query: &Query, session: Option<&Session>) -> Result<Vec<Value>>;

    /// Insert one row and return it as stored (with generated columns)
    async fn insert(&self, table: &str, row: Value, session: Option<&Session>) -> Result<Value>;

    /// Apply `patch` to every matching row, returning the updated rows
    async fn update(&self, query: &Query, patch: Value, session: Option<&Session>) -> Result<Vec<Value>>;

    /// Insert, or merge into the row whose `on_conflict` column matches
    async fn upsert(
        &self,
        table: &str,
        row: Value,
        on_conflict: &str,
        session: Option<&Session>,
    ) -> Result<Value>;

    /// Delete every matching row, returning how many were removed
    async fn delete(&self, query: &Query, session: Option<&Session>) -> Result<usize>;

    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome>;

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session>;

    async fn sign_out(&self, session: &Session) -> Result<()>;

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session>;

    /// URL the browser is sent to for an OAuth sign-in
    fn oauth_url(&self, provider: OAuthProvider, redirect_to: &str) -> Result<String>;
}

/// Build the REST backend from configuration
pub fn connect(config: &AppConfig) -> Result<Arc<dyn Backend>> {
    Ok(Arc::new(RestBackend::new(&config.backend)?))
}
