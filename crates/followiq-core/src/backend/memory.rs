use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::query::filter_literal;
use super::{Backend, Order, Query};
use crate::auth::{Credentials, OAuthProvider, Session, SignUpOutcome, User};
use crate::{Error, Result};

const SESSION_TTL_SECS: i64 = 3600;

#[derive(Serialize, Deserialize)]
struct Account {
    user: User,
    password: String,
    confirmed: bool,
}

#[derive(Default, Serialize, Deserialize)]
struct State {
    tables: HashMap<String, Vec<Value>>,
    accounts: Vec<Account>,
    /// access token -> user id
    access_tokens: HashMap<String, Uuid>,
    /// refresh token -> user id
    refresh_tokens: HashMap<String, Uuid>,
}

/// In-process backend with the same observable behavior as the hosted one
///
/// Inserted rows get an `id` and `created_at` when they lack one, mirroring
/// the column defaults of the hosted tables. A backend opened with
/// [`MemoryBackend::open`] writes its state back to a JSON file after every
/// change, so tables, accounts and issued tokens survive between runs.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
    require_confirmation: bool,
    path: Option<PathBuf>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend persisted at `path`; a missing file starts empty
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = if tokio::fs::try_exists(&path).await? {
            let content = tokio::fs::read_to_string(&path).await?;
            serde_json::from_str(&content)?
        } else {
            State::default()
        };
        tracing::debug!(path = %path.display(), "Opened offline backend");
        Ok(Self {
            state: Mutex::new(state),
            require_confirmation: false,
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write `state` back to the backing file, if any
    async fn persist(&self, state: &State) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, serde_json::to_string_pretty(state)?).await?;
        Ok(())
    }

    /// Sign-ups stay unconfirmed and return no session
    pub fn with_email_confirmation(mut self) -> Self {
        self.require_confirmation = true;
        self
    }

    fn issue_session(state: &mut State, user: &User) -> Session {
        let access_token = Uuid::new_v4().to_string();
        let refresh_token = Uuid::new_v4().to_string();
        state.access_tokens.insert(access_token.clone(), user.id);
        state.refresh_tokens.insert(refresh_token.clone(), user.id);
        Session {
            access_token,
            refresh_token,
            expires_at: Utc::now() + chrono::Duration::seconds(SESSION_TTL_SECS),
            user: user.clone(),
        }
    }

    fn check_session(state: &State, session: Option<&Session>) -> Result<()> {
        match session {
            Some(s) if !state.access_tokens.contains_key(&s.access_token) => Err(Error::Backend {
                status: 401,
                message: "invalid JWT".to_string(),
            }),
            _ => Ok(()),
        }
    }
}

fn with_defaults(row: Value) -> Result<Value> {
    let mut object = match row {
        Value::Object(map) => map,
        _ => return Err(Error::Validation("row must be a JSON object".to_string())),
    };
    object
        .entry("id")
        .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
    object
        .entry("created_at")
        .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
    Ok(Value::Object(object))
}

fn merge(target: &mut Value, patch: &Map<String, Value>) {
    if let Value::Object(existing) = target {
        for (key, value) in patch {
            existing.insert(key.clone(), value.clone());
        }
    }
}

fn sort_rows(rows: &mut [Value], column: &str, order: Order) {
    rows.sort_by(|a, b| {
        let a = a.get(column).map(filter_literal).unwrap_or_default();
        let b = b.get(column).map(filter_literal).unwrap_or_default();
        match order {
            Order::Asc => a.cmp(&b),
            Order::Desc => b.cmp(&a),
        }
    });
}

#[async_trait::async_trait]
impl Backend for MemoryBackend {
    async fn select(&self, query: &Query, session: Option<&Session>) -> Result<Vec<Value>> {
        let state = self.state.lock().await;
        Self::check_session(&state, session)?;

        let mut rows: Vec<Value> = state
            .tables
            .get(&query.table)
            .map(|rows| rows.iter().filter(|r| query.matches(r)).cloned().collect())
            .unwrap_or_default();

        if let Some((column, order)) = &query.order {
            sort_rows(&mut rows, column, *order);
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(&self, table: &str, row: Value, session: Option<&Session>) -> Result<Value> {
        let mut state = self.state.lock().await;
        Self::check_session(&state, session)?;

        let row = with_defaults(row)?;
        state.tables.entry(table.to_string()).or_default().push(row.clone());
        self.persist(&state).await?;
        Ok(row)
    }

    async fn update(&self, query: &Query, patch: Value, session: Option<&Session>) -> Result<Vec<Value>> {
        let mut state = self.state.lock().await;
        Self::check_session(&state, session)?;

        let patch = match patch {
            Value::Object(map) => map,
            _ => return Err(Error::Validation("patch must be a JSON object".to_string())),
        };

        let mut updated = Vec::new();
        if let Some(rows) = state.tables.get_mut(&query.table) {
            for row in rows.iter_mut().filter(|r| query.matches(r)) {
                merge(row, &patch);
                updated.push(row.clone());
            }
        }
        if !updated.is_empty() {
            self.persist(&state).await?;
        }
        Ok(updated)
    }

    async fn upsert(
        &self,
        table: &str,
        row: Value,
        on_conflict: &str,
        session: Option<&Session>,
    ) -> Result<Value> {
        let mut state = self.state.lock().await;
        Self::check_session(&state, session)?;

        let key = row
            .get(on_conflict)
            .cloned()
            .ok_or_else(|| Error::Validation(format!("upsert row is missing '{}'", on_conflict)))?;
        let patch = match &row {
            Value::Object(map) => map.clone(),
            _ => return Err(Error::Validation("row must be a JSON object".to_string())),
        };

        let rows = state.tables.entry(table.to_string()).or_default();
        let lookup = Query::table(table).eq(on_conflict, key);
        let saved = match rows.iter_mut().find(|r| lookup.matches(r)) {
            Some(existing) => {
                merge(existing, &patch);
                existing.clone()
            }
            None => {
                let row = with_defaults(row)?;
                rows.push(row.clone());
                row
            }
        };
        self.persist(&state).await?;
        Ok(saved)
    }

    async fn delete(&self, query: &Query, session: Option<&Session>) -> Result<usize> {
        let mut state = self.state.lock().await;
        Self::check_session(&state, session)?;

        let Some(rows) = state.tables.get_mut(&query.table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|r| !query.matches(r));
        let removed = before - rows.len();
        if removed > 0 {
            self.persist(&state).await?;
        }
        Ok(removed)
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome> {
        let mut state = self.state.lock().await;
        if state
            .accounts
            .iter()
            .any(|a| a.user.email.eq_ignore_ascii_case(&credentials.email))
        {
            return Err(Error::Backend {
                status: 422,
                message: "User already registered".to_string(),
            });
        }

        let user = User {
            id: Uuid::new_v4(),
            email: credentials.email.clone(),
        };
        state.accounts.push(Account {
            user: user.clone(),
            password: credentials.password.clone(),
            confirmed: !self.require_confirmation,
        });

        let outcome = if self.require_confirmation {
            SignUpOutcome::ConfirmationRequired { email: user.email }
        } else {
            SignUpOutcome::SignedIn(Self::issue_session(&mut state, &user))
        };
        self.persist(&state).await?;
        Ok(outcome)
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session> {
        let mut state = self.state.lock().await;
        let account = state
            .accounts
            .iter()
            .find(|a| {
                a.user.email.eq_ignore_ascii_case(&credentials.email)
                    && a.password == credentials.password
            })
            .ok_or_else(|| Error::Backend {
                status: 400,
                message: "Invalid login credentials".to_string(),
            })?;

        if !account.confirmed {
            return Err(Error::Backend {
                status: 400,
                message: "Email not confirmed".to_string(),
            });
        }

        let user = account.user.clone();
        let session = Self::issue_session(&mut state, &user);
        self.persist(&state).await?;
        Ok(session)
    }

    async fn sign_out(&self, session: &Session) -> Result<()> {
        let mut state = self.state.lock().await;
        Self::check_session(&state, Some(session))?;
        state.access_tokens.remove(&session.access_token);
        state.refresh_tokens.remove(&session.refresh_token);
        self.persist(&state).await
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session> {
        let mut state = self.state.lock().await;
        let user_id = state.refresh_tokens.remove(refresh_token).ok_or_else(|| Error::Backend {
            status: 400,
            message: "Invalid Refresh Token".to_string(),
        })?;
        let user = state
            .accounts
            .iter()
            .find(|a| a.user.id == user_id)
            .map(|a| a.user.clone())
            .ok_or_else(|| Error::NotFound(format!("user {}", user_id)))?;
        let session = Self::issue_session(&mut state, &user);
        self.persist(&state).await?;
        Ok(session)
    }

    fn oauth_url(&self, provider: OAuthProvider, redirect_to: &str) -> Result<String> {
        let mut url = url::Url::parse("memory://auth/authorize")?;
        url.query_pairs_mut()
            .append_pair("provider", provider.as_str())
            .append_pair("redirect_to", redirect_to);
        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_insert_fills_defaults_and_select_orders() {
        let backend = MemoryBackend::new();
        backend
            .insert("t", json!({"name": "b", "created_at": "2024-01-02T00:00:00Z"}), None)
            .await
            .unwrap();
        let inserted = backend
            .insert("t", json!({"name": "a", "created_at": "2024-01-01T00:00:00Z"}), None)
            .await
            .unwrap();
        assert!(inserted.get("id").is_some());

        let rows = backend
            .select(&Query::table("t").order("created_at", Order::Asc), None)
            .await
            .unwrap();
        assert_eq!(rows[0]["name"], "a");
        assert_eq!(rows[1]["name"], "b");

        let limited = backend.select(&Query::table("t").limit(1), None).await.unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_merges_on_conflict_column() {
        let backend = MemoryBackend::new();
        backend
            .upsert("p", json!({"user_id": "u1", "phone": "1"}), "user_id", None)
            .await
            .unwrap();
        let merged = backend
            .upsert("p", json!({"user_id": "u1", "job_role": "CTO"}), "user_id", None)
            .await
            .unwrap();
        assert_eq!(merged["phone"], "1");
        assert_eq!(merged["job_role"], "CTO");
        assert_eq!(backend.select(&Query::table("p"), None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_revoked_session_is_rejected() {
        let backend = MemoryBackend::new();
        let credentials = Credentials::new("u@example.com", "secret1");
        let SignUpOutcome::SignedIn(session) = backend.sign_up(&credentials).await.unwrap() else {
            panic!("expected a session");
        };

        backend.select(&Query::table("t"), Some(&session)).await.unwrap();
        backend.sign_out(&session).await.unwrap();

        let err = backend.select(&Query::table("t"), Some(&session)).await.unwrap_err();
        assert!(err.is_auth_expired());
    }

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let path = std::env::temp_dir()
            .join(format!("followiq-test-{}", Uuid::new_v4()))
            .join("offline.json");
        let credentials = Credentials::new("u@example.com", "secret1");

        let first = MemoryBackend::open(&path).await.unwrap();
        let SignUpOutcome::SignedIn(session) = first.sign_up(&credentials).await.unwrap() else {
            panic!("expected a session");
        };
        first.insert("t", json!({"name": "kept"}), Some(&session)).await.unwrap();
        drop(first);

        let second = MemoryBackend::open(&path).await.unwrap();
        let rows = second.select(&Query::table("t"), Some(&session)).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], "kept");
        assert!(second.sign_in(&credentials).await.is_ok());

        second.sign_out(&session).await.unwrap();
        let third = MemoryBackend::open(&path).await.unwrap();
        let err = third.select(&Query::table("t"), Some(&session)).await.unwrap_err();
        assert!(err.is_auth_expired());
    }

    #[tokio::test]
    async fn test_unconfirmed_account_cannot_sign_in() {
        let backend = MemoryBackend::new().with_email_confirmation();
        let credentials = Credentials::new("u@example.com", "secret1");
        let outcome = backend.sign_up(&credentials).await.unwrap();
        assert!(matches!(outcome, SignUpOutcome::ConfirmationRequired { .. }));
        assert!(backend.sign_in(&credentials).await.is_err());
    }

    #[tokio::test]
    async fn test_refresh_rotates_tokens() {
        let backend = MemoryBackend::new();
        let credentials = Credentials::new("u@example.com", "secret1");
        backend.sign_up(&credentials).await.unwrap();
        let session = backend.sign_in(&credentials).await.unwrap();

        let refreshed = backend.refresh_session(&session.refresh_token).await.unwrap();
        assert_ne!(refreshed.access_token, session.access_token);
        assert!(backend.refresh_session(&session.refresh_token).await.is_err());
    }
}
