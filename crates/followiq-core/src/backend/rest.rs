use std::time::Duration;

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::{Backend, Query};
use crate::auth::{Credentials, OAuthProvider, Session, SignUpOutcome, User};
use crate::config::BackendConfig;
use crate::{Error, Result};

const REST_PREFIX: &str = "rest/v1";
const AUTH_PREFIX: &str = "auth/v1";
const PREFER_REPRESENTATION: &str = "return=representation";
const PREFER_MERGE: &str = "resolution=merge-duplicates,return=representation";

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: User,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|ts| chrono::DateTime::from_timestamp(ts, 0))
            .unwrap_or_else(|| {
                Utc::now() + chrono::Duration::seconds(self.expires_in.unwrap_or(3600))
            });
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

/// Hosted backend reached over its REST and auth HTTP APIs
pub struct RestBackend {
    client: Client,
    base_url: Url,
    anon_key: String,
}

impl RestBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| Error::Config("backend.url is not set".to_string()))?;
        let anon_key = config
            .anon_key
            .clone()
            .ok_or_else(|| Error::Config("backend.anon_key is not set".to_string()))?;

        // Trailing slash so `join` appends instead of replacing the last segment
        let base_url = Url::parse(&format!("{}/", url.trim_end_matches('/')))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            base_url,
            anon_key,
        })
    }

    fn rest_url(&self, table: &str) -> Result<Url> {
        Ok(self.base_url.join(&format!("{}/{}", REST_PREFIX, table))?)
    }

    fn auth_url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(&format!("{}/{}", AUTH_PREFIX, path))?)
    }

    /// `apikey` always, bearer token of the session when there is one
    fn headers(&self, session: Option<&Session>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let bearer = session
            .map(|s| s.access_token.as_str())
            .unwrap_or(&self.anon_key);
        if let Ok(key) = HeaderValue::from_str(&self.anon_key) {
            headers.insert("apikey", key);
        }
        if let Ok(auth) = HeaderValue::from_str(&format!("Bearer {}", bearer)) {
            headers.insert(AUTHORIZATION, auth);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| {
            status.canonical_reason().unwrap_or("request failed").to_string()
        });
        tracing::warn!(status = status.as_u16(), %message, "Backend request failed");
        Err(Error::Backend {
            status: status.as_u16(),
            message,
        })
    }

    async fn rows(&self, request: RequestBuilder) -> Result<Vec<Value>> {
        let response = self.send(request).await?;
        Ok(response.json::<Vec<Value>>().await?)
    }
}

/// Pull the human-readable message out of an error body
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "msg", "error_description", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn first_row(rows: Vec<Value>, table: &str) -> Result<Value> {
    rows.into_iter()
        .next()
        .ok_or_else(|| Error::Other(format!("{} returned no representation", table)))
}

#[async_trait::async_trait]
impl Backend for RestBackend {
    async fn select(&self, query: &Query, session: Option<&Session>) -> Result<Vec<Value>> {
        let mut pairs = vec![("select".to_string(), "*".to_string())];
        pairs.extend(query.to_query_pairs());

        tracing::debug!(table = %query.table, filters = query.filters.len(), "Selecting rows");
        let request = self
            .client
            .get(self.rest_url(&query.table)?)
            .headers(self.headers(session))
            .query(&pairs);
        self.rows(request).await
    }

    async fn insert(&self, table: &str, row: Value, session: Option<&Session>) -> Result<Value> {
        tracing::debug!(table, "Inserting row");
        let request = self
            .client
            .post(self.rest_url(table)?)
            .headers(self.headers(session))
            .header("Prefer", PREFER_REPRESENTATION)
            .json(&row);
        first_row(self.rows(request).await?, table)
    }

    async fn update(&self, query: &Query, patch: Value, session: Option<&Session>) -> Result<Vec<Value>> {
        tracing::debug!(table = %query.table, "Updating rows");
        let request = self
            .client
            .patch(self.rest_url(&query.table)?)
            .headers(self.headers(session))
            .header("Prefer", PREFER_REPRESENTATION)
            .query(&query.to_query_pairs())
            .json(&patch);
        self.rows(request).await
    }

    async fn upsert(
        &self,
        table: &str,
        row: Value,
        on_conflict: &str,
        session: Option<&Session>,
    ) -> Result<Value> {
        tracing::debug!(table, on_conflict, "Upserting row");
        let request = self
            .client
            .post(self.rest_url(table)?)
            .headers(self.headers(session))
            .header("Prefer", PREFER_MERGE)
            .query(&[("on_conflict", on_conflict)])
            .json(&row);
        first_row(self.rows(request).await?, table)
    }

    async fn delete(&self, query: &Query, session: Option<&Session>) -> Result<usize> {
        tracing::debug!(table = %query.table, "Deleting rows");
        let request = self
            .client
            .delete(self.rest_url(&query.table)?)
            .headers(self.headers(session))
            .header("Prefer", PREFER_REPRESENTATION)
            .query(&query.to_query_pairs());
        Ok(self.rows(request).await?.len())
    }

    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome> {
        let request = self
            .client
            .post(self.auth_url("signup")?)
            .headers(self.headers(None))
            .json(&json!({"email": credentials.email, "password": credentials.password}));
        let body: Value = self.send(request).await?.json().await?;

        // A session is only returned when email confirmation is disabled
        if body.get("access_token").is_some() {
            let token: TokenResponse = serde_json::from_value(body)?;
            Ok(SignUpOutcome::SignedIn(token.into_session()))
        } else {
            Ok(SignUpOutcome::ConfirmationRequired {
                email: credentials.email.clone(),
            })
        }
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session> {
        let request = self
            .client
            .post(self.auth_url("token")?)
            .headers(self.headers(None))
            .query(&[("grant_type", "password")])
            .json(&json!({"email": credentials.email, "password": credentials.password}));
        let token: TokenResponse = self.send(request).await?.json().await?;
        Ok(token.into_session())
    }

    async fn sign_out(&self, session: &Session) -> Result<()> {
        let request = self
            .client
            .post(self.auth_url("logout")?)
            .headers(self.headers(Some(session)));
        self.send(request).await?;
        Ok(())
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session> {
        let request = self
            .client
            .post(self.auth_url("token")?)
            .headers(self.headers(None))
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({"refresh_token": refresh_token}));
        let token: TokenResponse = self.send(request).await?.json().await?;
        Ok(token.into_session())
    }

    fn oauth_url(&self, provider: OAuthProvider, redirect_to: &str) -> Result<String> {
        let mut url = self.auth_url("authorize")?;
        url.query_pairs_mut()
            .append_pair("provider", provider.as_str())
            .append_pair("redirect_to", redirect_to);
        Ok(url.to_string())
    }
}
