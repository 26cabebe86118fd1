use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

const MIN_PASSWORD_LEN: usize = 6;

/// Account record managed by the hosted auth service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
}

/// Signed-in session as persisted between CLI runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

impl Session {
    /// Expired, or expiring within the next 30 seconds
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - Duration::seconds(30) <= now
    }
}

/// A session already checked against the admin list
#[derive(Debug, Clone, PartialEq)]
pub struct AdminSession(Session);

impl AdminSession {
    pub(crate) fn new(session: Session) -> Self {
        Self(session)
    }

    pub fn session(&self) -> &Session {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn validated(self) -> Result<Self> {
        let email = self.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(Error::Validation("a valid email is required".to_string()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(Error::Validation(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(Self {
            email,
            password: self.password,
        })
    }
}

/// Result of a sign-up request
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    /// Account is active and signed in
    SignedIn(Session),
    /// Account created, a confirmation mail was sent
    ConfirmationRequired { email: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
    Github,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Github => "github",
        }
    }
}

impl std::str::FromStr for OAuthProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "github" => Ok(Self::Github),
            other => Err(Error::Validation(format!("unsupported OAuth provider: {}", other))),
        }
    }
}
