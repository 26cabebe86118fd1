use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::{AdminSession, Credentials, OAuthProvider, Session, SessionStore, SignUpOutcome};
use crate::backend::Backend;
use crate::config::AdminConfig;
use crate::{Error, Result};

/// Sign-in state of the account shell
pub struct AuthService {
    backend: Arc<dyn Backend>,
    store: SessionStore,
    admin: AdminConfig,
}

impl AuthService {
    pub fn new(backend: Arc<dyn Backend>, store: SessionStore, admin: AdminConfig) -> Self {
        Self {
            backend,
            store,
            admin,
        }
    }

    pub async fn sign_in(&self, credentials: Credentials) -> Result<Session> {
        let credentials = credentials.validated()?;
        let session = self.backend.sign_in(&credentials).await?;
        self.store.save(&session).await?;
        info!(user = %session.user.id, "Signed in");
        Ok(session)
    }

    pub async fn sign_up(&self, credentials: Credentials) -> Result<SignUpOutcome> {
        let credentials = credentials.validated()?;
        let outcome = self.backend.sign_up(&credentials).await?;
        match &outcome {
            SignUpOutcome::SignedIn(session) => {
                self.store.save(session).await?;
                info!(user = %session.user.id, "Account created and signed in");
            }
            SignUpOutcome::ConfirmationRequired { email } => {
                info!(%email, "Account created, awaiting email confirmation");
            }
        }
        Ok(outcome)
    }

    /// Revoke the stored session and forget it locally
    ///
    /// The local session is cleared even when the backend rejects the
    /// logout call (an already-expired token, for instance).
    pub async fn sign_out(&self) -> Result<()> {
        let Some(session) = self.store.load().await? else {
            return Ok(());
        };
        if let Err(e) = self.backend.sign_out(&session).await {
            warn!(error = %e, "Backend sign-out failed, clearing local session anyway");
        }
        self.store.clear().await?;
        info!(user = %session.user.id, "Signed out");
        Ok(())
    }

    /// The stored session, refreshed first when it has expired
    pub async fn current_session(&self) -> Result<Option<Session>> {
        let Some(session) = self.store.load().await? else {
            return Ok(None);
        };
        if !session.is_expired(Utc::now()) {
            return Ok(Some(session));
        }

        match self.backend.refresh_session(&session.refresh_token).await {
            Ok(refreshed) => {
                self.store.save(&refreshed).await?;
                tracing::debug!(user = %refreshed.user.id, "Session refreshed");
                Ok(Some(refreshed))
            }
            Err(e) => {
                warn!(error = %e, "Session refresh failed, signing out locally");
                self.store.clear().await?;
                Ok(None)
            }
        }
    }

    pub async fn require_session(&self) -> Result<Session> {
        self.current_session().await?.ok_or(Error::NotAuthenticated)
    }

    /// A signed-in session whose account is on the admin list
    pub async fn require_admin(&self) -> Result<AdminSession> {
        let session = self.require_session().await?;
        if !self.is_admin(&session) {
            return Err(Error::Forbidden(format!(
                "{} is not an administrator",
                session.user.email
            )));
        }
        Ok(AdminSession::new(session))
    }

    pub fn is_admin(&self, session: &Session) -> bool {
        self.admin.is_admin(&session.user.email)
    }

    pub fn oauth_url(&self, provider: OAuthProvider, redirect_to: &str) -> Result<String> {
        self.backend.oauth_url(provider, redirect_to)
    }
}
