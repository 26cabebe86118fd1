use std::sync::Arc;

use chrono::Utc;

use super::{Profile, ProfileUpdate};
use crate::auth::Session;
use crate::backend::{Backend, Query, PROFILES};
use crate::{Error, Result};

/// Reads and upserts the signed-in user's `profiles` row
pub struct ProfileService {
    backend: Arc<dyn Backend>,
}

impl ProfileService {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// The stored profile, or an empty one when nothing was saved yet
    pub async fn get(&self, session: &Session) -> Result<Profile> {
        let query = Query::table(PROFILES).eq("user_id", session.user.id.to_string());
        let row = self.backend.select(&query, Some(session)).await?.into_iter().next();
        match row {
            Some(row) => Ok(serde_json::from_value(row)?),
            None => Ok(Profile::empty(session.user.id)),
        }
    }

    pub async fn upsert(&self, session: &Session, update: &ProfileUpdate) -> Result<Profile> {
        if update.is_empty() {
            return Err(Error::Validation("nothing to update".to_string()));
        }

        let row = update.to_row(session.user.id, Utc::now())?;
        let stored = self
            .backend
            .upsert(PROFILES, row, "user_id", Some(session))
            .await?;
        tracing::info!(user = %session.user.id, "Profile saved");
        Ok(serde_json::from_value(stored)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Credentials, SignUpOutcome};
    use crate::backend::MemoryBackend;

    async fn setup() -> (ProfileService, Session) {
        let backend = Arc::new(MemoryBackend::new());
        let SignUpOutcome::SignedIn(session) = backend
            .sign_up(&Credentials::new("u@example.com", "secret1"))
            .await
            .unwrap()
        else {
            panic!("expected a session");
        };
        (ProfileService::new(backend), session)
    }

    #[tokio::test]
    async fn test_get_before_save_is_empty() {
        let (profiles, session) = setup().await;
        let profile = profiles.get(&session).await.unwrap();
        assert_eq!(profile, Profile::empty(session.user.id));
    }

    #[tokio::test]
    async fn test_upsert_merges_by_user_id() {
        let (profiles, session) = setup().await;
        profiles
            .upsert(
                &session,
                &ProfileUpdate {
                    display_name: Some("Grace".to_string()),
                    phone: Some("+1 212 555 0100".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let saved = profiles
            .upsert(
                &session,
                &ProfileUpdate {
                    job_role: Some("Head of Sales".to_string()),
                    phone: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(saved.display_name.as_deref(), Some("Grace"));
        assert_eq!(saved.job_role.as_deref(), Some("Head of Sales"));
        assert_eq!(saved.phone, None);
        assert!(saved.updated_at.is_some());
        assert_eq!(profiles.get(&session).await.unwrap(), saved);
    }

    #[tokio::test]
    async fn test_empty_update_rejected() {
        let (profiles, session) = setup().await;
        let err = profiles.upsert(&session, &ProfileUpdate::default()).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
