use std::path::{Path, PathBuf};

use super::Session;
use crate::Result;

/// Session persisted as JSON between runs
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Option<Session>> {
        if !tokio::fs::try_exists(&self.path).await? {
            return Ok(None);
        }
        let content = tokio::fs::read_to_string(&self.path).await?;
        match serde_json::from_str(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // Unreadable session files are treated as signed out
                tracing::warn!(path = %self.path.display(), error = %e, "Discarding corrupt session file");
                self.clear().await?;
                Ok(None)
            }
        }
    }

    pub async fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serde_json::to_string_pretty(session)?).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600)).await?;
        }

        Ok(())
    }

    pub async fn clear(&self) -> Result<()> {
        if tokio::fs::try_exists(&self.path).await? {
            tokio::fs::remove_file(&self.path).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::User;
    use chrono::Utc;
    use uuid::Uuid;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("followiq-test-{}", Uuid::new_v4()))
            .join(name)
    }

    #[tokio::test]
    async fn test_save_load_clear() {
        let store = SessionStore::new(temp_path("session.json"));
        assert!(store.load().await.unwrap().is_none());

        let session = Session {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_at: Utc::now(),
            user: User {
                id: Uuid::new_v4(),
                email: "u@example.com".to_string(),
            },
        };
        store.save(&session).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(session));

        store.clear().await.unwrap();
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_signed_out() {
        let path = temp_path("session.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();

        let store = SessionStore::new(&path);
        assert!(store.load().await.unwrap().is_none());
        assert!(!path.exists());
    }
}
