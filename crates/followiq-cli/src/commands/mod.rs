pub mod auth;
pub mod contact;
pub mod inbox;
pub mod motion;
pub mod profile;

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use followiq_core::{
    auth::{AuthService, SessionStore},
    backend,
    contact::ContactService,
    profile::ProfileService,
    AppConfig, Backend, MemoryBackend,
};

/// Backend connection plus the services built on it
pub struct Context {
    pub config: Arc<AppConfig>,
    backend: Arc<dyn Backend>,
    offline: bool,
}

impl Context {
    pub async fn new(config: Arc<AppConfig>, offline: bool) -> Result<Self> {
        let backend: Arc<dyn Backend> = if offline {
            let path = config.offline_backend_path();
            info!(path = %path.display(), "Offline mode: using a local backend, nothing is sent remotely");
            Arc::new(MemoryBackend::open(path).await?)
        } else {
            backend::connect(&config)?
        };
        Ok(Self {
            config,
            backend,
            offline,
        })
    }

    pub fn auth(&self) -> AuthService {
        // Offline sessions never overwrite a real one
        let path = if self.offline {
            self.config.session_path().with_file_name("session.offline.json")
        } else {
            self.config.session_path()
        };
        AuthService::new(
            Arc::clone(&self.backend),
            SessionStore::new(path),
            self.config.admin.clone(),
        )
    }

    pub fn contacts(&self) -> ContactService {
        ContactService::new(Arc::clone(&self.backend))
    }

    pub fn profiles(&self) -> ProfileService {
        ProfileService::new(Arc::clone(&self.backend))
    }
}
