// src/context.rs
//! Everything one application run needs, built once from configuration

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::authenticator::RequestAuthenticator;
use crate::core::{ConfigManager, ServiceClient};
use crate::engineers::EngineerService;
use crate::media::MediaClient;
use crate::navigation::Router;
use crate::session::{SessionClient, SessionStore};
use crate::storage::{FileStorage, LocalStorage};

pub struct SessionContext {
    pub config: ConfigManager,
    pub store: Arc<SessionStore>,
    pub session: Arc<SessionClient>,
    pub engineers: EngineerService,
    pub media: MediaClient,
    pub router: Router,
}

impl SessionContext {
    /// Open file-backed storage at the configured path and wire the services
    pub fn new(config: ConfigManager) -> Result<Self> {
        let storage = FileStorage::open(&config.storage.path).with_context(|| {
            format!(
                "Failed to open session storage at {}",
                config.storage.path.display()
            )
        })?;
        Self::with_storage(config, Arc::new(storage))
    }

    pub fn with_storage(config: ConfigManager, storage: Arc<dyn LocalStorage>) -> Result<Self> {
        let authenticator = Arc::new(RequestAuthenticator::new(
            storage.clone(),
            config.media.host()?,
        ));
        let api = Arc::new(ServiceClient::new(
            &config.api.base_url,
            config.api.timeout_seconds,
            authenticator,
        )?);

        let store = Arc::new(SessionStore::new(storage));
        let session = Arc::new(SessionClient::new(api.clone(), store.clone()));
        let engineers = EngineerService::new(api.clone(), &config.media.cloud_name);
        let media = MediaClient::new(
            api,
            &config.media.upload_url,
            &config.media.upload_preset,
        );
        let router = Router::new(store.clone(), session.clone());

        info!(
            "Session context ready (api: {}, environment: {})",
            config.api.base_url, config.environment
        );

        Ok(Self {
            config,
            store,
            session,
            engineers,
            media,
            router,
        })
    }

    /// Tear down the context; logged-in subscribers observe the signal closing
    pub fn shutdown(self) {
        info!(
            "Shutting down session context (logged in: {})",
            self.store.is_logged_in()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::collections::HashMap;

    fn config() -> ConfigManager {
        ConfigManager::from_sources(None, &HashMap::new()).unwrap()
    }

    #[tokio::test]
    async fn test_shutdown_closes_logged_in_signal() {
        let context =
            SessionContext::with_storage(config(), Arc::new(MemoryStorage::new())).unwrap();
        let mut subscription = context.store.subscribe();

        context.shutdown();
        assert_eq!(subscription.changed().await, None);
    }

    #[test]
    fn test_new_uses_configured_storage_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = config();
        config.storage.path = dir.path().join("storage.json");

        let context = SessionContext::new(config).unwrap();
        context.store.set_role(crate::types::Role::Recruiter);
        assert!(dir.path().join("storage.json").exists());
    }
}
