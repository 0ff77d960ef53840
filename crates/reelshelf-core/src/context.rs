//! Explicitly constructed application context.
//!
//! `AppContext` owns every piece of process-wide state (token store, API
//! client, session, notifications) and is handed to the view controllers by
//! reference. Construction is the initialization boundary; `shutdown` is the
//! teardown boundary.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::api::ApiClient;
use crate::auth::{FileTokenStore, KeyringTokenStore, Session, TokenStore};
use crate::config::{Config, TokenBackend};
use crate::notify::Notifier;

pub struct AppContext {
    pub config: Config,
    pub store: Arc<dyn TokenStore>,
    pub api: ApiClient,
    pub session: Session,
    pub notifier: Notifier,
}

impl AppContext {
    /// Build the context with the token backend selected in `config`
    pub fn new(config: Config) -> Result<Self> {
        let store: Arc<dyn TokenStore> = match config.token_backend {
            TokenBackend::File => Arc::new(FileTokenStore::new(config.data_dir()?)),
            TokenBackend::Keyring => Arc::new(KeyringTokenStore::new(&config.origin())?),
        };
        Self::with_store(config, store)
    }

    /// Build the context around an existing token store
    pub fn with_store(config: Config, store: Arc<dyn TokenStore>) -> Result<Self> {
        let api = ApiClient::new(config.api_base(), Arc::clone(&store), config.request_timeout())
            .context("Failed to create HTTP client")?;
        let session = Session::new(Arc::clone(&store));
        info!(
            api = %config.api_base(),
            backend = ?config.token_backend,
            authenticated = session.is_authenticated(),
            "Application context ready"
        );
        Ok(Self {
            config,
            store,
            api,
            session,
            notifier: Notifier::new(),
        })
    }

    /// Tear the context down. Pending notification timers are cancelled
    /// implicitly when the runtime stops; tokens stay persisted.
    pub fn shutdown(self) {
        self.notifier.dismiss();
        info!(
            authenticated = self.session.is_authenticated(),
            "Application context shut down"
        );
    }
}
