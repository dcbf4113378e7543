use std::{fmt, sync::Arc};

use anyhow::Context;
use cadence_config::Config;
use cadence_core::database::{AccountRepository, TrackRepository};
use cadence_core::storage::BlobStore;
use cadence_core::{
    AccountService, CatalogService, CredentialHasher, SessionService,
    TokenService,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub sessions: SessionService,
    pub catalog: CatalogService,
    pub accounts: AccountService,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("storage", &self.catalog.blob_store().kind())
            .field("budget", &self.config.limits.request_timeout)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire the services over the given adapters. The storage backend is
    /// chosen by the caller once, at startup.
    pub fn new(
        config: Config,
        tracks: Arc<dyn TrackRepository>,
        accounts: Arc<dyn AccountRepository>,
        blobs: Arc<dyn BlobStore>,
    ) -> anyhow::Result<Self> {
        let budget = config.limits.request_timeout;
        let tokens = Arc::new(
            TokenService::new(config.auth.jwt_secret.as_bytes())
                .context("failed to initialise token service")?,
        );
        let hasher = Arc::new(
            CredentialHasher::new()
                .context("failed to initialise credential hasher")?,
        );

        Ok(Self {
            sessions: SessionService::new(
                accounts.clone(),
                tokens,
                hasher,
                budget,
            ),
            catalog: CatalogService::new(tracks, blobs, budget),
            accounts: AccountService::new(accounts, budget),
            config: Arc::new(config),
        })
    }
}
