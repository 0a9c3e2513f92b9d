//! Shared application state.

use crate::error::ApiError;
use anyhow::Context;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use warrant_core::{StoreBackend, WarrantConfig};
use warrant_credential::CredentialHasher;
use warrant_store::{AgentStore, MemoryStore, ProfileStore, SqliteStore};
use warrant_token::{Claims, IssueOptions, SigningSecret, TokenIssuer, TokenVerifier};

/// Shared application state, cheap to clone into every handler.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WarrantConfig,
    issuer: TokenIssuer,
    verifier: TokenVerifier,
    hasher: CredentialHasher,
    profiles: Arc<dyn ProfileStore>,
    agents: Arc<dyn AgentStore>,
}

impl AppState {
    /// Assemble state from already-built parts.
    pub fn new(
        config: WarrantConfig,
        secret: SigningSecret,
        profiles: Arc<dyn ProfileStore>,
        agents: Arc<dyn AgentStore>,
    ) -> anyhow::Result<Self> {
        let ttl = config.token.ttl_duration()?;
        let scope = config.token.signature_scope;

        let issuer = TokenIssuer::new(secret.clone())
            .with_scope(scope)
            .with_ttl(ttl)
            .with_token_type(config.token.token_type.clone());
        let verifier = TokenVerifier::new(secret).with_scope(scope);
        let hasher = CredentialHasher::from_config(&config.credentials);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                issuer,
                verifier,
                hasher,
                profiles,
                agents,
            }),
        })
    }

    /// Build state from configuration: resolve the signing secret and open the store.
    pub async fn init(config: WarrantConfig) -> anyhow::Result<Self> {
        let secret = config
            .token
            .resolve_secret()
            .context("failed to read token secret file")?
            .context(
                "no token secret configured (set WARRANT_TOKEN_SECRET or token.secret_file)",
            )?;
        let secret = SigningSecret::new(secret)?;

        let (profiles, agents): (Arc<dyn ProfileStore>, Arc<dyn AgentStore>) =
            match config.store.backend {
                StoreBackend::Memory => {
                    info!("Using in-memory store");
                    let store = Arc::new(MemoryStore::new());
                    (store.clone(), store)
                }
                StoreBackend::Sqlite => {
                    info!(path = %config.store.sqlite_path, "Using SQLite store");
                    let store = Arc::new(
                        SqliteStore::open(&config.store.sqlite_path)
                            .await
                            .context("failed to open SQLite store")?,
                    );
                    (store.clone(), store)
                }
            };

        Self::new(config, secret, profiles, agents)
    }

    pub fn config(&self) -> &WarrantConfig {
        &self.inner.config
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.inner.verifier
    }

    pub fn hasher(&self) -> &CredentialHasher {
        &self.inner.hasher
    }

    pub fn profiles(&self) -> &dyn ProfileStore {
        self.inner.profiles.as_ref()
    }

    pub fn agents(&self) -> &dyn AgentStore {
        self.inner.agents.as_ref()
    }

    /// Whether token failures are reported by kind instead of one generic message.
    pub fn expose_token_errors(&self) -> bool {
        self.inner.config.server.expose_token_errors
    }

    /// Issue a token carrying `claims` with the configured lifetime.
    pub fn issue_token<T: Serialize>(&self, claims: &T) -> Result<String, ApiError> {
        let claims = Claims::from_serializable(claims)?;
        Ok(self.inner.issuer.issue(&claims, &IssueOptions::default())?)
    }
}
