//! Session Store
//!
//! Holds the initialized client and the single active account. All mutations go
//! through this type; readers get clones.

use bridge_traits::identity::{IdentityProvider, NativeClient};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::error::{AuthError, ErrorKind, Result};
use crate::normalize;
use crate::types::{Account, ClientConfiguration};

/// An initialized SDK client bound to one configuration.
#[derive(Clone)]
pub struct AuthClient {
    config: Arc<ClientConfiguration>,
    native: Arc<dyn NativeClient>,
}

impl AuthClient {
    pub fn new(config: ClientConfiguration, native: Arc<dyn NativeClient>) -> Self {
        Self {
            config: Arc::new(config),
            native,
        }
    }

    pub fn config(&self) -> &ClientConfiguration {
        &self.config
    }

    pub fn native(&self) -> &Arc<dyn NativeClient> {
        &self.native
    }
}

impl fmt::Debug for AuthClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthClient")
            .field("client_id", &self.config.client_id)
            .field("authority", &self.config.authority.as_str())
            .finish()
    }
}

/// What [`SessionStore::initialize`] did.
#[derive(Debug, Clone)]
pub struct Initialization {
    pub client: AuthClient,
    /// An existing client with identical configuration was kept.
    pub reused: bool,
    /// Account dropped because the client it belonged to was replaced.
    pub cleared_account: Option<Account>,
}

#[derive(Default)]
struct SessionState {
    client: Option<AuthClient>,
    active_account: Option<Account>,
}

/// Client lifecycle plus the one tracked account.
#[derive(Default)]
pub struct SessionStore {
    state: RwLock<SessionState>,
    init_lock: Mutex<()>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create (or keep) the client for `config`.
    ///
    /// Concurrent calls are serialized. An identical configuration reuses the
    /// current client without calling the provider. A failed creation leaves the
    /// previous client and account untouched.
    pub async fn initialize(
        &self,
        config: ClientConfiguration,
        provider: &dyn IdentityProvider,
    ) -> Result<Initialization> {
        let _guard = self.init_lock.lock().await;

        if let Some(existing) = self.state.read().await.client.clone() {
            if *existing.config() == config {
                debug!(client_id = %config.client_id, "Reusing client for identical configuration");
                return Ok(Initialization {
                    client: existing,
                    reused: true,
                    cleared_account: None,
                });
            }
        }

        let native = provider
            .create_client(config.to_native())
            .await
            .map_err(|err| {
                warn!(error = %err, "Provider rejected client configuration");
                normalize::provider_failure(ErrorKind::InitError, err)
            })?;

        let client = AuthClient::new(config, native);
        let mut state = self.state.write().await;
        let replaced = state.client.replace(client.clone()).is_some();
        let cleared_account = if replaced {
            state.active_account.take()
        } else {
            None
        };
        info!(
            client_id = %client.config().client_id,
            replaced,
            "Authentication client ready"
        );

        Ok(Initialization {
            client,
            reused: false,
            cleared_account,
        })
    }

    /// The current client, or `NOT_INITIALIZED`.
    pub async fn require_client(&self) -> Result<AuthClient> {
        self.state
            .read()
            .await
            .client
            .clone()
            .ok_or_else(AuthError::not_initialized)
    }

    pub async fn is_initialized(&self) -> bool {
        self.state.read().await.client.is_some()
    }

    /// Overwrite the active account, returning the previous one.
    pub async fn set_active_account(&self, account: Option<Account>) -> Option<Account> {
        let mut state = self.state.write().await;
        std::mem::replace(&mut state.active_account, account)
    }

    pub async fn active_account(&self) -> Option<Account> {
        self.state.read().await.active_account.clone()
    }

    /// Clear the active account only if it is still `id`.
    ///
    /// Returns `false` when another account took its place in the meantime.
    pub async fn clear_active_account_if(&self, id: &str) -> bool {
        let mut state = self.state.write().await;
        let matches = state
            .active_account
            .as_ref()
            .is_some_and(|active| active.id == id);
        if matches {
            state.active_account = None;
        }
        matches
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}
