//! Identity Provider Abstraction
//!
//! The seam between the core and a native identity SDK (MSAL on Android/iOS, or any
//! OAuth2/OIDC client on other hosts). The SDK is treated as a trusted black box: it
//! issues, caches and validates tokens; the core only drives it and interprets what
//! it reports.
//!
//! Native SDKs usually report completion through separate success / error / cancel
//! callbacks. Adapters collapse those into a single [`ProviderOutcome`] returned
//! from one `async fn`, so each call site handles exactly one result.
//!
//! Types in this module are deliberately "raw": identifiers may be missing, expiry
//! may be unknown. Normalization into the core's strong types happens in
//! `core-auth`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::presentation::PresentationContext;

/// Settings handed to the native SDK when a client is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeClientConfig {
    pub client_id: String,
    pub authority: String,
    pub redirect_uri: Option<String>,
    pub tenant_id: Option<String>,
    /// Authorities the configuration declares explicitly, in declared order.
    pub authorities: Vec<String>,
}

/// An account as the native SDK describes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeAccount {
    pub identifier: Option<String>,
    pub username: Option<String>,
    /// Display name from the account claims.
    pub name: Option<String>,
    pub tenant_id: Option<String>,
    pub environment: Option<String>,
    /// Authority the account was last authenticated against.
    pub authority: Option<String>,
}

impl NativeAccount {
    /// Convenience constructor used by adapters and tests.
    pub fn new(identifier: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            username: Some(username.into()),
            ..Self::default()
        }
    }

    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = Some(authority.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_tenant(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }
}

/// Successful acquisition result as reported by the native SDK.
#[derive(Clone)]
pub struct NativeAuthResult {
    pub access_token: String,
    pub id_token: Option<String>,
    pub scopes: Vec<String>,
    /// `None` when the SDK did not report an expiry.
    pub expires_on: Option<DateTime<Utc>>,
    pub account: NativeAccount,
}

impl fmt::Debug for NativeAuthResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeAuthResult")
            .field("access_token", &"[REDACTED]")
            .field("id_token", &self.id_token.as_ref().map(|_| "[REDACTED]"))
            .field("scopes", &self.scopes)
            .field("expires_on", &self.expires_on)
            .field("account", &self.account.identifier)
            .finish()
    }
}

/// Failure reported by the native SDK.
///
/// `message` is provider free text; callers must not branch on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ProviderError {
    /// SDK-specific error code, if the SDK exposes one.
    pub code: Option<String>,
    pub message: String,
    /// Diagnostic detail (e.g. `userInfo` dump on iOS).
    pub details: Option<String>,
}

impl ProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Single result channel for one provider call.
#[derive(Debug, Clone)]
pub enum ProviderOutcome<T> {
    Success(T),
    /// The user dismissed the flow.
    Cancelled,
    Failed(ProviderError),
}

impl<T> ProviderOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ProviderOutcome::Success(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ProviderOutcome::Cancelled)
    }
}

/// Result of asking the SDK which accounts it knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountLookup {
    /// Accounts in the order the SDK returned them.
    Loaded(Vec<NativeAccount>),
    /// The SDK noticed the signed-in account changed while loading.
    Changed {
        prior: Option<NativeAccount>,
        current: Option<NativeAccount>,
    },
}

/// Parameters for an interactive acquisition.
#[derive(Debug, Clone)]
pub struct InteractiveTokenRequest {
    pub scopes: Vec<String>,
    pub login_hint: Option<String>,
    pub presentation: PresentationContext,
}

/// Parameters for a silent acquisition.
#[derive(Debug, Clone)]
pub struct SilentTokenRequest {
    pub scopes: Vec<String>,
    pub account: NativeAccount,
    pub authority: String,
    /// Bypass the SDK token cache.
    pub force_refresh: bool,
}

/// Factory for native SDK clients.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::identity::{IdentityProvider, NativeClient, NativeClientConfig, ProviderError};
/// use async_trait::async_trait;
/// use std::sync::Arc;
///
/// struct MsalProvider;
///
/// #[async_trait]
/// impl IdentityProvider for MsalProvider {
///     async fn create_client(
///         &self,
///         config: NativeClientConfig,
///     ) -> Result<Arc<dyn NativeClient>, ProviderError> {
///         // Call into PublicClientApplication / MSALPublicClientApplication
///         todo!()
///     }
/// }
/// ```
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create a client bound to one configuration.
    async fn create_client(
        &self,
        config: NativeClientConfig,
    ) -> Result<Arc<dyn NativeClient>, ProviderError>;
}

/// An initialized native SDK client.
#[async_trait]
pub trait NativeClient: Send + Sync {
    /// Run the interactive flow on the given presentation surface.
    async fn acquire_token_interactive(
        &self,
        request: InteractiveTokenRequest,
    ) -> ProviderOutcome<NativeAuthResult>;

    /// Renew a token without user interaction.
    async fn acquire_token_silent(
        &self,
        request: SilentTokenRequest,
    ) -> ProviderOutcome<NativeAuthResult>;

    /// Enumerate accounts known to the SDK.
    async fn load_accounts(&self) -> Result<AccountLookup, ProviderError>;

    /// Remove an account (and its cached tokens) from the SDK.
    async fn remove_account(&self, account: &NativeAccount) -> Result<(), ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_result_debug_redacts_tokens() {
        let result = NativeAuthResult {
            access_token: "secret-access".to_string(),
            id_token: Some("secret-id".to_string()),
            scopes: vec!["User.Read".to_string()],
            expires_on: None,
            account: NativeAccount::new("acct1", "user@example.com"),
        };

        let debug = format!("{:?}", result);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret-access"));
        assert!(!debug.contains("secret-id"));
    }

    #[test]
    fn test_provider_error_builder() {
        let err = ProviderError::new("network down")
            .with_code("io_error")
            .with_details("NSURLErrorDomain -1009");

        assert_eq!(err.to_string(), "network down");
        assert_eq!(err.code.as_deref(), Some("io_error"));
        assert_eq!(err.details.as_deref(), Some("NSURLErrorDomain -1009"));
    }

    #[test]
    fn test_outcome_predicates() {
        let ok: ProviderOutcome<()> = ProviderOutcome::Success(());
        let cancelled: ProviderOutcome<()> = ProviderOutcome::Cancelled;
        let failed: ProviderOutcome<()> = ProviderOutcome::Failed(ProviderError::new("x"));

        assert!(ok.is_success());
        assert!(cancelled.is_cancelled());
        assert!(!failed.is_success() && !failed.is_cancelled());
    }

    #[test]
    fn test_native_account_builder() {
        let account = NativeAccount::new("id-1", "someone")
            .with_authority("https://login.example.com/tenant")
            .with_name("Some One")
            .with_tenant("tenant")
            .with_environment("login.example.com");

        assert_eq!(account.identifier.as_deref(), Some("id-1"));
        assert_eq!(
            account.authority.as_deref(),
            Some("https://login.example.com/tenant")
        );
        assert_eq!(account.environment.as_deref(), Some("login.example.com"));
    }
}
