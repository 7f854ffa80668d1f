//! # Authentication Manager
//!
//! Token Acquisition Engine for the single-account model.
//!
//! ## Overview
//!
//! `AuthManager` drives the native SDK through the [`SessionStore`]:
//!
//! - `initialize` / `initialize_from_source` create the client
//! - `sign_in` runs the interactive flow on the host's presentation surface
//! - `acquire_token_silent` renews without UI, resolving account and authority
//! - `sign_out` removes the active account
//! - `current_account` asks the SDK which account is signed in
//!
//! Preconditions (`NOT_INITIALIZED`, missing surface) are checked before any
//! provider call. Provider failures are converted on the spot; nothing the SDK
//! reports escapes as anything other than an [`AuthError`]. Lifecycle events go
//! to the [`EventBus`].
//!
//! ## Usage
//!
//! ```ignore
//! use core_auth::{AuthManager, SilentTokenOptions};
//! use core_runtime::{config::AuthSettings, events::EventBus};
//!
//! let manager = AuthManager::new(provider, EventBus::default(), AuthSettings::default())?
//!     .with_presentation(surface)
//!     .with_platform(HostPlatform::Android);
//!
//! manager.initialize(raw_config).await?;
//! let token = manager.sign_in(vec!["User.Read".into()], None).await?;
//! let renewed = manager
//!     .acquire_token_silent(SilentTokenOptions::new(vec!["User.Read".into()]))
//!     .await?;
//! ```

use crate::authority::select_authority;
use crate::error::{AuthError, ErrorKind, OperationOutcome};
use crate::normalize;
use crate::resolver;
use crate::session::{AuthClient, SessionStore};
use crate::types::{
    AcquisitionMode, AcquisitionRequest, Account, ClientConfiguration, RequestState, TokenResult,
};
use bridge_traits::config::{ConfigSource, RawClientConfig};
use bridge_traits::identity::{
    AccountLookup, IdentityProvider, InteractiveTokenRequest, ProviderOutcome, SilentTokenRequest,
};
use bridge_traits::{Clock, HostPlatform, PresentationSurface, SystemClock};
use core_runtime::config::AuthSettings;
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use core_runtime::logging::{mask_identifier, redact_if_sensitive};
use std::sync::Arc;
use tokio::sync::broadcast::Receiver;
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Options for a silent acquisition.
#[derive(Debug, Clone, Default)]
pub struct SilentTokenOptions {
    /// Empty means "use the default scopes".
    pub scopes: Vec<String>,
    /// Bypass the SDK token cache.
    pub force_refresh: bool,
    /// Renew for this account instead of the active one.
    pub account: Option<Account>,
}

impl SilentTokenOptions {
    pub fn new(scopes: Vec<String>) -> Self {
        Self {
            scopes,
            ..Self::default()
        }
    }

    pub fn force_refresh(mut self, force: bool) -> Self {
        self.force_refresh = force;
        self
    }

    pub fn for_account(mut self, account: Account) -> Self {
        self.account = Some(account);
        self
    }
}

/// Single-account authentication orchestrator.
pub struct AuthManager {
    provider: Arc<dyn IdentityProvider>,
    config_source: Option<Arc<dyn ConfigSource>>,
    presentation: Option<Arc<dyn PresentationSurface>>,
    platform: HostPlatform,
    clock: Arc<dyn Clock>,
    default_scopes: Vec<String>,
    fallback_authority: Url,
    event_bus: EventBus,
    session: SessionStore,
}

impl AuthManager {
    /// Fails with `INVALID_AUTHORITY` when the fallback authority is unusable and
    /// `INVALID_ARGS` when there are no default scopes.
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        event_bus: EventBus,
        settings: AuthSettings,
    ) -> OperationOutcome<Self> {
        let fallback_authority = settings.fallback_authority_url().map_err(|e| {
            AuthError::new(ErrorKind::InvalidAuthority, e.to_string())
                .with_details(settings.fallback_authority.clone())
        })?;
        if settings.default_scopes.is_empty() {
            return Err(AuthError::new(
                ErrorKind::InvalidArgs,
                "At least one default scope is required",
            ));
        }

        Ok(Self {
            provider,
            config_source: None,
            presentation: None,
            platform: HostPlatform::default(),
            clock: Arc::new(SystemClock),
            default_scopes: settings.default_scopes,
            fallback_authority,
            event_bus,
            session: SessionStore::new(),
        })
    }

    pub fn with_presentation(mut self, surface: Arc<dyn PresentationSurface>) -> Self {
        self.presentation = Some(surface);
        self
    }

    pub fn with_config_source(mut self, source: Arc<dyn ConfigSource>) -> Self {
        self.config_source = Some(source);
        self
    }

    pub fn with_platform(mut self, platform: HostPlatform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Receiver for lifecycle events published from now on.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.event_bus.subscribe()
    }

    pub fn platform(&self) -> HostPlatform {
        self.platform
    }

    pub async fn is_initialized(&self) -> bool {
        self.session.is_initialized().await
    }

    /// Configuration of the current client, if any.
    pub async fn client_configuration(&self) -> Option<ClientConfiguration> {
        self.session
            .require_client()
            .await
            .ok()
            .map(|client| client.config().clone())
    }

    /// The account the session currently tracks. Does not call the provider.
    pub async fn active_account(&self) -> Option<Account> {
        self.session.active_account().await
    }

    /// Initialize from explicit settings (the iOS argument style).
    #[instrument(skip(self, raw))]
    pub async fn initialize(&self, raw: RawClientConfig) -> OperationOutcome<()> {
        let source = resolver::ArgumentsConfigSource::new(raw);
        let config = resolver::resolve(&source)
            .await
            .map_err(|e| self.report(e))?;
        self.install(config).await
    }

    /// Initialize from the injected configuration source (the Android resource style).
    #[instrument(skip(self))]
    pub async fn initialize_from_source(&self) -> OperationOutcome<()> {
        let Some(source) = self.config_source.as_ref() else {
            return Err(self.report(AuthError::new(
                ErrorKind::NoContext,
                "No configuration source available",
            )));
        };
        let config = resolver::resolve(source.as_ref())
            .await
            .map_err(|e| self.report(e))?;
        self.install(config).await
    }

    async fn install(&self, config: ClientConfiguration) -> OperationOutcome<()> {
        let client_id = config.client_id.clone();
        let authority = config.authority.to_string();

        let init = self
            .session
            .initialize(config, self.provider.as_ref())
            .await
            .map_err(|e| self.report(e))?;

        if let Some(cleared) = init.cleared_account {
            self.emit(AuthEvent::ActiveAccountChanged {
                previous: Some(cleared.id),
                current: None,
            });
        }
        self.emit(AuthEvent::Initialized {
            client_id,
            authority,
            reused: init.reused,
        });
        Ok(())
    }

    fn effective_scopes(&self, scopes: Vec<String>) -> Vec<String> {
        let scopes: Vec<String> = scopes
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if scopes.is_empty() {
            debug!(default = ?self.default_scopes, "No scopes requested, using defaults");
            self.default_scopes.clone()
        } else {
            scopes
        }
    }

    /// Interactive sign-in. On success the returned account becomes the active one.
    #[instrument(skip(self, scopes, login_hint), fields(platform = %self.platform))]
    pub async fn sign_in(
        &self,
        scopes: Vec<String>,
        login_hint: Option<String>,
    ) -> OperationOutcome<TokenResult> {
        let client = self.session.require_client().await.map_err(|e| self.report(e))?;
        let scopes = self.effective_scopes(scopes);
        let mut request = AcquisitionRequest::new(AcquisitionMode::Interactive, scopes.clone());

        let surface = self.presentation.as_ref().and_then(|surface| surface.resolve());
        let Some(presentation) = surface else {
            self.advance(&mut request, RequestState::Failed);
            return Err(self.report(AuthError::missing_surface(self.platform)));
        };

        if let Some(hint) = login_hint.as_deref() {
            debug!(login_hint = %redact_if_sensitive("login_hint", hint), "Using login hint");
        }

        self.advance(&mut request, RequestState::Requested);
        self.emit(AuthEvent::SigningIn {
            request_id: request.id.to_string(),
        });

        let outcome = client
            .native()
            .acquire_token_interactive(InteractiveTokenRequest {
                scopes,
                login_hint,
                presentation,
            })
            .await;

        match outcome {
            ProviderOutcome::Success(result) => {
                self.advance(&mut request, RequestState::Completed);
                let (token, account) = normalize::token(result);
                self.replace_active_account(Some(account)).await;
                info!(account = %mask_identifier(&token.account_id), "Interactive sign-in completed");
                self.emit(AuthEvent::SignedIn {
                    account_id: token.account_id.clone(),
                });
                Ok(token)
            }
            ProviderOutcome::Cancelled => {
                self.advance(&mut request, RequestState::Cancelled);
                Err(self.report(normalize::cancelled()))
            }
            ProviderOutcome::Failed(err) => {
                self.advance(&mut request, RequestState::Failed);
                Err(self.report(normalize::provider_failure(ErrorKind::SignInError, err)))
            }
        }
    }

    /// Silent renewal. Never falls back to an interactive flow.
    #[instrument(skip(self, options), fields(force_refresh = options.force_refresh))]
    pub async fn acquire_token_silent(
        &self,
        options: SilentTokenOptions,
    ) -> OperationOutcome<TokenResult> {
        let client = self.session.require_client().await.map_err(|e| self.report(e))?;
        let scopes = self.effective_scopes(options.scopes);
        let mut request = AcquisitionRequest::new(AcquisitionMode::Silent, scopes.clone());

        let account = match options.account {
            Some(account) => account,
            None => match self.resolve_account(&client).await {
                Ok(account) => account,
                Err(err) => {
                    self.advance(&mut request, RequestState::Failed);
                    return Err(self.report(err));
                }
            },
        };

        let authority = select_authority(
            &client.config().authorities,
            Some(&account),
            &self.fallback_authority,
        );
        debug!(
            account = %mask_identifier(&account.id),
            authority = %authority,
            "Renewing token silently"
        );

        self.advance(&mut request, RequestState::Requested);
        let outcome = client
            .native()
            .acquire_token_silent(SilentTokenRequest {
                scopes,
                account: account.native().clone(),
                authority: authority.to_string(),
                force_refresh: options.force_refresh,
            })
            .await;

        match outcome {
            ProviderOutcome::Success(result) => {
                self.advance(&mut request, RequestState::Completed);
                let (token, renewed) = normalize::token(result);
                let keep = if renewed.id.is_empty() { account } else { renewed };
                self.replace_active_account(Some(keep)).await;

                let expires_in = token.expires_on_millis() - self.clock.unix_timestamp_millis();
                debug!(expires_in_ms = expires_in, "Silent renewal completed");
                self.emit(AuthEvent::TokenAcquired {
                    account_id: token.account_id.clone(),
                    expires_on: token.expires_on_millis(),
                });
                Ok(token)
            }
            ProviderOutcome::Cancelled => {
                self.advance(&mut request, RequestState::Cancelled);
                Err(self.report(normalize::cancelled()))
            }
            ProviderOutcome::Failed(err) => {
                self.advance(&mut request, RequestState::Failed);
                Err(self.report(normalize::provider_failure(ErrorKind::SilentError, err)))
            }
        }
    }

    /// Active account, else the first account the provider knows about.
    async fn resolve_account(&self, client: &AuthClient) -> OperationOutcome<Account> {
        if let Some(active) = self.session.active_account().await {
            return Ok(active);
        }

        let discovered = self.lookup_account(client).await?;
        match discovered {
            Some(account) => {
                self.replace_active_account(Some(account.clone())).await;
                Ok(account)
            }
            None => Err(AuthError::no_account()),
        }
    }

    async fn lookup_account(&self, client: &AuthClient) -> OperationOutcome<Option<Account>> {
        let lookup = client
            .native()
            .load_accounts()
            .await
            .map_err(|err| normalize::provider_failure(ErrorKind::AccountError, err))?;

        let found = match lookup {
            AccountLookup::Loaded(accounts) => accounts.first().map(normalize::account),
            AccountLookup::Changed { prior, current } => {
                debug!(
                    had_prior = prior.is_some(),
                    has_current = current.is_some(),
                    "Provider reported an account change"
                );
                current.as_ref().map(normalize::account)
            }
        };
        Ok(found)
    }

    /// Remove the active account from the provider, then forget it.
    ///
    /// With no active account this succeeds without calling the provider. On
    /// provider failure the active account is kept. An account that became active
    /// while the removal was in flight is kept as well.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> OperationOutcome<()> {
        let client = self.session.require_client().await.map_err(|e| self.report(e))?;

        let Some(account) = self.session.active_account().await else {
            debug!("Sign-out with no active account");
            self.emit(AuthEvent::SignedOut { account_id: None });
            return Ok(());
        };

        client
            .native()
            .remove_account(account.native())
            .await
            .map_err(|err| self.report(normalize::provider_failure(ErrorKind::SignOutError, err)))?;

        if self.session.clear_active_account_if(&account.id).await {
            self.emit(AuthEvent::ActiveAccountChanged {
                previous: Some(account.id.clone()),
                current: None,
            });
        } else {
            debug!(
                removed = %mask_identifier(&account.id),
                "Active account replaced during sign-out, keeping it"
            );
        }
        info!(account = %mask_identifier(&account.id), "Signed out");
        self.emit(AuthEvent::SignedOut {
            account_id: Some(account.id),
        });
        Ok(())
    }

    /// Ask the provider for the signed-in account and track it as active.
    #[instrument(skip(self))]
    pub async fn current_account(&self) -> OperationOutcome<Option<Account>> {
        let client = self.session.require_client().await.map_err(|e| self.report(e))?;
        let account = self
            .lookup_account(&client)
            .await
            .map_err(|e| self.report(e))?;
        self.replace_active_account(account.clone()).await;
        Ok(account)
    }

    async fn replace_active_account(&self, account: Option<Account>) {
        let current = account.as_ref().map(|a| a.id.clone());
        let previous = self.session.set_active_account(account).await.map(|a| a.id);
        if previous != current {
            self.emit(AuthEvent::ActiveAccountChanged { previous, current });
        }
    }

    fn advance(&self, request: &mut AcquisitionRequest, next: RequestState) {
        let from = request.state();
        match request.transition(next) {
            Ok(()) => debug!(
                request_id = %request.id,
                mode = %request.mode,
                ?from,
                to = ?next,
                "Request state changed"
            ),
            Err(err) => error!(request_id = %request.id, error = %err, "Rejected request transition"),
        }
    }

    /// Log and publish a failure, handing it back for propagation.
    fn report(&self, err: AuthError) -> AuthError {
        if err.is_cancelled() {
            info!(code = err.code(), "Operation cancelled by user");
        } else {
            warn!(code = err.code(), message = %err.message, "Operation failed");
        }
        self.emit(AuthEvent::AuthError {
            code: err.code().to_string(),
            message: err.message.clone(),
            recoverable: err.kind.is_recoverable(),
        });
        err
    }

    fn emit(&self, event: AuthEvent) {
        let _ = self.event_bus.emit(CoreEvent::Auth(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::identity::{
        NativeAccount, NativeAuthResult, NativeClient, NativeClientConfig, ProviderError,
    };
    use bridge_traits::PresentationContext;
    use std::sync::Mutex;

    struct FixedSurface;

    impl PresentationSurface for FixedSurface {
        fn resolve(&self) -> Option<PresentationContext> {
            Some(PresentationContext::new("activity-1"))
        }
    }

    /// Records the last silent request and answers from canned values.
    struct RecordingClient {
        accounts: Result<AccountLookup, ProviderError>,
        silent_requests: Mutex<Vec<SilentTokenRequest>>,
    }

    impl RecordingClient {
        fn with_accounts(accounts: Result<AccountLookup, ProviderError>) -> Self {
            Self {
                accounts,
                silent_requests: Mutex::new(Vec::new()),
            }
        }
    }

    fn result_for(account: NativeAccount) -> NativeAuthResult {
        NativeAuthResult {
            access_token: "tok".into(),
            id_token: None,
            scopes: vec!["read".into()],
            expires_on: None,
            account,
        }
    }

    #[async_trait]
    impl NativeClient for RecordingClient {
        async fn acquire_token_interactive(
            &self,
            _request: InteractiveTokenRequest,
        ) -> ProviderOutcome<NativeAuthResult> {
            ProviderOutcome::Success(result_for(NativeAccount::new("acct1", "user")))
        }

        async fn acquire_token_silent(
            &self,
            request: SilentTokenRequest,
        ) -> ProviderOutcome<NativeAuthResult> {
            let account = request.account.clone();
            self.silent_requests.lock().unwrap().push(request);
            ProviderOutcome::Success(result_for(account))
        }

        async fn load_accounts(&self) -> Result<AccountLookup, ProviderError> {
            self.accounts.clone()
        }

        async fn remove_account(&self, _account: &NativeAccount) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    struct SingleClientProvider(Arc<RecordingClient>);

    #[async_trait]
    impl IdentityProvider for SingleClientProvider {
        async fn create_client(
            &self,
            _config: NativeClientConfig,
        ) -> Result<Arc<dyn NativeClient>, ProviderError> {
            let client: Arc<dyn NativeClient> = self.0.clone();
            Ok(client)
        }
    }

    fn raw_config(authorities: Vec<String>) -> RawClientConfig {
        RawClientConfig {
            client_id: Some("abc".into()),
            authority: Some("https://login.example.com/tenant".into()),
            authorities,
            ..RawClientConfig::default()
        }
    }

    /// Resource-file style settings: one `authority`, no `authorities` list.
    struct ResourceFile;

    #[async_trait]
    impl ConfigSource for ResourceFile {
        async fn load(&self) -> bridge_traits::error::Result<RawClientConfig> {
            Ok(raw_config(vec![]))
        }
    }

    fn manager(client: Arc<RecordingClient>) -> AuthManager {
        AuthManager::new(
            Arc::new(SingleClientProvider(client)),
            EventBus::new(32),
            AuthSettings::default(),
        )
        .unwrap()
        .with_presentation(Arc::new(FixedSurface))
    }

    #[test]
    fn test_new_rejects_bad_settings() {
        let client = Arc::new(RecordingClient::with_accounts(Ok(AccountLookup::Loaded(vec![]))));
        let err = AuthManager::new(
            Arc::new(SingleClientProvider(client.clone())),
            EventBus::default(),
            AuthSettings::default().with_fallback_authority("nope"),
        )
        .err()
        .unwrap();
        assert_eq!(err.kind, ErrorKind::InvalidAuthority);

        let err = AuthManager::new(
            Arc::new(SingleClientProvider(client)),
            EventBus::default(),
            AuthSettings::default().with_default_scopes(Vec::<String>::new()),
        )
        .err()
        .unwrap();
        assert_eq!(err.kind, ErrorKind::InvalidArgs);
    }

    #[tokio::test]
    async fn test_silent_uses_changed_account() {
        let current = NativeAccount::new("acct2", "new-user")
            .with_authority("https://login.example.com/remembered");
        let client = Arc::new(RecordingClient::with_accounts(Ok(AccountLookup::Changed {
            prior: Some(NativeAccount::new("acct1", "old-user")),
            current: Some(current),
        })));
        let manager = manager(client.clone()).with_config_source(Arc::new(ResourceFile));
        manager.initialize_from_source().await.unwrap();

        let token = manager
            .acquire_token_silent(SilentTokenOptions::new(vec!["read".into()]))
            .await
            .unwrap();

        assert_eq!(token.account_id, "acct2");
        let requests = client.silent_requests.lock().unwrap();
        assert_eq!(requests[0].authority, "https://login.example.com/remembered");
        assert_eq!(
            manager.active_account().await.map(|a| a.id),
            Some("acct2".to_string())
        );
    }

    #[tokio::test]
    async fn test_silent_changed_to_none_is_no_account() {
        let client = Arc::new(RecordingClient::with_accounts(Ok(AccountLookup::Changed {
            prior: Some(NativeAccount::new("acct1", "old-user")),
            current: None,
        })));
        let manager = manager(client);
        manager.initialize(raw_config(vec![])).await.unwrap();

        let err = manager
            .acquire_token_silent(SilentTokenOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoAccount);
    }

    #[tokio::test]
    async fn test_silent_enumeration_failure_is_account_error() {
        let client = Arc::new(RecordingClient::with_accounts(Err(ProviderError::new(
            "keychain locked",
        ))));
        let manager = manager(client);
        manager.initialize(raw_config(vec![])).await.unwrap();

        let err = manager
            .acquire_token_silent(SilentTokenOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::AccountError);
        assert_eq!(err.message, "keychain locked");
    }

    #[tokio::test]
    async fn test_silent_defaults_scopes_and_forwards_force_refresh() {
        let client = Arc::new(RecordingClient::with_accounts(Ok(AccountLookup::Loaded(vec![
            NativeAccount::new("first", "u1"),
            NativeAccount::new("second", "u2"),
        ]))));
        let manager = manager(client.clone());
        manager
            .initialize(raw_config(vec!["https://login.example.com/explicit".into()]))
            .await
            .unwrap();

        let token = manager
            .acquire_token_silent(SilentTokenOptions::default().force_refresh(true))
            .await
            .unwrap();
        assert_eq!(token.account_id, "first");

        let requests = client.silent_requests.lock().unwrap();
        assert_eq!(requests[0].scopes, vec!["User.Read".to_string()]);
        assert!(requests[0].force_refresh);
        assert_eq!(requests[0].authority, "https://login.example.com/explicit");
    }

    #[tokio::test]
    async fn test_silent_for_explicit_account() {
        let client = Arc::new(RecordingClient::with_accounts(Err(ProviderError::new(
            "must not be called",
        ))));
        let manager = manager(client);
        manager.initialize(raw_config(vec![])).await.unwrap();

        let account = normalize::account(&NativeAccount::new("given", "u"));
        let token = manager
            .acquire_token_silent(SilentTokenOptions::new(vec!["read".into()]).for_account(account))
            .await
            .unwrap();
        assert_eq!(token.account_id, "given");
    }

    #[tokio::test]
    async fn test_sign_in_emits_lifecycle_events() {
        let client = Arc::new(RecordingClient::with_accounts(Ok(AccountLookup::Loaded(vec![]))));
        let manager = manager(client);
        let mut events = manager.subscribe();
        manager.initialize(raw_config(vec![])).await.unwrap();

        manager.sign_in(vec![], Some("user@example.com".into())).await.unwrap();

        let mut seen = Vec::new();
        while let Ok(CoreEvent::Auth(event)) = events.try_recv() {
            seen.push(event);
        }
        assert!(matches!(seen[0], AuthEvent::Initialized { reused: false, .. }));
        assert!(matches!(seen[1], AuthEvent::SigningIn { .. }));
        assert!(seen.iter().any(|e| matches!(
            e,
            AuthEvent::ActiveAccountChanged { previous: None, current: Some(id) } if id == "acct1"
        )));
        assert!(matches!(seen.last(), Some(AuthEvent::SignedIn { account_id }) if account_id == "acct1"));
    }

    #[tokio::test]
    async fn test_initialize_from_source_without_source() {
        let client = Arc::new(RecordingClient::with_accounts(Ok(AccountLookup::Loaded(vec![]))));
        let manager = manager(client);

        let err = manager.initialize_from_source().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoContext);
        assert!(!manager.is_initialized().await);
    }
}
