//! Core service façade and bootstrap helpers.
//!
//! This crate wires a host's [`CoreConfig`] into the authentication core and
//! exposes the uniform command surface (`initialize`, `signIn`,
//! `acquireTokenSilent`, `signOut`, `getCurrentAccount`). Desktop apps typically
//! enable the `desktop-shims` feature, which pulls in the file configuration
//! source and window presentation from `bridge-desktop`.

pub mod command;
pub mod error;

pub use command::{MethodCall, MethodResponse, TokenPayload};
pub use error::{CoreError, Result};

use std::sync::Arc;

use command::Arguments;
use core_auth::{AuthError, AuthManager, ErrorKind, SilentTokenOptions};
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventBus, EventStream};
use core_runtime::logging::{init_logging, LoggingConfig};
use serde_json::Value;
use tracing::{debug, instrument, warn};

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop::{DesktopPresentation, FileConfigSource};

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    manager: Arc<AuthManager>,
    event_bus: EventBus,
}

impl CoreService {
    /// Build the service from a validated configuration.
    ///
    /// A configured `logger_sink` is installed as the global tracing subscriber; if
    /// one is already installed the sink is skipped with a warning.
    pub fn new(config: CoreConfig) -> Result<Self> {
        config.validate()?;

        if let Some(sink) = config.logger_sink.clone() {
            if let Err(err) = init_logging(LoggingConfig::default().with_logger_sink(sink)) {
                warn!(error = %err, "Host log forwarding not installed");
            }
        }

        let event_bus = EventBus::new(config.event_buffer_size);
        let mut manager = AuthManager::new(
            Arc::clone(&config.identity_provider),
            event_bus.clone(),
            config.auth.clone(),
        )?
        .with_platform(config.platform)
        .with_clock(Arc::clone(&config.clock));

        if let Some(surface) = config.presentation.clone() {
            manager = manager.with_presentation(surface);
        }
        if let Some(source) = config.config_source.clone() {
            manager = manager.with_config_source(source);
        }

        Ok(Self {
            manager: Arc::new(manager),
            event_bus,
        })
    }

    /// The underlying authentication manager, for typed (non-channel) callers.
    pub fn manager(&self) -> Arc<AuthManager> {
        Arc::clone(&self.manager)
    }

    /// Stream of lifecycle events from now on.
    pub fn events(&self) -> EventStream {
        EventStream::new(self.event_bus.subscribe())
    }

    /// Dispatch one host call. Never fails: every outcome is a [`MethodResponse`].
    #[instrument(skip(self, call), fields(method = %call.method))]
    pub async fn handle(&self, call: MethodCall) -> MethodResponse {
        let outcome = match call.method.as_str() {
            command::METHOD_INITIALIZE => self.initialize(&call.arguments).await,
            command::METHOD_SIGN_IN => self.sign_in(&call.arguments).await,
            command::METHOD_ACQUIRE_TOKEN_SILENT => self.acquire_token_silent(&call.arguments).await,
            command::METHOD_SIGN_OUT => self.manager.sign_out().await.map(|_| Value::Null),
            command::METHOD_GET_CURRENT_ACCOUNT => self.current_account().await,
            other => {
                debug!(method = other, "Unknown method");
                return MethodResponse::NotImplemented;
            }
        };

        match outcome {
            Ok(payload) => MethodResponse::Success { payload },
            Err(err) => MethodResponse::from(err),
        }
    }

    async fn initialize(&self, arguments: &Value) -> std::result::Result<Value, AuthError> {
        let args = Arguments::parse(arguments)?;
        if args.contains_any(&[
            "clientId",
            "authority",
            "authorities",
            "redirectUri",
            "tenantId",
        ]) {
            self.manager.initialize(args.client_config()?).await?;
        } else {
            self.manager.initialize_from_source().await?;
        }
        Ok(Value::Null)
    }

    async fn sign_in(&self, arguments: &Value) -> std::result::Result<Value, AuthError> {
        let args = Arguments::parse(arguments)?;
        let scopes = args.strings("scopes")?.unwrap_or_default();
        let login_hint = args.string("loginHint")?;

        let token = self.manager.sign_in(scopes, login_hint).await?;
        command::token_payload(ErrorKind::SignInError, &token)
    }

    async fn acquire_token_silent(&self, arguments: &Value) -> std::result::Result<Value, AuthError> {
        let args = Arguments::parse(arguments)?;
        let options = SilentTokenOptions::new(args.strings("scopes")?.unwrap_or_default())
            .force_refresh(args.boolean("forceRefresh")?.unwrap_or(false));

        let token = self.manager.acquire_token_silent(options).await?;
        command::token_payload(ErrorKind::SilentError, &token)
    }

    async fn current_account(&self) -> std::result::Result<Value, AuthError> {
        let account = self.manager.current_account().await?;
        command::account_payload(account.map(|a| a.projection()))
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// Reads `msal_config.json` / `auth_config.json` from `FileConfigSource`'s default
/// location and presents interactive flows on `window`.
///
/// ```ignore
/// use core_service::{bootstrap_desktop, DesktopPresentation, MethodCall};
/// use std::sync::Arc;
///
/// let window = Arc::new(DesktopPresentation::new());
/// let core = bootstrap_desktop(Arc::new(MyOAuthProvider::new()), window.clone())?;
/// window.attach("main-window");
/// let response = core.handle(MethodCall::bare("initialize")).await;
/// ```
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop(
    provider: Arc<dyn bridge_traits::IdentityProvider>,
    window: Arc<DesktopPresentation>,
) -> Result<CoreService> {
    let config = CoreConfig::builder()
        .identity_provider(provider)
        .config_source(Arc::new(FileConfigSource::default_location()))
        .presentation(window)
        .platform(bridge_traits::HostPlatform::Desktop)
        .build()?;
    CoreService::new(config)
}
