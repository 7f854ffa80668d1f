//! # Core Configuration Module
//!
//! Builder-based configuration for the identity bridge core.
//!
//! ## Required Dependencies
//!
//! - `IdentityProvider` - the native SDK seam; nothing works without it
//!
//! ## Optional Dependencies (with platform defaults)
//!
//! - `ConfigSource` - where `initialize` reads settings when the caller passes none
//!   (desktop default: `msal_config.json` / `auth_config.json` in the user config dir)
//! - `PresentationSurface` - surface for interactive sign-in; without one, sign-in
//!   fails with `NO_ACTIVITY` / `NO_VIEW_CONTROLLER`
//! - `Clock` - defaults to the system clock
//! - `LoggerSink` - host log forwarding
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use bridge_traits::HostPlatform;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .identity_provider(Arc::new(MsalProvider::new()))
//!     .presentation(Arc::new(ActivitySurface::new()))
//!     .platform(HostPlatform::Android)
//!     .build()?;
//! ```
//!
//! Building without an identity provider fails with an actionable
//! [`Error::CapabilityMissing`].

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{
    Clock, ConfigSource, HostPlatform, IdentityProvider, LoggerSink, PresentationSurface,
    SystemClock,
};
use std::sync::Arc;
use url::Url;

/// Scope requested when a caller supplies none.
pub const DEFAULT_SCOPE: &str = "User.Read";

/// Authority used for silent renewal when neither the client configuration nor the
/// account names one.
pub const DEFAULT_FALLBACK_AUTHORITY: &str = "https://login.microsoftonline.com/common";

/// Token acquisition defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    /// Scopes used when a sign-in or silent request carries none.
    pub default_scopes: Vec<String>,
    /// Last-resort authority for silent renewal.
    pub fallback_authority: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            default_scopes: vec![DEFAULT_SCOPE.to_string()],
            fallback_authority: DEFAULT_FALLBACK_AUTHORITY.to_string(),
        }
    }
}

impl AuthSettings {
    pub fn with_default_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_fallback_authority(mut self, authority: impl Into<String>) -> Self {
        self.fallback_authority = authority.into();
        self
    }

    /// The fallback authority as a URL.
    pub fn fallback_authority_url(&self) -> Result<Url> {
        let url = Url::parse(&self.fallback_authority).map_err(|e| Error::InvalidSetting {
            field: "fallback_authority",
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "https" | "http") || url.host_str().is_none() {
            return Err(Error::InvalidSetting {
                field: "fallback_authority",
                reason: "must be an absolute http(s) URL".to_string(),
            });
        }
        Ok(url)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_scopes.is_empty() {
            return Err(Error::InvalidSetting {
                field: "default_scopes",
                reason: "at least one default scope is required".to_string(),
            });
        }
        if self.default_scopes.iter().any(|s| s.trim().is_empty()) {
            return Err(Error::InvalidSetting {
                field: "default_scopes",
                reason: "scopes cannot be blank".to_string(),
            });
        }
        self.fallback_authority_url().map(|_| ())
    }
}

/// Everything the core needs from its host.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Native identity SDK (required)
    pub identity_provider: Arc<dyn IdentityProvider>,

    /// Source consulted by `initialize` when no explicit settings are passed
    pub config_source: Option<Arc<dyn ConfigSource>>,

    /// Foreground surface for interactive flows
    pub presentation: Option<Arc<dyn PresentationSurface>>,

    /// Host platform; selects the missing-surface error code
    pub platform: HostPlatform,

    pub clock: Arc<dyn Clock>,

    pub logger_sink: Option<Arc<dyn LoggerSink>>,

    /// Capacity of the lifecycle event channel
    pub event_buffer_size: usize,

    pub auth: AuthSettings,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("identity_provider", &"IdentityProvider { ... }")
            .field(
                "config_source",
                &self.config_source.as_ref().map(|source| source.describe()),
            )
            .field(
                "presentation",
                &self
                    .presentation
                    .as_ref()
                    .map(|_| "PresentationSurface { ... }"),
            )
            .field("platform", &self.platform)
            .field(
                "logger_sink",
                &self.logger_sink.as_ref().map(|_| "LoggerSink { ... }"),
            )
            .field("event_buffer_size", &self.event_buffer_size)
            .field("auth", &self.auth)
            .finish()
    }
}

impl CoreConfig {
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Checks:
    /// - at least one non-blank default scope
    /// - the fallback authority is an absolute http(s) URL
    /// - the event buffer can hold at least one event
    pub fn validate(&self) -> Result<()> {
        self.auth.validate()?;

        if self.event_buffer_size == 0 {
            return Err(Error::InvalidSetting {
                field: "event_buffer_size",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

fn identity_provider_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "IdentityProvider".to_string(),
        message: "An IdentityProvider implementation is required to create authentication clients. \
                 Android: wrap PublicClientApplication. \
                 iOS: wrap MSALPublicClientApplication. \
                 Desktop/tests: inject an OAuth client or a stub provider."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_config_source() -> Option<Arc<dyn ConfigSource>> {
    use bridge_desktop::FileConfigSource;

    let source: Arc<dyn ConfigSource> = Arc::new(FileConfigSource::default_location());
    Some(source)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_config_source() -> Option<Arc<dyn ConfigSource>> {
    None
}

/// Builder for [`CoreConfig`].
#[derive(Default)]
pub struct CoreConfigBuilder {
    identity_provider: Option<Arc<dyn IdentityProvider>>,
    config_source: Option<Arc<dyn ConfigSource>>,
    presentation: Option<Arc<dyn PresentationSurface>>,
    platform: Option<HostPlatform>,
    clock: Option<Arc<dyn Clock>>,
    logger_sink: Option<Arc<dyn LoggerSink>>,
    event_buffer_size: Option<usize>,
    auth: Option<AuthSettings>,
}

impl CoreConfigBuilder {
    pub fn identity_provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.identity_provider = Some(provider);
        self
    }

    /// Overrides the platform default configuration source.
    pub fn config_source(mut self, source: Arc<dyn ConfigSource>) -> Self {
        self.config_source = Some(source);
        self
    }

    pub fn presentation(mut self, surface: Arc<dyn PresentationSurface>) -> Self {
        self.presentation = Some(surface);
        self
    }

    pub fn platform(mut self, platform: HostPlatform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    pub fn auth_settings(mut self, settings: AuthSettings) -> Self {
        self.auth = Some(settings);
        self
    }

    /// Assemble and validate.
    ///
    /// Fails when the identity provider is missing or a setting is out of range.
    pub fn build(self) -> Result<CoreConfig> {
        let identity_provider = self
            .identity_provider
            .ok_or_else(identity_provider_missing_error)?;

        let config_source = match self.config_source {
            Some(source) => Some(source),
            None => provide_default_config_source(),
        };

        let config = CoreConfig {
            identity_provider,
            config_source,
            presentation: self.presentation,
            platform: self.platform.unwrap_or_default(),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            logger_sink: self.logger_sink,
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            auth: self.auth.unwrap_or_default(),
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::identity::{NativeClient, NativeClientConfig, ProviderError};
    use bridge_traits::{FixedClock, PresentationContext};

    mockall::mock! {
        Provider {}

        #[async_trait::async_trait]
        impl IdentityProvider for Provider {
            async fn create_client(
                &self,
                config: NativeClientConfig,
            ) -> std::result::Result<Arc<dyn NativeClient>, ProviderError>;
        }
    }

    struct NoSurface;

    impl PresentationSurface for NoSurface {
        fn resolve(&self) -> Option<PresentationContext> {
            None
        }
    }

    fn provider() -> Arc<dyn IdentityProvider> {
        Arc::new(MockProvider::new())
    }

    #[test]
    fn test_builder_requires_identity_provider() {
        let result = CoreConfig::builder().build();
        match result {
            Err(Error::CapabilityMissing { capability, .. }) => {
                assert_eq!(capability, "IdentityProvider")
            }
            other => panic!("expected CapabilityMissing, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_builder_defaults() {
        let config = CoreConfig::builder()
            .identity_provider(provider())
            .build()
            .unwrap();

        assert_eq!(config.platform, HostPlatform::Desktop);
        assert_eq!(config.event_buffer_size, DEFAULT_EVENT_BUFFER_SIZE);
        assert_eq!(config.auth.default_scopes, vec!["User.Read".to_string()]);
        assert_eq!(
            config.auth.fallback_authority,
            "https://login.microsoftonline.com/common"
        );
        assert!(config.presentation.is_none());
        #[cfg(feature = "desktop-shims")]
        assert!(config.config_source.is_some());
        #[cfg(not(feature = "desktop-shims"))]
        assert!(config.config_source.is_none());
    }

    #[test]
    fn test_builder_with_overrides() {
        let config = CoreConfig::builder()
            .identity_provider(provider())
            .presentation(Arc::new(NoSurface))
            .platform(HostPlatform::Ios)
            .clock(Arc::new(FixedClock::from_millis(42)))
            .event_buffer_size(8)
            .auth_settings(AuthSettings::default().with_default_scopes(["openid", "profile"]))
            .build()
            .unwrap();

        assert_eq!(config.platform, HostPlatform::Ios);
        assert_eq!(config.clock.unix_timestamp_millis(), 42);
        assert_eq!(config.event_buffer_size, 8);
        assert_eq!(config.auth.default_scopes.len(), 2);
        assert!(config.presentation.is_some());
    }

    #[test]
    fn test_validate_rejects_empty_scopes() {
        let result = CoreConfig::builder()
            .identity_provider(provider())
            .auth_settings(AuthSettings::default().with_default_scopes(Vec::<String>::new()))
            .build();

        assert!(matches!(
            result,
            Err(Error::InvalidSetting {
                field: "default_scopes",
                ..
            })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_fallback_authority() {
        for authority in ["not a url", "mailto:someone@example.com"] {
            let result = CoreConfig::builder()
                .identity_provider(provider())
                .auth_settings(AuthSettings::default().with_fallback_authority(authority))
                .build();

            assert!(
                matches!(
                    result,
                    Err(Error::InvalidSetting {
                        field: "fallback_authority",
                        ..
                    })
                ),
                "{} should be rejected",
                authority
            );
        }
    }

    #[test]
    fn test_validate_rejects_zero_event_buffer() {
        let result = CoreConfig::builder()
            .identity_provider(provider())
            .event_buffer_size(0)
            .build();

        assert!(matches!(
            result,
            Err(Error::InvalidSetting {
                field: "event_buffer_size",
                ..
            })
        ));
    }

    #[test]
    fn test_config_debug_hides_bridges() {
        let config = CoreConfig::builder()
            .identity_provider(provider())
            .build()
            .unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("IdentityProvider { ... }"));
    }
}
