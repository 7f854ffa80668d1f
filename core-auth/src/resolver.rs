//! Configuration Resolver
//!
//! Loads client settings from a [`ConfigSource`] and validates them before any
//! client is created. Validation is pure: no network, no provider calls.

use async_trait::async_trait;
use bridge_traits::config::{ConfigSource, RawClientConfig};
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use tracing::{debug, warn};
use url::Url;

use crate::error::{AuthError, ErrorKind, Result};
use crate::types::ClientConfiguration;

/// Settings passed directly as call arguments (the iOS style).
///
/// A lone `authority` argument is the client's declared authority, so silent
/// renewal keeps using it. Only file configurations without an `authorities` list
/// leave the choice to the account and the fallback.
#[derive(Debug, Clone, Default)]
pub struct ArgumentsConfigSource {
    raw: RawClientConfig,
}

impl ArgumentsConfigSource {
    pub fn new(raw: RawClientConfig) -> Self {
        Self { raw }
    }
}

#[async_trait]
impl ConfigSource for ArgumentsConfigSource {
    async fn load(&self) -> BridgeResult<RawClientConfig> {
        let mut raw = self.raw.clone();
        if raw.authorities.iter().all(|a| a.trim().is_empty()) {
            if let Some(authority) = raw.authority.as_deref().filter(|a| !a.trim().is_empty()) {
                raw.authorities = vec![authority.to_string()];
            }
        }
        Ok(raw)
    }

    fn describe(&self) -> String {
        "call arguments".to_string()
    }
}

/// Load and validate configuration from `source`.
///
/// Source failures map to:
/// - no host context → `NO_CONTEXT`
/// - nothing found → `MISSING_CONFIG`
/// - unparseable content → `INVALID_ARGS`
pub async fn resolve(source: &dyn ConfigSource) -> Result<ClientConfiguration> {
    debug!(source = %source.describe(), "Resolving client configuration");
    let raw = source.load().await.map_err(source_failure)?;
    validate(raw)
}

fn source_failure(err: BridgeError) -> AuthError {
    warn!(error = %err, "Configuration source failed");
    match err {
        BridgeError::NotAvailable(message) => AuthError::new(ErrorKind::NoContext, message),
        BridgeError::NotFound(message) => AuthError::new(ErrorKind::MissingConfig, message),
        BridgeError::InvalidData(message) => AuthError::new(ErrorKind::InvalidArgs, message),
        other => AuthError::new(ErrorKind::MissingConfig, other.to_string()),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_authority(value: &str) -> Result<Url> {
    let invalid = || {
        AuthError::new(ErrorKind::InvalidAuthority, "Invalid authority URL")
            .with_details(value.to_string())
    };
    let url = Url::parse(value).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "https" | "http") || url.host_str().is_none() {
        return Err(invalid());
    }
    Ok(url)
}

/// Validate raw settings into a [`ClientConfiguration`].
///
/// `client_id` and an authority are required (`INVALID_ARGS`); every authority must
/// be an absolute http(s) URL (`INVALID_AUTHORITY`). When only an `authorities` list
/// is given its first entry becomes the primary authority.
pub fn validate(raw: RawClientConfig) -> Result<ClientConfiguration> {
    let client_id = non_blank(raw.client_id);
    let authority = non_blank(raw.authority);
    let declared: Vec<&str> = raw
        .authorities
        .iter()
        .map(|a| a.trim())
        .filter(|a| !a.is_empty())
        .collect();

    let Some(client_id) = client_id.filter(|_| authority.is_some() || !declared.is_empty())
    else {
        return Err(AuthError::new(
            ErrorKind::InvalidArgs,
            "Missing required arguments: clientId or authority",
        ));
    };

    let authorities = declared
        .into_iter()
        .map(parse_authority)
        .collect::<Result<Vec<_>>>()?;
    let authority = match authority {
        Some(authority) => parse_authority(&authority)?,
        None => match authorities.first() {
            Some(first) => first.clone(),
            None => {
                return Err(AuthError::new(
                    ErrorKind::InvalidArgs,
                    "Missing required arguments: clientId or authority",
                ))
            }
        },
    };

    Ok(ClientConfiguration {
        client_id,
        authority,
        redirect_uri: non_blank(raw.redirect_uri),
        tenant_id: non_blank(raw.tenant_id),
        authorities,
    })
}
