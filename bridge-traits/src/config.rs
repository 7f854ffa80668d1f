//! External configuration sources.
//!
//! Hosts differ in where client settings come from: iOS passes them as call
//! arguments, Android reads a JSON resource bundled with the app. Both are
//! expressed as a [`ConfigSource`] that yields an unvalidated
//! [`RawClientConfig`]; validation is the core's job.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Unvalidated client settings exactly as a source supplied them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawClientConfig {
    pub client_id: Option<String>,
    pub authority: Option<String>,
    pub redirect_uri: Option<String>,
    pub tenant_id: Option<String>,
    /// Authorities declared for token requests, in declared order.
    #[serde(default)]
    pub authorities: Vec<String>,
}

/// A place client settings can be loaded from.
///
/// Implementations report:
/// - [`BridgeError::NotAvailable`](crate::BridgeError::NotAvailable) when the host
///   context needed to look anything up is missing
/// - [`BridgeError::NotFound`](crate::BridgeError::NotFound) when no configuration exists
/// - [`BridgeError::InvalidData`](crate::BridgeError::InvalidData) when it exists but
///   cannot be parsed
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn load(&self) -> Result<RawClientConfig>;

    /// Short description used in log lines.
    fn describe(&self) -> String {
        "config source".to_string()
    }
}
