use bridge_traits::identity::{NativeAccount, NativeClientConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

/// Validated client settings.
///
/// Immutable once a client has been created from it. Two configurations are
/// "identical" for re-initialization purposes when they compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfiguration {
    pub client_id: String,
    pub authority: Url,
    pub redirect_uri: Option<String>,
    pub tenant_id: Option<String>,
    /// Authorities the source declared explicitly, in declared order. Empty when
    /// the source only named the primary authority.
    pub authorities: Vec<Url>,
}

impl ClientConfiguration {
    pub fn new(client_id: impl Into<String>, authority: Url) -> Self {
        Self {
            client_id: client_id.into(),
            authority,
            redirect_uri: None,
            tenant_id: None,
            authorities: Vec::new(),
        }
    }

    pub fn with_redirect_uri(mut self, redirect_uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    pub fn with_authorities(mut self, authorities: Vec<Url>) -> Self {
        self.authorities = authorities;
        self
    }

    pub(crate) fn to_native(&self) -> NativeClientConfig {
        NativeClientConfig {
            client_id: self.client_id.clone(),
            authority: self.authority.to_string(),
            redirect_uri: self.redirect_uri.clone(),
            tenant_id: self.tenant_id.clone(),
            authorities: self.authorities.iter().map(Url::to_string).collect(),
        }
    }
}

/// The signed-in account, normalized from what the SDK reported.
///
/// Keeps the SDK's own description so it can be handed back for silent renewal
/// and removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// `""` when the SDK reported no identifier.
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub tenant_id: Option<String>,
    pub environment: Option<String>,
    /// Authority the account last authenticated against, if non-blank and parseable.
    pub remembered_authority: Option<Url>,
    pub(crate) native: NativeAccount,
}

impl Account {
    pub fn native(&self) -> &NativeAccount {
        &self.native
    }

    /// Host-facing view; absent fields become empty strings.
    pub fn projection(&self) -> AccountProjection {
        AccountProjection {
            id: self.id.clone(),
            username: self.username.clone(),
            name: self.display_name.clone().unwrap_or_default(),
            tenant_id: self.tenant_id.clone().unwrap_or_default(),
            environment: self.environment.clone().unwrap_or_default(),
        }
    }
}

/// Account as returned by `getCurrentAccount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountProjection {
    pub id: String,
    pub username: String,
    pub name: String,
    pub tenant_id: String,
    pub environment: String,
}

/// Token acquisition result. Never persisted by the core.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenResult {
    pub access_token: String,
    pub id_token: Option<String>,
    pub granted_scopes: Vec<String>,
    /// Epoch (1970-01-01) when the SDK reported no expiry.
    pub expires_on: DateTime<Utc>,
    pub account_id: String,
}

impl TokenResult {
    pub fn expires_on_millis(&self) -> i64 {
        self.expires_on.timestamp_millis()
    }
}

impl fmt::Debug for TokenResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenResult")
            .field("access_token", &"[REDACTED]")
            .field("id_token", &self.id_token.as_ref().map(|_| "[REDACTED]"))
            .field("granted_scopes", &self.granted_scopes)
            .field("expires_on", &self.expires_on)
            .field("account_id", &self.account_id)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AcquisitionMode {
    Interactive,
    Silent,
}

impl fmt::Display for AcquisitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquisitionMode::Interactive => f.write_str("interactive"),
            AcquisitionMode::Silent => f.write_str("silent"),
        }
    }
}

/// Lifecycle of one acquisition request.
///
/// ```text
/// Idle -> Requested -> Completed
///                   -> Cancelled
///                   -> Failed
/// ```
///
/// A request may also fail straight from `Idle` when a precondition is not met
/// before the provider is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestState {
    Idle,
    Requested,
    Completed,
    Cancelled,
    Failed,
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestState::Completed | RequestState::Cancelled | RequestState::Failed
        )
    }

    fn can_transition_to(&self, next: RequestState) -> bool {
        matches!(
            (self, next),
            (RequestState::Idle, RequestState::Requested)
                | (RequestState::Idle, RequestState::Failed)
                | (RequestState::Requested, RequestState::Completed)
                | (RequestState::Requested, RequestState::Cancelled)
                | (RequestState::Requested, RequestState::Failed)
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid request transition {from:?} -> {to:?}")]
pub struct InvalidTransition {
    pub from: RequestState,
    pub to: RequestState,
}

/// One interactive or silent acquisition, tracked for logging.
#[derive(Debug, Clone)]
pub struct AcquisitionRequest {
    pub id: Uuid,
    pub mode: AcquisitionMode,
    pub scopes: Vec<String>,
    state: RequestState,
}

impl AcquisitionRequest {
    pub fn new(mode: AcquisitionMode, scopes: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            mode,
            scopes,
            state: RequestState::Idle,
        }
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn transition(&mut self, next: RequestState) -> std::result::Result<(), InvalidTransition> {
        if !self.state.can_transition_to(next) {
            return Err(InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_happy_path() {
        let mut request = AcquisitionRequest::new(AcquisitionMode::Silent, vec!["read".into()]);
        assert_eq!(request.state(), RequestState::Idle);

        request.transition(RequestState::Requested).unwrap();
        request.transition(RequestState::Completed).unwrap();
        assert!(request.state().is_terminal());
    }

    #[test]
    fn test_terminal_states_are_final() {
        for terminal in [
            RequestState::Completed,
            RequestState::Cancelled,
            RequestState::Failed,
        ] {
            let mut request = AcquisitionRequest::new(AcquisitionMode::Interactive, vec![]);
            request.transition(RequestState::Requested).unwrap();
            request.transition(terminal).unwrap();

            let err = request.transition(RequestState::Requested).unwrap_err();
            assert_eq!(err.from, terminal);
            assert_eq!(request.state(), terminal);
        }
    }

    #[test]
    fn test_cannot_complete_without_request() {
        let mut request = AcquisitionRequest::new(AcquisitionMode::Interactive, vec![]);
        assert!(request.transition(RequestState::Completed).is_err());
        assert!(request.transition(RequestState::Cancelled).is_err());
        assert!(request.transition(RequestState::Failed).is_ok());
    }

    #[test]
    fn test_projection_fills_blanks() {
        let account = Account {
            id: "acct1".into(),
            username: "user@example.com".into(),
            display_name: None,
            tenant_id: Some("tenant".into()),
            environment: None,
            remembered_authority: None,
            native: NativeAccount::new("acct1", "user@example.com"),
        };

        let projection = account.projection();
        assert_eq!(projection.name, "");
        assert_eq!(projection.environment, "");
        assert_eq!(projection.tenant_id, "tenant");

        let json = serde_json::to_value(&projection).unwrap();
        assert_eq!(json["tenantId"], "tenant");
    }

    #[test]
    fn test_token_debug_redacts() {
        let token = TokenResult {
            access_token: "at-secret".into(),
            id_token: Some("idt-secret".into()),
            granted_scopes: vec!["read".into()],
            expires_on: DateTime::<Utc>::UNIX_EPOCH,
            account_id: "acct1".into(),
        };
        let debug = format!("{:?}", token);
        assert!(!debug.contains("at-secret"));
        assert!(!debug.contains("idt-secret"));
        assert_eq!(token.expires_on_millis(), 0);
    }

    #[test]
    fn test_native_config_round_trips_authorities() {
        let config = ClientConfiguration::new(
            "abc",
            Url::parse("https://login.example.com/tenant").unwrap(),
        )
        .with_authorities(vec![Url::parse("https://login.example.com/other").unwrap()]);

        let native = config.to_native();
        assert_eq!(native.client_id, "abc");
        assert_eq!(native.authority, "https://login.example.com/tenant");
        assert_eq!(native.authorities, vec!["https://login.example.com/other"]);
    }
}
