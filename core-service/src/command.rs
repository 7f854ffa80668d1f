//! Command surface shared by every host.
//!
//! Hosts forward `(method, arguments)` pairs from their channel (Flutter method
//! channel, JNI, Swift) as a [`MethodCall`] and send the [`MethodResponse`] back
//! unchanged.

use bridge_traits::RawClientConfig;
use core_auth::{AccountProjection, AuthError, ErrorKind, TokenResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const METHOD_INITIALIZE: &str = "initialize";
pub const METHOD_SIGN_IN: &str = "signIn";
pub const METHOD_ACQUIRE_TOKEN_SILENT: &str = "acquireTokenSilent";
pub const METHOD_SIGN_OUT: &str = "signOut";
pub const METHOD_GET_CURRENT_ACCOUNT: &str = "getCurrentAccount";

/// One invocation from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }

    /// A call without arguments.
    pub fn bare(method: impl Into<String>) -> Self {
        Self::new(method, Value::Null)
    }
}

/// Exactly one of a payload, an error triple, or "not implemented".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MethodResponse {
    /// `payload` is `null` for commands without a result.
    Success { payload: Value },
    Error {
        code: String,
        message: String,
        details: Option<String>,
    },
    NotImplemented,
}

impl MethodResponse {
    pub fn empty() -> Self {
        MethodResponse::Success {
            payload: Value::Null,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MethodResponse::Success { .. })
    }

    /// Error code, if this is an error.
    pub fn error_code(&self) -> Option<&str> {
        match self {
            MethodResponse::Error { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<AuthError> for MethodResponse {
    fn from(err: AuthError) -> Self {
        MethodResponse::Error {
            code: err.code().to_string(),
            message: err.message,
            details: err.details,
        }
    }
}

/// Wire shape of a token result. `expiresOn` is epoch milliseconds (UTC).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPayload {
    pub access_token: String,
    pub id_token: Option<String>,
    pub scopes: Vec<String>,
    pub expires_on: i64,
    pub account_id: String,
}

impl From<&TokenResult> for TokenPayload {
    fn from(token: &TokenResult) -> Self {
        Self {
            access_token: token.access_token.clone(),
            id_token: token.id_token.clone(),
            scopes: token.granted_scopes.clone(),
            expires_on: token.expires_on_millis(),
            account_id: token.account_id.clone(),
        }
    }
}

/// Encode a token for the operation `kind`; an encoding fault is reported as that
/// operation's failure.
pub(crate) fn token_payload(kind: ErrorKind, token: &TokenResult) -> Result<Value, AuthError> {
    serde_json::to_value(TokenPayload::from(token)).map_err(|err| encode_failure(kind, err))
}

pub(crate) fn account_payload(account: Option<AccountProjection>) -> Result<Value, AuthError> {
    match account {
        Some(projection) => serde_json::to_value(projection)
            .map_err(|err| encode_failure(ErrorKind::AccountError, err)),
        None => Ok(Value::Null),
    }
}

fn encode_failure(kind: ErrorKind, err: serde_json::Error) -> AuthError {
    AuthError::new(kind, "Failed to encode result payload").with_details(err.to_string())
}

/// Typed view over the argument map of a call.
pub(crate) struct Arguments<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Arguments<'a> {
    /// `null` is treated as "no arguments"; anything other than an object is rejected.
    pub(crate) fn parse(value: &'a Value) -> Result<Self, AuthError> {
        match value {
            Value::Null => Ok(Self { map: None }),
            Value::Object(map) => Ok(Self { map: Some(map) }),
            _ => Err(invalid("arguments", "an object")),
        }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map
            .and_then(|m| m.get(key))
            .filter(|v| !v.is_null())
    }

    pub(crate) fn contains_any(&self, keys: &[&str]) -> bool {
        keys.iter().any(|key| self.get(key).is_some())
    }

    pub(crate) fn string(&self, key: &str) -> Result<Option<String>, AuthError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(invalid(key, "a string")),
        }
    }

    pub(crate) fn boolean(&self, key: &str) -> Result<Option<bool>, AuthError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(invalid(key, "a boolean")),
        }
    }

    pub(crate) fn strings(&self, key: &str) -> Result<Option<Vec<String>>, AuthError> {
        let Some(value) = self.get(key) else {
            return Ok(None);
        };
        let Value::Array(items) = value else {
            return Err(invalid(key, "a list of strings"));
        };
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                _ => Err(invalid(key, "a list of strings")),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    /// Client settings passed inline (`clientId`, `authority`, `redirectUri`,
    /// `tenantId`, `authorities`).
    pub(crate) fn client_config(&self) -> Result<RawClientConfig, AuthError> {
        Ok(RawClientConfig {
            client_id: self.string("clientId")?,
            authority: self.string("authority")?,
            redirect_uri: self.string("redirectUri")?,
            tenant_id: self.string("tenantId")?,
            authorities: self.strings("authorities")?.unwrap_or_default(),
        })
    }
}

fn invalid(key: &str, expected: &str) -> AuthError {
    AuthError::new(
        ErrorKind::InvalidArgs,
        format!("Argument '{}' must be {}", key, expected),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_arguments_typing() {
        let value = json!({
            "scopes": ["read", "write"],
            "forceRefresh": true,
            "loginHint": null,
        });
        let args = Arguments::parse(&value).unwrap();

        assert_eq!(
            args.strings("scopes").unwrap(),
            Some(vec!["read".to_string(), "write".to_string()])
        );
        assert_eq!(args.boolean("forceRefresh").unwrap(), Some(true));
        assert_eq!(args.string("loginHint").unwrap(), None);
        assert_eq!(args.string("missing").unwrap(), None);
    }

    #[test]
    fn test_wrong_types_are_invalid_args() {
        let value = json!({
            "scopes": "read",
            "mixed": ["read", 1],
            "forceRefresh": "yes",
        });
        let args = Arguments::parse(&value).unwrap();

        assert_eq!(args.strings("scopes").unwrap_err().kind, ErrorKind::InvalidArgs);
        assert_eq!(args.strings("mixed").unwrap_err().kind, ErrorKind::InvalidArgs);
        assert_eq!(args.boolean("forceRefresh").unwrap_err().kind, ErrorKind::InvalidArgs);

        let err = Arguments::parse(&json!(["not", "an", "object"])).err().unwrap();
        assert_eq!(err.kind, ErrorKind::InvalidArgs);
    }

    #[test]
    fn test_client_config_arguments() {
        let value = json!({
            "clientId": "abc",
            "authority": "https://login.example.com/tenant",
            "redirectUri": "msauth.com.example://auth",
        });
        let args = Arguments::parse(&value).unwrap();
        assert!(args.contains_any(&["clientId", "authority"]));

        let raw = args.client_config().unwrap();
        assert_eq!(raw.client_id.as_deref(), Some("abc"));
        assert_eq!(raw.tenant_id, None);
        assert!(raw.authorities.is_empty());

        let empty = Value::Null;
        assert!(!Arguments::parse(&empty).unwrap().contains_any(&["clientId"]));
    }

    #[test]
    fn test_encode_failure_keeps_operation_kind() {
        let err = serde_json::from_str::<Value>("{").unwrap_err();
        let failure = encode_failure(ErrorKind::SilentError, err);
        assert_eq!(failure.kind, ErrorKind::SilentError);
        assert!(failure.details.is_some());
        assert_ne!(failure.kind, ErrorKind::InvalidArgs);
    }

    #[test]
    fn test_token_payload_shape() {
        let token = TokenResult {
            access_token: "tok1".into(),
            id_token: None,
            granted_scopes: vec!["read".into()],
            expires_on: chrono::TimeZone::timestamp_opt(&chrono::Utc, 0, 0).unwrap(),
            account_id: "acct1".into(),
        };
        assert_eq!(
            token_payload(ErrorKind::SignInError, &token).unwrap(),
            json!({
                "accessToken": "tok1",
                "idToken": null,
                "scopes": ["read"],
                "expiresOn": 0,
                "accountId": "acct1",
            })
        );
        assert_eq!(account_payload(None).unwrap(), Value::Null);
    }

    #[test]
    fn test_error_response_shape() {
        let response = MethodResponse::from(
            AuthError::new(ErrorKind::SilentError, "expired").with_details("invalid_grant"),
        );
        assert_eq!(response.error_code(), Some("SILENT_ERROR"));
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "status": "error",
                "code": "SILENT_ERROR",
                "message": "expired",
                "details": "invalid_grant",
            })
        );
        assert_eq!(
            serde_json::to_value(MethodResponse::empty()).unwrap(),
            json!({"status": "success", "payload": null})
        );
    }
}
