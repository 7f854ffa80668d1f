//! Result/Error Normalizer
//!
//! Converts what the native SDK reports into the core's types. Provider types
//! stop here: callers only ever see [`TokenResult`], [`Account`] and [`AuthError`].

use bridge_traits::identity::{NativeAccount, NativeAuthResult, ProviderError};
use chrono::{DateTime, Utc};
use url::Url;

use crate::error::{AuthError, ErrorKind};
use crate::types::{Account, TokenResult};

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Normalize an SDK account. Missing identifier and username become `""`; a blank
/// or unparseable authority is dropped.
pub fn account(native: &NativeAccount) -> Account {
    Account {
        id: native.identifier.clone().unwrap_or_default(),
        username: native.username.clone().unwrap_or_default(),
        display_name: present(&native.name),
        tenant_id: present(&native.tenant_id),
        environment: present(&native.environment),
        remembered_authority: present(&native.authority).and_then(|a| Url::parse(&a).ok()),
        native: native.clone(),
    }
}

/// Normalize an acquisition result into the token and the account it belongs to.
///
/// A missing expiry becomes the Unix epoch (0 ms).
pub fn token(native: NativeAuthResult) -> (TokenResult, Account) {
    let account = account(&native.account);
    let token = TokenResult {
        access_token: native.access_token,
        id_token: native.id_token,
        granted_scopes: native.scopes,
        expires_on: native.expires_on.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
        account_id: account.id.clone(),
    };
    (token, account)
}

/// Map a provider failure to the error kind of the operation that was running.
pub fn provider_failure(kind: ErrorKind, err: ProviderError) -> AuthError {
    let message = if err.message.trim().is_empty() {
        default_message(kind).to_string()
    } else {
        err.message
    };

    let details = match (err.code, err.details) {
        (Some(code), Some(details)) => Some(format!("{}: {}", code, details)),
        (Some(code), None) => Some(code),
        (None, details) => details,
    };

    AuthError {
        kind,
        message,
        details,
    }
}

fn default_message(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::InitError => "Failed to create authentication client",
        ErrorKind::SignInError => "Interactive sign-in failed",
        ErrorKind::SilentError => "Silent token acquisition failed",
        ErrorKind::AccountError => "Failed to load accounts",
        ErrorKind::SignOutError => "Failed to remove account",
        _ => "Authentication operation failed",
    }
}

/// The error reported when the user dismissed the flow.
pub fn cancelled() -> AuthError {
    AuthError::new(ErrorKind::Cancelled, "User cancelled the operation")
}
