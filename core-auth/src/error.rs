use bridge_traits::HostPlatform;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The closed set of failure kinds an operation can report.
///
/// Each kind has a stable wire code (see [`ErrorKind::code`]) that hosts branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidArgs,
    InvalidAuthority,
    MissingConfig,
    NoContext,
    InitError,
    NotInitialized,
    /// No foreground activity to present on (Android, desktop).
    NoActivity,
    /// No presenting view controller (iOS).
    NoViewController,
    SignInError,
    /// The user dismissed the flow. Never an error in the retry sense.
    Cancelled,
    NoAccount,
    AccountError,
    SilentError,
    SignOutError,
}

impl ErrorKind {
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgs => "INVALID_ARGS",
            ErrorKind::InvalidAuthority => "INVALID_AUTHORITY",
            ErrorKind::MissingConfig => "MISSING_CONFIG",
            ErrorKind::NoContext => "NO_CONTEXT",
            ErrorKind::InitError => "INIT_ERROR",
            ErrorKind::NotInitialized => "NOT_INITIALIZED",
            ErrorKind::NoActivity => "NO_ACTIVITY",
            ErrorKind::NoViewController => "NO_VIEW_CONTROLLER",
            ErrorKind::SignInError => "SIGN_IN_ERROR",
            ErrorKind::Cancelled => "CANCELLED",
            ErrorKind::NoAccount => "NO_ACCOUNT",
            ErrorKind::AccountError => "ACCOUNT_ERROR",
            ErrorKind::SilentError => "SILENT_ERROR",
            ErrorKind::SignOutError => "SIGN_OUT_ERROR",
        }
    }

    /// Kind reported when no presentation surface can be resolved.
    pub fn missing_surface(platform: HostPlatform) -> Self {
        match platform {
            HostPlatform::Ios => ErrorKind::NoViewController,
            HostPlatform::Android | HostPlatform::Desktop => ErrorKind::NoActivity,
        }
    }

    /// Whether the same call (or an interactive one) may succeed later without
    /// changing the configuration.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ErrorKind::NoActivity
                | ErrorKind::NoViewController
                | ErrorKind::SignInError
                | ErrorKind::Cancelled
                | ErrorKind::NoAccount
                | ErrorKind::AccountError
                | ErrorKind::SilentError
                | ErrorKind::SignOutError
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Normalized failure: `(kind, message, details?)`.
///
/// `message` is free text (often provider supplied); branch on `kind` only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct AuthError {
    pub kind: ErrorKind,
    pub message: String,
    pub details: Option<String>,
}

impl AuthError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == ErrorKind::Cancelled
    }

    pub fn not_initialized() -> Self {
        Self::new(
            ErrorKind::NotInitialized,
            "Authentication client is not initialized. Call initialize first.",
        )
    }

    pub fn no_account() -> Self {
        Self::new(ErrorKind::NoAccount, "No account available")
    }

    pub fn missing_surface(platform: HostPlatform) -> Self {
        Self::new(
            ErrorKind::missing_surface(platform),
            format!("No {} available to present sign-in", platform.surface_name()),
        )
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;

/// Result of one public operation: exactly one of a payload or an [`AuthError`].
pub type OperationOutcome<T> = Result<T>;
