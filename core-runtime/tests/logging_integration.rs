//! Integration tests for the logging helpers

use bridge_traits::log::LogLevel;
use core_runtime::logging::{
    init_logging, mask_identifier, redact_if_sensitive, LogFormat, LoggingConfig,
};

#[test]
fn test_tokens_are_always_redacted() {
    for field in ["access_token", "id_token", "refresh_token", "Authorization"] {
        assert_eq!(redact_if_sensitive(field, "value"), "[REDACTED]", "{}", field);
    }
}

#[test]
fn test_usernames_keep_only_first_character() {
    let redacted = redact_if_sensitive("username", "adele.vance@contoso.onmicrosoft.com");
    assert!(redacted.starts_with('a'));
    assert!(!redacted.contains("contoso"));
}

#[test]
fn test_plain_values_pass_through() {
    assert_eq!(redact_if_sensitive("code", "NO_ACCOUNT"), "NO_ACCOUNT");
    assert_eq!(
        redact_if_sensitive("authority", "https://login.microsoftonline.com/common"),
        "https://login.microsoftonline.com/common"
    );
    assert_eq!(redact_if_sensitive("handle", "user@host"), "user@host");
}

#[test]
fn test_mask_identifier_keeps_short_ids() {
    assert_eq!(mask_identifier("acct1"), "acct1");
    assert!(mask_identifier("0b1c2d3e-aaaa-bbbb").starts_with("0b1c2d"));
}

#[test]
fn test_format_selection() {
    #[cfg(debug_assertions)]
    assert_eq!(LoggingConfig::default().format, LogFormat::Pretty);

    #[cfg(not(debug_assertions))]
    assert_eq!(LoggingConfig::default().format, LogFormat::Json);
}

#[test]
fn test_init_logging_only_once() {
    let config = LoggingConfig::default()
        .with_format(LogFormat::Compact)
        .with_level(LogLevel::Warn);

    assert!(init_logging(config.clone()).is_ok());
    assert!(init_logging(config).is_err());
}

#[test]
fn test_invalid_filter_is_rejected() {
    let config = LoggingConfig::default().with_filter("core_auth=notalevel");
    assert!(init_logging(config).is_err());
}
