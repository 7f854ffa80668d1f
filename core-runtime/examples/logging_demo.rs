//! Logging setup for an authentication host.
//!
//! Run with:
//! ```bash
//! cargo run --example logging_demo
//! cargo run --example logging_demo -- json
//! cargo run --example logging_demo -- compact "core_auth=trace"
//! ```

use bridge_traits::LogLevel;
use core_runtime::logging::{
    init_logging, mask_identifier, redact_if_sensitive, LogFormat, LoggingConfig,
};
use std::env;
use tracing::{debug, info, instrument, warn};

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();

    let format = match args.get(1).map(String::as_str) {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        _ => LogFormat::Pretty,
    };

    let mut config = LoggingConfig::default()
        .with_format(format)
        .with_level(LogLevel::Trace)
        .with_pii_redaction(true)
        .with_spans(true)
        .with_target(true);
    if let Some(filter) = args.get(2) {
        config = config.with_filter(filter.clone());
    }

    if let Err(err) = init_logging(config) {
        eprintln!("logging setup failed: {}", err);
        return;
    }

    info!(format = ?format, "Logging initialized");
    sign_in("user@example.com", "00000000-0000-0000-0000-000000000001").await;
}

#[instrument(skip(login_hint, account_id))]
async fn sign_in(login_hint: &str, account_id: &str) {
    debug!(
        login_hint = %redact_if_sensitive("login_hint", login_hint),
        "Presenting interactive flow"
    );

    let access_token = "eyJ0eXAiOiJKV1QiLCJhbGciOi";
    info!(
        account = %mask_identifier(account_id),
        access_token = %redact_if_sensitive("access_token", access_token),
        "Interactive sign-in completed"
    );

    warn!(code = "SILENT_ERROR", "Silent renewal failed; caller may retry interactively");
}
