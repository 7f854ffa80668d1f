//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the authentication core and the
//! platform-specific bindings around it. The core never talks to a native
//! identity SDK, a window system or a resource loader directly; it only sees
//! the traits below, and each host (Android, iOS, desktop) ships adapters.
//!
//! ## Traits
//!
//! ### Identity
//! - [`IdentityProvider`](identity::IdentityProvider) - Creates native SDK clients
//! - [`NativeClient`](identity::NativeClient) - Interactive/silent acquisition, account
//!   enumeration and removal
//!
//! ### Host integration
//! - [`ConfigSource`](config::ConfigSource) - Where the client id / authority come from
//! - [`PresentationSurface`](presentation::PresentationSurface) - Foreground surface for
//!   interactive flows (Activity / ViewController / window)
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! Host capability failures use [`BridgeError`](error::BridgeError). Failures reported
//! by the native identity SDK use [`ProviderError`](identity::ProviderError) and are
//! always normalized by the core before reaching a caller.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so the core can share adapters across
//! async tasks. Native SDK callbacks may be delivered on any thread.

pub mod config;
pub mod error;
pub mod identity;
pub mod log;
pub mod platform;
pub mod presentation;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use config::{ConfigSource, RawClientConfig};
pub use identity::{
    AccountLookup, IdentityProvider, InteractiveTokenRequest, NativeAccount, NativeAuthResult,
    NativeClient, NativeClientConfig, ProviderError, ProviderOutcome, SilentTokenRequest,
};
pub use log::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use platform::HostPlatform;
pub use presentation::{PresentationContext, PresentationSurface};
pub use time::{Clock, FixedClock, SystemClock};
