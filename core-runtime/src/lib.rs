//! # Core Runtime Module
//!
//! Runtime infrastructure shared by the identity bridge crates:
//! - Logging and tracing setup with host log forwarding
//! - Auth lifecycle event bus
//! - Capability-checked configuration
//!
//! ## Overview
//!
//! Nothing in here knows about tokens or accounts beyond event payloads. The
//! authentication state machine lives in `core-auth`; this crate gives it a place
//! to log, publish and read its settings from.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
