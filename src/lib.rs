//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (`core-service` and, through it, `core-auth` and the host
//! bridges). Host applications can depend on `identity-bridge-workspace` and
//! enable the documented features without needing to wire each crate
//! individually.

#[cfg(feature = "desktop-shims")]
pub use core_service;
