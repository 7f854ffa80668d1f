//! # Desktop Bridge Implementations
//!
//! Host adapters for desktop platforms (macOS, Windows, Linux) and for tests.
//!
//! ## Overview
//!
//! - [`FileConfigSource`] reads an MSAL-style JSON file, probing
//!   `msal_config.json` then `auth_config.json` in a resource directory
//! - [`DesktopPresentation`] tracks the foreground window the host attaches and
//!   detaches as it comes and goes
//!
//! The identity provider itself is not shipped here; desktop hosts inject their
//! own OAuth client through `bridge_traits::IdentityProvider`.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DesktopPresentation, FileConfigSource};
//! use std::sync::Arc;
//!
//! let surface = Arc::new(DesktopPresentation::new());
//! surface.attach("main-window");
//!
//! let config = CoreConfig::builder()
//!     .identity_provider(provider)
//!     .config_source(Arc::new(FileConfigSource::new("/opt/app/res")))
//!     .presentation(surface.clone())
//!     .build()?;
//! ```

mod config_source;
mod presentation;

pub use config_source::{FileConfigSource, CONFIG_FILE_NAMES};
pub use presentation::DesktopPresentation;
