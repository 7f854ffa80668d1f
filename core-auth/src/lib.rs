//! # Authentication Module
//!
//! Single-account session and token acquisition on top of a native identity SDK.
//!
//! ## Overview
//!
//! The native SDK (MSAL on Android/iOS, any OAuth2/OIDC client elsewhere) does the
//! protocol work. This crate decides *when* and *how* to call it:
//!
//! - [`resolver`] turns a configuration source into a validated [`ClientConfiguration`]
//! - [`session`] owns the initialized client and the one active account
//! - [`authority`] picks the authority for silent renewal
//! - [`manager`] runs interactive and silent acquisition, sign-out and account lookup
//! - [`normalize`] maps native results and failures into [`TokenResult`], [`Account`]
//!   and [`AuthError`]
//!
//! Every public operation returns an [`OperationOutcome`]: a token/account payload or
//! an [`AuthError`] carrying one of the fixed [`ErrorKind`]s, never both.

pub mod authority;
pub mod error;
pub mod manager;
pub mod normalize;
pub mod resolver;
pub mod session;
pub mod types;

pub use authority::select_authority;
pub use error::{AuthError, ErrorKind, OperationOutcome, Result};
pub use manager::{AuthManager, SilentTokenOptions};
pub use resolver::ArgumentsConfigSource;
pub use session::{AuthClient, Initialization, SessionStore};
pub use types::{
    AccountProjection, AcquisitionMode, AcquisitionRequest, Account, ClientConfiguration,
    InvalidTransition, RequestState, TokenResult,
};
