//! Session and token authentication for the ziqx identity service.
//!
//! Three independent entry points, none of which depends on another:
//!
//! - [`login`] - builds the provider login URL and hands it to a [`login::Navigator`]
//! - [`remote`] - authoritative validation against the ziqx validation endpoint
//! - [`local`] - fast, network-free structural and claim inspection
//!
//! # Trust boundary
//!
//! The local path never verifies the token signature. It only tells a caller
//! that a token is well-formed, unexpired and claims the trusted issuer.
//! Anything that must trust the token's authenticity goes through
//! [`remote::RemoteValidator`].

#![warn(clippy::pedantic)]

/// Module for symmetric encryption of stored tokens
pub mod cipher;

/// Module for configuration loaded from the environment
pub mod config;

/// Module for the login redirect flow
pub mod login;

/// Module for local (untrusted) token inspection
pub mod local;

/// Module for remote (authoritative) token validation
pub mod remote;

/// Module for secret types that prevent accidental logging
pub mod secret;

pub use config::{AuthConfig, ConfigError};
pub use local::{is_structurally_plausible, Claims, LocalRejection, LocalValidator};
pub use login::{LoginError, LoginRedirector, LoginRequest, NavigationError, Navigator};
pub use remote::{IndeterminateReason, RemoteValidator, RemoteVerdict};

/// Issuer claim carried by tokens minted by the ziqx identity service.
pub const DEFAULT_TRUSTED_ISSUER: &str = "ziqx.cc";

/// Base URL of the ziqx login provider.
pub const DEFAULT_PROVIDER_URL: &str = "https://ziqx.cc";

/// Base URL of the ziqx validation authority.
pub const DEFAULT_VALIDATION_URL: &str = "https://ziqx.cc";
