//! Secret types for protecting tokens and keys from accidental logging.
//!
//! Re-exports the [`secrecy`] types used across the workspace. `SecretString`
//! and `SecretBox<T>` implement `Debug` with redaction, so any struct that
//! derives `Debug` while holding one stays safe to log.
//!
//! # Example
//!
//! ```rust
//! use ziqx_auth::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct Session {
//!     user: String,
//!     token: SecretString,
//! }
//!
//! let session = Session {
//!     user: "alice".to_string(),
//!     token: SecretString::from("eyJhbGciOi..."),
//! };
//!
//! // Token is redacted
//! println!("{session:?}");
//!
//! let raw: &str = session.token.expose_secret();
//! # assert!(raw.starts_with("eyJ"));
//! ```
//!
//! Use `SecretString` for bearer tokens and storage credentials, and
//! `SecretBox<T>` for binary key material such as the token cipher key.

pub use secrecy::{ExposeSecret, SecretBox, SecretString};
