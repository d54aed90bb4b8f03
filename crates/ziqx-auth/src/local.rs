//! Local token inspection without a network round trip.
//!
//! This is the fast, untrusted path. It answers "is this token plausibly one
//! of ours and still within its lifetime?" by checking:
//! - Size limit (checked BEFORE any parsing)
//! - Three non-empty `header.payload.signature` segments
//! - Payload decodes to a JSON claims object
//! - `exp` (if present) is not in the past
//! - `iss` (if present) equals the trusted issuer
//!
//! # Security
//!
//! - The signature segment is NEVER verified. A forged token with plausible
//!   claims passes this check. Callers that need authenticity must use
//!   [`crate::remote::RemoteValidator`].
//! - Claim values are never logged; each rejection logs a distinct reason.
//! - Rejection `Display` messages are generic.
//!
//! # Usage
//!
//! ```rust
//! use ziqx_auth::local::{is_structurally_plausible, LocalValidator};
//!
//! assert!(!is_structurally_plausible("not-a-token"));
//! assert!(!is_structurally_plausible(None));
//!
//! let validator = LocalValidator::default().require_claims(true);
//! assert!(validator.inspect("a.b").is_err());
//! ```

use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::AuthConfig;
use crate::DEFAULT_TRUSTED_ISSUER;

// =============================================================================
// Constants
// =============================================================================

/// Maximum accepted token size in bytes (8KB).
///
/// Oversized tokens are rejected before base64 decoding so an attacker
/// cannot make the validator allocate and parse arbitrarily large payloads.
pub const MAX_TOKEN_SIZE_BYTES: usize = 8192;

const LOG_TARGET: &str = "ziqx.auth.local";

// =============================================================================
// Error Types
// =============================================================================

/// Reasons a token fails local inspection.
///
/// Every variant renders the same generic message. The variant itself is
/// the observability hook for callers that want more than a boolean.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalRejection {
    /// No token was supplied.
    #[error("The access token is invalid or expired")]
    Empty,

    /// Token exceeds [`MAX_TOKEN_SIZE_BYTES`].
    #[error("The access token is invalid or expired")]
    TooLarge,

    /// Token is not three non-empty dot-separated segments.
    #[error("The access token is invalid or expired")]
    Malformed,

    /// Payload segment is not base64-encoded JSON claims.
    #[error("The access token is invalid or expired")]
    UndecodablePayload,

    /// `exp` is earlier than the current time.
    #[error("The access token is invalid or expired")]
    Expired,

    /// `iss` does not match the trusted issuer.
    #[error("The access token is invalid or expired")]
    IssuerMismatch,

    /// A claim is absent while [`LocalValidator::require_claims`] is on.
    #[error("The access token is invalid or expired")]
    MissingClaim(&'static str),
}

impl LocalRejection {
    /// Stable label for structured logs and metrics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            LocalRejection::Empty => "empty",
            LocalRejection::TooLarge => "too_large",
            LocalRejection::Malformed => "malformed",
            LocalRejection::UndecodablePayload => "undecodable_payload",
            LocalRejection::Expired => "expired",
            LocalRejection::IssuerMismatch => "issuer_mismatch",
            LocalRejection::MissingClaim(_) => "missing_claim",
        }
    }
}

// =============================================================================
// Claims Types
// =============================================================================

/// Decoded token payload.
///
/// Only `exp` and `iss` are interpreted. Everything else is kept in `extra`
/// untouched. `sub` is redacted in Debug output.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Expiration timestamp (Unix epoch seconds).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issuer identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Subject, in whatever JSON shape the issuer used. Redacted in Debug output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<serde_json::Value>,

    /// Claims this crate does not interpret.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Claims {
    /// Subject as a string, when the issuer encoded it as one.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.sub.as_ref().and_then(serde_json::Value::as_str)
    }
}

impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("exp", &self.exp)
            .field("iss", &self.iss)
            .field("sub", &self.sub.as_ref().map(|_| "[REDACTED]"))
            .field("extra_claims", &self.extra.len())
            .finish()
    }
}

// =============================================================================
// Validator
// =============================================================================

/// Local structural and claim validator.
///
/// Cheap to construct and clone; holds no state besides its policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalValidator {
    trusted_issuer: String,
    require_claims: bool,
}

impl Default for LocalValidator {
    fn default() -> Self {
        Self::new(DEFAULT_TRUSTED_ISSUER)
    }
}

impl LocalValidator {
    /// Create a validator trusting `trusted_issuer`.
    ///
    /// Absent `exp` and `iss` claims pass by default.
    #[must_use]
    pub fn new(trusted_issuer: impl Into<String>) -> Self {
        Self {
            trusted_issuer: trusted_issuer.into(),
            require_claims: false,
        }
    }

    /// Create a validator from loaded configuration.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.trusted_issuer.clone())
    }

    /// Reject tokens that omit `exp` or `iss` instead of letting them pass.
    #[must_use]
    pub fn require_claims(mut self, required: bool) -> Self {
        self.require_claims = required;
        self
    }

    /// The issuer this validator accepts.
    #[must_use]
    pub fn trusted_issuer(&self) -> &str {
        &self.trusted_issuer
    }

    /// Boolean contract: `true` only if every local check passes.
    ///
    /// The signature is not verified; see the module documentation.
    #[must_use]
    pub fn is_structurally_plausible<'a>(&self, token: impl Into<Option<&'a str>>) -> bool {
        match token.into() {
            Some(token) => self.inspect(token).is_ok(),
            None => false,
        }
    }

    /// Inspect a token against the current wall clock.
    ///
    /// # Errors
    ///
    /// Returns the first [`LocalRejection`] encountered, in check order.
    pub fn inspect(&self, token: &str) -> Result<Claims, LocalRejection> {
        self.inspect_at(token, chrono::Utc::now().timestamp())
    }

    /// Deterministic inspection against an explicit `now` (Unix seconds).
    ///
    /// Prefer [`LocalValidator::inspect`] in production code. This variant
    /// lets expiry boundaries be tested without wall-clock dependence.
    ///
    /// # Errors
    ///
    /// Returns the first [`LocalRejection`] encountered, in check order.
    pub fn inspect_at(&self, token: &str, now: i64) -> Result<Claims, LocalRejection> {
        let claims = decode_claims(token)?;
        self.check_claims_at(&claims, now)?;
        Ok(claims)
    }

    /// Apply the expiry and issuer checks to already-decoded claims.
    ///
    /// # Errors
    ///
    /// `Expired`, `IssuerMismatch`, or `MissingClaim`.
    pub fn check_claims_at(&self, claims: &Claims, now: i64) -> Result<(), LocalRejection> {
        match claims.exp {
            Some(exp) if exp < now => {
                tracing::debug!(
                    target: LOG_TARGET,
                    expired_for_secs = now.saturating_sub(exp),
                    "Token rejected: expired"
                );
                return Err(LocalRejection::Expired);
            }
            Some(_) => {}
            None if self.require_claims => {
                tracing::debug!(target: LOG_TARGET, claim = "exp", "Token rejected: missing claim");
                return Err(LocalRejection::MissingClaim("exp"));
            }
            None => {}
        }

        match claims.iss.as_deref() {
            Some(iss) if iss != self.trusted_issuer => {
                tracing::debug!(
                    target: LOG_TARGET,
                    trusted_issuer = %self.trusted_issuer,
                    "Token rejected: issuer mismatch"
                );
                return Err(LocalRejection::IssuerMismatch);
            }
            Some(_) => {}
            None if self.require_claims => {
                tracing::debug!(target: LOG_TARGET, claim = "iss", "Token rejected: missing claim");
                return Err(LocalRejection::MissingClaim("iss"));
            }
            None => {}
        }

        Ok(())
    }
}

// =============================================================================
// Functions
// =============================================================================

/// Boolean local check with the default trusted issuer (`ziqx.cc`).
///
/// Accepts either `&str` or `Option<&str>`; `None` and `""` are both `false`.
/// This never verifies the signature segment.
#[must_use]
pub fn is_structurally_plausible<'a>(token: impl Into<Option<&'a str>>) -> bool {
    LocalValidator::default().is_structurally_plausible(token)
}

/// Split a token and decode its payload into [`Claims`] without checking them.
///
/// # Errors
///
/// - `Empty` - token is empty
/// - `TooLarge` - token exceeds [`MAX_TOKEN_SIZE_BYTES`]
/// - `Malformed` - not exactly three non-empty segments
/// - `UndecodablePayload` - bad base64 or not a JSON object
pub fn decode_claims(token: &str) -> Result<Claims, LocalRejection> {
    if token.is_empty() {
        tracing::debug!(target: LOG_TARGET, "Token rejected: empty");
        return Err(LocalRejection::Empty);
    }

    // Check token size first (DoS prevention)
    if token.len() > MAX_TOKEN_SIZE_BYTES {
        tracing::debug!(
            target: LOG_TARGET,
            token_size = token.len(),
            max_size = MAX_TOKEN_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(LocalRejection::TooLarge);
    }

    let segments: Vec<&str> = token.split('.').collect();
    let [_header, payload, _signature] = segments.as_slice() else {
        tracing::debug!(
            target: LOG_TARGET,
            segments = segments.len(),
            "Token rejected: expected three segments"
        );
        return Err(LocalRejection::Malformed);
    };

    if segments.iter().any(|segment| segment.is_empty()) {
        tracing::debug!(target: LOG_TARGET, "Token rejected: empty segment");
        return Err(LocalRejection::Malformed);
    }

    let payload_bytes = decode_segment(payload).map_err(|e| {
        tracing::debug!(target: LOG_TARGET, error = %e, "Failed to decode token payload base64");
        LocalRejection::UndecodablePayload
    })?;

    serde_json::from_slice(&payload_bytes).map_err(|e| {
        tracing::debug!(target: LOG_TARGET, error = %e, "Failed to parse token payload JSON");
        LocalRejection::UndecodablePayload
    })
}

/// Decode a token segment, accepting both base64url and standard alphabets
/// with or without padding.
fn decode_segment(segment: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let unpadded = segment.trim_end_matches('=');
    URL_SAFE_NO_PAD
        .decode(unpadded)
        .or_else(|_| STANDARD_NO_PAD.decode(unpadded))
}

// =============================================================================
// Tests
// =============================================================================
