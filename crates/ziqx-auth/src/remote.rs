//! Authoritative token validation against the ziqx validation endpoint.
//!
//! One call is one `GET {base}/auth/validateToken.php?token=<token>`. The
//! authority answers with a JSON object; only its `status` field matters.
//!
//! # Outcomes
//!
//! - `{"status": "success"}` => [`RemoteVerdict::Valid`]
//! - any other JSON object => [`RemoteVerdict::Invalid`]
//! - empty token => [`RemoteVerdict::Invalid`], no request is made
//! - transport error, non-2xx status, unparseable body =>
//!   [`RemoteVerdict::Indeterminate`]
//!
//! None of these are returned as errors. Failures are logged and collapse to
//! `false` through [`RemoteVerdict::is_valid`].
//!
//! # Timeouts
//!
//! The validator does not retry and sets no timeout of its own. Callers who
//! need one either pass a configured client to
//! [`RemoteValidator::with_client`] or wrap the call in
//! `tokio::time::timeout`.
//!
//! # Security
//!
//! - The token is never logged
//! - HTTPS is checked only when the validator is built from
//!   [`AuthConfig`]; [`RemoteValidator::new`] and
//!   [`RemoteValidator::with_client`] accept whatever base they are given

use std::fmt;
use tracing::instrument;
use url::Url;

use crate::config::{AuthConfig, ConfigError};
use crate::DEFAULT_VALIDATION_URL;

// =============================================================================
// Constants
// =============================================================================

/// Path of the validation endpoint, relative to the validation base URL.
pub const VALIDATION_PATH: &str = "auth/validateToken.php";

/// `status` value the authority uses for a valid token.
const STATUS_SUCCESS: &str = "success";

const LOG_TARGET: &str = "ziqx.auth.remote";

// =============================================================================
// Outcome Types
// =============================================================================

/// Why the authority's answer could not be determined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndeterminateReason {
    /// Request never completed (DNS, connect, TLS, reset).
    Transport,

    /// Authority answered with a non-2xx status.
    HttpStatus(u16),

    /// Body was not a JSON object with a string `status`.
    MalformedResponse,
}

impl fmt::Display for IndeterminateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndeterminateReason::Transport => write!(f, "transport failure"),
            IndeterminateReason::HttpStatus(status) => write!(f, "unexpected HTTP status {status}"),
            IndeterminateReason::MalformedResponse => write!(f, "malformed response body"),
        }
    }
}

/// Result of asking the authority about a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteVerdict {
    /// The authority reported the token as valid.
    Valid,

    /// The authority answered and did not report success.
    Invalid,

    /// No usable answer was obtained.
    Indeterminate(IndeterminateReason),
}

impl RemoteVerdict {
    /// Boolean contract: only [`RemoteVerdict::Valid`] is `true`.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, RemoteVerdict::Valid)
    }

    /// Whether the verdict reflects an actual answer from the authority.
    #[must_use]
    pub fn is_determinate(&self) -> bool {
        !matches!(self, RemoteVerdict::Indeterminate(_))
    }
}

impl From<RemoteVerdict> for bool {
    fn from(verdict: RemoteVerdict) -> Self {
        verdict.is_valid()
    }
}

/// Read the `status` field of the authority's answer.
///
/// Only a JSON object counts as an answer. A missing or `null` status reads
/// as `None`; any other non-string status is malformed.
fn response_status(body: &serde_json::Value) -> Result<Option<&str>, IndeterminateReason> {
    let serde_json::Value::Object(fields) = body else {
        return Err(IndeterminateReason::MalformedResponse);
    };

    match fields.get("status") {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(status)) => Ok(Some(status.as_str())),
        Some(_) => Err(IndeterminateReason::MalformedResponse),
    }
}

// =============================================================================
// Validator
// =============================================================================

/// Client for the remote validation authority.
///
/// Cloning is cheap: the underlying `reqwest::Client` shares its pool.
#[derive(Clone)]
pub struct RemoteValidator {
    endpoint: Url,
    http_client: reqwest::Client,
}

impl fmt::Debug for RemoteValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteValidator")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl RemoteValidator {
    /// Create a validator for `validation_base` with a default HTTP client.
    ///
    /// The endpoint is `validation_base` joined with [`VALIDATION_PATH`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the endpoint cannot be derived.
    pub fn new(validation_base: &Url) -> Result<Self, ConfigError> {
        Self::with_client(validation_base, reqwest::Client::new())
    }

    /// Create a validator using a caller-supplied HTTP client.
    ///
    /// This is where timeouts, proxies or custom TLS roots are layered in.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the endpoint cannot be derived.
    pub fn with_client(
        validation_base: &Url,
        http_client: reqwest::Client,
    ) -> Result<Self, ConfigError> {
        let endpoint = endpoint_for(validation_base)?;
        Ok(Self {
            endpoint,
            http_client,
        })
    }

    /// Create a validator for the public ziqx authority.
    ///
    /// # Errors
    ///
    /// Only fails if the built-in base URL is rejected, which does not happen.
    pub fn ziqx() -> Result<Self, ConfigError> {
        let base = Url::parse(DEFAULT_VALIDATION_URL)
            .map_err(|e| ConfigError::InvalidUrl("validation".to_string(), e.to_string()))?;
        Self::new(&base)
    }

    /// Create a validator from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if the endpoint cannot be derived.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ConfigError> {
        Self::new(&config.validation_url)
    }

    /// Full validation endpoint URL (without the token query).
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Ask the authority whether `token` is valid.
    ///
    /// Makes exactly one request, or none for an empty token. Never returns
    /// an error; see the module documentation for the outcome mapping.
    #[instrument(skip_all)]
    pub async fn validate(&self, token: &str) -> RemoteVerdict {
        if token.is_empty() {
            tracing::debug!(target: LOG_TARGET, "Empty token, skipping remote validation");
            return RemoteVerdict::Invalid;
        }

        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("token", token);

        let response = match self.http_client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    target: LOG_TARGET,
                    error = %e.without_url(),
                    "Remote validation request failed"
                );
                return RemoteVerdict::Indeterminate(IndeterminateReason::Transport);
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(
                target: LOG_TARGET,
                status = %status,
                "Validation authority returned error status"
            );
            return RemoteVerdict::Indeterminate(IndeterminateReason::HttpStatus(status.as_u16()));
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(
                    target: LOG_TARGET,
                    error = %e.without_url(),
                    "Failed to read validation response body"
                );
                return RemoteVerdict::Indeterminate(IndeterminateReason::Transport);
            }
        };

        let parsed: serde_json::Value = match serde_json::from_slice(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(
                    target: LOG_TARGET,
                    error = %e,
                    body_len = body.len(),
                    "Failed to parse validation response"
                );
                return RemoteVerdict::Indeterminate(IndeterminateReason::MalformedResponse);
            }
        };

        let status = match response_status(&parsed) {
            Ok(status) => status,
            Err(reason) => {
                tracing::warn!(
                    target: LOG_TARGET,
                    body_len = body.len(),
                    "Validation response is not an object with a string status"
                );
                return RemoteVerdict::Indeterminate(reason);
            }
        };

        match status {
            Some(STATUS_SUCCESS) => {
                tracing::debug!(target: LOG_TARGET, "Token accepted by validation authority");
                RemoteVerdict::Valid
            }
            other => {
                tracing::info!(
                    target: LOG_TARGET,
                    status = other.unwrap_or("<missing>"),
                    "Token rejected by validation authority"
                );
                RemoteVerdict::Invalid
            }
        }
    }
}

/// Derive the validation endpoint from a base URL.
///
/// A base without a trailing slash is treated as a directory, so
/// `https://host/api` and `https://host/api/` both yield
/// `https://host/api/auth/validateToken.php`.
fn endpoint_for(base: &Url) -> Result<Url, ConfigError> {
    let mut base = base.clone();
    base.set_query(None);
    base.set_fragment(None);
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }

    base.join(VALIDATION_PATH)
        .map_err(|e| ConfigError::InvalidUrl("validation".to_string(), e.to_string()))
}

// =============================================================================
// Tests
// =============================================================================
