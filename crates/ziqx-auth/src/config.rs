//! Configuration for the auth components, loaded from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `ZIQX_PROVIDER_URL` | `https://ziqx.cc` |
//! | `ZIQX_VALIDATION_URL` | `https://ziqx.cc` |
//! | `ZIQX_TRUSTED_ISSUER` | `ziqx.cc` |
//! | `ZIQX_TOKEN_KEY` | unset (base64, 32 bytes) |
//! | `ZIQX_ALLOW_INSECURE_HTTP` | `false` |

use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;
use url::Url;

use crate::cipher::{CipherError, CipherKey};
use crate::{DEFAULT_PROVIDER_URL, DEFAULT_TRUSTED_ISSUER, DEFAULT_VALIDATION_URL};

/// Login provider base URL.
pub const PROVIDER_URL_VAR: &str = "ZIQX_PROVIDER_URL";
/// Validation authority base URL.
pub const VALIDATION_URL_VAR: &str = "ZIQX_VALIDATION_URL";
/// Issuer accepted by local inspection.
pub const TRUSTED_ISSUER_VAR: &str = "ZIQX_TRUSTED_ISSUER";
/// Base64 32-byte key for stored-token encryption.
pub const TOKEN_KEY_VAR: &str = "ZIQX_TOKEN_KEY";
/// Set to `true` or `1` to permit `http://` URLs.
pub const ALLOW_INSECURE_HTTP_VAR: &str = "ZIQX_ALLOW_INSECURE_HTTP";

/// Errors from loading [`AuthConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A URL variable did not parse (name, parser message).
    #[error("Invalid {0} URL: {1}")]
    InvalidUrl(String, String),

    /// An `http://` URL was given without opting in to insecure HTTP.
    #[error("{0} URL must use HTTPS")]
    InsecureUrl(String),

    /// A variable held an unrecognised value (name, value).
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    /// The token key was not valid base64 or not 32 bytes.
    #[error("Invalid token key: {0}")]
    InvalidTokenKey(#[from] CipherError),
}

/// Settings shared by the login, remote and local components.
///
/// Not `Clone`; `Debug` redacts the token key.
pub struct AuthConfig {
    /// Where login redirects are sent.
    pub provider_url: Url,
    /// Base URL of the validation authority.
    pub validation_url: Url,
    /// `iss` value accepted by local inspection.
    pub trusted_issuer: String,
    /// Key for stored-token encryption, when configured.
    pub token_key: Option<CipherKey>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("provider_url", &self.provider_url.as_str())
            .field("validation_url", &self.validation_url.as_str())
            .field("trusted_issuer", &self.trusted_issuer)
            .field("token_key", &self.token_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AuthConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let allow_insecure = match vars.get(ALLOW_INSECURE_HTTP_VAR).map(String::as_str) {
            None | Some("" | "0" | "false") => false,
            Some("1" | "true") => true,
            Some(other) => {
                return Err(ConfigError::InvalidValue(
                    ALLOW_INSECURE_HTTP_VAR.to_string(),
                    other.to_string(),
                ))
            }
        };

        let provider_url = parse_url(
            "provider",
            vars.get(PROVIDER_URL_VAR).map_or(DEFAULT_PROVIDER_URL, String::as_str),
            allow_insecure,
        )?;

        let validation_url = parse_url(
            "validation",
            vars.get(VALIDATION_URL_VAR).map_or(DEFAULT_VALIDATION_URL, String::as_str),
            allow_insecure,
        )?;

        let trusted_issuer = vars
            .get(TRUSTED_ISSUER_VAR)
            .cloned()
            .unwrap_or_else(|| DEFAULT_TRUSTED_ISSUER.to_string());

        if trusted_issuer.is_empty() {
            return Err(ConfigError::InvalidValue(
                TRUSTED_ISSUER_VAR.to_string(),
                "must not be empty".to_string(),
            ));
        }

        let token_key = vars
            .get(TOKEN_KEY_VAR)
            .map(|encoded| CipherKey::from_base64(encoded))
            .transpose()?;

        Ok(AuthConfig {
            provider_url,
            validation_url,
            trusted_issuer,
            token_key,
        })
    }
}

fn parse_url(name: &str, raw: &str, allow_insecure: bool) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl(name.to_string(), e.to_string()))?;

    match url.scheme() {
        "https" => Ok(url),
        "http" if allow_insecure => {
            tracing::warn!(target: "ziqx.auth.config", url_name = name, "Using insecure HTTP URL");
            Ok(url)
        }
        "http" => Err(ConfigError::InsecureUrl(name.to_string())),
        other => Err(ConfigError::InvalidUrl(
            name.to_string(),
            format!("unsupported scheme '{other}'"),
        )),
    }
}
