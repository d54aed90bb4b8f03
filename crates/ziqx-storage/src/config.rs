//! Storage credentials loaded from environment variables.

use secrecy::SecretString;
use std::collections::HashMap;
use std::env;

use crate::error::StorageError;

pub const ENDPOINT_VAR: &str = "STORAGE_ENDPOINT";
pub const REGION_VAR: &str = "STORAGE_REGION";
pub const ACCESS_KEY_ID_VAR: &str = "STORAGE_ACCESS_KEY_ID";
pub const SECRET_ACCESS_KEY_VAR: &str = "STORAGE_SECRET_ACCESS_KEY";

const DEFAULT_REGION: &str = "auto";

/// S3-compatible storage settings.
///
/// `secret_access_key` is a `SecretString`, so the derived `Debug` is safe.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Custom endpoint for S3-compatible services; `None` means AWS.
    pub endpoint: Option<String>,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: SecretString,
}

impl StorageConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, StorageError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, StorageError> {
        let endpoint = vars.get(ENDPOINT_VAR).filter(|v| !v.is_empty()).cloned();

        if let Some(endpoint) = &endpoint {
            if !endpoint.starts_with("https://") && !endpoint.starts_with("http://") {
                return Err(StorageError::Configuration(format!(
                    "{ENDPOINT_VAR} must be an http(s) URL"
                )));
            }
        }

        let region = vars
            .get(REGION_VAR)
            .cloned()
            .unwrap_or_else(|| DEFAULT_REGION.to_string());

        let access_key_id = vars
            .get(ACCESS_KEY_ID_VAR)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| missing(ACCESS_KEY_ID_VAR))?
            .clone();

        let secret_access_key = vars
            .get(SECRET_ACCESS_KEY_VAR)
            .filter(|v| !v.is_empty())
            .map(|v| SecretString::from(v.clone()))
            .ok_or_else(|| missing(SECRET_ACCESS_KEY_VAR))?;

        Ok(StorageConfig {
            endpoint,
            region,
            access_key_id,
            secret_access_key,
        })
    }
}

fn missing(var: &str) -> StorageError {
    StorageError::Configuration(format!("Missing required environment variable: {var}"))
}
