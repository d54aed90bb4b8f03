//! Tokens stored encrypted at rest, then decrypted and validated.

use base64::{engine::general_purpose, Engine as _};
use std::collections::HashMap;
use ziqx_auth::cipher::{decrypt_stored_token, encrypt, CipherError, CipherKey};
use ziqx_auth::config::{AuthConfig, TOKEN_KEY_VAR};
use ziqx_auth::local::LocalValidator;
use ziqx_auth::secret::ExposeSecret;
use ziqx_test_utils::TestTokenBuilder;

fn config_with_key(fill: u8) -> Result<AuthConfig, anyhow::Error> {
    let vars = HashMap::from([(
        TOKEN_KEY_VAR.to_string(),
        general_purpose::STANDARD.encode([fill; 32]),
    )]);
    Ok(AuthConfig::from_vars(&vars)?)
}

fn token_key(config: &AuthConfig) -> Result<&CipherKey, anyhow::Error> {
    config
        .token_key
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("{TOKEN_KEY_VAR} was not loaded"))
}

#[test]
fn test_stored_token_round_trip_then_local_check() -> Result<(), anyhow::Error> {
    let config = config_with_key(11)?;
    let key = token_key(&config)?;
    let token = TestTokenBuilder::new().build();

    let stored = encrypt(token.as_bytes(), key)?;
    let restored = decrypt_stored_token(&stored, key)?;

    assert_eq!(restored.expose_secret(), token);
    assert!(LocalValidator::from_config(&config).is_structurally_plausible(restored.expose_secret()));
    Ok(())
}

#[test]
fn test_stored_token_needs_the_configured_key() -> Result<(), anyhow::Error> {
    let writer = config_with_key(1)?;
    let reader = config_with_key(2)?;
    let token = TestTokenBuilder::new().build();

    let stored = encrypt(token.as_bytes(), token_key(&writer)?)?;
    let result = decrypt_stored_token(&stored, token_key(&reader)?);

    assert!(matches!(result, Err(CipherError::Decryption)));
    Ok(())
}
