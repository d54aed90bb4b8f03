//! Symmetric encryption for tokens kept at rest.
//!
//! AES-256-GCM with a random 96-bit nonce per message. The encoded form is
//! `base64(nonce || ciphertext || tag)` so a single string can be stored next
//! to a session record.
//!
//! The key is always supplied by the caller and managed separately from the
//! data it protects. A token is never used as its own key.

use base64::{engine::general_purpose, Engine as _};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use std::fmt;
use thiserror::Error;
use tracing::instrument;

use crate::secret::{ExposeSecret, SecretBox, SecretString};

/// AES-256 key length in bytes.
pub const KEY_LEN: usize = 32;

/// GCM authentication tag length in bytes.
const TAG_LEN: usize = 16;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CipherError {
    #[error("Invalid key length: {0} (expected 32)")]
    InvalidKeyLength(usize),

    #[error("Invalid key encoding: {0}")]
    InvalidKeyEncoding(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Authentication failed: wrong key or tampered ciphertext.
    #[error("Decryption failed")]
    Decryption,

    #[error("Malformed ciphertext: {0}")]
    MalformedCiphertext(String),

    #[error("Decrypted token is not valid UTF-8")]
    InvalidUtf8,
}

/// 256-bit key for [`encrypt`] and [`decrypt`]. Zeroized on drop.
pub struct CipherKey(SecretBox<[u8; KEY_LEN]>);

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CipherKey([REDACTED])")
    }
}

impl CipherKey {
    /// Build a key from raw bytes.
    ///
    /// # Errors
    ///
    /// `InvalidKeyLength` unless exactly 32 bytes are given.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CipherError> {
        let key: [u8; KEY_LEN] = bytes
            .try_into()
            .map_err(|_| CipherError::InvalidKeyLength(bytes.len()))?;
        Ok(Self(SecretBox::new(Box::new(key))))
    }

    /// Build a key from standard base64, as stored in configuration.
    ///
    /// # Errors
    ///
    /// `InvalidKeyEncoding` for bad base64, `InvalidKeyLength` for a
    /// decoded length other than 32.
    pub fn from_base64(encoded: &str) -> Result<Self, CipherError> {
        let bytes = general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| CipherError::InvalidKeyEncoding(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Generate a fresh random key.
    ///
    /// # Errors
    ///
    /// `Encryption` if the system RNG fails.
    pub fn generate() -> Result<Self, CipherError> {
        let mut key = [0u8; KEY_LEN];
        SystemRandom::new()
            .fill(&mut key)
            .map_err(|e| CipherError::Encryption(format!("Key generation failed: {e}")))?;
        Self::from_bytes(&key)
    }

    fn aead_key(&self) -> Result<LessSafeKey, CipherError> {
        let unbound = UnboundKey::new(&AES_256_GCM, self.0.expose_secret())
            .map_err(|e| CipherError::Encryption(format!("Cipher key creation failed: {e}")))?;
        Ok(LessSafeKey::new(unbound))
    }
}

/// Encrypt `plaintext` and return the base64 envelope.
///
/// # Errors
///
/// `Encryption` if nonce generation or sealing fails.
#[instrument(skip_all)]
pub fn encrypt(plaintext: &[u8], key: &CipherKey) -> Result<String, CipherError> {
    let mut nonce_bytes = [0u8; NONCE_LEN];
    SystemRandom::new()
        .fill(&mut nonce_bytes)
        .map_err(|e| CipherError::Encryption(format!("Nonce generation failed: {e}")))?;

    let sealing_key = key.aead_key()?;

    let mut in_out = plaintext.to_vec();
    sealing_key
        .seal_in_place_append_tag(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::empty(),
            &mut in_out,
        )
        .map_err(|e| CipherError::Encryption(format!("Encryption operation failed: {e}")))?;

    let mut envelope = Vec::with_capacity(NONCE_LEN + in_out.len());
    envelope.extend_from_slice(&nonce_bytes);
    envelope.extend_from_slice(&in_out);

    Ok(general_purpose::STANDARD.encode(envelope))
}

/// Decrypt a base64 envelope produced by [`encrypt`].
///
/// # Errors
///
/// - `MalformedCiphertext` - bad base64 or too short to hold nonce and tag
/// - `Decryption` - wrong key or tampered data
#[instrument(skip_all)]
pub fn decrypt(ciphertext: &str, key: &CipherKey) -> Result<Vec<u8>, CipherError> {
    let envelope = general_purpose::STANDARD
        .decode(ciphertext.trim())
        .map_err(|e| CipherError::MalformedCiphertext(e.to_string()))?;

    if envelope.len() < NONCE_LEN + TAG_LEN {
        return Err(CipherError::MalformedCiphertext(format!(
            "Envelope too short: {} bytes",
            envelope.len()
        )));
    }

    let nonce_bytes: [u8; NONCE_LEN] = envelope
        .get(..NONCE_LEN)
        .and_then(|nonce| nonce.try_into().ok())
        .ok_or_else(|| CipherError::MalformedCiphertext("Invalid nonce".to_string()))?;
    let mut in_out = envelope
        .get(NONCE_LEN..)
        .ok_or_else(|| CipherError::MalformedCiphertext("Missing ciphertext".to_string()))?
        .to_vec();

    let opening_key = key.aead_key()?;
    let plaintext = opening_key
        .open_in_place(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::empty(),
            &mut in_out,
        )
        .map_err(|_| {
            tracing::debug!(target: "ziqx.auth.cipher", "Ciphertext failed authentication");
            CipherError::Decryption
        })?;

    Ok(plaintext.to_vec())
}

/// Decrypt a token that was stored with [`encrypt`].
///
/// The key must be the separately managed storage key (for example
/// `ZIQX_TOKEN_KEY`), never the token itself.
///
/// # Errors
///
/// Any [`decrypt`] error, or `InvalidUtf8` if the plaintext is not a string.
pub fn decrypt_stored_token(ciphertext: &str, key: &CipherKey) -> Result<SecretString, CipherError> {
    let bytes = decrypt(ciphertext, key)?;
    let token = String::from_utf8(bytes).map_err(|_| CipherError::InvalidUtf8)?;
    Ok(SecretString::from(token))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn test_key(fill: u8) -> CipherKey {
        CipherKey::from_bytes(&[fill; KEY_LEN]).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt_token() {
        let key = test_key(1);
        let sealed = encrypt(b"header.payload.signature", &key).unwrap();

        assert_ne!(sealed, "header.payload.signature");
        assert_eq!(decrypt(&sealed, &key).unwrap(), b"header.payload.signature");
    }

    #[test]
    fn test_encrypt_uses_fresh_nonce() {
        let key = test_key(1);
        let first = encrypt(b"same", &key).unwrap();
        let second = encrypt(b"same", &key).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_decrypt_with_wrong_key_fails() {
        let sealed = encrypt(b"secret", &test_key(1)).unwrap();
        assert_eq!(decrypt(&sealed, &test_key(2)), Err(CipherError::Decryption));
    }

    #[test]
    fn test_decrypt_tampered_ciphertext_fails() {
        let key = test_key(3);
        let sealed = encrypt(b"secret", &key).unwrap();

        let mut raw = general_purpose::STANDARD.decode(&sealed).unwrap();
        if let Some(byte) = raw.last_mut() {
            *byte ^= 0x01;
        }
        let tampered = general_purpose::STANDARD.encode(raw);

        assert_eq!(decrypt(&tampered, &key), Err(CipherError::Decryption));
    }

    #[test]
    fn test_decrypt_rejects_bad_base64() {
        let result = decrypt("***", &test_key(1));
        assert!(matches!(result, Err(CipherError::MalformedCiphertext(_))));
    }

    #[test]
    fn test_decrypt_rejects_short_envelope() {
        let short = general_purpose::STANDARD.encode([0u8; NONCE_LEN + TAG_LEN - 1]);
        let result = decrypt(&short, &test_key(1));
        assert!(
            matches!(result, Err(CipherError::MalformedCiphertext(msg)) if msg.contains("too short"))
        );
    }

    #[test]
    fn test_empty_plaintext_round_trips() {
        let key = test_key(4);
        let sealed = encrypt(b"", &key).unwrap();
        assert!(decrypt(&sealed, &key).unwrap().is_empty());
    }

    #[test]
    fn test_key_length_enforced() {
        assert_eq!(
            CipherKey::from_bytes(&[0u8; 16]).err(),
            Some(CipherError::InvalidKeyLength(16))
        );
        assert_eq!(
            CipherKey::from_bytes(&[0u8; 64]).err(),
            Some(CipherError::InvalidKeyLength(64))
        );
    }

    #[test]
    fn test_key_from_base64() {
        let encoded = general_purpose::STANDARD.encode([9u8; KEY_LEN]);
        assert!(CipherKey::from_base64(&encoded).is_ok());

        assert!(matches!(
            CipherKey::from_base64("not-base64!!"),
            Err(CipherError::InvalidKeyEncoding(_))
        ));
    }

    #[test]
    fn test_generated_keys_differ() {
        let a = CipherKey::generate().unwrap();
        let b = CipherKey::generate().unwrap();

        let sealed = encrypt(b"token", &a).unwrap();
        assert_eq!(decrypt(&sealed, &b), Err(CipherError::Decryption));
    }

    #[test]
    fn test_key_debug_is_redacted() {
        let debug_str = format!("{:?}", test_key(0xAB));
        assert_eq!(debug_str, "CipherKey([REDACTED])");
    }

    #[test]
    fn test_decrypt_stored_token() {
        let key = test_key(5);
        let sealed = encrypt(b"stored-session-token", &key).unwrap();

        let token = decrypt_stored_token(&sealed, &key).unwrap();
        assert_eq!(token.expose_secret(), "stored-session-token");
    }

    #[test]
    fn test_decrypt_stored_token_rejects_non_utf8() {
        let key = test_key(6);
        let sealed = encrypt(&[0xFF, 0xFE, 0xFD], &key).unwrap();

        assert_eq!(
            decrypt_stored_token(&sealed, &key).err(),
            Some(CipherError::InvalidUtf8)
        );
    }

    #[test]
    fn test_token_cannot_decrypt_itself() {
        // A token-derived key must not open data sealed under the real key
        let real_key = test_key(7);
        let token = "abcdefghijklmnopqrstuvwxyz012345";
        let sealed = encrypt(token.as_bytes(), &real_key).unwrap();

        let token_as_key = CipherKey::from_bytes(token.as_bytes()).unwrap();
        assert_eq!(
            decrypt_stored_token(&sealed, &token_as_key).err(),
            Some(CipherError::Decryption)
        );
    }
}
