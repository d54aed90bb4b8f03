//! Builder patterns for test tokens
//!
//! Produces compact `header.payload.signature` strings. The signature is a
//! fixed placeholder; nothing in the local path verifies it.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use serde_json::{json, Map, Value};

/// Builder for creating test tokens
///
/// Defaults to issuer `ziqx.cc` and expiry one hour from now.
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_subject("alice")
///     .with_issuer("ziqx.cc")
///     .expires_in(3600)
///     .build();
/// ```
pub struct TestTokenBuilder {
    iss: Option<String>,
    exp: Option<i64>,
    sub: Option<String>,
    extra: Map<String, Value>,
    signature: String,
}

impl TestTokenBuilder {
    /// Create a new token builder with defaults
    pub fn new() -> Self {
        Self {
            iss: Some(ziqx_auth::DEFAULT_TRUSTED_ISSUER.to_string()),
            exp: Some((Utc::now() + Duration::seconds(3600)).timestamp()),
            sub: None,
            extra: Map::new(),
            signature: URL_SAFE_NO_PAD.encode("test-signature"),
        }
    }

    /// Set the issuer claim
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.iss = Some(issuer.to_string());
        self
    }

    /// Omit the issuer claim
    pub fn without_issuer(mut self) -> Self {
        self.iss = None;
        self
    }

    /// Set expiration in seconds from now (negative for the past)
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = Some((Utc::now() + Duration::seconds(seconds)).timestamp());
        self
    }

    /// Set an absolute expiration timestamp
    pub fn expires_at(mut self, timestamp: i64) -> Self {
        self.exp = Some(timestamp);
        self
    }

    /// Omit the expiration claim
    pub fn without_expiry(mut self) -> Self {
        self.exp = None;
        self
    }

    /// Set the subject
    pub fn for_subject(mut self, subject: &str) -> Self {
        self.sub = Some(subject.to_string());
        self
    }

    /// Add an arbitrary claim
    pub fn with_claim(mut self, name: &str, value: Value) -> Self {
        self.extra.insert(name.to_string(), value);
        self
    }

    /// Replace the signature segment verbatim
    pub fn with_signature(mut self, signature: &str) -> Self {
        self.signature = signature.to_string();
        self
    }

    /// Build the claims as a JSON value
    pub fn claims(&self) -> Value {
        let mut claims = self.extra.clone();
        if let Some(iss) = &self.iss {
            claims.insert("iss".to_string(), json!(iss));
        }
        if let Some(exp) = self.exp {
            claims.insert("exp".to_string(), json!(exp));
        }
        if let Some(sub) = &self.sub {
            claims.insert("sub".to_string(), json!(sub));
        }
        Value::Object(claims)
    }

    /// Build the compact token string
    pub fn build(self) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"EdDSA","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(self.claims().to_string());
        format!("{header}.{payload}.{}", self.signature)
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
