//! Local validation against realistic tokens built with `TestTokenBuilder`.

use ziqx_auth::local::{is_structurally_plausible, LocalRejection, LocalValidator};
use ziqx_test_utils::{init_test_tracing, TestTokenBuilder};

#[test]
fn test_fresh_ziqx_token_is_plausible() {
    init_test_tracing();
    let token = TestTokenBuilder::new().expires_in(3600).build();
    assert!(is_structurally_plausible(token.as_str()));
}

#[test]
fn test_empty_and_absent_tokens_are_rejected() {
    assert!(!is_structurally_plausible(""));
    assert!(!is_structurally_plausible(None));
    assert_eq!(
        LocalValidator::default().inspect(""),
        Err(LocalRejection::Empty)
    );
}

#[test]
fn test_wrong_segment_counts_are_rejected() {
    for token in ["abc", "a.b", "a.b.c.d"] {
        assert!(!is_structurally_plausible(token), "{token} should fail");
    }
}

#[test]
fn test_expired_token_is_rejected() {
    init_test_tracing();
    let token = TestTokenBuilder::new().expires_in(-3600).build();

    assert!(!is_structurally_plausible(token.as_str()));
    assert_eq!(
        LocalValidator::default().inspect(&token),
        Err(LocalRejection::Expired)
    );
}

#[test]
fn test_foreign_issuer_is_rejected() {
    let token = TestTokenBuilder::new()
        .with_issuer("not-ziqx.cc")
        .expires_in(3600)
        .build();

    assert!(!is_structurally_plausible(token.as_str()));
    assert_eq!(
        LocalValidator::default().inspect(&token),
        Err(LocalRejection::IssuerMismatch)
    );
}

#[test]
fn test_claims_are_returned_for_plausible_token() {
    let token = TestTokenBuilder::new()
        .for_subject("user-1")
        .with_claim("name", serde_json::json!("Alice"))
        .build();

    let claims = LocalValidator::default().inspect(&token).unwrap();
    assert_eq!(claims.iss.as_deref(), Some("ziqx.cc"));
    assert_eq!(claims.subject(), Some("user-1"));
    assert_eq!(claims.extra["name"], "Alice");
}

#[test]
fn test_forged_signature_still_passes_locally() {
    // Local inspection is not an authenticity check
    let token = TestTokenBuilder::new().with_signature("forged").build();
    assert!(is_structurally_plausible(token.as_str()));
}

#[test]
fn test_missing_claims_pass_unless_required() {
    let token = TestTokenBuilder::new()
        .without_issuer()
        .without_expiry()
        .build();

    assert!(LocalValidator::default().is_structurally_plausible(token.as_str()));
    assert!(!LocalValidator::default()
        .require_claims(true)
        .is_structurally_plausible(token.as_str()));
}

#[test]
fn test_repeated_checks_agree() {
    let token = TestTokenBuilder::new().expires_in(600).build();
    let validator = LocalValidator::default();

    let results: Vec<bool> = (0..10)
        .map(|_| validator.is_structurally_plausible(token.as_str()))
        .collect();
    assert!(results.iter().all(|&ok| ok));
}

#[test]
fn test_numeric_and_nested_claims_do_not_affect_plausibility() {
    let token = TestTokenBuilder::new()
        .expires_in(3600)
        .with_claim("sub", serde_json::json!(42))
        .with_claim("iat", serde_json::json!(1_700_000_000))
        .with_claim("aud", serde_json::json!({"app": "console"}))
        .build();

    assert!(is_structurally_plausible(token.as_str()));
    let claims = LocalValidator::default().inspect(&token).unwrap();
    assert_eq!(claims.sub, Some(serde_json::json!(42)));
    assert_eq!(claims.extra["aud"]["app"], "console");
}
