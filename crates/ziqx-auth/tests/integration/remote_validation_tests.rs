//! Remote validation against a mock authority.

use std::time::Duration;
use wiremock::ResponseTemplate;
use ziqx_auth::remote::{IndeterminateReason, RemoteValidator, RemoteVerdict};
use ziqx_test_utils::{init_test_tracing, MockValidationAuthority, TestTokenBuilder};

#[tokio::test]
async fn test_accepted_token_is_valid() {
    init_test_tracing();
    let authority = MockValidationAuthority::start().await;
    let token = TestTokenBuilder::new().build();
    authority.accept(&token).await;

    let verdict = authority.validator().validate(&token).await;

    assert_eq!(verdict, RemoteVerdict::Valid);
    assert_eq!(authority.request_count().await, 1);
}

#[tokio::test]
async fn test_rejected_token_is_invalid() {
    let authority = MockValidationAuthority::start().await;
    authority.reject("revoked-token").await;

    let verdict = authority.validator().validate("revoked-token").await;

    assert_eq!(verdict, RemoteVerdict::Invalid);
    assert!(!verdict.is_valid());
}

#[tokio::test]
async fn test_empty_token_never_reaches_authority() {
    let authority = MockValidationAuthority::start().await;
    authority
        .respond_to_all(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "success"})),
        )
        .await;

    let verdict = authority.validator().validate("").await;

    assert_eq!(verdict, RemoteVerdict::Invalid);
    assert_eq!(authority.request_count().await, 0);
}

#[tokio::test]
async fn test_non_json_body_collapses_to_false() {
    let authority = MockValidationAuthority::start().await;
    authority
        .respond_to_all(ResponseTemplate::new(200).set_body_string("Service temporarily down"))
        .await;

    let verdict = authority.validator().validate("any").await;

    assert!(!verdict.is_valid());
    assert_eq!(
        verdict,
        RemoteVerdict::Indeterminate(IndeterminateReason::MalformedResponse)
    );
}

#[tokio::test]
async fn test_array_body_is_not_an_answer() {
    let authority = MockValidationAuthority::start().await;
    authority
        .respond_to_all(ResponseTemplate::new(200).set_body_json(serde_json::json!(["success"])))
        .await;

    let verdict = authority.validator().validate("any").await;

    assert!(!verdict.is_valid());
    assert_eq!(
        verdict,
        RemoteVerdict::Indeterminate(IndeterminateReason::MalformedResponse)
    );
}

#[tokio::test]
async fn test_unknown_token_gets_404_and_is_indeterminate() {
    let authority = MockValidationAuthority::start().await;
    authority.accept("known").await;

    let verdict = authority.validator().validate("unknown").await;

    assert_eq!(
        verdict,
        RemoteVerdict::Indeterminate(IndeterminateReason::HttpStatus(404))
    );
}

#[tokio::test]
async fn test_unreachable_authority_collapses_to_false() {
    let authority = MockValidationAuthority::start().await;
    let base = authority.base_url();
    drop(authority);

    let verdict = RemoteValidator::new(&base).unwrap().validate("token").await;

    assert!(!verdict.is_valid());
    assert!(!verdict.is_determinate());
}

#[tokio::test]
async fn test_caller_layered_timeout() {
    let authority = MockValidationAuthority::start().await;
    authority
        .respond_to_all(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"status": "success"}))
                .set_delay(Duration::from_secs(5)),
        )
        .await;

    let validator = authority.validator();
    let result =
        tokio::time::timeout(Duration::from_millis(200), validator.validate("slow")).await;

    assert!(result.is_err(), "caller timeout should fire first");
}

#[tokio::test]
async fn test_concurrent_validations_do_not_interfere() {
    let authority = MockValidationAuthority::start().await;
    authority.accept("good-1").await;
    authority.accept("good-2").await;
    authority.reject("bad-1").await;

    let validator = authority.validator();
    let (a, b, c) = tokio::join!(
        validator.validate("good-1"),
        validator.validate("bad-1"),
        validator.validate("good-2"),
    );

    assert_eq!(a, RemoteVerdict::Valid);
    assert_eq!(b, RemoteVerdict::Invalid);
    assert_eq!(c, RemoteVerdict::Valid);
}
