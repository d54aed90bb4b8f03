//! Mock validation authority for remote validation tests
//!
//! Wraps a `wiremock` server that speaks the `/auth/validateToken.php`
//! contract.

use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use ziqx_auth::remote::{RemoteValidator, VALIDATION_PATH};

/// Local stand-in for the ziqx validation endpoint
///
/// Tokens that were not registered get whatever fallback was mounted; with
/// no fallback wiremock answers 404.
///
/// # Example
/// ```rust,ignore
/// let authority = MockValidationAuthority::start().await;
/// authority.accept("good").await;
/// authority.reject("bad").await;
///
/// let validator = authority.validator();
/// assert!(validator.validate("good").await.is_valid());
/// ```
pub struct MockValidationAuthority {
    server: MockServer,
}

impl MockValidationAuthority {
    /// Start the mock server on a random local port
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Base URL to hand to `RemoteValidator::new`
    pub fn base_url(&self) -> Url {
        Url::parse(&self.server.uri()).unwrap()
    }

    /// A validator pointed at this authority
    pub fn validator(&self) -> RemoteValidator {
        RemoteValidator::new(&self.base_url()).unwrap()
    }

    /// Respond `{"status":"success"}` for `token`
    pub async fn accept(&self, token: &str) {
        self.respond_for(token, ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success"
        })))
        .await;
    }

    /// Respond `{"status":"failure"}` for `token`
    pub async fn reject(&self, token: &str) {
        self.respond_for(token, ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "failure",
            "message": "Invalid token"
        })))
        .await;
    }

    /// Respond with an arbitrary template for `token`
    pub async fn respond_for(&self, token: &str, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(format!("/{VALIDATION_PATH}")))
            .and(query_param("token", token))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Respond with `response` to every validation request
    pub async fn respond_to_all(&self, response: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(format!("/{VALIDATION_PATH}")))
            .respond_with(response)
            .mount(&self.server)
            .await;
    }

    /// Number of requests the authority has received
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map_or(0, |requests| requests.len())
    }
}
