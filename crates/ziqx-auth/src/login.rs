//! Redirect-based login hand-off to the ziqx provider.
//!
//! The redirector builds `https://<provider>/?appId=<id>[&dev=1]` and passes
//! it to a [`Navigator`]. Hosts that can navigate (an embedded browser, a
//! desktop shell) implement the trait; server-side hosts use
//! [`UnsupportedEnvironment`], which reports the failure as a value instead
//! of navigating.
//!
//! ```rust
//! use ziqx_auth::login::{LoginRedirector, LoginRequest, NavigationError, UnsupportedEnvironment};
//! use ziqx_auth::LoginError;
//!
//! let redirector = LoginRedirector::default();
//! let url = redirector.login_url(&LoginRequest::new("my-app").developer_mode(true))?;
//! assert_eq!(url.as_str(), "https://ziqx.cc/?appId=my-app&dev=1");
//!
//! let result = redirector.login(&UnsupportedEnvironment, &LoginRequest::new("my-app"));
//! assert!(matches!(
//!     result,
//!     Err(LoginError::Navigation(NavigationError::UnsupportedEnvironment))
//! ));
//! # Ok::<(), LoginError>(())
//! ```

use thiserror::Error;
use url::Url;

use crate::config::AuthConfig;
use crate::DEFAULT_PROVIDER_URL;

const LOG_TARGET: &str = "ziqx.auth.login";

/// Failures reported by a [`Navigator`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// The host has no navigable context (e.g. a server-side runtime).
    #[error("Login navigation is not supported in this environment")]
    UnsupportedEnvironment,

    /// The host tried to navigate and failed.
    #[error("Navigation failed: {0}")]
    Failed(String),
}

/// Errors returned by [`LoginRedirector::login`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    /// The application identifier was empty.
    #[error("Application id must not be empty")]
    EmptyApplicationId,

    /// The login URL could not be built from the provider base.
    #[error("Invalid provider URL: {0}")]
    InvalidProviderUrl(String),

    /// The navigator refused or failed the hand-off.
    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

/// Capability to move the user agent to another URL.
///
/// Implementations perform a full-page navigation. In a real browser context
/// control typically never comes back to the caller.
pub trait Navigator {
    /// Navigate to `url`.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError`] when the host cannot navigate.
    fn navigate_to(&self, url: &Url) -> Result<(), NavigationError>;
}

/// Navigator for hosts without a navigable context.
///
/// Always fails with [`NavigationError::UnsupportedEnvironment`] after
/// logging a diagnostic. Nothing is navigated.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedEnvironment;

impl Navigator for UnsupportedEnvironment {
    fn navigate_to(&self, _url: &Url) -> Result<(), NavigationError> {
        tracing::warn!(
            target: LOG_TARGET,
            "Login redirect requested in an unsupported environment; no navigation performed"
        );
        Err(NavigationError::UnsupportedEnvironment)
    }
}

/// A single login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRequest {
    /// Identifier issued by the provider's developer console.
    pub application_id: String,

    /// Route the session through the provider's non-production environment.
    pub developer_mode: bool,
}

impl LoginRequest {
    /// Create a production login request.
    #[must_use]
    pub fn new(application_id: impl Into<String>) -> Self {
        Self {
            application_id: application_id.into(),
            developer_mode: false,
        }
    }

    /// Toggle developer mode.
    #[must_use]
    pub fn developer_mode(mut self, enabled: bool) -> Self {
        self.developer_mode = enabled;
        self
    }
}

/// Builds login URLs and performs the navigation hand-off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirector {
    provider_url: Url,
}

impl Default for LoginRedirector {
    fn default() -> Self {
        // DEFAULT_PROVIDER_URL is a compile-time constant that always parses
        #[allow(clippy::expect_used)]
        let provider_url = Url::parse(DEFAULT_PROVIDER_URL).expect("default provider URL parses");
        Self { provider_url }
    }
}

impl LoginRedirector {
    /// Create a redirector for the given provider base URL.
    #[must_use]
    pub fn new(provider_url: Url) -> Self {
        Self { provider_url }
    }

    /// Create a redirector from loaded configuration.
    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.provider_url.clone())
    }

    /// Build the provider login URL without navigating.
    ///
    /// The application id is query-encoded but its format is not checked;
    /// a bad id surfaces as a provider-side error after the redirect.
    ///
    /// # Errors
    ///
    /// - `EmptyApplicationId` - the id is empty
    /// - `InvalidProviderUrl` - the provider base cannot carry a query
    pub fn login_url(&self, request: &LoginRequest) -> Result<Url, LoginError> {
        if request.application_id.is_empty() {
            return Err(LoginError::EmptyApplicationId);
        }

        if self.provider_url.cannot_be_a_base() {
            return Err(LoginError::InvalidProviderUrl(
                self.provider_url.to_string(),
            ));
        }

        let mut url = self.provider_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("appId", &request.application_id);
            if request.developer_mode {
                query.append_pair("dev", "1");
            }
        }

        Ok(url)
    }

    /// Build the login URL and hand it to `navigator`.
    ///
    /// There is nothing to return on success: in a navigable host the
    /// process leaves the current page.
    ///
    /// # Errors
    ///
    /// Any [`LoginRedirector::login_url`] error, or the navigator's failure
    /// wrapped in `LoginError::Navigation`.
    pub fn login(
        &self,
        navigator: &dyn Navigator,
        request: &LoginRequest,
    ) -> Result<(), LoginError> {
        let url = self.login_url(request)?;

        tracing::info!(
            target: LOG_TARGET,
            developer_mode = request.developer_mode,
            "Redirecting to login provider"
        );

        navigator.navigate_to(&url).map_err(|e| {
            tracing::warn!(target: LOG_TARGET, error = %e, "Login navigation failed");
            LoginError::Navigation(e)
        })
    }
}
