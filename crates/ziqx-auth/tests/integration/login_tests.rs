//! Login redirect hand-off through injected navigators.

use std::collections::HashMap;
use ziqx_auth::config::{AuthConfig, PROVIDER_URL_VAR};
use ziqx_auth::login::{
    LoginError, LoginRedirector, LoginRequest, NavigationError, UnsupportedEnvironment,
};
use ziqx_test_utils::RecordingNavigator;

#[test]
fn test_login_hands_url_to_navigator() {
    let navigator = RecordingNavigator::new();

    LoginRedirector::default()
        .login(&navigator, &LoginRequest::new("console-app-77"))
        .unwrap();

    let last = navigator.last().unwrap();
    assert_eq!(last.host_str(), Some("ziqx.cc"));
    assert_eq!(last.query(), Some("appId=console-app-77"));
}

#[test]
fn test_developer_mode_login() {
    let navigator = RecordingNavigator::new();

    LoginRedirector::default()
        .login(
            &navigator,
            &LoginRequest::new("console-app-77").developer_mode(true),
        )
        .unwrap();

    assert_eq!(
        navigator.last().unwrap().query(),
        Some("appId=console-app-77&dev=1")
    );
}

#[test]
fn test_server_side_login_reports_unsupported_environment() {
    let result = LoginRedirector::default().login(&UnsupportedEnvironment, &LoginRequest::new("a"));

    assert!(matches!(
        result,
        Err(LoginError::Navigation(NavigationError::UnsupportedEnvironment))
    ));
}

#[test]
fn test_configured_provider_is_used() {
    let vars = HashMap::from([(
        PROVIDER_URL_VAR.to_string(),
        "https://login.dev.ziqx.cc".to_string(),
    )]);
    let config = AuthConfig::from_vars(&vars).unwrap();
    let navigator = RecordingNavigator::new();

    LoginRedirector::from_config(&config)
        .login(&navigator, &LoginRequest::new("a"))
        .unwrap();

    assert_eq!(
        navigator.last().unwrap().as_str(),
        "https://login.dev.ziqx.cc/?appId=a"
    );
}

#[test]
fn test_each_login_navigates_once() {
    let navigator = RecordingNavigator::new();
    let redirector = LoginRedirector::default();

    redirector.login(&navigator, &LoginRequest::new("a")).unwrap();
    redirector.login(&navigator, &LoginRequest::new("b")).unwrap();

    let visited = navigator.visited();
    assert_eq!(visited.len(), 2);
    assert_eq!(visited[0].query(), Some("appId=a"));
    assert_eq!(visited[1].query(), Some("appId=b"));
}
