//! Navigator that records login hand-offs instead of performing them.

use std::sync::Mutex;
use url::Url;
use ziqx_auth::login::{NavigationError, Navigator};

/// Records every URL it is asked to navigate to.
///
/// # Example
/// ```rust,ignore
/// let navigator = RecordingNavigator::new();
/// redirector.login(&navigator, &LoginRequest::new("app"))?;
/// assert_eq!(navigator.visited().len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    visited: Mutex<Vec<Url>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// All URLs navigated to, in order
    pub fn visited(&self) -> Vec<Url> {
        self.visited.lock().unwrap().clone()
    }

    /// The most recent navigation target
    pub fn last(&self) -> Option<Url> {
        self.visited.lock().unwrap().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_to(&self, url: &Url) -> Result<(), NavigationError> {
        self.visited.lock().unwrap().push(url.clone());
        Ok(())
    }
}
