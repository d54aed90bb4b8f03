//! # Ziqx Test Utilities
//!
//! Shared test utilities for the ziqx auth crates.
//!
//! This crate provides:
//! - Compact token builders (`TestTokenBuilder`)
//! - A navigator that records instead of navigating (`RecordingNavigator`)
//! - A mock validation authority on a local port (`MockValidationAuthority`)
//! - Test log capture (`init_test_tracing`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ziqx_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let token = TestTokenBuilder::new().expires_in(3600).build();
//!
//!     let authority = MockValidationAuthority::start().await;
//!     authority.accept(&token).await;
//!
//!     assert!(authority.validator().validate(&token).await.is_valid());
//! }
//! ```

pub mod mock_authority;
pub mod navigator;
pub mod token_builders;

// Re-export commonly used items
pub use mock_authority::*;
pub use navigator::*;
pub use token_builders::*;

/// Install a test-friendly tracing subscriber once per process.
///
/// Honors `RUST_LOG`; defaults to `ziqx=debug`. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ziqx=debug".into()),
        )
        .with_test_writer()
        .try_init();
}
