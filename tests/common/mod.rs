//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{FailingClassifier, TestHarness, RECENTLY_PLAYED_QUERY};
//! use std::sync::Arc;
//!
//! #[tokio::test]
//! async fn test_recently_played() {
//!     let harness = TestHarness::new(Arc::new(FailingClassifier));
//!     let report = harness.run(RECENTLY_PLAYED_QUERY).await;
//!     assert!(report.is_success());
//! }
//! ```

mod constants;
mod harness;
mod stubs;

// Public API - this is what tests import
pub use constants::*;
pub use harness::TestHarness;
#[allow(unused_imports)]
pub use stubs::{FailingClassifier, FaultyStore, StubClassifier};
