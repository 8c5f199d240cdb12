//! Test support utilities for veil.
//!
//! Provides mock collaborators and synthetic image fixtures for testing the
//! moderation pipeline without any model backend.
//!
//! # Example
//!
//! ```
//! use veil_test_support::{MockFaceLocator, SyntheticImageBuilder};
//!
//! let image = SyntheticImageBuilder::portrait();
//! let locator = MockFaceLocator::empty();
//! assert_eq!(locator.call_count(), 0);
//! # let _ = image;
//! ```

mod builders;
mod mocks;

pub use builders::{centered_face, face, SyntheticImageBuilder};
pub use mocks::{
    MockFaceLocator, MockGenderClassifier, MockLabelAnalyzer, MockNsfwClassifier, ScriptedGender,
};
