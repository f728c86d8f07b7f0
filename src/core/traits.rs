//! Core traits for cross-validated evaluation

use crate::core::{FeatureMatrix, Result};

/// Multi-class classifier abstraction
///
/// The cross-validator is generic over this trait so alternative classifiers
/// can be evaluated with the same fold machinery.
pub trait Classifier: Send + Sync {
    /// Fit the classifier on scaled training data.
    ///
    /// `y` holds dense class ids (0-based). Class ids missing from `y` are
    /// still legal prediction targets if the classifier saw them elsewhere,
    /// but this implementation derives its class set from `y`.
    fn fit(&mut self, x: &FeatureMatrix, y: &[usize]) -> Result<()>;

    /// Predict a class id per row; never mutates classifier state.
    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<usize>>;
}
