//! Core types, traits, and error definitions

pub mod error;
pub mod traits;
pub mod types;

pub use error::{EvalError, Result};
pub use traits::Classifier;
pub use types::{ClassMap, FeatureMatrix, Fold, Labels, SolverConfig};
