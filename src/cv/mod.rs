//! Stratified cross-validation

pub mod evaluator;
pub mod partition;

pub use evaluator::CrossValidator;
pub use partition::StratifiedKFold;
