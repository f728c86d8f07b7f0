//! Binary SVM solver

pub mod smo;

pub use smo::{OptimizationResult, SmoSolver};
