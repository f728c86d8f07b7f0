//! Stratified cross-validated SVM evaluation
//!
//! Trains and evaluates a kernelized SVM over stratified k-folds: each fold
//! fits a feature scaler and classifier on its training partition only, then
//! scores the held-out partition. Built for multi-class EEG evoked potential
//! features, but any dense feature matrix with categorical labels works.

pub mod cache;
pub mod config;
pub mod core;
pub mod cv;
pub mod data;
pub mod kernel;
pub mod metrics;
pub mod multiclass;
pub mod report;
pub mod scaling;
pub mod solver;

// Re-export main types for convenience
pub use crate::cache::KernelCache;
pub use crate::config::{EvalConfig, Gamma, KernelKind};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::core::{EvalError, Result};
pub use crate::cv::{CrossValidator, StratifiedKFold};
pub use crate::data::CsvDataset;
pub use crate::kernel::{Kernel, LinearKernel, PolyKernel, RbfKernel};
pub use crate::metrics::ConfusionMatrix;
pub use crate::multiclass::{MulticlassStrategy, SvmClassifier};
pub use crate::report::{EvaluationReport, FoldResult};
pub use crate::scaling::{DegeneratePolicy, StandardScaler};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
