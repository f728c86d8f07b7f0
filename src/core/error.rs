//! Error types for cross-validated evaluation

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvalError {
    #[error("class '{class}' has {count} samples but {folds} folds were requested")]
    InsufficientSamples {
        class: String,
        count: usize,
        folds: usize,
    },

    #[error("feature column {index} has zero variance")]
    DegenerateFeature { index: usize },

    #[error("solver did not converge within {iterations} iterations (fold {fold}, {stage})")]
    Convergence {
        fold: usize,
        stage: String,
        iterations: usize,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl EvalError {
    /// Attach a fold index to a convergence failure; other errors pass through.
    pub(crate) fn at_fold(self, fold_index: usize) -> Self {
        match self {
            EvalError::Convergence {
                stage, iterations, ..
            } => EvalError::Convergence {
                fold: fold_index,
                stage,
                iterations,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;
