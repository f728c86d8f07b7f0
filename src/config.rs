//! Evaluation configuration
//!
//! All knobs recognized by the evaluator, loadable from a JSON file and
//! overridable from the command line. A config snapshot is embedded in every
//! report so results stay attributable to their settings.

use crate::core::{EvalError, FeatureMatrix, Result, SolverConfig};
use crate::kernel::{Kernel, LinearKernel, PolyKernel, RbfKernel};
use crate::multiclass::MulticlassStrategy;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

/// Kernel family selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KernelKind {
    #[default]
    Rbf,
    Linear,
    Poly,
}

impl fmt::Display for KernelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelKind::Rbf => write!(f, "rbf"),
            KernelKind::Linear => write!(f, "linear"),
            KernelKind::Poly => write!(f, "poly"),
        }
    }
}

/// Kernel width specification: `"scale"`, `"auto"`, or an explicit value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(try_from = "GammaRepr", into = "GammaRepr")]
pub enum Gamma {
    /// 1 / (n_features * variance of the training matrix), sklearn's default
    #[default]
    Scale,
    /// 1 / n_features
    Auto,
    /// Explicit positive value
    Value(f64),
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(untagged)]
enum GammaRepr {
    Number(f64),
    Name(String),
}

impl TryFrom<GammaRepr> for Gamma {
    type Error = String;

    fn try_from(repr: GammaRepr) -> std::result::Result<Self, String> {
        match repr {
            GammaRepr::Number(v) if v > 0.0 => Ok(Gamma::Value(v)),
            GammaRepr::Number(v) => Err(format!("gamma must be positive, got {v}")),
            GammaRepr::Name(name) => match name.as_str() {
                "scale" => Ok(Gamma::Scale),
                "auto" => Ok(Gamma::Auto),
                other => Err(format!("unknown gamma '{other}': use scale, auto, or a number")),
            },
        }
    }
}

impl From<Gamma> for GammaRepr {
    fn from(gamma: Gamma) -> Self {
        match gamma {
            Gamma::Scale => GammaRepr::Name("scale".to_string()),
            Gamma::Auto => GammaRepr::Name("auto".to_string()),
            Gamma::Value(v) => GammaRepr::Number(v),
        }
    }
}

impl Gamma {
    /// Resolve to a concrete value against the training matrix.
    ///
    /// `Scale` with a zero-variance matrix falls back to 1 / n_features with
    /// a warning, since the division would otherwise blow up.
    pub fn resolve(&self, x: &FeatureMatrix) -> Result<f64> {
        let d = x.cols();
        if d == 0 {
            return Err(EvalError::InvalidParameter(
                "cannot resolve gamma for a matrix with no features".to_string(),
            ));
        }

        match *self {
            Gamma::Value(v) => Ok(v),
            Gamma::Auto => Ok(1.0 / d as f64),
            Gamma::Scale => {
                let var = x.global_variance();
                if var <= f64::EPSILON {
                    warn!("training matrix has ~zero variance; gamma 'scale' falls back to 'auto'");
                    Ok(1.0 / d as f64)
                } else {
                    Ok(1.0 / (d as f64 * var))
                }
            }
        }
    }
}

impl fmt::Display for Gamma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gamma::Scale => write!(f, "scale"),
            Gamma::Auto => write!(f, "auto"),
            Gamma::Value(v) => write!(f, "{v}"),
        }
    }
}

/// Full evaluator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Number of stratified folds (k)
    pub num_folds: usize,
    /// Seed for the per-class shuffle during fold assignment
    pub random_seed: u64,
    /// Kernel family
    pub svm_kernel: KernelKind,
    /// Regularization strength C
    pub svm_c: f64,
    /// Kernel width
    pub svm_gamma: Gamma,
    /// Polynomial degree (poly kernel only)
    pub poly_degree: u32,
    /// Independent term (poly kernel only)
    pub coef0: f64,
    /// Multi-class decomposition
    pub multiclass_strategy: MulticlassStrategy,
    /// KKT tolerance for the SMO solver
    pub epsilon: f64,
    /// Solver iteration budget before reporting non-convergence
    pub max_iterations: usize,
    /// Kernel cache budget in bytes
    pub cache_size: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            num_folds: 5,
            random_seed: 42,
            svm_kernel: KernelKind::Rbf,
            svm_c: 1.0,
            svm_gamma: Gamma::Scale,
            poly_degree: 3,
            coef0: 0.0,
            multiclass_strategy: MulticlassStrategy::OneVsOne,
            epsilon: 0.001,
            max_iterations: 10000,
            cache_size: 100_000_000,
        }
    }
}

impl EvalConfig {
    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.num_folds < 2 {
            return Err(EvalError::InvalidParameter(format!(
                "num_folds must be at least 2, got {}",
                self.num_folds
            )));
        }
        if self.svm_c <= 0.0 {
            return Err(EvalError::InvalidParameter(format!(
                "svm_c must be positive, got {}",
                self.svm_c
            )));
        }
        if let Gamma::Value(v) = self.svm_gamma {
            if v <= 0.0 {
                return Err(EvalError::InvalidParameter(format!(
                    "svm_gamma must be positive, got {v}"
                )));
            }
        }
        if self.poly_degree == 0 {
            return Err(EvalError::InvalidParameter(
                "poly_degree must be at least 1".to_string(),
            ));
        }
        if self.epsilon <= 0.0 {
            return Err(EvalError::InvalidParameter(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        if self.max_iterations == 0 {
            return Err(EvalError::InvalidParameter(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from a JSON file; missing fields take defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(EvalError::IoError)?;
        let reader = BufReader::new(file);
        let config: EvalConfig = serde_json::from_reader(reader)
            .map_err(|e| EvalError::SerializationError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as pretty JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(EvalError::IoError)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| EvalError::SerializationError(e.to_string()))
    }

    /// Solver parameters implied by this configuration
    pub fn solver_config(&self) -> SolverConfig {
        SolverConfig {
            c: self.svm_c,
            epsilon: self.epsilon,
            max_iterations: self.max_iterations,
            cache_size: self.cache_size,
        }
    }

    /// Instantiate the configured kernel with a resolved gamma value.
    pub fn build_kernel(&self, gamma: f64) -> Arc<dyn Kernel> {
        match self.svm_kernel {
            KernelKind::Linear => Arc::new(LinearKernel::new()),
            KernelKind::Rbf => Arc::new(RbfKernel::new(gamma)),
            KernelKind::Poly => Arc::new(PolyKernel::new(gamma, self.poly_degree, self.coef0)),
        }
    }
}
