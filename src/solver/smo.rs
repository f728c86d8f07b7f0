//! Sequential Minimal Optimization (SMO) solver implementation
//!
//! Implements Platt's SMO algorithm for the binary soft-margin SVM dual
//! problem, optimizing pairs of Lagrange multipliers until the KKT conditions
//! hold within tolerance. Multi-class training decomposes into several of
//! these binary problems.

use crate::cache::KernelCache;
use crate::core::{EvalError, FeatureMatrix, Result, SolverConfig};
use crate::kernel::Kernel;
use log::{debug, trace};
use std::sync::Arc;

/// Result of the dual optimization
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Lagrange multipliers (alpha values), one per training sample
    pub alpha: Vec<f64>,
    /// Bias term (b)
    pub bias: f64,
    /// Indices of support vectors (where alpha > 0)
    pub support_indices: Vec<usize>,
    /// Number of outer iterations performed
    pub iterations: usize,
}

/// SMO solver for the binary SVM dual problem
pub struct SmoSolver {
    kernel: Arc<dyn Kernel>,
    config: SolverConfig,
}

/// Alphas below this are treated as numerically zero.
const ALPHA_ZERO: f64 = 1e-12;

impl SmoSolver {
    /// Create a new SMO solver with the given kernel and configuration
    pub fn new(kernel: Arc<dyn Kernel>, config: SolverConfig) -> Self {
        Self { kernel, config }
    }

    /// Solve the dual problem for samples `x` with binary labels `y` (+1/-1).
    ///
    /// `stage` names the binary sub-problem (e.g. which class pair) and is
    /// carried into the convergence error so failures stay attributable.
    pub fn solve(&self, x: &FeatureMatrix, y: &[f64], stage: &str) -> Result<OptimizationResult> {
        if x.is_empty() {
            return Err(EvalError::EmptyDataset);
        }
        if y.len() != x.rows() {
            return Err(EvalError::DimensionMismatch {
                expected: x.rows(),
                actual: y.len(),
            });
        }
        for &label in y {
            if label != 1.0 && label != -1.0 {
                return Err(EvalError::InvalidParameter(format!(
                    "binary solver expects labels +1/-1, got {label}"
                )));
            }
        }

        let n = x.rows();
        let mut state = SolveState {
            x,
            y,
            alpha: vec![0.0; n],
            // f(x_i) = 0 with all alphas zero, so E_i = -y_i
            errors: y.iter().map(|&l| -l).collect(),
            bias: 0.0,
            cache: KernelCache::with_memory_limit(self.config.cache_size),
            kernel: Arc::clone(&self.kernel),
            c: self.config.c,
            tol: self.config.epsilon,
        };

        let mut iterations = 0;
        let mut num_changed = 0;
        let mut examine_all = true;

        while (num_changed > 0 || examine_all) && iterations < self.config.max_iterations {
            num_changed = 0;

            if examine_all {
                for i in 0..n {
                    num_changed += usize::from(state.examine_example(i));
                }
            } else {
                for i in 0..n {
                    if state.alpha[i] > ALPHA_ZERO && state.alpha[i] < state.c - ALPHA_ZERO {
                        num_changed += usize::from(state.examine_example(i));
                    }
                }
            }

            if examine_all {
                examine_all = false;
            } else if num_changed == 0 {
                examine_all = true;
            }

            iterations += 1;
        }

        if num_changed > 0 || examine_all {
            return Err(EvalError::Convergence {
                fold: 0,
                stage: stage.to_string(),
                iterations,
            });
        }

        let support_indices: Vec<usize> = state
            .alpha
            .iter()
            .enumerate()
            .filter_map(|(i, &a)| (a > ALPHA_ZERO).then_some(i))
            .collect();

        debug!(
            "smo converged: {} iterations, {}/{} support vectors, cache hit rate {:.2}",
            iterations,
            support_indices.len(),
            n,
            state.cache.hit_rate()
        );

        Ok(OptimizationResult {
            alpha: state.alpha,
            bias: state.bias,
            support_indices,
            iterations,
        })
    }
}

/// Mutable solver state shared by the examine / step routines
struct SolveState<'a> {
    x: &'a FeatureMatrix,
    y: &'a [f64],
    alpha: Vec<f64>,
    errors: Vec<f64>,
    bias: f64,
    cache: KernelCache,
    kernel: Arc<dyn Kernel>,
    c: f64,
    tol: f64,
}

impl SolveState<'_> {
    fn k(&mut self, i: usize, j: usize) -> f64 {
        let (x, kernel) = (self.x, &self.kernel);
        self.cache
            .get_or_compute(i, j, || kernel.compute(x.row(i), x.row(j)))
    }

    /// Check KKT conditions for sample `i2` and attempt a joint step with a
    /// second multiplier if violated. Returns true when a step was taken.
    fn examine_example(&mut self, i2: usize) -> bool {
        let y2 = self.y[i2];
        let alpha2 = self.alpha[i2];
        let e2 = self.errors[i2];
        let r2 = e2 * y2;

        let violates_kkt = (r2 < -self.tol && alpha2 < self.c - ALPHA_ZERO)
            || (r2 > self.tol && alpha2 > ALPHA_ZERO);
        if !violates_kkt {
            return false;
        }

        // Second-choice heuristic: the non-bound partner maximizing |E1 - E2|
        if let Some(i1) = self.best_partner(i2, e2) {
            if self.take_step(i1, i2) {
                return true;
            }
        }

        // Fall back to scanning non-bound multipliers, then the whole set
        for i1 in 0..self.alpha.len() {
            if i1 != i2
                && self.alpha[i1] > ALPHA_ZERO
                && self.alpha[i1] < self.c - ALPHA_ZERO
                && self.take_step(i1, i2)
            {
                return true;
            }
        }
        for i1 in 0..self.alpha.len() {
            if i1 != i2 && self.take_step(i1, i2) {
                return true;
            }
        }

        false
    }

    /// Non-bound multiplier with maximum |E1 - E2|, if any
    fn best_partner(&self, i2: usize, e2: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &a) in self.alpha.iter().enumerate() {
            if i == i2 || a <= ALPHA_ZERO || a >= self.c - ALPHA_ZERO {
                continue;
            }
            let gap = (self.errors[i] - e2).abs();
            if best.map_or(true, |(_, g)| gap > g) {
                best = Some((i, gap));
            }
        }
        best.map(|(i, _)| i)
    }

    /// Jointly optimize alpha[i1] and alpha[i2]. Returns true on progress.
    fn take_step(&mut self, i1: usize, i2: usize) -> bool {
        if i1 == i2 {
            return false;
        }

        let alpha1 = self.alpha[i1];
        let alpha2 = self.alpha[i2];
        let y1 = self.y[i1];
        let y2 = self.y[i2];
        let e1 = self.errors[i1];
        let e2 = self.errors[i2];
        let s = y1 * y2;

        // Feasible range for the new alpha2
        let (low, high) = if s < 0.0 {
            let diff = alpha2 - alpha1;
            (diff.max(0.0), (self.c + diff).min(self.c))
        } else {
            let sum = alpha1 + alpha2;
            ((sum - self.c).max(0.0), sum.min(self.c))
        };
        if high - low < ALPHA_ZERO {
            return false;
        }

        let k11 = self.k(i1, i1);
        let k12 = self.k(i1, i2);
        let k22 = self.k(i2, i2);
        let eta = k11 + k22 - 2.0 * k12;

        if eta <= 0.0 {
            // Non-positive curvature along the constraint line; skip the pair.
            // Valid Mercer kernels make this rare (numerical noise only).
            trace!("non-positive eta for pair ({i1}, {i2}), skipping");
            return false;
        }

        let mut a2 = alpha2 + y2 * (e1 - e2) / eta;
        a2 = a2.clamp(low, high);

        if (a2 - alpha2).abs() < self.tol * (a2 + alpha2 + self.tol) {
            return false;
        }

        let a1 = alpha1 + s * (alpha2 - a2);

        // Bias update keeping the KKT conditions for the stepped pair
        let delta1 = y1 * (a1 - alpha1);
        let delta2 = y2 * (a2 - alpha2);
        let b1 = self.bias - e1 - delta1 * k11 - delta2 * k12;
        let b2 = self.bias - e2 - delta1 * k12 - delta2 * k22;
        let new_bias = if a1 > ALPHA_ZERO && a1 < self.c - ALPHA_ZERO {
            b1
        } else if a2 > ALPHA_ZERO && a2 < self.c - ALPHA_ZERO {
            b2
        } else {
            (b1 + b2) / 2.0
        };
        let delta_b = new_bias - self.bias;

        self.alpha[i1] = a1;
        self.alpha[i2] = a2;
        self.bias = new_bias;

        for i in 0..self.errors.len() {
            let k1i = self.k(i1, i);
            let k2i = self.k(i2, i);
            self.errors[i] += delta1 * k1i + delta2 * k2i + delta_b;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::LinearKernel;

    fn solver(c: f64, max_iterations: usize) -> SmoSolver {
        SmoSolver::new(
            Arc::new(LinearKernel::new()),
            SolverConfig {
                c,
                max_iterations,
                ..SolverConfig::default()
            },
        )
    }

    fn separable_1d() -> (FeatureMatrix, Vec<f64>) {
        let x = FeatureMatrix::from_rows(vec![
            vec![2.0],
            vec![1.5],
            vec![-2.0],
            vec![-1.5],
        ])
        .unwrap();
        (x, vec![1.0, 1.0, -1.0, -1.0])
    }

    fn decision(x: &FeatureMatrix, y: &[f64], result: &OptimizationResult, point: &[f64]) -> f64 {
        let kernel = LinearKernel::new();
        let mut value = result.bias;
        for &i in &result.support_indices {
            value += result.alpha[i] * y[i] * kernel.compute(x.row(i), point);
        }
        value
    }

    #[test]
    fn test_smo_separable_problem() {
        let (x, y) = separable_1d();
        let result = solver(1.0, 1000).solve(&x, &y, "test").unwrap();

        assert!(!result.support_indices.is_empty());
        assert!(result.iterations > 0);

        for (i, &label) in y.iter().enumerate() {
            let d = decision(&x, &y, &result, x.row(i));
            assert_eq!(d.signum(), label, "sample {i} misclassified (d = {d})");
        }
    }

    #[test]
    fn test_smo_alpha_within_box() {
        let (x, y) = separable_1d();
        let c = 0.5;
        let result = solver(c, 1000).solve(&x, &y, "test").unwrap();

        for &a in &result.alpha {
            assert!((0.0..=c + 1e-9).contains(&a), "alpha {a} outside [0, C]");
        }
    }

    #[test]
    fn test_smo_dual_constraint_holds() {
        let (x, y) = separable_1d();
        let result = solver(1.0, 1000).solve(&x, &y, "test").unwrap();

        // sum alpha_i * y_i = 0
        let sum: f64 = result
            .alpha
            .iter()
            .zip(y.iter())
            .map(|(&a, &l)| a * l)
            .sum();
        assert!(sum.abs() < 1e-9, "dual constraint violated: {sum}");
    }

    #[test]
    fn test_smo_invalid_label_rejected() {
        let x = FeatureMatrix::from_rows(vec![vec![1.0], vec![-1.0]]).unwrap();
        let result = solver(1.0, 100).solve(&x, &[1.0, 2.0], "test");
        assert!(matches!(result, Err(EvalError::InvalidParameter(_))));
    }

    #[test]
    fn test_smo_label_count_mismatch() {
        let x = FeatureMatrix::from_rows(vec![vec![1.0], vec![-1.0]]).unwrap();
        let result = solver(1.0, 100).solve(&x, &[1.0], "test");
        assert!(matches!(
            result,
            Err(EvalError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_smo_nonconvergence_reported() {
        // Two identical points with opposite labels cannot satisfy the KKT
        // conditions; a tiny iteration budget must surface the failure.
        let x = FeatureMatrix::from_rows(vec![
            vec![1.0, 0.0],
            vec![1.0, 0.0],
            vec![-1.0, 0.5],
            vec![-1.0, -0.5],
        ])
        .unwrap();
        let y = vec![1.0, -1.0, 1.0, -1.0];

        let result = solver(1e6, 1).solve(&x, &y, "class a vs b");
        match result {
            Err(EvalError::Convergence { stage, .. }) => assert_eq!(stage, "class a vs b"),
            other => panic!("expected convergence error, got {other:?}"),
        }
    }

    #[test]
    fn test_smo_deterministic() {
        let (x, y) = separable_1d();
        let a = solver(1.0, 1000).solve(&x, &y, "test").unwrap();
        let b = solver(1.0, 1000).solve(&x, &y, "test").unwrap();

        assert_eq!(a.alpha, b.alpha);
        assert_eq!(a.bias, b.bias);
        assert_eq!(a.support_indices, b.support_indices);
    }
}
