//! Multi-class SVM built from binary SMO sub-problems
//!
//! Binary machines are decomposed either one-vs-one (the default, matching
//! the decomposition sklearn's `SVC` uses) or one-vs-rest. Each binary
//! machine is trained by the SMO solver and keeps only its support vectors.

use crate::core::{Classifier, EvalError, FeatureMatrix, Result, SolverConfig};
use crate::kernel::Kernel;
use crate::solver::SmoSolver;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Multi-class decomposition strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MulticlassStrategy {
    /// One binary machine per class pair; prediction by majority vote
    #[default]
    #[serde(rename = "ovo")]
    OneVsOne,
    /// One binary machine per class; prediction by maximum decision value
    #[serde(rename = "ovr")]
    OneVsRest,
}

/// A trained binary machine: support vectors plus their weighted coefficients
struct BinaryMachine {
    /// Class voted for when the decision value is non-negative
    positive: usize,
    /// Opposing class for one-vs-one machines
    negative: Option<usize>,
    support: FeatureMatrix,
    alpha_y: Vec<f64>,
    bias: f64,
}

impl BinaryMachine {
    fn decision(&self, kernel: &dyn Kernel, row: &[f64]) -> f64 {
        let mut value = self.bias;
        for (sv, &coef) in self.support.iter_rows().zip(self.alpha_y.iter()) {
            value += coef * kernel.compute(sv, row);
        }
        value
    }
}

/// Kernelized multi-class SVM classifier
pub struct SvmClassifier {
    kernel: Arc<dyn Kernel>,
    config: SolverConfig,
    strategy: MulticlassStrategy,
    machines: Vec<BinaryMachine>,
    n_classes: usize,
}

impl SvmClassifier {
    /// Create an unfitted classifier
    pub fn new(
        kernel: Arc<dyn Kernel>,
        config: SolverConfig,
        strategy: MulticlassStrategy,
    ) -> Self {
        Self {
            kernel,
            config,
            strategy,
            machines: Vec::new(),
            n_classes: 0,
        }
    }

    /// Number of classes seen at fit time (0 before fitting)
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Total support vectors across all binary machines
    pub fn n_support_vectors(&self) -> usize {
        self.machines.iter().map(|m| m.support.rows()).sum()
    }

    /// Predict the class id for a single scaled row
    pub fn predict_row(&self, row: &[f64]) -> Result<usize> {
        if self.machines.is_empty() {
            return Err(EvalError::ModelNotFitted);
        }

        match self.strategy {
            MulticlassStrategy::OneVsOne => Ok(self.vote_one_vs_one(row)),
            MulticlassStrategy::OneVsRest => Ok(self.argmax_one_vs_rest(row)),
        }
    }

    fn vote_one_vs_one(&self, row: &[f64]) -> usize {
        let mut votes = vec![0usize; self.n_classes];
        let mut margins = vec![0.0f64; self.n_classes];

        for machine in &self.machines {
            let d = machine.decision(self.kernel.as_ref(), row);
            let negative = match machine.negative {
                Some(c) => c,
                None => continue,
            };
            if d >= 0.0 {
                votes[machine.positive] += 1;
                margins[machine.positive] += d;
            } else {
                votes[negative] += 1;
                margins[negative] += -d;
            }
        }

        // Most votes wins; ties broken by accumulated margin, then lowest id
        let mut winner = 0;
        for c in 1..self.n_classes {
            if votes[c] > votes[winner]
                || (votes[c] == votes[winner] && margins[c] > margins[winner])
            {
                winner = c;
            }
        }
        winner
    }

    fn argmax_one_vs_rest(&self, row: &[f64]) -> usize {
        let mut winner = 0;
        let mut best = f64::NEG_INFINITY;
        for machine in &self.machines {
            let d = machine.decision(self.kernel.as_ref(), row);
            if d > best {
                best = d;
                winner = machine.positive;
            }
        }
        winner
    }

    fn train_binary(
        &self,
        solver: &SmoSolver,
        x: &FeatureMatrix,
        y: &[f64],
        positive: usize,
        negative: Option<usize>,
        stage: &str,
    ) -> Result<BinaryMachine> {
        let result = solver.solve(x, y, stage)?;

        let support = x.select(&result.support_indices);
        let alpha_y: Vec<f64> = result
            .support_indices
            .iter()
            .map(|&i| result.alpha[i] * y[i])
            .collect();

        debug!(
            "trained {stage}: {} support vectors, {} iterations",
            support.rows(),
            result.iterations
        );

        Ok(BinaryMachine {
            positive,
            negative,
            support,
            alpha_y,
            bias: result.bias,
        })
    }
}

impl Classifier for SvmClassifier {
    fn fit(&mut self, x: &FeatureMatrix, y: &[usize]) -> Result<()> {
        if x.is_empty() || y.is_empty() {
            return Err(EvalError::EmptyDataset);
        }
        if y.len() != x.rows() {
            return Err(EvalError::DimensionMismatch {
                expected: x.rows(),
                actual: y.len(),
            });
        }

        let n_classes = y.iter().max().copied().unwrap_or(0) + 1;
        if n_classes < 2 {
            return Err(EvalError::InvalidParameter(
                "training data must contain at least two classes".to_string(),
            ));
        }

        let solver = SmoSolver::new(Arc::clone(&self.kernel), self.config.clone());
        let mut machines = Vec::new();

        match self.strategy {
            MulticlassStrategy::OneVsOne => {
                for a in 0..n_classes {
                    for b in (a + 1)..n_classes {
                        let indices: Vec<usize> = y
                            .iter()
                            .enumerate()
                            .filter_map(|(i, &c)| (c == a || c == b).then_some(i))
                            .collect();
                        let labels: Vec<f64> = indices
                            .iter()
                            .map(|&i| if y[i] == a { 1.0 } else { -1.0 })
                            .collect();
                        let sub = x.select(&indices);

                        let stage = format!("class {a} vs class {b}");
                        machines.push(self.train_binary(
                            &solver,
                            &sub,
                            &labels,
                            a,
                            Some(b),
                            &stage,
                        )?);
                    }
                }
            }
            MulticlassStrategy::OneVsRest => {
                for c in 0..n_classes {
                    let labels: Vec<f64> = y
                        .iter()
                        .map(|&id| if id == c { 1.0 } else { -1.0 })
                        .collect();

                    let stage = format!("class {c} vs rest");
                    machines.push(self.train_binary(&solver, x, &labels, c, None, &stage)?);
                }
            }
        }

        self.machines = machines;
        self.n_classes = n_classes;
        Ok(())
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<usize>> {
        x.iter_rows().map(|row| self.predict_row(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::LinearKernel;

    fn three_class_data() -> (FeatureMatrix, Vec<usize>) {
        // Three well-separated clusters in 2D
        let x = FeatureMatrix::from_rows(vec![
            vec![0.0, 3.0],
            vec![0.4, 3.2],
            vec![-0.3, 2.8],
            vec![3.0, 0.0],
            vec![3.2, 0.3],
            vec![2.8, -0.2],
            vec![-3.0, -3.0],
            vec![-3.2, -2.8],
            vec![-2.9, -3.1],
        ])
        .unwrap();
        let y = vec![0, 0, 0, 1, 1, 1, 2, 2, 2];
        (x, y)
    }

    fn classifier(strategy: MulticlassStrategy) -> SvmClassifier {
        SvmClassifier::new(
            Arc::new(LinearKernel::new()),
            SolverConfig {
                c: 10.0,
                ..SolverConfig::default()
            },
            strategy,
        )
    }

    #[test]
    fn test_one_vs_one_separable() {
        let (x, y) = three_class_data();
        let mut clf = classifier(MulticlassStrategy::OneVsOne);
        clf.fit(&x, &y).unwrap();

        assert_eq!(clf.n_classes(), 3);
        assert_eq!(clf.predict(&x).unwrap(), y);
        assert!(clf.n_support_vectors() > 0);
    }

    #[test]
    fn test_one_vs_rest_separable() {
        let (x, y) = three_class_data();
        let mut clf = classifier(MulticlassStrategy::OneVsRest);
        clf.fit(&x, &y).unwrap();

        assert_eq!(clf.predict(&x).unwrap(), y);
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let clf = classifier(MulticlassStrategy::OneVsOne);
        let x = FeatureMatrix::from_rows(vec![vec![0.0, 0.0]]).unwrap();
        assert!(matches!(clf.predict(&x), Err(EvalError::ModelNotFitted)));
    }

    #[test]
    fn test_single_class_rejected() {
        let x = FeatureMatrix::from_rows(vec![vec![1.0], vec![2.0]]).unwrap();
        let mut clf = classifier(MulticlassStrategy::OneVsOne);
        assert!(matches!(
            clf.fit(&x, &[0, 0]),
            Err(EvalError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_one_vs_one_machine_count() {
        let (x, y) = three_class_data();
        let mut clf = classifier(MulticlassStrategy::OneVsOne);
        clf.fit(&x, &y).unwrap();
        // 3 classes -> 3 pairs
        assert_eq!(clf.machines.len(), 3);
    }

    #[test]
    fn test_predict_is_deterministic() {
        let (x, y) = three_class_data();
        let mut clf = classifier(MulticlassStrategy::OneVsOne);
        clf.fit(&x, &y).unwrap();

        let first = clf.predict(&x).unwrap();
        let second = clf.predict(&x).unwrap();
        assert_eq!(first, second);
    }
}
