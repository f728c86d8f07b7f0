//! Classification metrics
//!
//! Multi-class confusion matrix with derived accuracy, per-class precision,
//! recall, and F1. A per-class score with an empty denominator is reported as
//! 0.0 rather than NaN.

use serde::{Deserialize, Serialize};

/// Square confusion matrix; rows are true classes, columns predicted classes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    n_classes: usize,
    counts: Vec<usize>,
}

impl ConfusionMatrix {
    /// Create an empty matrix for `n_classes` classes
    pub fn new(n_classes: usize) -> Self {
        Self {
            n_classes,
            counts: vec![0; n_classes * n_classes],
        }
    }

    /// Tally predictions against true labels
    ///
    /// # Panics
    /// Panics if the slices differ in length or contain out-of-range ids.
    pub fn from_predictions(truth: &[usize], predicted: &[usize], n_classes: usize) -> Self {
        assert_eq!(
            truth.len(),
            predicted.len(),
            "truth and predictions must have same length"
        );
        let mut matrix = Self::new(n_classes);
        for (&t, &p) in truth.iter().zip(predicted.iter()) {
            matrix.record(t, p);
        }
        matrix
    }

    /// Record one observation
    pub fn record(&mut self, truth: usize, predicted: usize) {
        assert!(truth < self.n_classes && predicted < self.n_classes);
        self.counts[truth * self.n_classes + predicted] += 1;
    }

    /// Add another matrix of the same shape into this one
    pub fn merge(&mut self, other: &ConfusionMatrix) {
        assert_eq!(self.n_classes, other.n_classes);
        for (a, b) in self.counts.iter_mut().zip(other.counts.iter()) {
            *a += b;
        }
    }

    /// Count of samples with true class `truth` predicted as `predicted`
    pub fn count(&self, truth: usize, predicted: usize) -> usize {
        self.counts[truth * self.n_classes + predicted]
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Total number of recorded observations
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Overall accuracy: trace / total
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let correct: usize = (0..self.n_classes).map(|c| self.count(c, c)).sum();
        correct as f64 / total as f64
    }

    /// Precision for one class: TP / (TP + FP)
    pub fn precision(&self, class: usize) -> f64 {
        let tp = self.count(class, class);
        let predicted: usize = (0..self.n_classes).map(|t| self.count(t, class)).sum();
        if predicted == 0 {
            0.0
        } else {
            tp as f64 / predicted as f64
        }
    }

    /// Recall for one class: TP / (TP + FN)
    pub fn recall(&self, class: usize) -> f64 {
        let tp = self.count(class, class);
        let actual: usize = (0..self.n_classes).map(|p| self.count(class, p)).sum();
        if actual == 0 {
            0.0
        } else {
            tp as f64 / actual as f64
        }
    }

    /// F1 for one class: harmonic mean of precision and recall
    pub fn f1(&self, class: usize) -> f64 {
        let p = self.precision(class);
        let r = self.recall(class);
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    /// F1 per class, indexed by class id
    pub fn per_class_f1(&self) -> Vec<f64> {
        (0..self.n_classes).map(|c| self.f1(c)).collect()
    }

    /// Unweighted mean of per-class F1 scores
    pub fn macro_f1(&self) -> f64 {
        if self.n_classes == 0 {
            return 0.0;
        }
        self.per_class_f1().iter().sum::<f64>() / self.n_classes as f64
    }
}

/// Fraction of matching predictions
///
/// # Panics
/// Panics if the slices differ in length or are empty.
pub fn accuracy(predicted: &[usize], truth: &[usize]) -> f64 {
    assert_eq!(
        predicted.len(),
        truth.len(),
        "truth and predictions must have same length"
    );
    assert!(!truth.is_empty(), "cannot score an empty prediction set");

    let correct = predicted
        .iter()
        .zip(truth.iter())
        .filter(|(p, t)| p == t)
        .count();
    correct as f64 / truth.len() as f64
}

/// Mean and population standard deviation of a score series
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let var = values.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    (mean, var.sqrt())
}
