//! Core type definitions for cross-validated evaluation

use crate::core::{EvalError, Result};

/// Dense row-major feature matrix
///
/// Every row is one sample (e.g., one EEG epoch), every column one real-valued
/// feature. The matrix is rectangular by construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl FeatureMatrix {
    /// Create a matrix from row vectors, validating that all rows have the
    /// same feature count.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        if rows.is_empty() {
            return Err(EvalError::EmptyDataset);
        }

        let cols = rows[0].len();
        let mut data = Vec::with_capacity(rows.len() * cols);

        for row in &rows {
            if row.len() != cols {
                return Err(EvalError::DimensionMismatch {
                    expected: cols,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }

        Ok(Self {
            data,
            rows: rows.len(),
            cols,
        })
    }

    /// Create a matrix from a flat row-major buffer.
    pub fn from_vec(data: Vec<f64>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(EvalError::DimensionMismatch {
                expected: rows * cols,
                actual: data.len(),
            });
        }
        Ok(Self { data, rows, cols })
    }

    /// Number of samples
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of features
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Get a single sample by index
    ///
    /// # Panics
    /// Panics if `i >= rows()`
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Iterate over sample rows in order
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.cols.max(1)).take(self.rows)
    }

    /// Build a new matrix containing the given rows, in the given order.
    ///
    /// # Panics
    /// Panics if any index is out of range.
    pub fn select(&self, indices: &[usize]) -> FeatureMatrix {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &i in indices {
            data.extend_from_slice(self.row(i));
        }
        FeatureMatrix {
            data,
            rows: indices.len(),
            cols: self.cols,
        }
    }

    /// Variance of all entries around the global mean (population variance).
    ///
    /// This mirrors the quantity sklearn uses to resolve `gamma = "scale"`.
    pub fn global_variance(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let mean = self.data.iter().sum::<f64>() / self.data.len() as f64;
        self.data.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / self.data.len() as f64
    }
}

/// Mapping between class ids (dense, 0-based) and display names
///
/// Ids are assigned by sorting the distinct raw labels, numerically when every
/// label parses as a number, lexicographically otherwise. The assignment is
/// therefore independent of sample order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMap {
    names: Vec<String>,
}

impl ClassMap {
    /// Build a class map from raw label strings (duplicates allowed).
    pub fn from_raw(raw: &[String]) -> Result<Self> {
        if raw.is_empty() {
            return Err(EvalError::EmptyDataset);
        }

        let mut names: Vec<String> = raw.to_vec();
        names.sort_by(|a, b| compare_labels(a, b));
        names.dedup();

        Ok(Self { names })
    }

    /// Class id for a raw label, if known
    pub fn id(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Display name for a class id
    ///
    /// # Panics
    /// Panics if `id >= len()`
    pub fn name(&self, id: usize) -> &str {
        &self.names[id]
    }

    /// Number of classes
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All class names in id order
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Order labels numerically when both parse as numbers, lexicographically otherwise.
fn compare_labels(a: &str, b: &str) -> std::cmp::Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
        _ => a.cmp(b),
    }
}

/// Categorical labels, one per sample
#[derive(Debug, Clone, PartialEq)]
pub struct Labels {
    ids: Vec<usize>,
    classes: ClassMap,
}

impl Labels {
    /// Build labels from raw strings, assigning dense class ids.
    pub fn from_raw(raw: &[String]) -> Result<Self> {
        let classes = ClassMap::from_raw(raw)?;
        let ids = raw
            .iter()
            .map(|name| {
                classes
                    .id(name)
                    .expect("class map contains every raw label")
            })
            .collect();
        Ok(Self { ids, classes })
    }

    /// Build labels from pre-assigned class ids.
    pub fn from_ids(ids: Vec<usize>, classes: ClassMap) -> Result<Self> {
        if ids.is_empty() {
            return Err(EvalError::EmptyDataset);
        }
        if let Some(&bad) = ids.iter().find(|&&id| id >= classes.len()) {
            return Err(EvalError::InvalidParameter(format!(
                "class id {bad} out of range for {} classes",
                classes.len()
            )));
        }
        Ok(Self { ids, classes })
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Class ids in sample order
    pub fn ids(&self) -> &[usize] {
        &self.ids
    }

    /// The class id / name mapping
    pub fn classes(&self) -> &ClassMap {
        &self.classes
    }

    /// Number of distinct classes
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Samples per class, indexed by class id
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.classes.len()];
        for &id in &self.ids {
            counts[id] += 1;
        }
        counts
    }
}

/// One cross-validation fold: a disjoint train / validation index split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    /// Fold index (0-based)
    pub index: usize,
    /// Sample indices used for fitting
    pub train: Vec<usize>,
    /// Held-out sample indices
    pub validation: Vec<usize>,
}

/// Configuration for the SMO solver
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Regularization parameter (upper bound for alpha)
    pub c: f64,
    /// Tolerance for KKT conditions
    pub epsilon: f64,
    /// Maximum number of outer iterations before reporting non-convergence
    pub max_iterations: usize,
    /// Kernel cache capacity in bytes
    pub cache_size: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            epsilon: 0.001,
            max_iterations: 10000,
            cache_size: 100_000_000, // 100MB
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_matrix_from_rows() {
        let m = FeatureMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(m.rows(), 2);
        assert_eq!(m.cols(), 2);
        assert_eq!(m.row(0), &[1.0, 2.0]);
        assert_eq!(m.row(1), &[3.0, 4.0]);
    }

    #[test]
    fn test_matrix_ragged_rows_rejected() {
        let result = FeatureMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(
            result,
            Err(EvalError::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_matrix_empty_rejected() {
        assert!(matches!(
            FeatureMatrix::from_rows(vec![]),
            Err(EvalError::EmptyDataset)
        ));
    }

    #[test]
    fn test_matrix_select() {
        let m = FeatureMatrix::from_rows(vec![
            vec![1.0, 0.0],
            vec![2.0, 0.0],
            vec![3.0, 0.0],
        ])
        .unwrap();

        let sub = m.select(&[2, 0]);
        assert_eq!(sub.rows(), 2);
        assert_eq!(sub.row(0), &[3.0, 0.0]);
        assert_eq!(sub.row(1), &[1.0, 0.0]);
    }

    #[test]
    fn test_matrix_global_variance() {
        let m = FeatureMatrix::from_rows(vec![vec![1.0, 1.0], vec![3.0, 3.0]]).unwrap();
        assert_relative_eq!(m.global_variance(), 1.0);
    }

    #[test]
    fn test_class_map_sorted_and_deduped() {
        let raw: Vec<String> = ["car", "apple", "car", "face", "flower", "apple"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let map = ClassMap::from_raw(&raw).unwrap();

        assert_eq!(map.len(), 4);
        assert_eq!(map.names(), &["apple", "car", "face", "flower"]);
        assert_eq!(map.id("car"), Some(1));
        assert_eq!(map.name(3), "flower");
        assert_eq!(map.id("unknown"), None);
    }

    #[test]
    fn test_class_map_numeric_labels_sorted_numerically() {
        let raw: Vec<String> = ["10", "2", "1"].iter().map(|s| s.to_string()).collect();
        let map = ClassMap::from_raw(&raw).unwrap();
        assert_eq!(map.names(), &["1", "2", "10"]);
    }

    #[test]
    fn test_labels_from_raw() {
        let raw: Vec<String> = ["b", "a", "b", "a"].iter().map(|s| s.to_string()).collect();
        let labels = Labels::from_raw(&raw).unwrap();

        assert_eq!(labels.ids(), &[1, 0, 1, 0]);
        assert_eq!(labels.n_classes(), 2);
        assert_eq!(labels.class_counts(), vec![2, 2]);
    }

    #[test]
    fn test_labels_from_ids_out_of_range() {
        let classes = ClassMap::from_raw(&["a".to_string(), "b".to_string()]).unwrap();
        let result = Labels::from_ids(vec![0, 2], classes);
        assert!(matches!(result, Err(EvalError::InvalidParameter(_))));
    }

    #[test]
    fn test_solver_config_default() {
        let config = SolverConfig::default();
        assert_eq!(config.c, 1.0);
        assert_eq!(config.epsilon, 0.001);
        assert_eq!(config.max_iterations, 10000);
        assert_eq!(config.cache_size, 100_000_000);
    }
}
