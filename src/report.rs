//! Evaluation reports
//!
//! Per-fold results and the aggregate report produced once all folds have
//! been evaluated. Reports render as text and round-trip through JSON for
//! archiving alongside the configuration that produced them.

use crate::config::EvalConfig;
use crate::core::{EvalError, Result};
use crate::metrics::{mean_std, ConfusionMatrix};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Outcome of one fold: predictions, true labels, and derived metrics.
/// Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoldResult {
    /// Fold index (0-based)
    pub fold: usize,
    /// True class ids of the validation samples
    pub truth: Vec<usize>,
    /// Predicted class ids, aligned with `truth`
    pub predicted: Vec<usize>,
    /// Validation accuracy
    pub accuracy: f64,
    /// F1 per class id
    pub per_class_f1: Vec<f64>,
    /// This fold's confusion matrix
    pub confusion: ConfusionMatrix,
}

impl FoldResult {
    /// Build a fold result, deriving metrics from the prediction pairs.
    pub fn new(fold: usize, truth: Vec<usize>, predicted: Vec<usize>, n_classes: usize) -> Self {
        let confusion = ConfusionMatrix::from_predictions(&truth, &predicted, n_classes);
        Self {
            fold,
            accuracy: confusion.accuracy(),
            per_class_f1: confusion.per_class_f1(),
            confusion,
            truth,
            predicted,
        }
    }

    /// Unweighted mean of this fold's per-class F1 scores
    pub fn macro_f1(&self) -> f64 {
        self.confusion.macro_f1()
    }
}

/// Report metadata for tracking and reproduction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Library version that produced the report
    pub library_version: String,
    /// Creation timestamp (RFC 3339)
    pub created_at: String,
    /// Configuration snapshot
    pub config: EvalConfig,
}

/// Aggregate results across all folds. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Per-fold results, ordered by fold index
    pub folds: Vec<FoldResult>,
    /// Class display names, indexed by class id
    pub class_names: Vec<String>,
    /// Mean validation accuracy over folds
    pub mean_accuracy: f64,
    /// Population standard deviation of fold accuracies
    pub std_accuracy: f64,
    /// Mean macro-F1 over folds
    pub mean_macro_f1: f64,
    /// Population standard deviation of fold macro-F1
    pub std_macro_f1: f64,
    /// Per-class F1 averaged over folds
    pub per_class_mean_f1: Vec<f64>,
    /// Confusion matrix summed over all folds
    pub confusion: ConfusionMatrix,
    pub metadata: ReportMetadata,
}

impl EvaluationReport {
    /// Aggregate fold results into a final report.
    ///
    /// # Panics
    /// Panics if `folds` is empty; the evaluator always supplies k >= 2.
    pub fn new(folds: Vec<FoldResult>, class_names: Vec<String>, config: EvalConfig) -> Self {
        assert!(!folds.is_empty(), "report requires at least one fold");
        let n_classes = class_names.len();

        let accuracies: Vec<f64> = folds.iter().map(|f| f.accuracy).collect();
        let macro_f1s: Vec<f64> = folds.iter().map(|f| f.macro_f1()).collect();
        let (mean_accuracy, std_accuracy) = mean_std(&accuracies);
        let (mean_macro_f1, std_macro_f1) = mean_std(&macro_f1s);

        let per_class_mean_f1: Vec<f64> = (0..n_classes)
            .map(|c| {
                folds.iter().map(|f| f.per_class_f1[c]).sum::<f64>() / folds.len() as f64
            })
            .collect();

        let mut confusion = ConfusionMatrix::new(n_classes);
        for fold in &folds {
            confusion.merge(&fold.confusion);
        }

        Self {
            folds,
            class_names,
            mean_accuracy,
            std_accuracy,
            mean_macro_f1,
            std_macro_f1,
            per_class_mean_f1,
            confusion,
            metadata: ReportMetadata {
                library_version: crate::VERSION.to_string(),
                created_at: chrono::Utc::now().to_rfc3339(),
                config,
            },
        }
    }

    /// Save the report as pretty JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path).map_err(EvalError::IoError)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| EvalError::SerializationError(e.to_string()))
    }

    /// Load a previously saved report.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(EvalError::IoError)?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| EvalError::SerializationError(e.to_string()))
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Cross-Validation Report ===")?;
        writeln!(f, "Classes: {}", self.class_names.join(", "))?;
        writeln!(f, "Folds: {}", self.folds.len())?;
        writeln!(f)?;

        writeln!(f, "Fold  Accuracy  Macro-F1")?;
        for fold in &self.folds {
            writeln!(
                f,
                "{:>4}  {:>8.4}  {:>8.4}",
                fold.fold,
                fold.accuracy,
                fold.macro_f1()
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "Mean accuracy: {:.4} (std {:.4})",
            self.mean_accuracy, self.std_accuracy
        )?;
        writeln!(
            f,
            "Mean macro-F1: {:.4} (std {:.4})",
            self.mean_macro_f1, self.std_macro_f1
        )?;
        writeln!(f)?;

        let name_width = self
            .class_names
            .iter()
            .map(|n| n.len())
            .max()
            .unwrap_or(5)
            .max(5);

        writeln!(f, "Per-class F1 (mean over folds):")?;
        for (name, f1) in self.class_names.iter().zip(&self.per_class_mean_f1) {
            writeln!(f, "  {name:>name_width$}  {f1:.4}")?;
        }
        writeln!(f)?;

        writeln!(f, "Confusion matrix (rows = true, columns = predicted):")?;
        write!(f, "  {:>name_width$}", "")?;
        for name in &self.class_names {
            write!(f, " {name:>name_width$}")?;
        }
        writeln!(f)?;
        for (t, name) in self.class_names.iter().enumerate() {
            write!(f, "  {name:>name_width$}")?;
            for p in 0..self.class_names.len() {
                write!(f, " {:>name_width$}", self.confusion.count(t, p))?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
