//! Cross-validated evaluation loop
//!
//! Runs the full fit/predict cycle over all stratified folds. Each fold gets
//! its own scaler and classifier, fitted on that fold's training partition
//! only; validation data never influences scaling statistics or the model.

use crate::config::EvalConfig;
use crate::core::{Classifier, EvalError, FeatureMatrix, Labels, Result};
use crate::cv::StratifiedKFold;
use crate::multiclass::SvmClassifier;
use crate::report::{EvaluationReport, FoldResult};
use crate::scaling::StandardScaler;
use log::info;

/// Stratified cross-validated evaluator
pub struct CrossValidator {
    config: EvalConfig,
}

impl CrossValidator {
    /// Create an evaluator, validating the configuration up front
    pub fn new(config: EvalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Evaluate the configured SVM over all folds.
    ///
    /// Gamma is resolved per fold against the scaled training partition, so
    /// `scale` tracks each fold's own statistics.
    pub fn evaluate(&self, x: &FeatureMatrix, labels: &Labels) -> Result<EvaluationReport> {
        self.evaluate_with(x, labels, |scaled_train| {
            let gamma = self.config.svm_gamma.resolve(scaled_train)?;
            Ok(SvmClassifier::new(
                self.config.build_kernel(gamma),
                self.config.solver_config(),
                self.config.multiclass_strategy,
            ))
        })
    }

    /// Evaluate an arbitrary classifier over all folds.
    ///
    /// `make_classifier` is called once per fold with that fold's scaled
    /// training matrix and must return a fresh, unfitted classifier, keeping
    /// folds independent. A solver convergence failure aborts the whole
    /// evaluation, tagged with the failing fold.
    pub fn evaluate_with<C, F>(
        &self,
        x: &FeatureMatrix,
        labels: &Labels,
        make_classifier: F,
    ) -> Result<EvaluationReport>
    where
        C: Classifier,
        F: Fn(&FeatureMatrix) -> Result<C>,
    {
        if x.rows() != labels.len() {
            return Err(EvalError::DimensionMismatch {
                expected: x.rows(),
                actual: labels.len(),
            });
        }

        let folds =
            StratifiedKFold::new(self.config.num_folds, self.config.random_seed).split(labels)?;
        let n_classes = labels.n_classes();
        let mut results = Vec::with_capacity(folds.len());

        for fold in &folds {
            info!(
                "fold {}: fitting on {} samples, validating on {}",
                fold.index,
                fold.train.len(),
                fold.validation.len()
            );

            let x_train = x.select(&fold.train);
            let y_train: Vec<usize> = fold.train.iter().map(|&i| labels.ids()[i]).collect();

            let scaler = StandardScaler::fit(&x_train)?;
            let xs_train = scaler.transform(&x_train)?;
            let xs_val = scaler.transform(&x.select(&fold.validation))?;

            let mut classifier = make_classifier(&xs_train)?;
            classifier
                .fit(&xs_train, &y_train)
                .map_err(|e| e.at_fold(fold.index))?;
            let predicted = classifier
                .predict(&xs_val)
                .map_err(|e| e.at_fold(fold.index))?;

            let truth: Vec<usize> = fold.validation.iter().map(|&i| labels.ids()[i]).collect();
            let result = FoldResult::new(fold.index, truth, predicted, n_classes);
            info!(
                "fold {}: accuracy {:.4}, macro-F1 {:.4}",
                fold.index,
                result.accuracy,
                result.macro_f1()
            );
            results.push(result);
        }

        Ok(EvaluationReport::new(
            results,
            labels.classes().names().to_vec(),
            self.config.clone(),
        ))
    }
}
