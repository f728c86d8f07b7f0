//! Stratified fold partitioning
//!
//! Splits sample indices into k folds whose validation sets preserve the
//! global class proportions. Each class's indices are shuffled with a seeded
//! RNG and dealt round-robin across folds, so the partition is deterministic
//! for a given seed and input order.

use crate::core::{EvalError, Fold, Labels, Result};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Stratified k-fold splitter
#[derive(Debug, Clone, Copy)]
pub struct StratifiedKFold {
    k: usize,
    seed: u64,
}

impl StratifiedKFold {
    /// Create a splitter with `k` folds and a shuffle seed
    pub fn new(k: usize, seed: u64) -> Self {
        Self { k, seed }
    }

    /// Partition sample indices into k folds.
    ///
    /// Fails with `InsufficientSamples` naming the first class whose sample
    /// count is below `k`, since such a class cannot appear in every fold.
    pub fn split(&self, labels: &Labels) -> Result<Vec<Fold>> {
        if self.k < 2 {
            return Err(EvalError::InvalidParameter(format!(
                "fold count must be at least 2, got {}",
                self.k
            )));
        }
        if labels.is_empty() {
            return Err(EvalError::EmptyDataset);
        }

        let counts = labels.class_counts();
        for (class_id, &count) in counts.iter().enumerate() {
            if count < self.k {
                return Err(EvalError::InsufficientSamples {
                    class: labels.classes().name(class_id).to_string(),
                    count,
                    folds: self.k,
                });
            }
        }

        // Group sample indices by class, in input order
        let mut groups: Vec<Vec<usize>> = vec![Vec::new(); labels.n_classes()];
        for (i, &class_id) in labels.ids().iter().enumerate() {
            groups[class_id].push(i);
        }

        // One RNG drives all per-class shuffles; class order is fixed
        // (ascending id), so the partition depends only on seed and input.
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut validation_sets: Vec<Vec<usize>> = vec![Vec::new(); self.k];

        for group in &mut groups {
            group.shuffle(&mut rng);
            for (position, &sample) in group.iter().enumerate() {
                validation_sets[position % self.k].push(sample);
            }
        }

        let n = labels.len();
        let mut folds = Vec::with_capacity(self.k);
        for (index, mut validation) in validation_sets.into_iter().enumerate() {
            validation.sort_unstable();

            let mut held_out = vec![false; n];
            for &i in &validation {
                held_out[i] = true;
            }
            let train: Vec<usize> = (0..n).filter(|&i| !held_out[i]).collect();

            debug!(
                "fold {index}: {} train / {} validation samples",
                train.len(),
                validation.len()
            );

            folds.push(Fold {
                index,
                train,
                validation,
            });
        }

        Ok(folds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ClassMap, Labels};

    /// `counts[c]` samples of class c, interleaved in id order
    fn labels_with_counts(counts: &[usize]) -> Labels {
        let names: Vec<String> = (0..counts.len()).map(|c| format!("class{c}")).collect();
        let classes = ClassMap::from_raw(&names).unwrap();

        let mut ids = Vec::new();
        for (c, &count) in counts.iter().enumerate() {
            ids.extend(std::iter::repeat(c).take(count));
        }
        Labels::from_ids(ids, classes).unwrap()
    }

    #[test]
    fn test_folds_are_disjoint_and_cover_all_samples() {
        let labels = labels_with_counts(&[10, 7, 13]);
        let folds = StratifiedKFold::new(3, 7).split(&labels).unwrap();

        assert_eq!(folds.len(), 3);

        let mut seen = vec![0usize; labels.len()];
        for fold in &folds {
            for &i in &fold.validation {
                seen[i] += 1;
            }
        }
        // Every sample held out exactly once
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_train_is_complement_of_validation() {
        let labels = labels_with_counts(&[6, 6]);
        let folds = StratifiedKFold::new(2, 0).split(&labels).unwrap();

        for fold in &folds {
            assert_eq!(fold.train.len() + fold.validation.len(), labels.len());
            for &i in &fold.train {
                assert!(!fold.validation.contains(&i));
            }
        }
    }

    #[test]
    fn test_class_counts_preserved_across_validation_sets() {
        let labels = labels_with_counts(&[9, 14, 5]);
        let folds = StratifiedKFold::new(4, 99).split(&labels).unwrap();

        let mut counts = vec![0usize; 3];
        for fold in &folds {
            for &i in &fold.validation {
                counts[labels.ids()[i]] += 1;
            }
        }
        assert_eq!(counts, vec![9, 14, 5]);
    }

    #[test]
    fn test_balanced_four_class_split() {
        // 100 samples, 4 classes with 25 each, k=5: every fold's validation
        // set holds exactly 5 samples per class.
        let labels = labels_with_counts(&[25, 25, 25, 25]);
        let folds = StratifiedKFold::new(5, 42).split(&labels).unwrap();

        for fold in &folds {
            assert_eq!(fold.validation.len(), 20);
            let mut per_class = vec![0usize; 4];
            for &i in &fold.validation {
                per_class[labels.ids()[i]] += 1;
            }
            assert_eq!(per_class, vec![5, 5, 5, 5]);
        }
    }

    #[test]
    fn test_underrepresented_class_rejected() {
        // A class with 3 samples cannot be stratified into 5 folds
        let labels = labels_with_counts(&[10, 3]);
        let result = StratifiedKFold::new(5, 42).split(&labels);

        match result {
            Err(EvalError::InsufficientSamples {
                class,
                count,
                folds,
            }) => {
                assert_eq!(class, "class1");
                assert_eq!(count, 3);
                assert_eq!(folds, 5);
            }
            other => panic!("expected InsufficientSamples, got {other:?}"),
        }
    }

    #[test]
    fn test_k_below_two_rejected() {
        let labels = labels_with_counts(&[4, 4]);
        assert!(matches!(
            StratifiedKFold::new(1, 0).split(&labels),
            Err(EvalError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_same_seed_same_partition() {
        let labels = labels_with_counts(&[12, 12, 12]);
        let a = StratifiedKFold::new(4, 123).split(&labels).unwrap();
        let b = StratifiedKFold::new(4, 123).split(&labels).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_seed_different_partition() {
        let labels = labels_with_counts(&[20, 20]);
        let a = StratifiedKFold::new(4, 1).split(&labels).unwrap();
        let b = StratifiedKFold::new(4, 2).split(&labels).unwrap();
        assert_ne!(a, b);
    }
}
