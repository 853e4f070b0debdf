//! Accuracy, confusion matrix, and per-class classification metrics.

use crate::error::ForestError;

/// Percentage of positions where `predicted` matches `actual`, in `[0, 100]`.
///
/// Compares position by position; returns 0.0 when `actual` is empty.
#[must_use]
pub fn accuracy_metric(actual: &[usize], predicted: &[usize]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let correct = actual
        .iter()
        .zip(predicted)
        .filter(|&(a, p)| a == p)
        .count();
    correct as f64 / actual.len() as f64 * 100.0
}

/// A confusion matrix for multi-class classification.
///
/// Entry `matrix[true_class][predicted_class]` counts how many rows
/// with true label `true_class` were predicted as `predicted_class`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ConfusionMatrix {
    matrix: Vec<Vec<usize>>,
    n_classes: usize,
}

/// Per-class precision, recall, and F1 score.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ClassMetrics {
    /// The class label.
    pub class: usize,
    /// Precision: TP / (TP + FP). 0.0 if nothing was predicted as this class.
    pub precision: f64,
    /// Recall: TP / (TP + FN). 0.0 if no true rows belong to this class.
    pub recall: f64,
    /// F1: 2 * precision * recall / (precision + recall). 0.0 if both are zero.
    pub f1: f64,
    /// Number of true rows in this class.
    pub support: usize,
}

impl ConfusionMatrix {
    /// Build a confusion matrix from true and predicted labels.
    ///
    /// The matrix grows past `n_classes` if either slice holds a larger label.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::EmptyDataset`] when no labels are provided.
    pub fn from_labels(
        true_labels: &[usize],
        predicted: &[usize],
        n_classes: usize,
    ) -> Result<Self, ForestError> {
        if true_labels.is_empty() {
            return Err(ForestError::EmptyDataset);
        }
        let n_classes = true_labels
            .iter()
            .chain(predicted)
            .map(|&l| l + 1)
            .fold(n_classes, usize::max);
        let mut matrix = vec![vec![0usize; n_classes]; n_classes];
        for (&t, &p) in true_labels.iter().zip(predicted) {
            matrix[t][p] += 1;
        }
        Ok(Self { matrix, n_classes })
    }

    /// Overall accuracy as a percentage.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        let correct: usize = (0..self.n_classes).map(|i| self.matrix[i][i]).sum();
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64 * 100.0
        }
    }

    /// Return the number of rows counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.matrix.iter().flatten().sum()
    }

    /// Per-class precision, recall, F1, and support.
    #[must_use]
    pub fn class_metrics(&self) -> Vec<ClassMetrics> {
        (0..self.n_classes)
            .map(|c| {
                let tp = self.matrix[c][c];
                let predicted: usize = (0..self.n_classes).map(|i| self.matrix[i][c]).sum();
                let support: usize = self.matrix[c].iter().sum();
                let precision = if predicted == 0 {
                    0.0
                } else {
                    tp as f64 / predicted as f64
                };
                let recall = if support == 0 {
                    0.0
                } else {
                    tp as f64 / support as f64
                };
                let f1 = if precision + recall == 0.0 {
                    0.0
                } else {
                    2.0 * precision * recall / (precision + recall)
                };
                ClassMetrics {
                    class: c,
                    precision,
                    recall,
                    f1,
                    support,
                }
            })
            .collect()
    }

    /// Return the underlying matrix rows.
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<usize>] {
        &self.matrix
    }

    /// Return the number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_two_of_three() {
        let acc = accuracy_metric(&[1, 1, 0], &[1, 0, 0]);
        assert!((acc - 66.667).abs() < 1e-3, "acc = {acc}");
    }

    #[test]
    fn accuracy_bounds() {
        assert_eq!(accuracy_metric(&[0, 1, 2], &[0, 1, 2]), 100.0);
        assert_eq!(accuracy_metric(&[0, 1, 2], &[1, 2, 0]), 0.0);
        assert_eq!(accuracy_metric(&[], &[]), 0.0);
    }

    #[test]
    fn matrix_counts_and_accuracy() {
        let cm = ConfusionMatrix::from_labels(&[0, 0, 1, 1, 2], &[0, 1, 1, 1, 0], 3).unwrap();
        assert_eq!(cm.as_rows(), &[vec![1, 1, 0], vec![0, 2, 0], vec![1, 0, 0]]);
        assert_eq!(cm.total(), 5);
        assert!((cm.accuracy() - 60.0).abs() < 1e-12);
    }

    #[test]
    fn class_metrics_values() {
        let cm = ConfusionMatrix::from_labels(&[0, 0, 1, 1, 2], &[0, 1, 1, 1, 0], 3).unwrap();
        let metrics = cm.class_metrics();
        // class 1: tp 2, predicted 3, support 2
        assert!((metrics[1].precision - 2.0 / 3.0).abs() < 1e-12);
        assert!((metrics[1].recall - 1.0).abs() < 1e-12);
        assert!((metrics[1].f1 - 0.8).abs() < 1e-12);
        // class 2 never predicted correctly
        assert_eq!(metrics[2].f1, 0.0);
        assert_eq!(metrics[2].support, 1);
    }

    #[test]
    fn matrix_grows_for_unseen_labels() {
        let cm = ConfusionMatrix::from_labels(&[0, 3], &[0, 1], 2).unwrap();
        assert_eq!(cm.n_classes(), 4);
    }

    #[test]
    fn empty_labels_error() {
        assert!(matches!(
            ConfusionMatrix::from_labels(&[], &[], 2),
            Err(ForestError::EmptyDataset)
        ));
    }
}
