//! Majority-vote prediction for the random forest ensemble.

use crate::dataset::majority_label;
use crate::error::ForestError;
use crate::forest::{RandomForest, TrainingMetadata};
use crate::tree::DecisionTree;

/// Per-label vote counts collected from every tree for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteTally {
    counts: Vec<usize>,
}

impl VoteTally {
    pub(crate) fn new(counts: Vec<usize>) -> Self {
        Self { counts }
    }

    /// Return the most-voted label.
    ///
    /// Ties go to the smallest label among the tied ones, independent of the
    /// order in which trees voted.
    #[must_use]
    pub fn winner(&self) -> usize {
        majority_label(&self.counts)
    }

    /// Return the number of votes cast for `label`.
    #[must_use]
    pub fn votes_for(&self, label: usize) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    /// Return the total number of votes cast.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Return the vote counts indexed by label.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.counts
    }
}

impl RandomForest {
    /// Predict the class label for one record's features by majority vote.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] when `features.len() != n_features`.
    pub fn predict(&self, features: &[f64]) -> Result<usize, ForestError> {
        Ok(self.votes(features)?.winner())
    }

    /// Collect one vote per tree for one record's features.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] when `features.len() != n_features`.
    pub fn votes(&self, features: &[f64]) -> Result<VoteTally, ForestError> {
        if features.len() != self.n_features {
            return Err(ForestError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: features.len(),
            });
        }

        let mut counts = vec![0usize; self.n_classes];
        for tree in &self.trees {
            counts[tree.predict(features)?] += 1;
        }
        Ok(VoteTally::new(counts))
    }

    /// Predict class labels for a batch of feature rows.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] if any row has the wrong feature count.
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, ForestError> {
        features.iter().map(|row| self.predict(row)).collect()
    }

    /// Borrow the trained trees in training order.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Return the number of features this forest was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of classes.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Return training metadata.
    #[must_use]
    pub fn metadata(&self) -> &TrainingMetadata {
        &self.metadata
    }
}
