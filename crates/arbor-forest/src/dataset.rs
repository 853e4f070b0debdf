//! Record and dataset types shared by training and evaluation.

use crate::error::ForestError;
use crate::node::FeatureIndex;

/// One row of the dataset: real-valued features followed by a class label.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    features: Vec<f64>,
    label: usize,
}

impl Record {
    /// Create a new record.
    #[must_use]
    pub fn new(features: Vec<f64>, label: usize) -> Self {
        Self { features, label }
    }

    /// Return the feature values.
    #[must_use]
    pub fn features(&self) -> &[f64] {
        &self.features
    }

    /// Return the value of a single feature column.
    #[must_use]
    pub fn value(&self, feature: FeatureIndex) -> f64 {
        self.features[feature.index()]
    }

    /// Return the class label (zero-based).
    #[must_use]
    pub fn label(&self) -> usize {
        self.label
    }
}

/// An immutable collection of records that all share the same feature count.
///
/// Constructed once upstream and only read afterwards. Training and
/// evaluation borrow rows from it instead of copying them.
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
    n_features: usize,
    n_classes: usize,
}

impl Dataset {
    /// Build a dataset from parallel feature rows and labels.
    ///
    /// `features[row][column]`, row-major.
    ///
    /// # Errors
    ///
    /// | Variant                               | When                                  |
    /// |---------------------------------------|---------------------------------------|
    /// | [`ForestError::LabelCountMismatch`]   | `features.len() != labels.len()`      |
    /// | [`ForestError::EmptyDataset`]         | zero rows                             |
    /// | [`ForestError::ZeroFeatures`]         | rows have zero feature columns        |
    /// | [`ForestError::FeatureCountMismatch`] | rows have inconsistent lengths        |
    /// | [`ForestError::LabelOutOfRange`]      | a label is `usize::MAX`               |
    ///
    /// Labels are expected to be dense codes `0..k`. Per-node class tallies
    /// allocate one slot per code up to the largest label.
    pub fn new(features: Vec<Vec<f64>>, labels: Vec<usize>) -> Result<Self, ForestError> {
        if features.len() != labels.len() {
            return Err(ForestError::LabelCountMismatch {
                n_rows: features.len(),
                n_labels: labels.len(),
            });
        }
        let records = features
            .into_iter()
            .zip(labels)
            .map(|(row, label)| Record::new(row, label))
            .collect();
        Self::from_records(records)
    }

    /// Build a dataset from already-assembled records.
    ///
    /// # Errors
    ///
    /// Same as [`Dataset::new`], minus the label count check.
    pub fn from_records(records: Vec<Record>) -> Result<Self, ForestError> {
        let first = records.first().ok_or(ForestError::EmptyDataset)?;
        let n_features = first.features().len();
        if n_features == 0 {
            return Err(ForestError::ZeroFeatures);
        }
        for (row_index, record) in records.iter().enumerate() {
            if record.features().len() != n_features {
                return Err(ForestError::FeatureCountMismatch {
                    expected: n_features,
                    got: record.features().len(),
                    row_index,
                });
            }
        }
        let (row_index, label) = records
            .iter()
            .map(Record::label)
            .enumerate()
            .max_by_key(|&(_, label)| label)
            .unwrap_or((0, 0));
        let n_classes = label
            .checked_add(1)
            .ok_or(ForestError::LabelOutOfRange { label, row_index })?;
        Ok(Self {
            records,
            n_features,
            n_classes,
        })
    }

    /// Return all records in their original order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Return the number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.records.len()
    }

    /// Return the number of feature columns.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the number of classes (largest label + 1).
    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Borrow every row, in order, as a partition usable by the trainers.
    #[must_use]
    pub fn rows(&self) -> Vec<&Record> {
        self.records.iter().collect()
    }
}

/// Count how many rows carry each label, indexed by label.
pub(crate) fn class_counts(rows: &[&Record], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_classes];
    for row in rows {
        counts[row.label()] += 1;
    }
    counts
}

/// Return the label with the highest count, preferring the smallest label on ties.
pub(crate) fn majority_label(counts: &[usize]) -> usize {
    let mut best = 0usize;
    for (label, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = label;
        }
    }
    best
}
