//! K-fold cross-validation for the random forest.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument};

use crate::config::RandomForestConfig;
use crate::dataset::{Dataset, Record};
use crate::error::ForestError;
use crate::metrics::{ConfusionMatrix, accuracy_metric};

/// Cross-validation configuration.
///
/// Construct via [`CrossValidation::new`], then chain `with_seed` if desired.
#[derive(Debug, Clone)]
pub struct CrossValidation {
    n_folds: usize,
    seed: u64,
}

/// A disjoint subset of dataset rows, identified by their positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    rows: Vec<usize>,
}

impl Fold {
    /// Return the dataset row positions in this fold, in draw order.
    #[must_use]
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// Return the number of rows in this fold.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Return `true` if the fold holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Results of k-fold cross-validation.
#[derive(Debug, serde::Serialize)]
pub struct CrossValidationResult {
    /// Accuracy percentage for each fold, in fold order.
    pub fold_accuracies: Vec<f64>,
    /// Mean of `fold_accuracies`.
    pub mean_accuracy: f64,
    /// Standard deviation of `fold_accuracies`.
    pub std_accuracy: f64,
    /// Confusion matrix summed across every held-out row.
    pub confusion_matrix: ConfusionMatrix,
    /// Number of folds.
    pub n_folds: usize,
    /// Rows per fold.
    pub fold_size: usize,
    /// Rows left out of every fold by integer-division sizing.
    pub n_dropped: usize,
}

impl CrossValidation {
    /// Create a new cross-validation config with the given number of folds.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidFoldCount`] if `n_folds` < 2.
    pub fn new(n_folds: usize) -> Result<Self, ForestError> {
        if n_folds < 2 {
            return Err(ForestError::InvalidFoldCount { n_folds });
        }
        Ok(Self { n_folds, seed: 42 })
    }

    /// Set the random seed for fold assignment.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the number of folds.
    #[must_use]
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    /// Return the fold assignment seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Split `n_rows` row positions into `n_folds` folds of `n_rows / n_folds` rows each.
    ///
    /// Rows are drawn uniformly without replacement from the remaining pool.
    /// The `n_rows % n_folds` rows never drawn belong to no fold.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::FoldCountExceedsRows`] if `n_folds > n_rows`.
    pub fn split(&self, n_rows: usize) -> Result<Vec<Fold>, ForestError> {
        if self.n_folds > n_rows {
            return Err(ForestError::FoldCountExceedsRows {
                n_folds: self.n_folds,
                n_rows,
            });
        }
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        Ok(split_folds(n_rows, self.n_folds, &mut rng))
    }

    /// Run k-fold cross-validation.
    ///
    /// For each fold, a forest is trained on the concatenation of every other
    /// fold and scored on the held-out fold. The held-out labels are only
    /// used for scoring; the forest sees feature values alone. Each fold's
    /// forest is seeded with `config.seed() + fold`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::FoldCountExceedsRows`] | More folds than rows |
    /// | Other forest errors | From underlying training |
    #[instrument(skip_all, fields(n_folds = self.n_folds, n_rows = dataset.n_rows()))]
    pub fn evaluate(
        &self,
        config: &RandomForestConfig,
        dataset: &Dataset,
    ) -> Result<CrossValidationResult, ForestError> {
        let folds = self.split(dataset.n_rows())?;
        let records = dataset.records();
        let fold_size = folds.first().map_or(0, Fold::len);
        let n_dropped = dataset.n_rows() - fold_size * self.n_folds;

        let mut fold_accuracies = Vec::with_capacity(self.n_folds);
        let mut all_actual = Vec::new();
        let mut all_predicted = Vec::new();

        for (fold_index, test_fold) in folds.iter().enumerate() {
            let train_rows: Vec<&Record> = folds
                .iter()
                .enumerate()
                .filter(|&(other, _)| other != fold_index)
                .flat_map(|(_, fold)| fold.rows().iter().map(|&i| &records[i]))
                .collect();

            let fold_config = config
                .clone()
                .with_seed(config.seed.wrapping_add(fold_index as u64));
            let forest = crate::forest::train(
                &fold_config,
                &train_rows,
                dataset.n_features(),
                dataset.n_classes(),
            )?;

            let mut actual = Vec::with_capacity(test_fold.len());
            let mut predicted = Vec::with_capacity(test_fold.len());
            for &i in test_fold.rows() {
                predicted.push(forest.predict(records[i].features())?);
                actual.push(records[i].label());
            }

            let accuracy = accuracy_metric(&actual, &predicted);
            info!(fold = fold_index, accuracy, "fold completed");
            fold_accuracies.push(accuracy);

            all_actual.extend(actual);
            all_predicted.extend(predicted);
        }

        let n = fold_accuracies.len() as f64;
        let mean_accuracy = fold_accuracies.iter().sum::<f64>() / n;
        let std_accuracy = (fold_accuracies
            .iter()
            .map(|&a| (a - mean_accuracy).powi(2))
            .sum::<f64>()
            / n)
            .sqrt();

        let confusion_matrix =
            ConfusionMatrix::from_labels(&all_actual, &all_predicted, dataset.n_classes())?;

        info!(mean_accuracy, std_accuracy, n_dropped, "cross-validation complete");

        Ok(CrossValidationResult {
            fold_accuracies,
            mean_accuracy,
            std_accuracy,
            confusion_matrix,
            n_folds: self.n_folds,
            fold_size,
            n_dropped,
        })
    }
}

/// Draw `n_folds` folds of `n_rows / n_folds` positions without replacement.
fn split_folds(n_rows: usize, n_folds: usize, rng: &mut impl Rng) -> Vec<Fold> {
    let fold_size = n_rows / n_folds;
    let mut pool: Vec<usize> = (0..n_rows).collect();
    let mut folds = Vec::with_capacity(n_folds);
    for _ in 0..n_folds {
        let mut rows = Vec::with_capacity(fold_size);
        while rows.len() < fold_size {
            let pick = rng.gen_range(0..pool.len());
            rows.push(pool.remove(pick));
        }
        folds.push(Fold { rows });
    }
    folds
}
