//! Configuration builder for random forest training.

use crate::dataset::Dataset;
use crate::error::ForestError;
use crate::forest::RandomForest;

/// Strategy for determining the number of features sampled at each split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaxFeatures {
    /// Floor of the square root of the column count (at least 1).
    Sqrt,
    /// Floor of log base 2 of the column count (at least 1).
    Log2,
    /// A fixed count.
    Fixed(usize),
    /// All features (no subsampling).
    All,
}

impl MaxFeatures {
    /// Resolve the strategy to a concrete count for `n_features` columns.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidMaxFeatures`] when the count is 0 or
    /// exceeds `n_features`.
    pub fn resolve(self, n_features: usize) -> Result<usize, ForestError> {
        let resolved = match self {
            MaxFeatures::Sqrt => ((n_features as f64).sqrt().floor() as usize).max(1),
            MaxFeatures::Log2 => ((n_features as f64).log2().floor() as usize).max(1),
            MaxFeatures::Fixed(n) => n,
            MaxFeatures::All => n_features,
        };
        if resolved == 0 || resolved > n_features {
            return Err(ForestError::InvalidMaxFeatures {
                max_features: resolved,
                n_features,
            });
        }
        Ok(resolved)
    }
}

/// Configuration for random forest training.
///
/// Construct via [`RandomForestConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter      | Default |
/// |----------------|---------|
/// | `max_features` | `Sqrt`  |
/// | `max_depth`    | 10      |
/// | `min_size`     | 1       |
/// | `sample_ratio` | 1.0     |
/// | `seed`         | 42      |
#[derive(Debug, Clone)]
pub struct RandomForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) max_features: MaxFeatures,
    pub(crate) max_depth: usize,
    pub(crate) min_size: usize,
    pub(crate) sample_ratio: f64,
    pub(crate) seed: u64,
}

impl RandomForestConfig {
    /// Create a new config with the given number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, ForestError> {
        if n_trees == 0 {
            return Err(ForestError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            max_features: MaxFeatures::Sqrt,
            max_depth: 10,
            min_size: 1,
            sample_ratio: 1.0,
            seed: 42,
        })
    }

    // --- Setters ---

    /// Set the per-split feature sampling strategy.
    #[must_use]
    pub fn with_max_features(mut self, max_features: MaxFeatures) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the maximum tree depth (root is depth 0).
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the partition size at or below which a leaf is forced.
    #[must_use]
    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    /// Set the fraction of the training set, in `(0, 1]`, drawn for each tree's bootstrap sample.
    #[must_use]
    pub fn with_sample_ratio(mut self, sample_ratio: f64) -> Self {
        self.sample_ratio = sample_ratio;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

    /// Return the number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Return the per-split feature sampling strategy.
    #[must_use]
    pub fn max_features(&self) -> MaxFeatures {
        self.max_features
    }

    /// Return the maximum depth.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Return the forced-leaf partition size.
    #[must_use]
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// Return the bootstrap sample ratio.
    #[must_use]
    pub fn sample_ratio(&self) -> f64 {
        self.sample_ratio
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Train a random forest on every row of `dataset`.
    ///
    /// # Errors
    ///
    /// | Variant                                 | When                                             |
    /// |-----------------------------------------|--------------------------------------------------|
    /// | [`ForestError::InvalidMinSize`]         | `min_size` is zero                               |
    /// | [`ForestError::InvalidMaxFeatures`]     | resolved max_features is outside [1, n_features] |
    /// | [`ForestError::InvalidSampleRatio`]     | `sample_ratio` is outside (0, 1]                 |
    /// | [`ForestError::EmptyBootstrapSample`]   | `sample_ratio` draws zero rows                   |
    pub fn fit(&self, dataset: &Dataset) -> Result<RandomForest, ForestError> {
        crate::forest::train(
            self,
            &dataset.rows(),
            dataset.n_features(),
            dataset.n_classes(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqrt_floors() {
        assert_eq!(MaxFeatures::Sqrt.resolve(60).unwrap(), 7);
        assert_eq!(MaxFeatures::Sqrt.resolve(2).unwrap(), 1);
        assert_eq!(MaxFeatures::Sqrt.resolve(1).unwrap(), 1);
    }

    #[test]
    fn log2_floors() {
        assert_eq!(MaxFeatures::Log2.resolve(60).unwrap(), 5);
        assert_eq!(MaxFeatures::Log2.resolve(1).unwrap(), 1);
    }

    #[test]
    fn fixed_out_of_range_errors() {
        assert!(matches!(
            MaxFeatures::Fixed(5).resolve(4),
            Err(ForestError::InvalidMaxFeatures {
                max_features: 5,
                n_features: 4
            })
        ));
        assert!(MaxFeatures::Fixed(0).resolve(4).is_err());
        assert_eq!(MaxFeatures::All.resolve(4).unwrap(), 4);
    }

    #[test]
    fn zero_trees_error() {
        assert!(matches!(
            RandomForestConfig::new(0),
            Err(ForestError::InvalidTreeCount { n_trees: 0 })
        ));
    }

    #[test]
    fn builder_sets_fields() {
        let cfg = RandomForestConfig::new(3)
            .unwrap()
            .with_max_depth(4)
            .with_min_size(2)
            .with_sample_ratio(0.5)
            .with_max_features(MaxFeatures::Fixed(2))
            .with_seed(7);
        assert_eq!(cfg.n_trees(), 3);
        assert_eq!(cfg.max_depth(), 4);
        assert_eq!(cfg.min_size(), 2);
        assert_eq!(cfg.sample_ratio(), 0.5);
        assert_eq!(cfg.max_features(), MaxFeatures::Fixed(2));
        assert_eq!(cfg.seed(), 7);
    }
}
