//! Random forest training: one bootstrap sample and one tree per ensemble member.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument};

use crate::bootstrap::{subsample, validate_ratio};
use crate::config::RandomForestConfig;
use crate::dataset::Record;
use crate::error::ForestError;
use crate::tree::{DecisionTree, TreeConfig};

/// Metadata about the training run.
#[derive(Debug, Clone)]
pub struct TrainingMetadata {
    /// Number of trees trained.
    pub n_trees: usize,
    /// Number of rows in the training set.
    pub n_rows: usize,
    /// Number of feature columns.
    pub n_features: usize,
    /// Number of classes (largest label + 1).
    pub n_classes: usize,
    /// Features sampled at each split.
    pub max_features_resolved: usize,
    /// Rows drawn into each tree's bootstrap sample.
    pub draw_count: usize,
}

/// A fitted random forest ensemble.
///
/// Trees are trained independently and never mutated after training.
#[derive(Debug, Clone)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
    pub(crate) metadata: TrainingMetadata,
}

/// Train the ensemble on `rows`.
///
/// A master generator seeded from the config yields one seed per tree. Each
/// tree's own generator first draws its bootstrap sample, then drives
/// feature sampling while the tree grows, so a tree depends only on its seed
/// and the training rows.
#[instrument(skip_all, fields(n_trees = config.n_trees, n_rows = rows.len()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    rows: &[&Record],
    n_features: usize,
    n_classes: usize,
) -> Result<RandomForest, ForestError> {
    // --- Validate config ---
    if rows.is_empty() {
        return Err(ForestError::EmptyDataset);
    }
    if config.min_size == 0 {
        return Err(ForestError::InvalidMinSize { min_size: 0 });
    }
    let max_features_resolved = config.max_features.resolve(n_features)?;
    let draw_count = validate_ratio(rows.len(), config.sample_ratio)?;

    info!(
        n_trees = config.n_trees,
        n_rows = rows.len(),
        n_features,
        n_classes,
        max_features = max_features_resolved,
        draw_count,
        "training random forest"
    );

    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| master_rng.r#gen()).collect();

    let tree_config = TreeConfig::new()
        .with_max_depth(config.max_depth)
        .with_min_size(config.min_size)
        .with_max_features(Some(max_features_resolved));

    let trees = tree_seeds
        .into_iter()
        .enumerate()
        .map(|(tree_index, seed)| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let sample = subsample(rows, config.sample_ratio, &mut rng)?;
            let tree = tree_config.grow(sample, n_features, n_classes, &mut rng);
            debug!(tree_index, n_nodes = tree.n_nodes(), "tree trained");
            Ok(tree)
        })
        .collect::<Result<Vec<DecisionTree>, ForestError>>()?;

    info!(n_trees_trained = trees.len(), "random forest training complete");

    Ok(RandomForest {
        trees,
        n_features,
        n_classes,
        metadata: TrainingMetadata {
            n_trees: config.n_trees,
            n_rows: rows.len(),
            n_features,
            n_classes,
            max_features_resolved,
            draw_count,
        },
    })
}
