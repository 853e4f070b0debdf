use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::{
    ForestError,
    dataset::{Dataset, Record, class_counts, majority_label},
    node::{Node, NodeIndex},
    split::find_best_split,
};

/// Configuration for a single decision tree.
///
/// Construct via [`TreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter      | Default               |
/// |----------------|-----------------------|
/// | `max_depth`    | 10                    |
/// | `min_size`     | 1                     |
/// | `max_features` | `None` (all features) |
/// | `seed`         | 42                    |
#[derive(Debug, Clone)]
pub struct TreeConfig {
    pub(crate) max_depth: usize,
    pub(crate) min_size: usize,
    pub(crate) max_features: Option<usize>,
    pub(crate) seed: u64,
}

impl TreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_depth: 10,
            min_size: 1,
            max_features: None,
            seed: 42,
        }
    }

    /// Set the maximum tree depth.
    ///
    /// The root sits at depth 0 and its children at depth 1; any node at
    /// `depth >= max_depth` becomes a leaf. `0` yields a single-leaf tree.
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

    /// Set the number of features sampled at each split.
    ///
    /// `None` means examine every feature.
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
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

    /// Return the number of features sampled per split, if set.
    #[must_use]
    pub fn max_features(&self) -> Option<usize> {
        self.max_features
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Train a decision tree on every row of `dataset`.
    ///
    /// # Errors
    ///
    /// | Variant                              | When                                             |
    /// |--------------------------------------|--------------------------------------------------|
    /// | [`ForestError::InvalidMinSize`]      | `min_size` is zero                               |
    /// | [`ForestError::InvalidMaxFeatures`]  | `max_features` resolves outside [1, n_features]  |
    #[instrument(skip_all, fields(n_rows = dataset.n_rows()))]
    pub fn fit(&self, dataset: &Dataset) -> Result<DecisionTree, ForestError> {
        if self.min_size == 0 {
            return Err(ForestError::InvalidMinSize { min_size: 0 });
        }
        let n_features = dataset.n_features();
        let max_features = self.max_features.unwrap_or(n_features);
        if max_features == 0 || max_features > n_features {
            return Err(ForestError::InvalidMaxFeatures {
                max_features,
                n_features,
            });
        }

        let config = self.clone().with_max_features(Some(max_features));
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        Ok(config.grow(
            dataset.rows(),
            n_features,
            dataset.n_classes(),
            &mut rng,
        ))
    }

    /// Grow a tree over `rows` without validating the config.
    ///
    /// Nodes are built depth-first, left before right, from an explicit work
    /// stack. Each node's arena slot is reserved when its parent splits and
    /// filled once the node itself is resolved, so the root is always index 0.
    pub(crate) fn grow(
        &self,
        rows: Vec<&Record>,
        n_features: usize,
        n_classes: usize,
        rng: &mut impl Rng,
    ) -> DecisionTree {
        let max_features = self.max_features.unwrap_or(n_features);
        let mut arena = vec![placeholder()];
        let mut stack = vec![Pending {
            rows,
            depth: 0,
            slot: NodeIndex::new(0),
        }];

        while let Some(Pending { rows, depth, slot }) = stack.pop() {
            let counts = class_counts(&rows, n_classes);
            let leaf = Node::Leaf {
                label: majority_label(&counts),
                n_samples: rows.len(),
            };

            let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
            if depth >= self.max_depth || rows.len() <= self.min_size || pure {
                arena[slot.index()] = leaf;
                continue;
            }

            let split = match find_best_split(&rows, n_features, max_features, n_classes, rng) {
                Some(split) if !split.is_degenerate() => split,
                _ => {
                    arena[slot.index()] = leaf;
                    continue;
                }
            };

            let left = NodeIndex::new(arena.len());
            arena.push(placeholder());
            let right = NodeIndex::new(arena.len());
            arena.push(placeholder());

            arena[slot.index()] = Node::Internal {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
                impurity: split.impurity,
                n_samples: rows.len(),
            };

            // Pushed right first so the left subtree is built first.
            stack.push(Pending {
                rows: split.right,
                depth: depth + 1,
                slot: right,
            });
            stack.push(Pending {
                rows: split.left,
                depth: depth + 1,
                slot: left,
            });
        }

        let tree = DecisionTree {
            nodes: arena,
            n_features,
        };
        debug!(
            n_nodes = tree.n_nodes(),
            depth = tree.depth(),
            "decision tree built"
        );
        tree
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A partition waiting to be resolved into the node at `slot`.
struct Pending<'a> {
    rows: Vec<&'a Record>,
    depth: usize,
    slot: NodeIndex,
}

fn placeholder() -> Node {
    Node::Leaf {
        label: 0,
        n_samples: 0,
    }
}

/// A fitted decision tree.
///
/// Stored as an arena-based `Vec<Node>` rooted at index 0 with index
/// references between parents and children. Immutable once built.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
}

impl DecisionTree {
    /// Predict the class label for one record's features.
    ///
    /// Traverses from the root: at each internal node, goes left when
    /// `features[feature] < threshold`, right otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::PredictionFeatureMismatch`] when `features.len() != n_features`.
    pub fn predict(&self, features: &[f64]) -> Result<usize, ForestError> {
        if features.len() != self.n_features {
            return Err(ForestError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: features.len(),
            });
        }
        Ok(self.traverse(features))
    }

    /// Borrow the node arena. Index 0 is the root.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Return the number of features this tree was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Return the total number of nodes in the tree (both internal and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Return the maximum depth of the tree.
    ///
    /// A single-node tree (just a root leaf) has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0usize;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, d)) = stack.pop() {
            match &self.nodes[idx] {
                Node::Leaf { .. } => max_depth = max_depth.max(d),
                Node::Internal { left, right, .. } => {
                    stack.push((left.index(), d + 1));
                    stack.push((right.index(), d + 1));
                }
            }
        }
        max_depth
    }

    /// Walk from the root to a leaf and return its label.
    fn traverse(&self, features: &[f64]) -> usize {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { label, .. } => return *label,
                Node::Internal {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if features[feature.index()] < *threshold {
                        left.index()
                    } else {
                        right.index()
                    };
                }
            }
        }
    }
}
