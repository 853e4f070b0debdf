//! Random forest classification: train, predict, cross-validate.
//!
//! Provides bagged CART decision trees split on un-normalized Gini impurity
//! over a random feature subset, majority-vote ensemble prediction, and a
//! k-fold cross-validation harness. All randomness flows from explicit
//! seeds, so every run is reproducible.

mod bootstrap;
mod config;
mod dataset;
mod error;
mod eval;
mod forest;
mod metrics;
mod node;
mod predict;
mod split;
mod tree;

pub use bootstrap::{draw_count, subsample};
pub use config::{MaxFeatures, RandomForestConfig};
pub use dataset::{Dataset, Record};
pub use error::ForestError;
pub use eval::{CrossValidation, CrossValidationResult, Fold};
pub use forest::{RandomForest, TrainingMetadata};
pub use metrics::{ClassMetrics, ConfusionMatrix, accuracy_metric};
pub use node::{FeatureIndex, Impurity, Node, NodeIndex};
pub use predict::VoteTally;
pub use split::{gini_index, test_split};
pub use tree::{DecisionTree, TreeConfig};
