use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use arbor_forest::{
    ClassMetrics, ConfusionMatrix, CrossValidation, CrossValidationResult, MaxFeatures,
    RandomForestConfig,
};
use arbor_io::{DatasetReader, LabeledDataset};

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "Random forest classification with k-fold cross-validation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// RNG seed for reproducibility
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Cross-validate a random forest for one or more ensemble sizes
    Evaluate {
        /// Path to the input file (features then a trailing label column)
        #[arg(long)]
        data: PathBuf,

        /// Number of cross-validation folds
        #[arg(long, default_value_t = 5)]
        n_folds: usize,

        /// Maximum tree depth (root is depth 0)
        #[arg(long, default_value_t = 10)]
        max_depth: usize,

        /// Node size at or below which a node becomes a leaf
        #[arg(long, default_value_t = 1)]
        min_size: usize,

        /// Bootstrap sample size as a fraction of the training rows, in (0, 1]
        #[arg(long, default_value_t = 1.0)]
        sample_ratio: f64,

        /// Ensemble sizes to evaluate, comma separated
        #[arg(long, value_delimiter = ',', default_value = "1,5,10")]
        n_trees: Vec<usize>,

        /// Features considered per split (defaults to floor(sqrt(columns)))
        #[arg(long)]
        n_features: Option<usize>,

        /// Treat the first row as a header
        #[arg(long, default_value_t = false)]
        has_headers: bool,

        /// Field delimiter (single ASCII character)
        #[arg(long, default_value_t = ',')]
        delimiter: char,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct EvaluateOutput {
    data: String,
    n_rows: usize,
    n_features: usize,
    feature_names: Vec<String>,
    class_names: Vec<String>,
    n_folds: usize,
    fold_size: usize,
    n_dropped: usize,
    results: Vec<TreeCountOutput>,
}

#[derive(Serialize)]
struct TreeCountOutput {
    n_trees: usize,
    fold_accuracies: Vec<f64>,
    mean_accuracy: f64,
    std_accuracy: f64,
    pooled_accuracy: f64,
    confusion_matrix: ConfusionMatrix,
    class_metrics: Vec<ClassMetrics>,
}

fn tree_count_output(n_trees: usize, cv_result: CrossValidationResult) -> TreeCountOutput {
    TreeCountOutput {
        n_trees,
        pooled_accuracy: cv_result.confusion_matrix.accuracy(),
        class_metrics: cv_result.confusion_matrix.class_metrics(),
        confusion_matrix: cv_result.confusion_matrix,
        fold_accuracies: cv_result.fold_accuracies,
        mean_accuracy: cv_result.mean_accuracy,
        std_accuracy: cv_result.std_accuracy,
    }
}

fn evaluate_output(
    data: &Path,
    loaded: &LabeledDataset,
    n_folds: usize,
    fold_size: usize,
    n_dropped: usize,
    results: Vec<TreeCountOutput>,
) -> EvaluateOutput {
    EvaluateOutput {
        data: data.display().to_string(),
        n_rows: loaded.dataset.n_rows(),
        n_features: loaded.dataset.n_features(),
        feature_names: loaded.feature_names.clone(),
        class_names: loaded.class_names.clone(),
        n_folds,
        fold_size,
        n_dropped,
        results,
    }
}

fn parse_delimiter(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() {
        anyhow::bail!("delimiter must be a single ASCII character, got {delimiter:?}");
    }
    Ok(delimiter as u8)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Evaluate {
            data,
            n_folds,
            max_depth,
            min_size,
            sample_ratio,
            n_trees,
            n_features,
            has_headers,
            delimiter,
        } => {
            if n_trees.is_empty() {
                anyhow::bail!("--n-trees needs at least one value");
            }

            // 1. Load
            let loaded = DatasetReader::new(&data)
                .with_headers(has_headers)
                .with_delimiter(parse_delimiter(delimiter)?)
                .read()
                .context("failed to read dataset")?;
            let dataset = &loaded.dataset;
            info!(
                n_rows = dataset.n_rows(),
                n_classes = loaded.class_names.len(),
                "dataset ready"
            );

            let max_features = n_features.map_or(MaxFeatures::Sqrt, MaxFeatures::Fixed);
            let cv = CrossValidation::new(n_folds)?.with_seed(cli.seed);

            // 2. Cross-validate each ensemble size
            let mut results = Vec::with_capacity(n_trees.len());
            let mut fold_size = 0;
            let mut n_dropped = 0;
            for &count in &n_trees {
                let rf_config = RandomForestConfig::new(count)?
                    .with_max_depth(max_depth)
                    .with_min_size(min_size)
                    .with_sample_ratio(sample_ratio)
                    .with_max_features(max_features)
                    .with_seed(cli.seed);
                let cv_result = cv
                    .evaluate(&rf_config, dataset)
                    .with_context(|| format!("cross-validation failed for {count} trees"))?;
                info!(
                    n_trees = count,
                    mean_accuracy = cv_result.mean_accuracy,
                    "ensemble size evaluated"
                );

                fold_size = cv_result.fold_size;
                n_dropped = cv_result.n_dropped;
                results.push(tree_count_output(count, cv_result));
            }

            let output = evaluate_output(&data, &loaded, n_folds, fold_size, n_dropped, results);
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arbor_forest::Dataset;

    fn loaded() -> LabeledDataset {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..20 {
            features.push(vec![i as f64, 0.5]);
            labels.push(usize::from(i >= 10));
        }
        LabeledDataset {
            dataset: Dataset::new(features, labels).unwrap(),
            class_names: vec!["low".to_string(), "high".to_string()],
            feature_names: vec!["x".to_string(), "noise".to_string()],
        }
    }

    #[test]
    fn output_reports_confusion_matrix_and_class_metrics() {
        let loaded = loaded();
        let config = RandomForestConfig::new(3)
            .unwrap()
            .with_max_features(MaxFeatures::All);
        let cv_result = CrossValidation::new(2)
            .unwrap()
            .evaluate(&config, &loaded.dataset)
            .unwrap();
        let expected_total = cv_result.confusion_matrix.total();

        let result = tree_count_output(3, cv_result);
        let json = serde_json::to_value(&result).unwrap();

        let rows = json["confusion_matrix"]["matrix"].as_array().unwrap();
        let total: u64 = rows
            .iter()
            .flat_map(|r| r.as_array().unwrap())
            .map(|c| c.as_u64().unwrap())
            .sum();
        assert_eq!(total as usize, expected_total);
        assert_eq!(json["class_metrics"].as_array().unwrap().len(), 2);
        let pooled = json["pooled_accuracy"].as_f64().unwrap();
        assert!((0.0..=100.0).contains(&pooled));
    }

    #[test]
    fn output_reports_feature_names() {
        let loaded = loaded();
        let output = evaluate_output(Path::new("data.csv"), &loaded, 2, 10, 0, Vec::new());
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["feature_names"], serde_json::json!(["x", "noise"]));
        assert_eq!(json["class_names"], serde_json::json!(["low", "high"]));
        assert_eq!(json["n_rows"], 20);
    }
}
