use rand::Rng;

use crate::dataset::{Record, class_counts};
use crate::node::{FeatureIndex, Impurity};

/// Un-normalized Gini contribution of one group: `Σ p_c · (1 - p_c)`.
///
/// Empty groups contribute 0.
fn group_gini(counts: &[usize], size: usize) -> f64 {
    if size == 0 {
        return 0.0;
    }
    let n = size as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n;
            p * (1.0 - p)
        })
        .sum()
}

/// Gini index of a two-way split, summed across both groups.
///
/// Groups are not weighted by their size, so a perfectly pure pair of groups
/// scores 0.0 and a 50/50 binary group contributes 0.5 regardless of how
/// many rows it holds. Empty groups contribute nothing.
#[must_use]
pub fn gini_index(groups: [&[&Record]; 2], n_classes: usize) -> Impurity {
    let score = groups
        .iter()
        .map(|group| group_gini(&class_counts(group, n_classes), group.len()))
        .sum();
    Impurity::new(score)
}

/// Partition `rows` on a single feature.
///
/// Rows with `value < threshold` go to the first (left) group, all others to
/// the second (right). Row order is preserved within each group.
#[must_use]
pub fn test_split<'a>(
    feature: FeatureIndex,
    threshold: f64,
    rows: &[&'a Record],
) -> (Vec<&'a Record>, Vec<&'a Record>) {
    rows.iter().copied().partition(|row| row.value(feature) < threshold)
}

/// The best split found for a partition.
#[derive(Debug, Clone)]
pub(crate) struct SplitCandidate<'a> {
    pub(crate) feature: FeatureIndex,
    pub(crate) threshold: f64,
    pub(crate) impurity: Impurity,
    pub(crate) left: Vec<&'a Record>,
    pub(crate) right: Vec<&'a Record>,
}

impl SplitCandidate<'_> {
    /// `true` when every row fell on the same side of the threshold.
    pub(crate) fn is_degenerate(&self) -> bool {
        self.left.is_empty() || self.right.is_empty()
    }
}

/// Draw `n_features` distinct column indices out of `n_columns`, in draw order.
///
/// Partial Fisher-Yates: only the first `n_features` positions are shuffled.
pub(crate) fn sample_features(
    n_columns: usize,
    n_features: usize,
    rng: &mut impl Rng,
) -> Vec<FeatureIndex> {
    let mut order: Vec<usize> = (0..n_columns).collect();
    let take = n_features.min(n_columns);
    for i in 0..take {
        let j = rng.gen_range(i..n_columns);
        order.swap(i, j);
    }
    order[..take].iter().copied().map(FeatureIndex::new).collect()
}

/// Find the lowest-impurity split among `n_features` randomly sampled columns.
///
/// Every observed value of a sampled feature is tried as a threshold. Ties
/// keep the first candidate encountered: features in sampling order, then
/// rows in partition order. Returns `None` only for an empty partition.
///
/// The best candidate may be degenerate (one group empty); callers decide
/// what to do with it.
pub(crate) fn find_best_split<'a>(
    rows: &[&'a Record],
    n_columns: usize,
    n_features: usize,
    n_classes: usize,
    rng: &mut impl Rng,
) -> Option<SplitCandidate<'a>> {
    if rows.is_empty() {
        return None;
    }

    let features = sample_features(n_columns, n_features, rng);
    let total_counts = class_counts(rows, n_classes);
    let n_rows = rows.len();

    let mut best: Option<(FeatureIndex, f64, f64)> = None;
    let mut left_counts = vec![0usize; n_classes];
    let mut right_counts = vec![0usize; n_classes];

    for &feature in &features {
        for candidate in rows {
            let threshold = candidate.value(feature);

            left_counts.iter_mut().for_each(|c| *c = 0);
            let mut n_left = 0usize;
            for row in rows {
                if row.value(feature) < threshold {
                    left_counts[row.label()] += 1;
                    n_left += 1;
                }
            }
            for (right, (&total, &left)) in right_counts
                .iter_mut()
                .zip(total_counts.iter().zip(&left_counts))
            {
                *right = total - left;
            }

            let score = group_gini(&left_counts, n_left)
                + group_gini(&right_counts, n_rows - n_left);
            if best.is_none_or(|(_, _, best_score)| score < best_score) {
                best = Some((feature, threshold, score));
            }
        }
    }

    let (feature, threshold, score) = best?;
    let (left, right) = test_split(feature, threshold, rows);
    Some(SplitCandidate {
        feature,
        threshold,
        impurity: Impurity::new(score),
        left,
        right,
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::dataset::Dataset;

    fn dataset(features: Vec<Vec<f64>>, labels: Vec<usize>) -> Dataset {
        Dataset::new(features, labels).unwrap()
    }

    #[test]
    fn pure_groups_score_zero() {
        let ds = dataset(vec![vec![1.0], vec![2.0], vec![3.0]], vec![1, 1, 1]);
        let rows = ds.rows();
        let imp = gini_index([&rows[..1], &rows[1..]], ds.n_classes());
        assert_eq!(imp.value(), 0.0);
    }

    #[test]
    fn balanced_binary_group_scores_half() {
        let ds = dataset(vec![vec![0.0]; 4], vec![0, 1, 0, 1]);
        let rows = ds.rows();
        let imp = gini_index([&rows[..], &[]], ds.n_classes());
        assert!((imp.value() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn gini_is_unweighted_sum_over_groups() {
        // left: [0, 1] -> 0.5, right: [0, 0, 1] -> 2 * (2/3 * 1/3) = 4/9
        let ds = dataset(vec![vec![0.0]; 5], vec![0, 1, 0, 0, 1]);
        let rows = ds.rows();
        let imp = gini_index([&rows[..2], &rows[2..]], ds.n_classes());
        assert!((imp.value() - (0.5 + 4.0 / 9.0)).abs() < 1e-12);
    }

    #[test]
    fn test_split_sends_smaller_values_left() {
        let ds = dataset(
            vec![vec![3.0], vec![1.0], vec![2.0], vec![5.0]],
            vec![0, 0, 1, 1],
        );
        let (left, right) = test_split(FeatureIndex::new(0), 3.0, &ds.rows());
        let left_vals: Vec<f64> = left.iter().map(|r| r.features()[0]).collect();
        let right_vals: Vec<f64> = right.iter().map(|r| r.features()[0]).collect();
        assert_eq!(left_vals, vec![1.0, 2.0]);
        assert_eq!(right_vals, vec![3.0, 5.0]);
    }

    #[test]
    fn sampled_features_are_distinct() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..50 {
            let mut feats: Vec<usize> = sample_features(10, 4, &mut rng)
                .into_iter()
                .map(FeatureIndex::index)
                .collect();
            assert_eq!(feats.len(), 4);
            feats.sort_unstable();
            feats.dedup();
            assert_eq!(feats.len(), 4);
            assert!(feats.iter().all(|&f| f < 10));
        }
    }

    #[test]
    fn separable_data_finds_correct_split() {
        let ds = dataset(
            vec![
                vec![1.0],
                vec![2.0],
                vec![3.0],
                vec![10.0],
                vec![11.0],
                vec![12.0],
            ],
            vec![0, 0, 0, 1, 1, 1],
        );
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let split = find_best_split(&ds.rows(), 1, 1, 2, &mut rng).expect("should find a split");
        assert_eq!(split.feature.index(), 0);
        assert_eq!(split.threshold, 10.0);
        assert_eq!(split.impurity.value(), 0.0);
        assert_eq!(split.left.len(), 3);
        assert_eq!(split.right.len(), 3);
    }

    #[test]
    fn first_candidate_wins_ties() {
        // Thresholds 2.0 and 4.0 both score 4/9; the earlier row wins.
        let ds = dataset(
            vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]],
            vec![0, 1, 1, 0],
        );
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let split = find_best_split(&ds.rows(), 1, 1, 2, &mut rng).unwrap();
        assert_eq!(split.threshold, 2.0);
        assert!((split.impurity.value() - 4.0 / 9.0).abs() < 1e-12);

        let ds = dataset(
            vec![vec![4.0], vec![3.0], vec![2.0], vec![1.0]],
            vec![0, 1, 1, 0],
        );
        let split = find_best_split(&ds.rows(), 1, 1, 2, &mut rng).unwrap();
        assert_eq!(split.threshold, 4.0);

        let ds = dataset(vec![vec![5.0], vec![5.0]], vec![0, 1]);
        let split = find_best_split(&ds.rows(), 1, 1, 2, &mut rng).unwrap();
        assert_eq!(split.threshold, 5.0);
        assert!(split.is_degenerate());
    }

    #[test]
    fn constant_feature_is_degenerate() {
        let ds = dataset(vec![vec![5.0]; 4], vec![0, 0, 1, 1]);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let split = find_best_split(&ds.rows(), 1, 1, 2, &mut rng).unwrap();
        assert!(split.left.is_empty());
        assert_eq!(split.right.len(), 4);
        assert!(split.is_degenerate());
    }

    #[test]
    fn empty_partition_returns_none() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        assert!(find_best_split(&[], 3, 2, 2, &mut rng).is_none());
    }

    #[test]
    fn same_seed_same_split() {
        let features: Vec<Vec<f64>> = (0..30)
            .map(|i| vec![i as f64, (i * 7 % 11) as f64, (i * 3 % 5) as f64])
            .collect();
        let labels: Vec<usize> = (0..30).map(|i| usize::from(i % 3 == 0)).collect();
        let ds = dataset(features, labels);
        let a = find_best_split(&ds.rows(), 3, 2, 2, &mut ChaCha8Rng::seed_from_u64(9)).unwrap();
        let b = find_best_split(&ds.rows(), 3, 2, 2, &mut ChaCha8Rng::seed_from_u64(9)).unwrap();
        assert_eq!(a.feature, b.feature);
        assert_eq!(a.threshold, b.threshold);
        assert_eq!(a.left.len(), b.left.len());
    }

    mod properties {
        use proptest::prelude::*;
        use rand::SeedableRng;
        use rand_chacha::ChaCha8Rng;

        use super::super::*;
        use crate::dataset::Dataset;

        fn table() -> impl Strategy<Value = (Vec<Vec<f64>>, Vec<usize>)> {
            (1usize..4, 1usize..25).prop_flat_map(|(n_cols, n_rows)| {
                (
                    proptest::collection::vec(
                        proptest::collection::vec(-5.0f64..5.0, n_cols),
                        n_rows,
                    ),
                    proptest::collection::vec(0usize..3, n_rows),
                )
            })
        }

        proptest! {
            #[test]
            fn split_groups_are_disjoint_and_cover_partition(
                (features, labels) in table(),
                seed in any::<u64>(),
            ) {
                let ds = Dataset::new(features, labels).unwrap();
                let rows = ds.rows();
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let split = find_best_split(
                    &rows, ds.n_features(), ds.n_features(), ds.n_classes(), &mut rng,
                ).unwrap();
                prop_assert_eq!(split.left.len() + split.right.len(), rows.len());
                for row in &split.left {
                    prop_assert!(row.value(split.feature) < split.threshold);
                }
                for row in &split.right {
                    prop_assert!(row.value(split.feature) >= split.threshold);
                }
            }

            #[test]
            fn single_class_partition_scores_zero(
                (features, _labels) in table(),
                label in 0usize..3,
                threshold in -5.0f64..5.0,
            ) {
                let labels = vec![label; features.len()];
                let ds = Dataset::new(features, labels).unwrap();
                let rows = ds.rows();
                let (left, right) = test_split(FeatureIndex::new(0), threshold, &rows);
                prop_assert_eq!(gini_index([&left[..], &right[..]], ds.n_classes()).value(), 0.0);
            }
        }
    }
}
