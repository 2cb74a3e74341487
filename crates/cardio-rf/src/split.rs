use rand::Rng;

use crate::node::{FeatureIndex, Impurity};

/// Criterion for measuring the quality of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitCriterion {
    /// Gini impurity: 1 - Σ(p_i²)
    Gini,
    /// Information entropy: -Σ(p_i · ln(p_i))
    Entropy,
}

impl SplitCriterion {
    /// Compute the impurity of a node from its class counts.
    ///
    /// An empty node is treated as pure.
    #[must_use]
    pub fn impurity(&self, class_counts: &[usize], n_samples: usize) -> Impurity {
        if n_samples == 0 {
            return Impurity::new(0.0);
        }
        let n = n_samples as f64;
        let value = match self {
            SplitCriterion::Gini => {
                let sum_sq: f64 = class_counts
                    .iter()
                    .map(|&c| {
                        let p = c as f64 / n;
                        p * p
                    })
                    .sum();
                1.0 - sum_sq
            }
            SplitCriterion::Entropy => -class_counts
                .iter()
                .filter(|&&c| c > 0)
                .map(|&c| {
                    let p = c as f64 / n;
                    p * p.ln()
                })
                .sum::<f64>(),
        };
        Impurity::new(value)
    }
}

/// Best split found for a node.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    pub(crate) feature: FeatureIndex,
    pub(crate) threshold: f64,
    /// `n * parent - n_left * left - n_right * right`.
    pub(crate) impurity_decrease: f64,
    pub(crate) left_indices: Vec<usize>,
    pub(crate) right_indices: Vec<usize>,
}

/// Find the best exact split among `max_features` randomly drawn features.
///
/// Features that are constant over the node are skipped without counting
/// against `max_features`.
///
/// `features` is column-major: `features[feature_idx][sample_idx]`, and
/// `sample_indices` select the samples that reached the node. For each
/// drawn feature the node's samples are sorted by value and scanned once,
/// moving one sample at a time from the right child to the left child.
/// Candidate thresholds sit halfway between consecutive distinct values.
///
/// Returns `None` when every feature is constant over the node or no
/// boundary satisfies `min_samples_leaf`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn find_best_split(
    features: &[Vec<f64>],
    labels: &[usize],
    sample_indices: &[usize],
    n_classes: usize,
    criterion: SplitCriterion,
    max_features: usize,
    min_samples_leaf: usize,
    rng: &mut impl Rng,
) -> Option<SplitResult> {
    let n_features = features.len();
    let n_samples = sample_indices.len();
    if n_samples < 2 || n_features == 0 {
        return None;
    }

    let mut parent_counts = vec![0usize; n_classes];
    for &si in sample_indices {
        parent_counts[labels[si]] += 1;
    }
    let parent_impurity = criterion.impurity(&parent_counts, n_samples).value();

    let mut feature_order: Vec<usize> = (0..n_features).collect();
    let mut best_decrease = f64::NEG_INFINITY;
    let mut best: Option<(usize, f64)> = None;
    let mut sorted: Vec<(f64, usize)> = Vec::with_capacity(n_samples);
    let mut n_visited = 0usize;

    // Lazy Fisher-Yates: features constant over this node do not count
    // towards max_features, so drawing continues past them.
    for i in 0..n_features {
        if n_visited >= max_features {
            break;
        }
        let j = rng.gen_range(i..n_features);
        feature_order.swap(i, j);
        let feat_idx = feature_order[i];

        let column = &features[feat_idx];
        sorted.clear();
        sorted.extend(sample_indices.iter().map(|&si| (column[si], labels[si])));
        sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));
        if sorted[0].0 == sorted[n_samples - 1].0 {
            continue;
        }
        n_visited += 1;

        let mut left_counts = vec![0usize; n_classes];
        let mut right_counts = parent_counts.clone();

        for k in 0..n_samples - 1 {
            let (value, class) = sorted[k];
            left_counts[class] += 1;
            right_counts[class] -= 1;

            let next_value = sorted[k + 1].0;
            if value == next_value {
                continue;
            }

            let n_left = k + 1;
            let n_right = n_samples - n_left;
            if n_left < min_samples_leaf || n_right < min_samples_leaf {
                continue;
            }

            let decrease = n_samples as f64 * parent_impurity
                - n_left as f64 * criterion.impurity(&left_counts, n_left).value()
                - n_right as f64 * criterion.impurity(&right_counts, n_right).value();

            if decrease > best_decrease {
                best_decrease = decrease;
                // Adjacent floats round the midpoint up to next_value.
                let mut threshold = value + (next_value - value) / 2.0;
                if threshold >= next_value || !threshold.is_finite() {
                    threshold = value;
                }
                best = Some((feat_idx, threshold));
            }
        }
    }

    let (feat_idx, threshold) = best?;
    let column = &features[feat_idx];
    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = sample_indices
        .iter()
        .partition(|&&si| column[si] <= threshold);

    Some(SplitResult {
        feature: FeatureIndex::new(feat_idx),
        threshold,
        impurity_decrease: best_decrease,
        left_indices,
        right_indices,
    })
}
