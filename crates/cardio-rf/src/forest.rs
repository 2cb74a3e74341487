//! Random forest training with parallel tree construction.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::RandomForestConfig;
use crate::error::RfError;
use crate::importance::aggregate_importances;
use crate::result::{RandomForestResult, TrainingMetadata};
use crate::tree::{DecisionTree, DecisionTreeConfig};
use crate::validate::validate_training_data;

/// A fitted random forest ensemble.
#[derive(Debug, Clone)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) n_classes: usize,
    pub(crate) feature_names: Vec<String>,
}

/// Draw `draw_count` sample indices with replacement.
fn bootstrap_sample(n_samples: usize, draw_count: usize, rng: &mut impl Rng) -> Vec<usize> {
    (0..draw_count).map(|_| rng.gen_range(0..n_samples)).collect()
}

#[instrument(skip_all, fields(n_trees = config.n_trees, n_samples = features.len()))]
pub(crate) fn train(
    config: &RandomForestConfig,
    features: &[Vec<f64>],
    labels: &[usize],
    feature_names: &[String],
) -> Result<RandomForestResult, RfError> {
    let n_features = validate_training_data(features, labels)?;
    let n_samples = features.len();
    if feature_names.len() != n_features {
        return Err(RfError::FeatureNameCountMismatch {
            n_features,
            n_names: feature_names.len(),
        });
    }

    let max_features = config.max_features.resolve(n_features)?;
    if !(config.bootstrap_fraction > 0.0 && config.bootstrap_fraction <= 1.0) {
        return Err(RfError::InvalidBootstrapFraction {
            fraction: config.bootstrap_fraction,
        });
    }

    let tree_template = DecisionTreeConfig::new()
        .with_criterion(config.criterion)
        .with_max_depth(config.max_depth)
        .with_min_samples_split(config.min_samples_split)
        .with_min_samples_leaf(config.min_samples_leaf)
        .with_max_features(Some(max_features));
    tree_template.validate(n_features)?;

    let n_classes = labels.iter().max().copied().unwrap_or(0) + 1;
    let draw_count = ((n_samples as f64) * config.bootstrap_fraction).ceil() as usize;

    info!(
        n_trees = config.n_trees,
        n_samples,
        n_features,
        n_classes,
        max_features,
        draw_count,
        "training random forest"
    );

    // Seeds are drawn up front so results do not depend on thread scheduling.
    let mut master_rng = ChaCha8Rng::seed_from_u64(config.seed);
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| master_rng.r#gen()).collect();

    let trees: Vec<DecisionTree> = tree_seeds
        .into_par_iter()
        .map(|seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let drawn = bootstrap_sample(n_samples, draw_count, &mut rng);
            let boot_features: Vec<Vec<f64>> = drawn.iter().map(|&i| features[i].clone()).collect();
            let boot_labels: Vec<usize> = drawn.iter().map(|&i| labels[i]).collect();

            tree_template
                .clone()
                .with_seed(rng.r#gen())
                .grow(&boot_features, &boot_labels, n_classes, max_features)
        })
        .collect();

    debug!(n_trees_trained = trees.len(), "tree training complete");

    let per_tree: Vec<Vec<f64>> = trees.iter().map(DecisionTree::feature_importances).collect();
    let importances = aggregate_importances(&per_tree, feature_names);

    let forest = RandomForest {
        trees,
        n_features,
        n_classes,
        feature_names: feature_names.to_vec(),
    };

    let metadata = TrainingMetadata {
        n_trees: config.n_trees,
        n_features,
        n_classes,
        n_samples,
        max_features_resolved: max_features,
        bootstrap_draws: draw_count,
        criterion: config.criterion,
        max_depth: config.max_depth,
        seed: config.seed,
    };

    info!(
        mean_depth = forest.mean_depth(),
        "random forest training complete"
    );

    Ok(RandomForestResult::new(forest, importances, metadata))
}

impl RandomForest {
    /// Mean depth across trees.
    #[must_use]
    pub fn mean_depth(&self) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.trees.iter().map(DecisionTree::depth).sum::<usize>() as f64 / self.trees.len() as f64
    }

    /// Borrow the individual trees.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{MaxFeatures, RandomForestConfig};
    use crate::split::SplitCriterion;

    /// Two noisy clinical-looking groups separated on the first feature.
    fn make_two_class() -> (Vec<Vec<f64>>, Vec<usize>, Vec<String>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for i in 0..25 {
            let jitter = (i % 5) as f64 * 0.1;
            features.push(vec![-1.5 + jitter, (i % 3) as f64, 0.2]);
            labels.push(0);
            features.push(vec![1.5 - jitter, (i % 3) as f64, 0.2]);
            labels.push(1);
        }
        let names = vec!["thalach".into(), "cp".into(), "fbs".into()];
        (features, labels, names)
    }

    #[test]
    fn fits_separable_data() {
        let (features, labels, names) = make_two_class();
        let result = RandomForestConfig::new(30)
            .unwrap()
            .with_max_features(MaxFeatures::All)
            .fit(&features, &labels, &names)
            .unwrap();
        let predictions = result.forest().predict_batch(&features).unwrap();
        assert_eq!(predictions, labels);
        assert_eq!(result.forest().n_trees(), 30);
        assert_eq!(result.metadata().max_features_resolved, 3);
        assert_eq!(result.metadata().bootstrap_draws, 50);
        assert_eq!(result.metadata().seed, 42);
    }

    #[test]
    fn importances_rank_the_separating_feature_first() {
        let (features, labels, names) = make_two_class();
        let result = RandomForestConfig::new(40).unwrap().fit(&features, &labels, &names).unwrap();
        let total: f64 = result.importances().iter().map(|f| f.importance).sum();
        assert!((total - 1.0).abs() < 1e-10, "total = {total}");
        assert_eq!(result.importances()[0].name, "thalach");
        assert_eq!(result.importances()[0].rank, 1);
        assert_eq!(result.top_features(1), ["thalach"]);
        assert_eq!(result.top_features(10).len(), 3);
    }

    #[test]
    fn same_seed_same_forest() {
        let (features, labels, names) = make_two_class();
        let cfg = RandomForestConfig::new(15)
            .unwrap()
            .with_criterion(SplitCriterion::Entropy)
            .with_seed(7);
        let a = cfg.fit(&features, &labels, &names).unwrap();
        let b = cfg.fit(&features, &labels, &names).unwrap();
        let queries = vec![vec![0.1, 1.0, 0.2], vec![-0.1, 2.0, 0.2]];
        let pa = a.forest().predict_proba_batch(&queries).unwrap();
        let pb = b.forest().predict_proba_batch(&queries).unwrap();
        for (x, y) in pa.iter().zip(&pb) {
            assert_eq!(x.as_slice(), y.as_slice());
        }
    }

    #[test]
    fn every_tree_covers_all_classes() {
        let (features, labels, names) = make_two_class();
        let result = RandomForestConfig::new(10)
            .unwrap()
            .with_bootstrap_fraction(0.1)
            .fit(&features, &labels, &names)
            .unwrap();
        assert!(result.forest().trees().iter().all(|t| t.n_classes() == 2));
    }

    #[test]
    fn invalid_configs() {
        let (features, labels, names) = make_two_class();
        let err = RandomForestConfig::new(5)
            .unwrap()
            .with_bootstrap_fraction(1.5)
            .fit(&features, &labels, &names)
            .unwrap_err();
        assert!(matches!(err, crate::RfError::InvalidBootstrapFraction { .. }));

        let err = RandomForestConfig::new(5)
            .unwrap()
            .with_bootstrap_fraction(f64::NAN)
            .fit(&features, &labels, &names)
            .unwrap_err();
        assert!(matches!(err, crate::RfError::InvalidBootstrapFraction { .. }));

        let err = RandomForestConfig::new(5)
            .unwrap()
            .fit(&features, &labels, &names[..1])
            .unwrap_err();
        assert!(matches!(
            err,
            crate::RfError::FeatureNameCountMismatch { n_features: 3, n_names: 1 }
        ));

        let err = RandomForestConfig::new(5)
            .unwrap()
            .with_min_samples_leaf(0)
            .fit(&features, &labels, &names)
            .unwrap_err();
        assert!(matches!(err, crate::RfError::InvalidMinSamplesLeaf { .. }));

        let err = RandomForestConfig::new(5).unwrap().fit(&[], &[], &[]).unwrap_err();
        assert!(matches!(err, crate::RfError::EmptyDataset));
    }
}
