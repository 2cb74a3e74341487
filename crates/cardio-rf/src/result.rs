use crate::forest::RandomForest;
use crate::importance::RankedFeature;
use crate::split::SplitCriterion;

/// Settings and data shape a forest was fitted with, echoed in JSON output.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TrainingMetadata {
    pub n_trees: usize,
    pub n_samples: usize,
    pub n_features: usize,
    pub n_classes: usize,
    /// Features drawn per split after resolving [`MaxFeatures`](crate::MaxFeatures).
    pub max_features_resolved: usize,
    /// Rows drawn with replacement for each tree.
    pub bootstrap_draws: usize,
    pub criterion: SplitCriterion,
    pub max_depth: Option<usize>,
    pub seed: u64,
}

/// A fitted forest together with its ranked importances.
#[derive(Debug)]
pub struct RandomForestResult {
    forest: RandomForest,
    importances: Vec<RankedFeature>,
    metadata: TrainingMetadata,
}

impl RandomForestResult {
    pub(crate) fn new(
        forest: RandomForest,
        importances: Vec<RankedFeature>,
        metadata: TrainingMetadata,
    ) -> Self {
        Self {
            forest,
            importances,
            metadata,
        }
    }

    #[must_use]
    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    #[must_use]
    pub fn into_forest(self) -> RandomForest {
        self.forest
    }

    /// Importances, most important first.
    #[must_use]
    pub fn importances(&self) -> &[RankedFeature] {
        &self.importances
    }

    /// Names of the `k` most important features.
    #[must_use]
    pub fn top_features(&self, k: usize) -> Vec<&str> {
        self.importances
            .iter()
            .take(k)
            .map(|f| f.name.as_str())
            .collect()
    }

    #[must_use]
    pub fn metadata(&self) -> &TrainingMetadata {
        &self.metadata
    }
}
