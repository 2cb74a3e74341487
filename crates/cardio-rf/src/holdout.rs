//! Shuffled train/test holdout split.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::error::RfError;

/// Holdout split configuration.
///
/// Construct via [`TrainTestSplit::new`], then chain `with_seed` if desired.
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    test_fraction: f64,
    seed: u64,
}

/// The two sides of a holdout split.
#[derive(Debug, Clone)]
pub struct Holdout {
    /// Training feature rows.
    pub train_features: Vec<Vec<f64>>,
    /// Training labels, aligned with `train_features`.
    pub train_labels: Vec<usize>,
    /// Test feature rows.
    pub test_features: Vec<Vec<f64>>,
    /// Test labels, aligned with `test_features`.
    pub test_labels: Vec<usize>,
}

impl Default for TrainTestSplit {
    fn default() -> Self {
        Self {
            test_fraction: 0.3,
            seed: 42,
        }
    }
}

impl TrainTestSplit {
    /// Create a split that holds out `test_fraction` of the samples.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidTestFraction`] unless `test_fraction` lies
    /// strictly between 0 and 1.
    pub fn new(test_fraction: f64) -> Result<Self, RfError> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(RfError::InvalidTestFraction {
                fraction: test_fraction,
            });
        }
        Ok(Self {
            test_fraction,
            ..Self::default()
        })
    }

    /// Set the seed of the shuffling permutation.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the held-out fraction.
    #[must_use]
    pub fn test_fraction(&self) -> f64 {
        self.test_fraction
    }

    /// Return the shuffle seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Sizes `(n_train, n_test)` for `n_samples` samples.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::TooFewSamplesForSplit`] if either side would be
    /// empty.
    pub fn sizes(&self, n_samples: usize) -> Result<(usize, usize), RfError> {
        let n_test = ((n_samples as f64) * self.test_fraction).ceil() as usize;
        let n_train = n_samples.saturating_sub(n_test);
        if n_test == 0 || n_train == 0 {
            return Err(RfError::TooFewSamplesForSplit {
                n_samples,
                fraction: self.test_fraction,
                n_train,
                n_test,
            });
        }
        Ok((n_train, n_test))
    }

    /// Shuffle the samples and slice off the test side.
    ///
    /// The first `n_test` entries of a seeded permutation form the test
    /// side; the rest train. Class proportions are not preserved.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::LabelCountMismatch`] | `features` and `labels` differ in length |
    /// | [`RfError::TooFewSamplesForSplit`] | Either side would be empty |
    #[instrument(skip_all, fields(n_samples = features.len(), test_fraction = self.test_fraction))]
    pub fn split(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<Holdout, RfError> {
        if features.len() != labels.len() {
            return Err(RfError::LabelCountMismatch {
                n_samples: features.len(),
                n_labels: labels.len(),
            });
        }
        let (n_train, n_test) = self.sizes(features.len())?;

        let mut order: Vec<usize> = (0..features.len()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        order.shuffle(&mut rng);

        let (test_idx, train_idx) = order.split_at(n_test);
        let pick_rows = |idx: &[usize]| idx.iter().map(|&i| features[i].clone()).collect();
        let pick_labels = |idx: &[usize]| idx.iter().map(|&i| labels[i]).collect();

        debug!(n_train, n_test, "holdout split");

        Ok(Holdout {
            train_features: pick_rows(train_idx),
            train_labels: pick_labels(train_idx),
            test_features: pick_rows(test_idx),
            test_labels: pick_labels(test_idx),
        })
    }
}
