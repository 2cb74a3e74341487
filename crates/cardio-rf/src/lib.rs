//! Random forest classification for tabular clinical data.
//!
//! Provides a shuffled holdout split, CART decision trees with Gini or
//! entropy splits, a bootstrap random forest trained in parallel with rayon,
//! mean-decrease-in-impurity feature importances, and a confusion-matrix
//! based classification report.
//!
//! ```no_run
//! use cardio_rf::{ClassificationReport, ConfusionMatrix, RandomForestConfig, TrainTestSplit};
//!
//! # fn demo(features: &[Vec<f64>], labels: &[usize], names: &[String], classes: &[String])
//! #     -> Result<(), cardio_rf::RfError> {
//! let holdout = TrainTestSplit::new(0.3)?.split(features, labels)?;
//! let result = RandomForestConfig::default().fit(
//!     &holdout.train_features,
//!     &holdout.train_labels,
//!     names,
//! )?;
//! let predicted = result.forest().predict_batch(&holdout.test_features)?;
//! let matrix = ConfusionMatrix::from_labels(&holdout.test_labels, &predicted, classes.len())?;
//! println!("{}", ClassificationReport::new(&matrix, classes)?);
//! # Ok(())
//! # }
//! ```

mod config;
mod confusion;
mod error;
mod forest;
mod holdout;
mod importance;
mod node;
mod predict;
mod report;
mod result;
mod split;
mod tree;
mod validate;

pub use config::{MaxFeatures, RandomForestConfig};
pub use confusion::{ClassMetrics, ConfusionMatrix};
pub use error::RfError;
pub use forest::RandomForest;
pub use holdout::{Holdout, TrainTestSplit};
pub use importance::RankedFeature;
pub use node::{FeatureIndex, Impurity, Node, NodeIndex};
pub use predict::ClassDistribution;
pub use report::{ClassificationReport, ReportRow};
pub use result::{RandomForestResult, TrainingMetadata};
pub use split::SplitCriterion;
pub use tree::{DecisionTree, DecisionTreeConfig};
