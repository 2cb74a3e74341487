//! Per-feature standardization to zero mean and unit variance.

use tracing::{debug, instrument, warn};

use crate::FrameError;
use crate::domain::FeatureTable;

/// Fitted per-feature means and scales.
///
/// Uses population standard deviation (divides by n, not n-1). A feature
/// whose variance is indistinguishable from zero gets scale 1.0, so it
/// transforms to (near) zero instead of dividing by zero.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

/// Variance at or below float noise for a column of `n` values around `mean`.
fn is_constant(variance: f64, mean: f64, n: f64) -> bool {
    let eps = f64::EPSILON;
    variance <= n * eps * variance + (n * mean * eps).powi(2)
}

impl StandardScaler {
    /// Learn means and scales from feature rows.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FrameError::EmptyTable`] | `features` is empty |
    /// | [`FrameError::FeatureCountMismatch`] | Rows differ in length |
    #[instrument(skip_all, fields(n_rows = features.len()))]
    pub fn fit(features: &[Vec<f64>]) -> Result<Self, FrameError> {
        let first = features.first().ok_or(FrameError::EmptyTable)?;
        let n_features = first.len();
        check_widths(features, n_features)?;

        let n = features.len() as f64;
        let mut means = vec![0.0; n_features];
        for row in features {
            for (m, &x) in means.iter_mut().zip(row) {
                *m += x;
            }
        }
        means.iter_mut().for_each(|m| *m /= n);

        let mut variances = vec![0.0; n_features];
        for row in features {
            for ((v, &m), &x) in variances.iter_mut().zip(&means).zip(row) {
                *v += (x - m).powi(2);
            }
        }

        let scales = variances
            .iter()
            .zip(&means)
            .enumerate()
            .map(|(j, (&sum_sq, &mean))| {
                let variance = sum_sq / n;
                if is_constant(variance, mean, n) {
                    warn!(feature = j, mean, "constant feature left unscaled");
                    1.0
                } else {
                    variance.sqrt()
                }
            })
            .collect();

        debug!(n_features, "scaler fitted");
        Ok(Self { means, scales })
    }

    /// Apply `(x - mean) / scale` to every row.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::FeatureCountMismatch`] if a row's width differs
    /// from the fitted feature count.
    pub fn transform(&self, features: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, FrameError> {
        check_widths(features, self.means.len())?;
        Ok(features
            .iter()
            .map(|row| {
                row.iter()
                    .zip(&self.means)
                    .zip(&self.scales)
                    .map(|((&x, &m), &s)| (x - m) / s)
                    .collect()
            })
            .collect())
    }

    /// Fit on the table's features and return the scaled table.
    ///
    /// The target column is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::EmptyTable`] if the table has no rows.
    #[instrument(skip_all, fields(n_rows = table.n_rows(), n_features = table.n_features()))]
    pub fn fit_transform(table: &FeatureTable) -> Result<(Self, FeatureTable), FrameError> {
        let scaler = Self::fit(table.features())?;
        let scaled = scaler.transform(table.features())?;
        Ok((scaler, table.with_features(scaled)))
    }

    /// Fitted per-feature means.
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Fitted per-feature scales (population std, or 1.0 for constant features).
    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Number of features the scaler was fitted on.
    pub fn n_features(&self) -> usize {
        self.means.len()
    }
}

fn check_widths(features: &[Vec<f64>], expected: usize) -> Result<(), FrameError> {
    match features.iter().position(|row| row.len() != expected) {
        Some(row_index) => Err(FrameError::FeatureCountMismatch {
            expected,
            got: features[row_index].len(),
            row_index,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> FeatureTable {
        FeatureTable::new(
            vec!["age".into(), "fbs".into(), "chol".into()],
            vec![
                vec![40.0, 1.0, 200.0],
                vec![50.0, 1.0, 240.0],
                vec![60.0, 1.0, 280.0],
                vec![70.0, 1.0, 320.0],
            ],
            "target".into(),
            vec![0.0, 1.0, 1.0, 0.0],
        )
    }

    #[test]
    fn zero_mean_unit_population_variance() {
        let (scaler, scaled) = StandardScaler::fit_transform(&table()).unwrap();
        assert!((scaler.means()[0] - 55.0).abs() < 1e-12);
        // population std of 40,50,60,70 is sqrt(125)
        assert!((scaler.scales()[0] - 125.0_f64.sqrt()).abs() < 1e-12);

        for j in [0, 2] {
            let col: Vec<f64> = scaled.features().iter().map(|r| r[j]).collect();
            let mean = col.iter().sum::<f64>() / 4.0;
            let var = col.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / 4.0;
            assert!(mean.abs() < 1e-12);
            assert!((var - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn constant_feature_becomes_zeros() {
        let (scaler, scaled) = StandardScaler::fit_transform(&table()).unwrap();
        assert_eq!(scaler.scales()[1], 1.0);
        assert!(scaled.features().iter().all(|r| r[1] == 0.0));
    }

    #[test]
    fn nearly_constant_float_column_is_constant() {
        let rows: Vec<Vec<f64>> = (0..10).map(|_| vec![0.1]).collect();
        let scaler = StandardScaler::fit(&rows).unwrap();
        assert_eq!(scaler.scales(), [1.0]);
    }

    #[test]
    fn target_is_untouched() {
        let (_, scaled) = StandardScaler::fit_transform(&table()).unwrap();
        assert_eq!(scaled.target(), [0.0, 1.0, 1.0, 0.0]);
        assert_eq!(scaled.feature_names(), table().feature_names());
    }

    #[test]
    fn errors() {
        assert!(matches!(StandardScaler::fit(&[]), Err(FrameError::EmptyTable)));
        let scaler = StandardScaler::fit(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert!(matches!(
            scaler.transform(&[vec![1.0]]),
            Err(FrameError::FeatureCountMismatch { expected: 2, got: 1, row_index: 0 })
        ));
    }
}
