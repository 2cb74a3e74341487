//! Missing-value reporting, row dropping, and mean imputation.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::FrameError;
use crate::domain::{ColumnValues, Table};

/// Number of missing cells in one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingCount {
    /// Column name.
    pub column: String,
    /// Missing cells in the column.
    pub missing: usize,
}

/// A numeric column whose gaps were filled with its mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImputedColumn {
    /// Column name.
    pub column: String,
    /// Mean of the present values, used as the fill value.
    pub mean: f64,
    /// Number of cells filled.
    pub filled: usize,
}

impl Table {
    /// Per-column missing-cell counts, in column order.
    pub fn missing_counts(&self) -> Vec<MissingCount> {
        self.columns()
            .iter()
            .map(|c| MissingCount {
                column: c.name().to_string(),
                missing: c.missing_count(),
            })
            .collect()
    }

    /// Drop every row that has a missing cell in any column.
    ///
    /// Returns the number of rows removed.
    pub fn drop_incomplete_rows(&mut self) -> usize {
        let keep: Vec<bool> = (0..self.n_rows())
            .map(|row| self.columns().iter().all(|c| !c.is_missing(row)))
            .collect();
        self.retain_rows(&keep)
    }

    /// Drop every row whose `column` cell is missing.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::ColumnNotFound`] if `column` does not exist.
    pub fn drop_rows_missing(&mut self, column: &str) -> Result<usize, FrameError> {
        let col = self.require_column(column)?;
        let keep: Vec<bool> = (0..self.n_rows()).map(|row| !col.is_missing(row)).collect();
        Ok(self.retain_rows(&keep))
    }

    /// Fill the gaps of each numeric column with the mean of its present
    /// values. Categorical columns are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::NoPresentValues`] if a numeric column with gaps
    /// has no present value.
    pub fn impute_mean(&mut self) -> Result<Vec<ImputedColumn>, FrameError> {
        let mut imputed = Vec::new();
        for column in self.columns_mut() {
            let name = column.name().to_string();
            let ColumnValues::Numeric(cells) = column.values_mut() else {
                continue;
            };
            let filled = cells.iter().filter(|c| c.is_none()).count();
            if filled == 0 {
                continue;
            }
            let present: Vec<f64> = cells.iter().flatten().copied().collect();
            if present.is_empty() {
                return Err(FrameError::NoPresentValues { column: name });
            }
            let mean = present.iter().sum::<f64>() / present.len() as f64;
            for cell in cells.iter_mut().filter(|c| c.is_none()) {
                *cell = Some(mean);
            }
            debug!(column = %name, mean, filled, "imputed column mean");
            imputed.push(ImputedColumn {
                column: name,
                mean,
                filled,
            });
        }
        Ok(imputed)
    }
}

/// Cleaning configuration.
///
/// Construct via [`CleanOptions::new`], then chain `with_drop_incomplete` if
/// desired.
#[derive(Debug, Clone)]
pub struct CleanOptions {
    target: String,
    drop_incomplete: bool,
}

/// What a cleaning pass did to a table.
#[derive(Debug, Clone, Serialize)]
pub struct CleanSummary {
    /// Rows before cleaning.
    pub rows_before: usize,
    /// Rows removed because the target was missing.
    pub rows_missing_target: usize,
    /// Rows removed because some other cell was missing.
    pub rows_incomplete: usize,
    /// Rows after cleaning.
    pub rows_after: usize,
    /// Missing cells per column before cleaning.
    pub missing_before: Vec<MissingCount>,
    /// Numeric columns filled with their mean.
    pub imputed: Vec<ImputedColumn>,
}

impl CleanOptions {
    /// Clean for the given target column, dropping incomplete rows.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            drop_incomplete: true,
        }
    }

    /// Whether rows with any missing cell are dropped before imputation.
    #[must_use]
    pub fn with_drop_incomplete(mut self, drop_incomplete: bool) -> Self {
        self.drop_incomplete = drop_incomplete;
        self
    }

    /// Return the target column name.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Clean `table` in place.
    ///
    /// Rows with a missing target are always dropped. With
    /// `drop_incomplete` every row holding a gap is dropped next. Remaining
    /// numeric gaps are then mean-imputed.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FrameError::ColumnNotFound`] | The target column is absent |
    /// | [`FrameError::AllRowsDropped`] | No row survives |
    /// | [`FrameError::NoPresentValues`] | A numeric column has only gaps |
    #[instrument(skip_all, fields(target = %self.target, drop_incomplete = self.drop_incomplete))]
    pub fn apply(&self, table: &mut Table) -> Result<CleanSummary, FrameError> {
        let rows_before = table.n_rows();
        let missing_before = table.missing_counts();

        let rows_missing_target = table.drop_rows_missing(&self.target)?;
        if rows_missing_target > 0 {
            warn!(rows_missing_target, "dropped rows with a missing target");
        }
        let rows_incomplete = if self.drop_incomplete {
            table.drop_incomplete_rows()
        } else {
            0
        };
        if table.n_rows() == 0 {
            return Err(FrameError::AllRowsDropped { n_rows: rows_before });
        }
        let imputed = table.impute_mean()?;

        info!(
            rows_before,
            rows_after = table.n_rows(),
            rows_incomplete,
            n_imputed = imputed.len(),
            "table cleaned"
        );

        Ok(CleanSummary {
            rows_before,
            rows_missing_target,
            rows_incomplete,
            rows_after: table.n_rows(),
            missing_before,
            imputed,
        })
    }
}

impl fmt::Display for CleanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .missing_before
            .iter()
            .map(|m| m.column.len())
            .max()
            .unwrap_or(0);
        for m in &self.missing_before {
            writeln!(f, "{:<width$}  {:>6}", m.column, m.missing)?;
        }
        write!(
            f,
            "rows: {} -> {} ({} missing target, {} incomplete)",
            self.rows_before, self.rows_after, self.rows_missing_target, self.rows_incomplete
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Column;

    fn table() -> Table {
        Table::new(vec![
            Column::new(
                "age",
                ColumnValues::Numeric(vec![Some(60.0), None, Some(40.0), Some(50.0)]),
            ),
            Column::new(
                "thal",
                ColumnValues::Categorical(vec![
                    Some("normal".into()),
                    Some("fixed".into()),
                    None,
                    Some("normal".into()),
                ]),
            ),
            Column::new(
                "target",
                ColumnValues::Numeric(vec![Some(1.0), Some(0.0), Some(1.0), None]),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn counts_missing_per_column() {
        let counts: Vec<usize> = table().missing_counts().iter().map(|m| m.missing).collect();
        assert_eq!(counts, [1, 1, 1]);
    }

    #[test]
    fn default_drops_every_incomplete_row() {
        let mut t = table();
        let summary = CleanOptions::new("target").apply(&mut t).unwrap();
        assert_eq!(summary.rows_missing_target, 1);
        assert_eq!(summary.rows_incomplete, 2);
        assert_eq!(summary.rows_after, 1);
        assert!(summary.imputed.is_empty());
        assert_eq!(t.column("age").unwrap().as_numeric().unwrap(), [Some(60.0)]);
    }

    #[test]
    fn keep_incomplete_imputes_numeric_means() {
        let mut t = table();
        let summary = CleanOptions::new("target")
            .with_drop_incomplete(false)
            .apply(&mut t)
            .unwrap();
        assert_eq!(summary.rows_after, 3);
        // rows left: age 60, None, 40 -> mean 50
        assert_eq!(summary.imputed.len(), 1);
        assert_eq!(summary.imputed[0].column, "age");
        assert!((summary.imputed[0].mean - 50.0).abs() < 1e-12);
        assert_eq!(
            t.column("age").unwrap().as_numeric().unwrap(),
            [Some(60.0), Some(50.0), Some(40.0)]
        );
        // categorical gaps stay
        assert_eq!(t.column("thal").unwrap().missing_count(), 1);
    }

    #[test]
    fn all_missing_numeric_column_cannot_be_imputed() {
        let mut t = Table::new(vec![
            Column::new("ca", ColumnValues::Numeric(vec![None, None])),
            Column::new("target", ColumnValues::Numeric(vec![Some(0.0), Some(1.0)])),
        ])
        .unwrap();
        let err = CleanOptions::new("target")
            .with_drop_incomplete(false)
            .apply(&mut t)
            .unwrap_err();
        assert!(matches!(err, FrameError::NoPresentValues { .. }));

        let err = CleanOptions::new("target").apply(&mut t).unwrap_err();
        assert!(matches!(err, FrameError::AllRowsDropped { n_rows: 2 }));
    }

    #[test]
    fn unknown_target() {
        let err = CleanOptions::new("outcome").apply(&mut table()).unwrap_err();
        assert!(matches!(err, FrameError::ColumnNotFound { .. }));
    }
}
