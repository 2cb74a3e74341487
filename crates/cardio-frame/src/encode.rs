//! Drop-first one-hot encoding of categorical columns.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, instrument};

use crate::FrameError;
use crate::domain::{Column, ColumnValues, FeatureTable, Table, require_present};

/// Encode a cleaned table into a numeric [`FeatureTable`].
///
/// Numeric columns pass through in table order. Each categorical column
/// becomes one `{column}_{category}` indicator per distinct category except
/// the first in sorted order; indicators follow the numeric columns. A
/// missing categorical cell encodes as all zeros. `target` is split off as
/// the target vector.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`FrameError::ColumnNotFound`] | `target` is not a column |
/// | [`FrameError::CategoricalTarget`] | The target column is not numeric |
/// | [`FrameError::MissingValue`] | A numeric cell (target included) is missing |
/// | [`FrameError::DuplicateColumn`] | An indicator name repeats another output column |
#[instrument(skip(table), fields(n_rows = table.n_rows(), n_cols = table.n_cols()))]
pub fn encode_one_hot(table: &Table, target: &str) -> Result<FeatureTable, FrameError> {
    let target_cells = table
        .require_column(target)?
        .as_numeric()
        .ok_or_else(|| FrameError::CategoricalTarget {
            column: target.to_string(),
        })?;
    let target_values = require_present(target, target_cells)?;

    let mut names: Vec<String> = Vec::new();
    let mut columns: Vec<Vec<f64>> = Vec::new();
    let mut categorical: Vec<&Column> = Vec::new();

    for column in table.columns().iter().filter(|c| c.name() != target) {
        match column.values() {
            ColumnValues::Numeric(cells) => {
                columns.push(require_present(column.name(), cells)?);
                names.push(column.name().to_string());
            }
            ColumnValues::Categorical(_) => categorical.push(column),
        }
    }

    for column in categorical {
        let ColumnValues::Categorical(cells) = column.values() else {
            continue;
        };
        let categories: BTreeSet<&str> = cells.iter().flatten().map(String::as_str).collect();
        debug!(
            column = column.name(),
            n_categories = categories.len(),
            "one-hot encoding column"
        );
        for category in categories.into_iter().skip(1) {
            names.push(format!("{}_{category}", column.name()));
            columns.push(
                cells
                    .iter()
                    .map(|c| if c.as_deref() == Some(category) { 1.0 } else { 0.0 })
                    .collect(),
            );
        }
    }

    // Indices refer to the written header: features, then the target.
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let header = names.iter().map(String::as_str).chain([target]);
    for (index, name) in header.enumerate() {
        if let Some(&first_index) = seen.get(name) {
            return Err(FrameError::DuplicateColumn {
                column: name.to_string(),
                first_index,
                second_index: index,
            });
        }
        seen.insert(name, index);
    }

    let features = (0..table.n_rows())
        .map(|row| columns.iter().map(|col| col[row]).collect())
        .collect();

    Ok(FeatureTable::new(
        names,
        features,
        target.to_string(),
        target_values,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cat(name: &str, cells: &[Option<&str>]) -> Column {
        Column::new(
            name,
            ColumnValues::Categorical(cells.iter().map(|c| c.map(String::from)).collect()),
        )
    }

    fn num(name: &str, cells: &[Option<f64>]) -> Column {
        Column::new(name, ColumnValues::Numeric(cells.to_vec()))
    }

    #[test]
    fn drop_first_indicators_follow_numeric_columns() {
        let table = Table::new(vec![
            cat("thal", &[Some("reversable"), Some("fixed"), Some("normal"), None]),
            num("age", &[Some(63.0), Some(37.0), Some(41.0), Some(56.0)]),
            num("target", &[Some(1.0), Some(1.0), Some(0.0), Some(0.0)]),
        ])
        .unwrap();
        let ft = encode_one_hot(&table, "target").unwrap();

        assert_eq!(ft.feature_names(), ["age", "thal_normal", "thal_reversable"]);
        assert_eq!(
            ft.features(),
            [
                vec![63.0, 0.0, 1.0],
                vec![37.0, 0.0, 0.0],
                vec![41.0, 1.0, 0.0],
                vec![56.0, 0.0, 0.0],
            ]
        );
        assert_eq!(ft.target(), [1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn single_category_column_vanishes() {
        let table = Table::new(vec![
            cat("country", &[Some("us"), Some("us")]),
            num("target", &[Some(0.0), Some(1.0)]),
        ])
        .unwrap();
        let ft = encode_one_hot(&table, "target").unwrap();
        assert_eq!(ft.n_features(), 0);
        assert_eq!(ft.n_rows(), 2);
    }

    #[test]
    fn target_errors() {
        let table = Table::new(vec![
            num("age", &[Some(1.0)]),
            cat("label", &[Some("sick")]),
            num("target", &[None]),
        ])
        .unwrap();
        assert!(matches!(
            encode_one_hot(&table, "label"),
            Err(FrameError::CategoricalTarget { .. })
        ));
        assert!(matches!(
            encode_one_hot(&table, "target"),
            Err(FrameError::MissingValue { .. })
        ));
        assert!(matches!(
            encode_one_hot(&table, "outcome"),
            Err(FrameError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn indicator_clashing_with_a_column_is_rejected() {
        let table = Table::new(vec![
            cat("cp", &[Some("asymptomatic"), Some("typical")]),
            num("cp_typical", &[Some(1.0), Some(0.0)]),
            num("target", &[Some(0.0), Some(1.0)]),
        ])
        .unwrap();
        let err = encode_one_hot(&table, "target").unwrap_err();
        assert!(matches!(
            err,
            FrameError::DuplicateColumn { ref column, first_index: 0, second_index: 1 }
                if column == "cp_typical"
        ));
    }

    #[test]
    fn uncleaned_numeric_gap_is_rejected() {
        let table = Table::new(vec![
            num("chol", &[Some(233.0), None]),
            num("target", &[Some(0.0), Some(1.0)]),
        ])
        .unwrap();
        let err = encode_one_hot(&table, "target").unwrap_err();
        assert!(matches!(err, FrameError::MissingValue { row_index: 1, .. }));
    }
}
