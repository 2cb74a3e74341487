//! Domain types for cardio-frame.

use std::collections::HashMap;

use serde::Serialize;

use crate::FrameError;

/// Render a float in shortest round-trip form (`1` for 1.0, `0.25` for 0.25).
pub(crate) fn format_value(value: f64) -> String {
    value.to_string()
}

/// Whether a column holds numbers or free-form categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Every present cell is a finite float.
    Numeric,
    /// At least one present cell is not a finite float.
    Categorical,
}

impl std::fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnKind::Numeric => f.write_str("float64"),
            ColumnKind::Categorical => f.write_str("object"),
        }
    }
}

/// Cells of a single column. `None` marks a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    /// Numeric cells.
    Numeric(Vec<Option<f64>>),
    /// Categorical cells.
    Categorical(Vec<Option<String>>),
}

/// A named column of a [`Table`].
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: ColumnValues,
}

impl Column {
    /// Create a column from a name and its cells.
    pub fn new(name: impl Into<String>, values: ColumnValues) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Return the column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the column cells.
    pub fn values(&self) -> &ColumnValues {
        &self.values
    }

    /// Return the column kind.
    pub fn kind(&self) -> ColumnKind {
        match self.values {
            ColumnValues::Numeric(_) => ColumnKind::Numeric,
            ColumnValues::Categorical(_) => ColumnKind::Categorical,
        }
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        match &self.values {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Categorical(v) => v.len(),
        }
    }

    /// Whether the column has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the cell at `row` is missing.
    pub fn is_missing(&self, row: usize) -> bool {
        match &self.values {
            ColumnValues::Numeric(v) => v[row].is_none(),
            ColumnValues::Categorical(v) => v[row].is_none(),
        }
    }

    /// Number of missing cells.
    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|&i| self.is_missing(i)).count()
    }

    /// Numeric cells, or `None` for a categorical column.
    pub fn as_numeric(&self) -> Option<&[Option<f64>]> {
        match &self.values {
            ColumnValues::Numeric(v) => Some(v),
            ColumnValues::Categorical(_) => None,
        }
    }

    /// Present numeric values in row order; empty for a categorical column.
    pub fn present_numeric(&self) -> Vec<f64> {
        self.as_numeric()
            .map(|v| v.iter().flatten().copied().collect())
            .unwrap_or_default()
    }

    /// Render one cell as text, `NaN` for a missing cell.
    pub fn render(&self, row: usize) -> String {
        match &self.values {
            ColumnValues::Numeric(v) => v[row].map_or_else(|| "NaN".to_string(), format_value),
            ColumnValues::Categorical(v) => v[row].clone().unwrap_or_else(|| "NaN".to_string()),
        }
    }

    pub(crate) fn values_mut(&mut self) -> &mut ColumnValues {
        &mut self.values
    }

    /// Keep only rows whose `keep` flag is set.
    pub(crate) fn retain_rows(&mut self, keep: &[bool]) {
        fn retain<T>(cells: &mut Vec<T>, keep: &[bool]) {
            let mut flags = keep.iter();
            cells.retain(|_| flags.next().copied().unwrap_or(false));
        }
        match &mut self.values {
            ColumnValues::Numeric(v) => retain(v, keep),
            ColumnValues::Categorical(v) => retain(v, keep),
        }
    }
}

/// An ordered collection of equal-length named columns.
///
/// Produced by [`CsvTableReader`](crate::CsvTableReader). Column names are
/// unique.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Create a table from columns.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FrameError::DuplicateColumn`] | Two columns share a name |
    /// | [`FrameError::ColumnLengthMismatch`] | Columns differ in length |
    pub fn new(columns: Vec<Column>) -> Result<Self, FrameError> {
        let n_rows = columns.first().map_or(0, Column::len);
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (index, column) in columns.iter().enumerate() {
            if let Some(&first_index) = seen.get(column.name()) {
                return Err(FrameError::DuplicateColumn {
                    column: column.name().to_string(),
                    first_index,
                    second_index: index,
                });
            }
            seen.insert(column.name(), index);
            if column.len() != n_rows {
                return Err(FrameError::ColumnLengthMismatch {
                    column: column.name().to_string(),
                    expected: n_rows,
                    got: column.len(),
                });
            }
        }
        Ok(Self { columns, n_rows })
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Look up a column by name, failing with [`FrameError::ColumnNotFound`].
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::ColumnNotFound`] if no column is called `name`.
    pub fn require_column(&self, name: &str) -> Result<&Column, FrameError> {
        self.column(name).ok_or_else(|| FrameError::ColumnNotFound {
            column: name.to_string(),
        })
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    /// Keep only rows whose `keep` flag is set; returns the number removed.
    pub(crate) fn retain_rows(&mut self, keep: &[bool]) -> usize {
        debug_assert_eq!(keep.len(), self.n_rows);
        for column in &mut self.columns {
            column.retain_rows(keep);
        }
        let kept = keep.iter().filter(|&&k| k).count();
        let removed = self.n_rows - kept;
        self.n_rows = kept;
        removed
    }
}

/// A fully numeric, gap-free feature matrix with its target column.
///
/// Feature order is the source column order with the target removed.
/// `features[i]` and `target[i]` describe the same row.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTable {
    feature_names: Vec<String>,
    features: Vec<Vec<f64>>,
    target_name: String,
    target: Vec<f64>,
}

impl FeatureTable {
    pub(crate) fn new(
        feature_names: Vec<String>,
        features: Vec<Vec<f64>>,
        target_name: String,
        target: Vec<f64>,
    ) -> Self {
        debug_assert_eq!(features.len(), target.len());
        Self {
            feature_names,
            features,
            target_name,
            target,
        }
    }

    /// Convert a cleaned table (for instance a reloaded CSV) into features
    /// and target.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FrameError::ColumnNotFound`] | `target` is not a column |
    /// | [`FrameError::CategoricalTarget`] | The target column is not numeric |
    /// | [`FrameError::CategoricalFeature`] | A feature column is not numeric |
    /// | [`FrameError::MissingValue`] | Any cell is missing |
    pub fn from_table(table: &Table, target: &str) -> Result<Self, FrameError> {
        let target_column = table.require_column(target)?;
        let target_values = target_column
            .as_numeric()
            .ok_or_else(|| FrameError::CategoricalTarget {
                column: target.to_string(),
            })?;
        let target_values = require_present(target, target_values)?;

        let mut feature_names = Vec::with_capacity(table.n_cols().saturating_sub(1));
        let mut feature_columns = Vec::with_capacity(table.n_cols().saturating_sub(1));
        for column in table.columns().iter().filter(|c| c.name() != target) {
            let cells = column
                .as_numeric()
                .ok_or_else(|| FrameError::CategoricalFeature {
                    column: column.name().to_string(),
                })?;
            feature_columns.push(require_present(column.name(), cells)?);
            feature_names.push(column.name().to_string());
        }

        let features = (0..table.n_rows())
            .map(|row| feature_columns.iter().map(|col| col[row]).collect())
            .collect();

        Ok(Self::new(
            feature_names,
            features,
            target.to_string(),
            target_values,
        ))
    }

    /// Feature column names.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Feature rows: `features[row][feature]`.
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Target column name.
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// Target values, row-aligned with [`features`](Self::features).
    pub fn target(&self) -> &[f64] {
        &self.target
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.features.len()
    }

    /// Number of feature columns.
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Return a copy with the feature matrix replaced.
    pub(crate) fn with_features(&self, features: Vec<Vec<f64>>) -> Self {
        Self::new(
            self.feature_names.clone(),
            features,
            self.target_name.clone(),
            self.target.clone(),
        )
    }

    /// Map target values onto zero-based class labels.
    ///
    /// Classes are the distinct target values in ascending order.
    pub fn to_labelled(&self) -> LabelledData {
        let mut classes = self.target.clone();
        classes.sort_by(f64::total_cmp);
        classes.dedup();

        let labels = self
            .target
            .iter()
            .map(|v| classes.partition_point(|c| c < v))
            .collect();

        LabelledData {
            feature_names: self.feature_names.clone(),
            features: self.features.clone(),
            labels,
            class_names: classes.into_iter().map(format_value).collect(),
        }
    }
}

pub(crate) fn require_present(column: &str, cells: &[Option<f64>]) -> Result<Vec<f64>, FrameError> {
    cells
        .iter()
        .enumerate()
        .map(|(row_index, cell)| {
            cell.ok_or_else(|| FrameError::MissingValue {
                column: column.to_string(),
                row_index,
            })
        })
        .collect()
}

/// Features with zero-based class labels, ready for classification.
#[derive(Debug, Clone)]
pub struct LabelledData {
    /// Feature column names.
    pub feature_names: Vec<String>,
    /// Feature rows.
    pub features: Vec<Vec<f64>>,
    /// Class index per row.
    pub labels: Vec<usize>,
    /// Name of each class index, as the target value reads in the CSV.
    pub class_names: Vec<String>,
}

impl LabelledData {
    /// Number of distinct classes.
    pub fn n_classes(&self) -> usize {
        self.class_names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric(name: &str, cells: &[Option<f64>]) -> Column {
        Column::new(name, ColumnValues::Numeric(cells.to_vec()))
    }

    fn categorical(name: &str, cells: &[Option<&str>]) -> Column {
        Column::new(
            name,
            ColumnValues::Categorical(cells.iter().map(|c| c.map(String::from)).collect()),
        )
    }

    #[test]
    fn table_rejects_duplicates_and_ragged_columns() {
        let err = Table::new(vec![numeric("age", &[Some(1.0)]), numeric("age", &[Some(2.0)])])
            .unwrap_err();
        assert!(matches!(
            err,
            FrameError::DuplicateColumn { first_index: 0, second_index: 1, .. }
        ));

        let err = Table::new(vec![numeric("age", &[Some(1.0)]), numeric("chol", &[])]).unwrap_err();
        assert!(matches!(err, FrameError::ColumnLengthMismatch { expected: 1, got: 0, .. }));
    }

    #[test]
    fn retain_rows_keeps_columns_aligned() {
        let mut table = Table::new(vec![
            numeric("age", &[Some(63.0), None, Some(41.0)]),
            categorical("sex", &[Some("m"), Some("f"), None]),
        ])
        .unwrap();
        let removed = table.retain_rows(&[true, false, true]);
        assert_eq!(removed, 1);
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.columns()[0].render(1), "41");
        assert_eq!(table.columns()[1].render(1), "NaN");
    }

    #[test]
    fn from_table_splits_off_the_target() {
        let table = Table::new(vec![
            numeric("target", &[Some(1.0), Some(0.0)]),
            numeric("age", &[Some(63.0), Some(37.0)]),
            numeric("chol", &[Some(233.0), Some(250.0)]),
        ])
        .unwrap();
        let ft = FeatureTable::from_table(&table, "target").unwrap();
        assert_eq!(ft.feature_names(), ["age", "chol"]);
        assert_eq!(ft.features(), [vec![63.0, 233.0], vec![37.0, 250.0]]);
        assert_eq!(ft.target(), [1.0, 0.0]);
        assert_eq!(ft.target_name(), "target");
    }

    #[test]
    fn from_table_is_strict() {
        let gap = Table::new(vec![
            numeric("age", &[Some(1.0), None]),
            numeric("target", &[Some(0.0), Some(1.0)]),
        ])
        .unwrap();
        assert!(matches!(
            FeatureTable::from_table(&gap, "target"),
            Err(FrameError::MissingValue { row_index: 1, .. })
        ));

        let text = Table::new(vec![
            categorical("cp", &[Some("typical")]),
            numeric("target", &[Some(0.0)]),
        ])
        .unwrap();
        assert!(matches!(
            FeatureTable::from_table(&text, "target"),
            Err(FrameError::CategoricalFeature { .. })
        ));

        assert!(matches!(
            FeatureTable::from_table(&text, "outcome"),
            Err(FrameError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn labels_follow_sorted_target_values() {
        let ft = FeatureTable::new(
            vec!["age".into()],
            vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]],
            "target".into(),
            vec![2.0, 0.0, 2.0, 1.5],
        );
        let data = ft.to_labelled();
        assert_eq!(data.class_names, ["0", "1.5", "2"]);
        assert_eq!(data.labels, [2, 0, 2, 1]);
        assert_eq!(data.n_classes(), 3);
    }
}
