//! Descriptive summaries of a table: info, head, describe, correlation,
//! and class counts. Each renders as an aligned text table and serializes
//! to JSON.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::FrameError;
use crate::domain::{Column, ColumnKind, ColumnValues, Table, format_value};

/// Name, non-null count, and kind of one column.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Present cells.
    pub non_null: usize,
    /// Column kind.
    pub kind: ColumnKind,
}

/// Row count and per-column overview.
#[derive(Debug, Clone, Serialize)]
pub struct TableInfo {
    /// Number of rows.
    pub n_rows: usize,
    /// One entry per column, in order.
    pub columns: Vec<ColumnInfo>,
}

/// Count, mean, sample std, min, quartiles, and max of one numeric column.
///
/// Statistics cover present cells only. With no present cell every
/// statistic is NaN; `std` is NaN below two cells.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnStats {
    /// Column name.
    pub name: String,
    /// Present cells.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (n-1).
    pub std: f64,
    /// Minimum.
    pub min: f64,
    /// First quartile.
    #[serde(rename = "25%")]
    pub q25: f64,
    /// Median.
    #[serde(rename = "50%")]
    pub q50: f64,
    /// Third quartile.
    #[serde(rename = "75%")]
    pub q75: f64,
    /// Maximum.
    pub max: f64,
}

/// Statistics for every numeric column.
#[derive(Debug, Clone, Serialize)]
pub struct Description {
    /// One entry per numeric column, in table order.
    pub columns: Vec<ColumnStats>,
}

/// Pairwise Pearson correlation between numeric columns.
///
/// Each pair uses the rows where both cells are present. Pairs with fewer
/// than two such rows or zero variance are NaN.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    /// Numeric column names, in table order.
    pub names: Vec<String>,
    /// `values[i][j]` correlates `names[i]` with `names[j]`.
    pub values: Vec<Vec<f64>>,
}

/// The first rows of a table rendered as text.
#[derive(Debug, Clone, Serialize)]
pub struct Head {
    /// Column names.
    pub columns: Vec<String>,
    /// Rendered cells, `rows[i][j]` for row `i` and column `j`.
    pub rows: Vec<Vec<String>>,
}

/// Rows per distinct value of one column.
#[derive(Debug, Clone, Serialize)]
pub struct ClassCount {
    /// The value as it reads in the CSV.
    pub value: String,
    /// Rows holding the value.
    pub count: usize,
}

/// Distribution of a column's values, ascending by value.
#[derive(Debug, Clone, Serialize)]
pub struct ClassDistribution {
    /// Column name.
    pub column: String,
    /// One entry per distinct present value.
    pub counts: Vec<ClassCount>,
}

impl Table {
    /// Row count and per-column non-null count and kind.
    pub fn info(&self) -> TableInfo {
        TableInfo {
            n_rows: self.n_rows(),
            columns: self
                .columns()
                .iter()
                .map(|c| ColumnInfo {
                    name: c.name().to_string(),
                    non_null: c.len() - c.missing_count(),
                    kind: c.kind(),
                })
                .collect(),
        }
    }

    /// Summary statistics of every numeric column.
    pub fn describe(&self) -> Description {
        Description {
            columns: self
                .columns()
                .iter()
                .filter(|c| c.kind() == ColumnKind::Numeric)
                .map(column_stats)
                .collect(),
        }
    }

    /// Pearson correlation between every pair of numeric columns.
    pub fn correlation_matrix(&self) -> CorrelationMatrix {
        let numeric: Vec<(&str, &[Option<f64>])> = self
            .columns()
            .iter()
            .filter_map(|c| c.as_numeric().map(|cells| (c.name(), cells)))
            .collect();
        let values = numeric
            .iter()
            .map(|(_, a)| numeric.iter().map(|(_, b)| pearson(a, b)).collect())
            .collect();
        CorrelationMatrix {
            names: numeric.iter().map(|(name, _)| name.to_string()).collect(),
            values,
        }
    }

    /// The first `n` rows (fewer if the table is shorter).
    pub fn head(&self, n: usize) -> Head {
        let n = n.min(self.n_rows());
        Head {
            columns: self.column_names().into_iter().map(String::from).collect(),
            rows: (0..n)
                .map(|row| self.columns().iter().map(|c| c.render(row)).collect())
                .collect(),
        }
    }

    /// Rows per distinct present value of `column`.
    ///
    /// Numeric values sort numerically, categories lexicographically.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::ColumnNotFound`] if `column` does not exist.
    pub fn class_distribution(&self, column: &str) -> Result<ClassDistribution, FrameError> {
        let col = self.require_column(column)?;
        let counts = match col.values() {
            ColumnValues::Numeric(_) => {
                let mut values = col.present_numeric();
                values.sort_by(f64::total_cmp);
                let mut counts: Vec<ClassCount> = Vec::new();
                for v in values {
                    let value = format_value(v);
                    match counts.last_mut() {
                        Some(last) if last.value == value => last.count += 1,
                        _ => counts.push(ClassCount { value, count: 1 }),
                    }
                }
                counts
            }
            ColumnValues::Categorical(cells) => {
                let mut tally: BTreeMap<&str, usize> = BTreeMap::new();
                for cell in cells.iter().flatten() {
                    *tally.entry(cell.as_str()).or_default() += 1;
                }
                tally
                    .into_iter()
                    .map(|(value, count)| ClassCount {
                        value: value.to_string(),
                        count,
                    })
                    .collect()
            }
        };
        Ok(ClassDistribution {
            column: column.to_string(),
            counts,
        })
    }
}

fn column_stats(column: &Column) -> ColumnStats {
    let mut values = column.present_numeric();
    values.sort_by(f64::total_cmp);
    let count = values.len();
    let n = count as f64;

    let mean = if count == 0 {
        f64::NAN
    } else {
        values.iter().sum::<f64>() / n
    };
    let std = if count < 2 {
        f64::NAN
    } else {
        (values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
    };

    ColumnStats {
        name: column.name().to_string(),
        count,
        mean,
        std,
        min: quantile(&values, 0.0),
        q25: quantile(&values, 0.25),
        q50: quantile(&values, 0.5),
        q75: quantile(&values, 0.75),
        max: quantile(&values, 1.0),
    }
}

/// Linear-interpolation quantile of sorted values; NaN when empty.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in &pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

/// Write a grid with a left-aligned first column and right-aligned others.
fn write_grid(f: &mut fmt::Formatter<'_>, header: &[String], rows: &[Vec<String>]) -> fmt::Result {
    let widths: Vec<usize> = (0..header.len())
        .map(|j| {
            rows.iter()
                .map(|r| r[j].chars().count())
                .chain([header[j].chars().count()])
                .max()
                .unwrap_or(0)
        })
        .collect();
    for line in std::iter::once(header).chain(rows.iter().map(Vec::as_slice)) {
        let mut cells = line.iter().zip(&widths);
        if let Some((first, &w)) = cells.next() {
            write!(f, "{first:<w$}")?;
        }
        for (cell, &w) in cells {
            write!(f, "  {cell:>w$}")?;
        }
        writeln!(f)?;
    }
    Ok(())
}

impl fmt::Display for TableInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} rows, {} columns", self.n_rows, self.columns.len())?;
        let header = ["#", "Column", "Non-Null Count", "Dtype"].map(String::from);
        let rows: Vec<Vec<String>> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                vec![
                    i.to_string(),
                    c.name.clone(),
                    format!("{} non-null", c.non_null),
                    c.kind.to_string(),
                ]
            })
            .collect();
        write_grid(f, &header, &rows)
    }
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header =
            ["", "count", "mean", "std", "min", "25%", "50%", "75%", "max"].map(String::from);
        let rows: Vec<Vec<String>> = self
            .columns
            .iter()
            .map(|s| {
                let mut row = vec![s.name.clone(), s.count.to_string()];
                row.extend(
                    [s.mean, s.std, s.min, s.q25, s.q50, s.q75, s.max].map(|v| format!("{v:.6}")),
                );
                row
            })
            .collect();
        write_grid(f, &header, &rows)
    }
}

impl fmt::Display for CorrelationMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header: Vec<String> = std::iter::once(String::new())
            .chain(self.names.iter().cloned())
            .collect();
        let rows: Vec<Vec<String>> = self
            .names
            .iter()
            .zip(&self.values)
            .map(|(name, row)| {
                std::iter::once(name.clone())
                    .chain(row.iter().map(|v| format!("{v:.3}")))
                    .collect()
            })
            .collect();
        write_grid(f, &header, &rows)
    }
}

impl fmt::Display for Head {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header: Vec<String> = std::iter::once(String::new())
            .chain(self.columns.iter().cloned())
            .collect();
        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, cells)| std::iter::once(i.to_string()).chain(cells.iter().cloned()).collect())
            .collect();
        write_grid(f, &header, &rows)
    }
}

impl fmt::Display for ClassDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = [self.column.clone(), "count".to_string()];
        let rows: Vec<Vec<String>> = self
            .counts
            .iter()
            .map(|c| vec![c.value.clone(), c.count.to_string()])
            .collect();
        write_grid(f, &header, &rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::new(vec![
            Column::new(
                "age",
                ColumnValues::Numeric(vec![Some(63.0), Some(37.0), Some(41.0), Some(56.0), None]),
            ),
            Column::new(
                "chol",
                ColumnValues::Numeric(vec![
                    Some(233.0),
                    Some(250.0),
                    Some(204.0),
                    Some(236.0),
                    Some(354.0),
                ]),
            ),
            Column::new(
                "thal",
                ColumnValues::Categorical(vec![
                    Some("fixed".into()),
                    Some("normal".into()),
                    Some("normal".into()),
                    None,
                    Some("reversable".into()),
                ]),
            ),
            Column::new(
                "target",
                ColumnValues::Numeric(vec![Some(1.0), Some(1.0), Some(0.0), Some(1.0), Some(0.0)]),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn info_counts_non_null() {
        let info = table().info();
        assert_eq!(info.n_rows, 5);
        let non_null: Vec<usize> = info.columns.iter().map(|c| c.non_null).collect();
        assert_eq!(non_null, [4, 5, 4, 5]);
        assert_eq!(info.columns[2].kind, ColumnKind::Categorical);
        assert!(info.to_string().contains("4 non-null"));
    }

    #[test]
    fn describe_matches_sample_statistics() {
        let d = table().describe();
        assert_eq!(d.columns.len(), 3);
        let age = &d.columns[0];
        assert_eq!(age.count, 4);
        assert!((age.mean - 49.25).abs() < 1e-12);
        // squared deviations sum to 452.75
        let expected_std = (452.75_f64 / 3.0).sqrt();
        assert!((age.std - expected_std).abs() < 1e-12);
        assert_eq!(age.min, 37.0);
        assert!((age.q25 - 40.0).abs() < 1e-12);
        assert!((age.q50 - 48.5).abs() < 1e-12);
        assert!((age.q75 - 57.75).abs() < 1e-12);
        assert_eq!(age.max, 63.0);
    }

    #[test]
    fn describe_of_an_all_missing_column_is_nan() {
        let t = Table::new(vec![Column::new("ca", ColumnValues::Numeric(vec![None]))]).unwrap();
        let stats = &t.describe().columns[0];
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_nan() && stats.std.is_nan() && stats.max.is_nan());
    }

    #[test]
    fn correlation_is_symmetric_with_unit_diagonal() {
        let c = table().correlation_matrix();
        assert_eq!(c.names, ["age", "chol", "target"]);
        for i in 0..3 {
            assert!((c.values[i][i] - 1.0).abs() < 1e-12);
            for j in 0..3 {
                assert_eq!(c.values[i][j].to_bits(), c.values[j][i].to_bits());
            }
        }
    }

    #[test]
    fn perfect_and_undefined_correlation() {
        let t = Table::new(vec![
            Column::new("x", ColumnValues::Numeric(vec![Some(1.0), Some(2.0), Some(3.0)])),
            Column::new("y", ColumnValues::Numeric(vec![Some(6.0), Some(4.0), Some(2.0)])),
            Column::new("k", ColumnValues::Numeric(vec![Some(5.0), Some(5.0), Some(5.0)])),
        ])
        .unwrap();
        let c = t.correlation_matrix();
        assert!((c.values[0][1] + 1.0).abs() < 1e-12);
        assert!(c.values[0][2].is_nan());
        assert!(c.values[2][2].is_nan());
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("null"));
    }

    #[test]
    fn head_renders_cells() {
        let head = table().head(2);
        assert_eq!(head.rows.len(), 2);
        assert_eq!(head.rows[0], ["63", "233", "fixed", "1"]);
        assert_eq!(table().head(50).rows.len(), 5);
        let text = head.to_string();
        assert!(text.lines().next().unwrap().contains("age"));
    }

    #[test]
    fn class_distribution_sorts_values() {
        let dist = table().class_distribution("target").unwrap();
        let pairs: Vec<(&str, usize)> =
            dist.counts.iter().map(|c| (c.value.as_str(), c.count)).collect();
        assert_eq!(pairs, [("0", 2), ("1", 3)]);

        let thal = table().class_distribution("thal").unwrap();
        let values: Vec<&str> = thal.counts.iter().map(|c| c.value.as_str()).collect();
        assert_eq!(values, ["fixed", "normal", "reversable"]);
        assert_eq!(thal.counts[1].count, 2);

        assert!(matches!(
            table().class_distribution("outcome"),
            Err(FrameError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn grid_aligns_columns() {
        let dist = table().class_distribution("target").unwrap();
        assert_eq!(dist.to_string(), "target  count\n0           2\n1           3\n");
    }

    #[test]
    fn grid_pads_by_characters() {
        let dist = ClassDistribution {
            column: "thal".into(),
            counts: vec![
                ClassCount { value: "fixé".into(), count: 1 },
                ClassCount { value: "normal".into(), count: 12 },
            ],
        };
        assert_eq!(dist.to_string(), "thal    count\nfixé        1\nnormal     12\n");
    }
}
