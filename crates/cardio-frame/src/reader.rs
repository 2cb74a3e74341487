//! CSV table reader with column typing and input validation.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::FrameError;
use crate::domain::{Column, ColumnValues, Table};

/// Cell spellings read as missing values, besides the empty cell.
pub const NA_TOKENS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "NULL", "null", "None", "<NA>", "#N/A",
];

fn is_missing(raw: &str) -> bool {
    raw.is_empty() || NA_TOKENS.contains(&raw)
}

/// Reads a headed CSV file into a [`Table`].
///
/// A column is numeric when every present cell parses as a finite float;
/// otherwise it is categorical. Cells are trimmed before typing.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`FrameError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`FrameError::CsvParse`] | Malformed CSV record |
/// | [`FrameError::NoColumns`] | Header row is empty |
/// | [`FrameError::EmptyDataset`] | Zero data rows after header |
/// | [`FrameError::InconsistentRowLength`] | Row has different column count than header |
/// | [`FrameError::DuplicateColumn`] | Two header cells share a name |
pub struct CsvTableReader {
    path: PathBuf,
}

impl CsvTableReader {
    /// Create a new reader for the given CSV file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Read, validate, and type the CSV file.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<Table, FrameError> {
        let file = std::fs::File::open(&self.path).map_err(|e| FrameError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) lets the row-length check below report the row.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let header = rdr.headers().map_err(|e| self.parse_error(e))?.clone();
        let expected = header.len();
        if expected == 0 {
            return Err(FrameError::NoColumns {
                path: self.path.clone(),
            });
        }
        debug!(expected, "read CSV header");

        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); expected];
        for (row_index, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| self.parse_error(e))?;
            if record.len() != expected {
                return Err(FrameError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected,
                    got: record.len(),
                });
            }
            for (column, raw) in cells.iter_mut().zip(record.iter()) {
                column.push((!is_missing(raw)).then(|| raw.to_string()));
            }
        }

        let n_rows = cells[0].len();
        if n_rows == 0 {
            return Err(FrameError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let columns: Vec<Column> = header
            .iter()
            .zip(cells)
            .map(|(name, raw)| Column::new(name, type_column(raw)))
            .collect();
        let n_categorical = columns
            .iter()
            .filter(|c| matches!(c.values(), ColumnValues::Categorical(_)))
            .count();
        let table = Table::new(columns)?;

        info!(
            n_rows,
            n_cols = table.n_cols(),
            n_categorical,
            "table loaded"
        );
        Ok(table)
    }

    fn parse_error(&self, e: csv::Error) -> FrameError {
        FrameError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

/// Numeric when every present cell is a finite float.
fn type_column(raw: Vec<Option<String>>) -> ColumnValues {
    let parsed: Option<Vec<Option<f64>>> = raw
        .iter()
        .map(|cell| match cell {
            None => Some(None),
            Some(s) => s.parse::<f64>().ok().filter(|v| v.is_finite()).map(Some),
        })
        .collect();
    match parsed {
        Some(values) => ColumnValues::Numeric(values),
        None => ColumnValues::Categorical(raw),
    }
}
