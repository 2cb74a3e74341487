//! Error types for cardio-frame.

use std::path::PathBuf;

/// Errors from CSV I/O, cleaning, encoding, and scaling.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Returned when the input file does not exist or is unreadable.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when the CSV parser encounters a malformed record.
    #[error("CSV parse error in {path} at byte offset {offset}")]
    CsvParse {
        /// Path to the CSV file.
        path: PathBuf,
        /// Byte offset where the error occurred.
        offset: u64,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Returned when the header row is empty.
    #[error("no columns in {path}")]
    NoColumns {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when the CSV file contains a header but zero data rows.
    #[error("empty dataset (no data rows) in {path}")]
    EmptyDataset {
        /// Path to the CSV file.
        path: PathBuf,
    },

    /// Returned when a data row has a different number of cells than the header.
    #[error("inconsistent row length in {path}: row {row_index} has {got} columns, expected {expected}")]
    InconsistentRowLength {
        /// Path to the CSV file.
        path: PathBuf,
        /// Zero-based row index (excluding header).
        row_index: usize,
        /// Expected number of columns (from header).
        expected: usize,
        /// Actual number of columns in this row.
        got: usize,
    },

    /// Returned when two columns share a name.
    #[error("duplicate column \"{column}\": first at index {first_index}, again at index {second_index}")]
    DuplicateColumn {
        /// The duplicated column name.
        column: String,
        /// Zero-based index of the first occurrence.
        first_index: usize,
        /// Zero-based index of the second occurrence.
        second_index: usize,
    },

    /// Returned when columns passed to a table differ in length.
    #[error("column \"{column}\" has {got} rows, expected {expected}")]
    ColumnLengthMismatch {
        /// The offending column.
        column: String,
        /// Row count of the first column.
        expected: usize,
        /// Row count of this column.
        got: usize,
    },

    /// Returned when a named column is absent.
    #[error("column \"{column}\" not found")]
    ColumnNotFound {
        /// The requested column name.
        column: String,
    },

    /// Returned when the target column holds non-numeric values.
    #[error("target column \"{column}\" is not numeric")]
    CategoricalTarget {
        /// The target column name.
        column: String,
    },

    /// Returned when a feature column of a cleaned table is not numeric.
    #[error("feature column \"{column}\" is not numeric")]
    CategoricalFeature {
        /// The offending column name.
        column: String,
    },

    /// Returned when a cell that must be present is missing.
    #[error("missing value in column \"{column}\" at row {row_index}")]
    MissingValue {
        /// The column containing the gap.
        column: String,
        /// Zero-based row index.
        row_index: usize,
    },

    /// Returned when a numeric column has no present value to take a mean over.
    #[error("column \"{column}\" has no present values to impute from")]
    NoPresentValues {
        /// The all-missing column.
        column: String,
    },

    /// Returned when cleaning removes every row.
    #[error("cleaning dropped all {n_rows} rows")]
    AllRowsDropped {
        /// Row count before cleaning.
        n_rows: usize,
    },

    /// Returned when a scaler is fitted on zero rows.
    #[error("cannot fit a scaler on zero rows")]
    EmptyTable,

    /// Returned when a row has a different feature count than expected.
    #[error("row {row_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// Expected feature count.
        expected: usize,
        /// Actual feature count.
        got: usize,
        /// Zero-based row index.
        row_index: usize,
    },

    /// Returned when the output directory cannot be created.
    #[error("cannot create output directory {path}")]
    OutputDirCreate {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Returned when a CSV file cannot be written.
    #[error("cannot write CSV file {path}")]
    WriteFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },
}
