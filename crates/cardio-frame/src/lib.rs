//! Tabular data preparation for the cardio pipeline.
//!
//! Loads a headed CSV into a typed [`Table`], reports and cleans missing
//! values, one-hot encodes categorical columns into a numeric
//! [`FeatureTable`], standardizes features, writes the cleaned table back to
//! CSV, and produces descriptive summaries.

mod clean;
mod domain;
mod encode;
mod error;
mod reader;
mod scale;
mod summary;
mod writer;

pub use clean::{CleanOptions, CleanSummary, ImputedColumn, MissingCount};
pub use domain::{Column, ColumnKind, ColumnValues, FeatureTable, LabelledData, Table};
pub use encode::encode_one_hot;
pub use error::FrameError;
pub use reader::{CsvTableReader, NA_TOKENS};
pub use scale::StandardScaler;
pub use summary::{
    ClassCount, ClassDistribution, ColumnInfo, ColumnStats, CorrelationMatrix, Description, Head,
    TableInfo,
};
pub use writer::CsvTableWriter;
