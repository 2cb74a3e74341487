//! CSV writer for cleaned feature tables.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use crate::FrameError;
use crate::domain::{FeatureTable, format_value};

/// Writes a [`FeatureTable`] as CSV: features then target, no index column.
///
/// Values are written in shortest round-trip decimal form, so reading the
/// file back with [`CsvTableReader`](crate::CsvTableReader) yields the
/// same numbers.
pub struct CsvTableWriter {
    path: PathBuf,
}

impl CsvTableWriter {
    /// Create a writer for the given output path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    /// Write the table, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`FrameError::OutputDirCreate`] | Parent directory cannot be created |
    /// | [`FrameError::WriteFile`] | File cannot be created or written |
    #[instrument(skip_all, fields(path = %self.path.display(), n_rows = table.n_rows()))]
    pub fn write(&self, table: &FeatureTable) -> Result<(), FrameError> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            fs::create_dir_all(dir).map_err(|e| FrameError::OutputDirCreate {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }

        let wrap = |source: csv::Error| FrameError::WriteFile {
            path: self.path.clone(),
            source,
        };
        let mut wtr = csv::Writer::from_path(&self.path).map_err(wrap)?;

        let header = table
            .feature_names()
            .iter()
            .map(String::as_str)
            .chain([table.target_name()]);
        wtr.write_record(header).map_err(wrap)?;

        for (row, &target) in table.features().iter().zip(table.target()) {
            let record = row
                .iter()
                .chain([&target])
                .map(|&v| format_value(v));
            wtr.write_record(record).map_err(wrap)?;
        }
        wtr.flush().map_err(|e| wrap(e.into()))?;

        info!(
            n_rows = table.n_rows(),
            n_cols = table.n_features() + 1,
            "table written"
        );
        Ok(())
    }
}
