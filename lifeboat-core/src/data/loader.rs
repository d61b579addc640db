//! CSV loading

use crate::error::{LifeboatError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;

/// Loader for the workflow's CSV datasets
pub struct DataLoader {
    infer_schema_length: usize,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a new data loader
    pub fn new() -> Self {
        Self {
            infer_schema_length: 1000,
        }
    }

    /// Set how many rows schema inference reads
    pub fn with_infer_schema_length(mut self, n: usize) -> Self {
        self.infer_schema_length = n;
        self
    }

    /// Load a headered CSV file
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let file = File::open(path.as_ref()).map_err(|e| {
            LifeboatError::DataError(format!("cannot open {}: {e}", path.as_ref().display()))
        })?;

        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(self.infer_schema_length))
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| LifeboatError::DataError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(lines: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        for line in lines {
            writeln!(file, "{line}").unwrap();
        }
        file
    }

    #[test]
    fn test_load_csv() {
        let file = write_csv(&["a,b,c", "1,2,x", "4,5,y"]);

        let df = DataLoader::new().load_csv(file.path()).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 3);
    }

    #[test]
    fn test_missing_values_become_nulls() {
        let file = write_csv(&["a,b", "1,", ",2"]);

        let df = DataLoader::new().load_csv(file.path()).unwrap();
        assert_eq!(df.column("a").unwrap().null_count(), 1);
        assert_eq!(df.column("b").unwrap().null_count(), 1);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = DataLoader::new().load_csv("no/such/file.csv").unwrap_err();
        assert!(err.to_string().contains("no/such/file.csv"));
    }
}
