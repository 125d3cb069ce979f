//! CSV Data Loader Module
//! Reads CSV files with Polars and exposes them as string-valued records.

use polars::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to load CSV {path}: {source}")]
    CsvError {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },
}

/// A table of string cells keyed by header name.
///
/// Every value is kept as text; numeric coercion is the processor's job.
/// Empty cells are stored as the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<String>>,
}

/// Borrowed view of one row of a [`RecordSet`].
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    set: &'a RecordSet,
    cells: &'a [String],
}

impl<'a> Record<'a> {
    /// Value of `field`, or `None` when the column does not exist.
    pub fn get(&self, field: &str) -> Option<&'a str> {
        self.set.column_index(field).map(|i| self.value(i))
    }

    /// Value at a known column position.
    pub fn value(&self, column: usize) -> &'a str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }
}

impl RecordSet {
    pub fn new(columns: Vec<String>) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self {
            columns,
            index,
            rows: Vec::new(),
        }
    }

    /// Build a record set from literal rows. Short rows are padded with empty cells.
    pub fn from_rows<S: AsRef<str>>(columns: &[&str], rows: Vec<Vec<S>>) -> Self {
        let mut set = Self::new(columns.iter().map(|c| c.to_string()).collect());
        for row in rows {
            set.push_row(row.iter().map(|v| v.as_ref().to_string()).collect());
        }
        set
    }

    pub fn push_row(&mut self, mut cells: Vec<String>) {
        cells.resize(self.columns.len(), String::new());
        self.rows.push(cells);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_index(&self, field: &str) -> Option<usize> {
        self.index.get(field).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> + '_ {
        self.rows.iter().map(move |cells| Record { set: self, cells })
    }
}

/// Handles CSV file loading with Polars.
pub struct DataLoader;

impl DataLoader {
    /// Load a CSV file, reading every column as text.
    pub fn load_csv(file_path: &Path) -> Result<RecordSet, LoaderError> {
        if !file_path.is_file() {
            return Err(LoaderError::NotFound(file_path.to_path_buf()));
        }

        let wrap = |source: PolarsError| LoaderError::CsvError {
            path: file_path.to_path_buf(),
            source,
        };

        // A zero-length inference window makes Polars type every column as String
        let df = match LazyCsvReader::new(file_path)
            .with_infer_schema_length(Some(0))
            .finish()
            .and_then(|lazy| lazy.collect())
        {
            Ok(df) => df,
            // No header and no rows: an empty table, not a malformed file
            Err(PolarsError::NoData(_)) => {
                warn!("{} is empty; no records loaded", file_path.display());
                return Ok(RecordSet::default());
            }
            Err(e) => return Err(wrap(e)),
        };

        let records = Self::from_dataframe(&df).map_err(wrap)?;
        if records.is_empty() {
            warn!("{} has no data rows", file_path.display());
        }
        info!(
            "Loaded {} rows, {} columns from {}",
            records.len(),
            records.columns().len(),
            file_path.display()
        );
        Ok(records)
    }

    /// Convert a DataFrame into string records, mapping nulls to "".
    pub fn from_dataframe(df: &DataFrame) -> PolarsResult<RecordSet> {
        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        debug!("CSV columns: {:?}", columns);

        let mut rows: Vec<Vec<String>> = vec![Vec::with_capacity(columns.len()); df.height()];
        for column in df.get_columns() {
            let text = column.cast(&DataType::String)?;
            let values = text.as_materialized_series().str()?;
            for (row, value) in rows.iter_mut().zip(values.into_iter()) {
                row.push(value.unwrap_or_default().to_string());
            }
        }

        let mut set = RecordSet::new(columns);
        for row in rows {
            set.push_row(row);
        }
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_all_columns_as_text() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(
            &dir,
            "specialty.csv",
            "medical_specialty,readmission_rate,count\nCardiology,0.2,100\nSurgery,0.1,50\n",
        );

        let records = DataLoader::load_csv(&path).unwrap();

        assert_eq!(
            records.columns(),
            &["medical_specialty", "readmission_rate", "count"]
        );
        let rows: Vec<Vec<&str>> = records
            .records()
            .map(|r| {
                vec![
                    r.get("medical_specialty").unwrap(),
                    r.get("readmission_rate").unwrap(),
                    r.get("count").unwrap(),
                ]
            })
            .collect();
        assert_eq!(
            rows,
            vec![vec!["Cardiology", "0.2", "100"], vec!["Surgery", "0.1", "50"]]
        );
    }

    #[test]
    fn empty_cells_become_empty_strings() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "hospital.csv", "diag_1,age\nV1,\n,[70-80)\n");

        let records = DataLoader::load_csv(&path).unwrap();
        let ages: Vec<&str> = records.records().map(|r| r.get("age").unwrap()).collect();
        let diags: Vec<&str> = records
            .records()
            .map(|r| r.get("diag_1").unwrap())
            .collect();

        assert_eq!(ages, vec!["", "[70-80)"]);
        assert_eq!(diags, vec!["V1", ""]);
    }

    #[test]
    fn zero_byte_file_is_an_empty_table() {
        let dir = TempDir::new().unwrap();
        let path = write_csv(&dir, "hospital.csv", "");

        let records = DataLoader::load_csv(&path).unwrap();
        assert!(records.is_empty());
        assert!(records.columns().is_empty());
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let err = DataLoader::load_csv(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, LoaderError::NotFound(_)));
    }

    #[test]
    fn unknown_field_is_none() {
        let records = RecordSet::from_rows(&["diag_1"], vec![vec!["V1"]]);
        let record = records.records().next().unwrap();
        assert_eq!(record.get("age"), None);
        assert_eq!(record.get("diag_1"), Some("V1"));
        assert_eq!(records.column_index("age"), None);
    }
}
