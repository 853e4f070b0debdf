//! Delimited-text dataset reader with full input validation.

use std::path::{Path, PathBuf};

use arbor_forest::Dataset;
use tracing::{debug, info, instrument};

use crate::encode::LabelEncoder;
use crate::IoError;

/// A dataset read from disk, with the names needed to report on it.
#[derive(Debug, Clone)]
pub struct LabeledDataset {
    /// Feature matrix and integer-coded labels.
    pub dataset: Dataset,
    /// Class label strings, indexed by code.
    pub class_names: Vec<String>,
    /// Feature column names, from the header or generated as `f0..fN`.
    pub feature_names: Vec<String>,
}

/// Reads a labeled dataset from a delimited text file.
///
/// Expected format:
/// - One row per observation, all rows with the same number of columns
/// - Every column except the last is a finite floating-point feature
/// - The last column is a class label, encoded to integer codes in the
///   lexicographic order of the distinct label strings
/// - Optional header row (off by default); blank rows are skipped
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed record |
/// | [`IoError::EmptyDataset`] | Zero data rows |
/// | [`IoError::TooFewColumns`] | Fewer than two columns |
/// | [`IoError::InconsistentRowLength`] | Row column count differs from the first row |
/// | [`IoError::NonFiniteValue`] | Feature cell is NaN, Inf, or unparseable |
pub struct DatasetReader {
    path: PathBuf,
    has_headers: bool,
    delimiter: u8,
}

impl DatasetReader {
    /// Create a new reader for a headerless, comma-delimited file.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            has_headers: false,
            delimiter: b',',
        }
    }

    /// Treat the first row as a header of column names.
    #[must_use]
    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    /// Set the field delimiter byte.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Read and validate the file, returning a [`LabeledDataset`].
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn read(&self) -> Result<LabeledDataset, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) so ragged rows surface as InconsistentRowLength.
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(self.has_headers)
            .delimiter(self.delimiter)
            .flexible(true)
            .from_reader(file);

        let mut header_names: Option<Vec<String>> = None;
        let mut expected_cols: Option<usize> = None;
        if self.has_headers {
            let header = rdr.headers().map_err(|e| self.csv_error(e))?;
            let names: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();
            debug!(expected_cols = names.len(), "read header");
            expected_cols = Some(names.len());
            header_names = Some(names);
        }

        let mut features = Vec::new();
        let mut raw_labels = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| self.csv_error(e))?;
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }
            let row_index = features.len();

            let expected = *expected_cols.get_or_insert(record.len());
            if expected < 2 {
                return Err(IoError::TooFewColumns {
                    path: self.path.clone(),
                    got: expected,
                });
            }
            if record.len() != expected {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected,
                    got: record.len(),
                });
            }

            let n_features = expected - 1;
            let mut row = Vec::with_capacity(n_features);
            for (col_index, raw) in record.iter().take(n_features).enumerate() {
                row.push(self.parse_feature(raw, row_index, col_index)?);
            }
            features.push(row);
            raw_labels.push(record.get(n_features).unwrap_or("").trim().to_string());
        }

        if features.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        let (encoder, labels) = LabelEncoder::fit_transform(&raw_labels);
        let n_features = features[0].len();
        let feature_names = match header_names {
            Some(mut names) => {
                names.truncate(n_features);
                names
            }
            None => (0..n_features).map(|i| format!("f{i}")).collect(),
        };

        let dataset = Dataset::new(features, labels).map_err(|e| IoError::InvalidDataset {
            path: self.path.clone(),
            source: e,
        })?;

        info!(
            n_rows = dataset.n_rows(),
            n_features,
            n_classes = encoder.n_classes(),
            "dataset loaded"
        );

        Ok(LabeledDataset {
            dataset,
            class_names: encoder.classes().to_vec(),
            feature_names,
        })
    }

    fn parse_feature(&self, raw: &str, row_index: usize, col_index: usize) -> Result<f64, IoError> {
        let non_finite = || IoError::NonFiniteValue {
            path: self.path.clone(),
            row_index,
            col_index,
            raw: raw.to_string(),
        };
        let value: f64 = raw.trim().parse().map_err(|_| non_finite())?;
        if !value.is_finite() {
            return Err(non_finite());
        }
        Ok(value)
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn read_headerless_rows() {
        let f = write_csv("0.02,0.37,R\n0.45,0.11,M\n0.10,0.90,R\n");
        let ld = DatasetReader::new(f.path()).read().unwrap();
        assert_eq!(ld.dataset.n_rows(), 3);
        assert_eq!(ld.dataset.n_features(), 2);
        assert_eq!(ld.class_names, vec!["M", "R"]);
        assert_eq!(ld.feature_names, vec!["f0", "f1"]);
        let labels: Vec<usize> = ld.dataset.records().iter().map(|r| r.label()).collect();
        assert_eq!(labels, vec![1, 0, 1]);
        assert!((ld.dataset.records()[1].features()[0] - 0.45).abs() < f64::EPSILON);
    }

    #[test]
    fn read_with_header() {
        let f = write_csv("width,height,class\n1.0,2.0,a\n3.0,4.0,b\n");
        let ld = DatasetReader::new(f.path()).with_headers(true).read().unwrap();
        assert_eq!(ld.dataset.n_rows(), 2);
        assert_eq!(ld.feature_names, vec!["width", "height"]);
    }

    #[test]
    fn custom_delimiter() {
        let f = write_csv("1.0;2.0;x\n3.0;4.0;y\n");
        let ld = DatasetReader::new(f.path()).with_delimiter(b';').read().unwrap();
        assert_eq!(ld.dataset.n_features(), 2);
        assert_eq!(ld.class_names, vec!["x", "y"]);
    }

    #[test]
    fn blank_rows_are_skipped() {
        let f = write_csv("1.0,a\n\n2.0,b\n\n");
        let ld = DatasetReader::new(f.path()).read().unwrap();
        assert_eq!(ld.dataset.n_rows(), 2);
    }

    #[test]
    fn missing_file_error() {
        let err = DatasetReader::new(Path::new("/nonexistent/arbor/data.csv"))
            .read()
            .unwrap_err();
        assert!(matches!(err, IoError::FileNotFound { .. }));
    }

    #[test]
    fn empty_dataset_error() {
        let f = write_csv("a,b,class\n");
        let err = DatasetReader::new(f.path()).with_headers(true).read().unwrap_err();
        assert!(matches!(err, IoError::EmptyDataset { .. }));
    }

    #[test]
    fn single_column_error() {
        let f = write_csv("a\nb\n");
        let err = DatasetReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::TooFewColumns { got: 1, .. }));
    }

    #[test]
    fn inconsistent_row_length_error() {
        let f = write_csv("1.0,2.0,a\n3.0,b\n");
        let err = DatasetReader::new(f.path()).read().unwrap_err();
        assert!(matches!(
            err,
            IoError::InconsistentRowLength {
                row_index: 1,
                expected: 3,
                got: 2,
                ..
            }
        ));
    }

    #[test]
    fn non_finite_value_error() {
        let f = write_csv("1.0,a\nNaN,b\n");
        let err = DatasetReader::new(f.path()).read().unwrap_err();
        assert!(matches!(
            err,
            IoError::NonFiniteValue {
                row_index: 1,
                col_index: 0,
                ..
            }
        ));
    }

    #[test]
    fn unparseable_value_error() {
        let f = write_csv("1.0,a\nabc,b\n");
        let err = DatasetReader::new(f.path()).read().unwrap_err();
        assert!(matches!(err, IoError::NonFiniteValue { .. }));
    }
}
