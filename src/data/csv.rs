//! CSV format dataset implementation
//!
//! Loads epoch feature tables from CSV files where:
//! - The last column is the class label (name or number)
//! - All other columns are numeric features
//! - First row can be headers (automatically detected)
//! - `#` lines and blank lines are skipped

use crate::core::{EvalError, FeatureMatrix, Labels, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Feature matrix plus labels loaded from a CSV file
#[derive(Debug, Clone)]
pub struct CsvDataset {
    features: FeatureMatrix,
    labels: Labels,
}

impl CsvDataset {
    /// Load a dataset from a CSV file, auto-detecting a header row.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(EvalError::IoError)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load a dataset from a reader, auto-detecting a header row.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, true)
    }

    /// Load a dataset with explicit header handling.
    pub fn from_reader_with_options<R: BufRead>(
        mut reader: R,
        auto_detect_header: bool,
    ) -> Result<Self> {
        let mut rows: Vec<Vec<f64>> = Vec::new();
        let mut raw_labels: Vec<String> = Vec::new();

        let mut first_line = String::new();
        reader.read_line(&mut first_line).map_err(EvalError::IoError)?;
        let first_line = first_line.trim();

        if first_line.is_empty() {
            return Err(EvalError::EmptyDataset);
        }

        if !first_line.starts_with('#') {
            let has_header = auto_detect_header && is_header_line(first_line);
            if !has_header {
                let (features, label) = parse_data_line(first_line)?;
                rows.push(features);
                raw_labels.push(label);
            }
        }

        for line in reader.lines() {
            let line = line.map_err(EvalError::IoError)?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (features, label) = parse_data_line(line)?;
            rows.push(features);
            raw_labels.push(label);
        }

        if rows.is_empty() {
            return Err(EvalError::EmptyDataset);
        }

        let features = FeatureMatrix::from_rows(rows)?;
        let labels = Labels::from_raw(&raw_labels)?;
        Ok(Self { features, labels })
    }

    pub fn features(&self) -> &FeatureMatrix {
        &self.features
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Consume the dataset into its matrix and labels
    pub fn into_parts(self) -> (FeatureMatrix, Labels) {
        (self.features, self.labels)
    }
}

/// Check if a line appears to be a header: most feature columns non-numeric.
/// The last column is excluded since class labels may legitimately be names.
fn is_header_line(line: &str) -> bool {
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < 2 {
        return false;
    }

    let non_numeric_count = fields
        .iter()
        .take(fields.len() - 1)
        .filter(|field| field.trim().parse::<f64>().is_err())
        .count();

    non_numeric_count > (fields.len() - 1) / 2
}

/// Parse one CSV data line into features and a raw label
fn parse_data_line(line: &str) -> Result<(Vec<f64>, String)> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();

    if fields.len() < 2 {
        return Err(EvalError::ParseError(format!(
            "Line has too few fields: {line}"
        )));
    }

    let label = fields[fields.len() - 1];
    if label.is_empty() {
        return Err(EvalError::ParseError(format!("Missing label in: {line}")));
    }

    let mut features = Vec::with_capacity(fields.len() - 1);
    for (idx, field) in fields.iter().take(fields.len() - 1).enumerate() {
        let value = field.parse::<f64>().map_err(|_| {
            EvalError::ParseError(format!(
                "Invalid feature value at column {}: {field}",
                idx + 1
            ))
        })?;
        features.push(value);
    }

    Ok((features, label.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_csv_basic() {
        let data = "1.0,2.0,apple\n3.0,4.0,car\n";
        let dataset = CsvDataset::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.features().rows(), 2);
        assert_eq!(dataset.features().cols(), 2);
        assert_eq!(dataset.features().row(0), &[1.0, 2.0]);
        assert_eq!(dataset.labels().ids(), &[0, 1]);
        assert_eq!(dataset.labels().classes().names(), &["apple", "car"]);
    }

    #[test]
    fn test_csv_with_headers() {
        let data = "p300_amp,n170_amp,stimulus\n1.0,2.0,face\n3.0,4.0,flower\n";
        let dataset = CsvDataset::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(dataset.features().rows(), 2);
        assert_eq!(dataset.labels().classes().names(), &["face", "flower"]);
    }

    #[test]
    fn test_csv_numeric_labels() {
        let data = "1.0,2.0,2\n3.0,4.0,1\n5.0,6.0,10\n";
        let dataset = CsvDataset::from_reader(Cursor::new(data)).unwrap();

        // Numeric labels sort numerically: 1 < 2 < 10
        assert_eq!(dataset.labels().classes().names(), &["1", "2", "10"]);
        assert_eq!(dataset.labels().ids(), &[1, 0, 2]);
    }

    #[test]
    fn test_csv_comments_and_blank_lines() {
        let data = "# epoch features\n1.0,2.0,a\n\n3.0,4.0,b\n";
        let dataset = CsvDataset::from_reader(Cursor::new(data)).unwrap();
        assert_eq!(dataset.features().rows(), 2);
    }

    #[test]
    fn test_csv_ragged_rows_rejected() {
        let data = "1.0,2.0,a\n1.0,b\n";
        let result = CsvDataset::from_reader(Cursor::new(data));
        assert!(matches!(result, Err(EvalError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_csv_invalid_feature_value() {
        let data = "1.0,oops,a\n";
        let result = CsvDataset::from_reader(Cursor::new(data));
        assert!(matches!(result, Err(EvalError::ParseError(_))));
    }

    #[test]
    fn test_csv_too_few_fields() {
        let data = "1.0\n";
        let result = CsvDataset::from_reader(Cursor::new(data));
        assert!(matches!(result, Err(EvalError::ParseError(_))));
    }

    #[test]
    fn test_csv_empty_input() {
        let result = CsvDataset::from_reader(Cursor::new(""));
        assert!(matches!(result, Err(EvalError::EmptyDataset)));
    }

    #[test]
    fn test_csv_manual_header_control() {
        // "1,2" could look like data; explicit flag forces data handling
        let data = "1.0,2.0,3\n4.0,5.0,6\n";
        let dataset = CsvDataset::from_reader_with_options(Cursor::new(data), false).unwrap();
        assert_eq!(dataset.features().rows(), 2);
    }

    #[test]
    fn test_is_header_line() {
        assert!(is_header_line("feature1,feature2,label"));
        assert!(is_header_line("x1,x2,x3,y"));
        assert!(!is_header_line("1.0,2.0,3.0,face"));
        assert!(!is_header_line("1"));
    }
}
