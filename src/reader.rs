//! Loads one input CSV into a validated, typed [`Dataset`].

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::{
    dataset::{Dataset, Source},
    error::InputError,
    io_utils,
};

#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    pub delimiter: Option<u8>,
    pub encoding: Option<String>,
    pub required_columns: Vec<String>,
}

pub fn load_dataset(
    path: &Path,
    label: &str,
    source: Source,
    options: &ReadOptions,
) -> Result<Dataset, InputError> {
    let encoding = io_utils::resolve_encoding(options.encoding.as_deref()).ok_or_else(|| {
        InputError::UnknownEncoding {
            label: label.to_string(),
            encoding: options.encoding.clone().unwrap_or_default(),
        }
    })?;
    let delimiter = io_utils::resolve_input_delimiter(path, options.delimiter);
    info!(
        "Reading {label} CSV: {} (delimiter '{}', encoding {})",
        path.display(),
        io_utils::printable_delimiter(delimiter),
        encoding.name()
    );

    let input = io_utils::open_input(path).map_err(|source| InputError::Open {
        label: label.to_string(),
        path: PathBuf::from(path),
        source,
    })?;
    let mut reader = io_utils::open_csv_reader(input, delimiter);

    let raw_headers = reader
        .byte_headers()
        .map_err(|source| InputError::Csv {
            label: label.to_string(),
            row: 1,
            source,
        })?
        .clone();
    if raw_headers.is_empty() {
        return Err(InputError::Empty {
            label: label.to_string(),
        });
    }
    let headers =
        io_utils::decode_record(&raw_headers, encoding).ok_or_else(|| InputError::Decode {
            label: label.to_string(),
            row: 1,
            encoding: encoding.name(),
        })?;
    debug!("{label} headers: {headers:?}");

    let missing = options
        .required_columns
        .iter()
        .filter(|required| !headers.contains(*required))
        .cloned()
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(InputError::MissingColumns {
            label: label.to_string(),
            columns: missing,
        });
    }

    let mut rows = Vec::new();
    for (idx, record) in reader.byte_records().enumerate() {
        let row = idx + 2;
        let record = record.map_err(|source| InputError::Csv {
            label: label.to_string(),
            row,
            source,
        })?;
        if record.len() != headers.len() {
            return Err(InputError::RaggedRow {
                label: label.to_string(),
                row,
                found: record.len(),
                expected: headers.len(),
            });
        }
        let decoded = io_utils::decode_record(&record, encoding).ok_or_else(|| {
            InputError::Decode {
                label: label.to_string(),
                row,
                encoding: encoding.name(),
            }
        })?;
        rows.push(decoded);
    }
    if rows.is_empty() {
        return Err(InputError::Empty {
            label: label.to_string(),
        });
    }

    let dataset = Dataset::from_rows(source, headers, rows);
    info!("{label} CSV loaded: {} rows", dataset.len());
    debug!(
        "{label} column types: {}",
        dataset
            .headers
            .iter()
            .zip(&dataset.types)
            .map(|(name, ty)| format!("{name}={ty}"))
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ColumnType, Value};
    use std::fs;
    use tempfile::tempdir;

    fn required() -> ReadOptions {
        ReadOptions {
            required_columns: vec!["transaction_reference".into(), "amount".into()],
            ..ReadOptions::default()
        }
    }

    #[test]
    fn loads_and_types_columns() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("internal.csv");
        fs::write(
            &path,
            "transaction_reference,amount,status\nT1,10.50,paid\nT2,3,failed\n",
        )
        .unwrap();
        let dataset = load_dataset(&path, "Internal", Source::Internal, &required()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.types[1], ColumnType::Decimal);
        assert_eq!(dataset.rows[0][0], Some(Value::from("T1")));
    }

    #[test]
    fn reads_tsv_by_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("provider.tsv");
        fs::write(&path, "transaction_reference\tamount\nT1\t10\n").unwrap();
        let dataset = load_dataset(&path, "Provider", Source::Provider, &required()).unwrap();
        assert_eq!(dataset.headers, vec!["transaction_reference", "amount"]);
    }

    #[test]
    fn reports_every_missing_required_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, "ref,value\nT1,1\n").unwrap();
        let err = load_dataset(&path, "Internal", Source::Internal, &required()).unwrap_err();
        match err {
            InputError::MissingColumns { columns, .. } => {
                assert_eq!(columns, vec!["transaction_reference", "amount"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_only_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        fs::write(&path, "transaction_reference,amount\n").unwrap();
        let err = load_dataset(&path, "Internal", Source::Internal, &required()).unwrap_err();
        assert!(matches!(err, InputError::Empty { .. }));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ragged.csv");
        fs::write(&path, "transaction_reference,amount\nT1,1,extra\n").unwrap();
        let err = load_dataset(&path, "Internal", Source::Internal, &required()).unwrap_err();
        assert!(matches!(err, InputError::RaggedRow { row: 2, found: 3, expected: 2, .. }));
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let dir = tempdir().unwrap();
        let err = load_dataset(
            &dir.path().join("nope.csv"),
            "Internal",
            Source::Internal,
            &required(),
        )
        .unwrap_err();
        assert!(matches!(err, InputError::Open { .. }));
    }
}
