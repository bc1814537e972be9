use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::metrics::{MetricRecord, MetricValue};

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid metrics JSON in '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid metrics JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("row {row} ('{name}'): {field} '{value}' is not a number")]
    BadRow {
        row: usize,
        name: String,
        field: &'static str,
        value: String,
    },
}

/// A number that may have been serialised as a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    fn to_f64(&self) -> Option<f64> {
        match self {
            Numeric::Number(v) => Some(*v),
            Numeric::Text(s) => s.trim().parse().ok(),
        }
    }

    fn raw(&self) -> String {
        match self {
            Numeric::Number(v) => v.to_string(),
            Numeric::Text(s) => s.clone(),
        }
    }
}

/// `{"data": [[name, duration, coverage], ...]}`
#[derive(Debug, Deserialize)]
struct RowsFile {
    data: Vec<(String, Numeric, Numeric)>,
}

/// The shapes metrics files have taken across experiment iterations.
#[derive(Debug)]
enum MetricsFile {
    /// `[{"name": .., "duration": .., "coverage": .., "outcome": ..}, ...]`
    Records(Vec<MetricRecord>),
    Rows(RowsFile),
}

impl MetricsFile {
    /// Picks the shape from the top-level token, so a bad field is reported
    /// with its name and position.
    fn parse(json: &str) -> Result<Self, serde_json::Error> {
        if json.trim_start().starts_with('[') {
            serde_json::from_str(json).map(MetricsFile::Records)
        } else {
            serde_json::from_str(json).map(MetricsFile::Rows)
        }
    }

    fn into_records(self) -> Result<Vec<MetricRecord>, DatasetError> {
        match self {
            MetricsFile::Records(records) => Ok(records),
            MetricsFile::Rows(RowsFile { data }) => data
                .into_iter()
                .enumerate()
                .map(|(row, (name, duration, coverage))| {
                    let parse = |field: &'static str, value: &Numeric| {
                        value.to_f64().ok_or_else(|| DatasetError::BadRow {
                            row,
                            name: name.clone(),
                            field,
                            value: value.raw(),
                        })
                    };
                    let duration = parse("duration", &duration)?;
                    let coverage = parse("coverage", &coverage)?;
                    Ok(MetricRecord {
                        name: name.clone(),
                        duration,
                        coverage: MetricValue::Scalar(coverage),
                        outcome: None,
                        extra: BTreeMap::new(),
                    })
                })
                .collect(),
        }
    }
}

/// Parses metric records from a JSON string in any supported shape.
pub fn parse_records(json: &str) -> Result<Vec<MetricRecord>, DatasetError> {
    MetricsFile::parse(json)?.into_records()
}

/// Loads metric records from a JSON file in any supported shape.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<MetricRecord>, DatasetError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed = MetricsFile::parse(&text).map_err(|source| DatasetError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let records = parsed.into_records()?;
    debug!(path = %path.display(), records = records.len(), "loaded metrics");
    Ok(records)
}

/// Writes records as a pretty-printed JSON array.
pub fn write_records<P: AsRef<Path>>(path: P, records: &[MetricRecord]) -> Result<(), DatasetError> {
    let path = path.as_ref();
    let io_err = |source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records).map_err(|source| DatasetError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_err)?;
    Ok(())
}
