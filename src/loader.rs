//! Address spreadsheet loading
//!
//! Reads a comma-separated file with a header row into [`InputRow`]s. Header
//! names are kept exactly as written; callers match them through
//! [`crate::normalize::normalize_key`].

use std::path::Path;

use csv::{ReaderBuilder, Trim};
use tracing::{debug, info};

use crate::{GeopointsError, Result};

/// One data row keyed by its (untrimmed) header names, in column order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputRow {
    fields: Vec<(String, String)>,
}

impl InputRow {
    /// Build a row from `(header, value)` pairs
    pub fn new<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// First value whose header satisfies `pred`
    pub fn find_by<P>(&self, mut pred: P) -> Option<&str>
    where
        P: FnMut(&str) -> bool,
    {
        self.fields
            .iter()
            .find(|(k, _)| pred(k.as_str()))
            .map(|(_, v)| v.as_str())
    }
}

/// Read every data row of the CSV file at `path`.
///
/// Short rows are accepted; their missing trailing columns are simply absent.
pub fn load_rows(path: impl AsRef<Path>) -> Result<Vec<InputRow>> {
    let path = path.as_ref();
    debug!("Loading address rows from {}", path.display());

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::None)
        .from_path(path)
        .map_err(|e| GeopointsError::read(path, e))?;

    let headers = reader
        .headers()
        .map_err(|e| GeopointsError::read(path, e))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| GeopointsError::read(path, e))?;
        rows.push(InputRow::new(headers.iter().zip(record.iter())));
    }

    info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}
