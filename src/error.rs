//! Error types and handling for the geopoints pipeline

use std::path::PathBuf;
use thiserror::Error;

use crate::geocode::GeocodeError;

/// Fatal errors that abort a geocoding run
#[derive(Error, Debug)]
pub enum GeopointsError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The address file could not be opened or parsed
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// An output file could not be created or written
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The HTML report template could not be loaded or rendered
    #[error("Template error: {message}")]
    Template { message: String },

    /// The geocoding provider could not be reached or refused the request
    #[error("Geocoding failed: {0}")]
    Geocode(#[from] GeocodeError),
}

impl GeopointsError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new template error
    pub fn template<S: Into<String>>(message: S) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    /// Wrap a read failure together with the offending path
    pub fn read(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Wrap a write failure together with the offending path
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            GeopointsError::Config { message } => {
                format!("Configuration error: {message}. Please check your config file.")
            }
            GeopointsError::Read { path, .. } => {
                format!(
                    "Could not read the address file {}. Please check that it exists and is valid CSV.",
                    path.display()
                )
            }
            GeopointsError::Write { path, .. } => {
                format!(
                    "Could not write {}. Please check file permissions.",
                    path.display()
                )
            }
            GeopointsError::Template { message } => format!("Report template error: {message}"),
            GeopointsError::Geocode(err) if err.is_retryable() => {
                "The geocoding service is unavailable right now. Nothing was written; please rerun later."
                    .to_string()
            }
            GeopointsError::Geocode(_) => {
                "The geocoding service rejected the request. Please check your API key and base URL."
                    .to_string()
            }
        }
    }
}
