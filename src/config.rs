//! Configuration management for geopoints
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::GeopointsError;
use crate::normalize::normalize_key;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for a geocoding run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeopointsConfig {
    /// Input, output and record-building settings
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Geocoding provider settings
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// HTML/CSV report settings
    #[serde(default)]
    pub report: ReportConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Output document produced at the end of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// GeoJSON feature collection of located addresses
    Geojson,
    /// Comma-separated report of every address
    Csv,
    /// HTML page rendered from the report template
    Html,
}

impl OutputFormat {
    /// Where the document is written when no output path is configured
    #[must_use]
    pub fn default_output_path(self) -> PathBuf {
        match self {
            OutputFormat::Geojson => PathBuf::from("data/geocode.json"),
            OutputFormat::Csv => PathBuf::from("data/geocode.csv"),
            OutputFormat::Html => PathBuf::from("index.html"),
        }
    }
}

/// Settings handed to the row loader and the record builder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Address spreadsheet (CSV with a header row)
    #[serde(default = "default_input_path")]
    pub input_path: PathBuf,
    /// Destination of the generated document; unset means the format's
    /// conventional file name
    #[serde(default)]
    pub output_path: Option<PathBuf>,
    /// Which document to generate
    #[serde(default = "default_format")]
    pub format: OutputFormat,
    /// Header of the column holding the street address
    #[serde(default = "default_address_column")]
    pub address_column: String,
    /// Columns extracted as integer counts, in output order
    #[serde(default)]
    pub attribute_fields: Vec<String>,
    /// Locality appended to every address before geocoding
    #[serde(default = "default_context_suffix")]
    pub context_suffix: String,
}

/// Geocoding provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Endpoint of the geocoding JSON API
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,
    /// Provider API key
    pub api_key: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_geocoding_timeout")]
    pub timeout_seconds: u32,
    /// Fixed pause after every request, in milliseconds
    #[serde(default = "default_geocoding_delay")]
    pub delay_ms: u64,
}

/// Report rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Page template used for the HTML report
    #[serde(default = "default_template_path")]
    pub template_path: PathBuf,
    /// Static map width in pixels
    #[serde(default = "default_map_size")]
    pub map_width: u32,
    /// Static map height in pixels
    #[serde(default = "default_map_size")]
    pub map_height: u32,
    /// Static map zoom level
    #[serde(default = "default_map_zoom")]
    pub map_zoom: u8,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_input_path() -> PathBuf {
    PathBuf::from("data/addresses.csv")
}

fn default_format() -> OutputFormat {
    OutputFormat::Geojson
}

fn default_address_column() -> String {
    "Address".to_string()
}

fn default_context_suffix() -> String {
    "Waiheke Island, NZ".to_string()
}

fn default_geocoding_base_url() -> String {
    "https://maps.googleapis.com/maps/api/geocode/json".to_string()
}

fn default_geocoding_timeout() -> u32 {
    30
}

fn default_geocoding_delay() -> u64 {
    1000
}

fn default_template_path() -> PathBuf {
    PathBuf::from("templates/index-template.html")
}

fn default_map_size() -> u32 {
    150
}

fn default_map_zoom() -> u8 {
    12
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            output_path: None,
            format: default_format(),
            address_column: default_address_column(),
            attribute_fields: Vec::new(),
            context_suffix: default_context_suffix(),
        }
    }
}

impl PipelineConfig {
    /// Configured output path, or the default for the selected format
    #[must_use]
    pub fn resolved_output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| self.format.default_output_path())
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            api_key: None,
            timeout_seconds: default_geocoding_timeout(),
            delay_ms: default_geocoding_delay(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            template_path: default_template_path(),
            map_width: default_map_size(),
            map_height: default_map_size(),
            map_zoom: default_map_zoom(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl GeopointsConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // An explicitly named file must exist; the per-user one is optional
        match config_path {
            Some(path) => {
                builder = builder.add_source(
                    File::from(path)
                        .required(true)
                        .format(config::FileFormat::Toml),
                );
            }
            None => {
                if let Some(path) = Self::get_config_path().filter(|p| p.exists()) {
                    builder = builder.add_source(
                        File::from(path)
                            .required(false)
                            .format(config::FileFormat::Toml),
                    );
                }
            }
        }

        // GEOPOINTS_PIPELINE__INPUT_PATH=... style overrides
        builder = builder.add_source(
            Environment::with_prefix("GEOPOINTS")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("pipeline.attribute_fields")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: GeopointsConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("geopoints").join("config.toml"))
    }

    /// Apply default values to fields left blank in the file
    pub fn apply_defaults(&mut self) {
        if self.pipeline.address_column.trim().is_empty() {
            self.pipeline.address_column = default_address_column();
        }
        if self.geocoding.base_url.is_empty() {
            self.geocoding.base_url = default_geocoding_base_url();
        }
        if self.geocoding.timeout_seconds == 0 {
            self.geocoding.timeout_seconds = default_geocoding_timeout();
        }
        if self.report.map_width == 0 {
            self.report.map_width = default_map_size();
        }
        if self.report.map_height == 0 {
            self.report.map_height = default_map_size();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_api_key()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        self.validate_attribute_fields()?;
        Ok(())
    }

    /// Validate the provider API key, when one is set
    pub fn validate_api_key(&self) -> Result<()> {
        if let Some(api_key) = &self.geocoding.api_key {
            if api_key.is_empty() {
                return Err(GeopointsError::config(
                    "Geocoding API key cannot be empty if provided. Either remove it or provide a valid key.",
                )
                .into());
            }

            if api_key.len() < 8 {
                return Err(GeopointsError::config(
                    "Geocoding API key appears to be invalid (too short). Please check your API key.",
                )
                .into());
            }
        }

        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.geocoding.timeout_seconds > 300 {
            return Err(
                GeopointsError::config("Geocoding timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.geocoding.delay_ms > 60_000 {
            return Err(GeopointsError::config("Geocoding delay cannot exceed 60000 ms").into());
        }

        if self.report.map_zoom > 21 {
            return Err(GeopointsError::config("Map zoom level cannot exceed 21").into());
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(GeopointsError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(GeopointsError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.geocoding.base_url.starts_with("http://")
            && !self.geocoding.base_url.starts_with("https://")
        {
            return Err(GeopointsError::config(
                "Geocoding base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }

    /// Attribute names become GeoJSON property keys next to `name`
    fn validate_attribute_fields(&self) -> Result<()> {
        for field in &self.pipeline.attribute_fields {
            match normalize_key(field).as_str() {
                "" => {
                    return Err(
                        GeopointsError::config("Attribute field names cannot be empty").into(),
                    );
                }
                "name" => {
                    return Err(GeopointsError::config(format!(
                        "Attribute field '{field}' clashes with the reserved 'name' property"
                    ))
                    .into());
                }
                _ => {}
            }
        }
        Ok(())
    }
}
