//! `geopoints` - batch geocoding of address spreadsheets
//!
//! This library reads addresses from a CSV file, resolves each one to
//! coordinates through a geocoding provider and writes the result as a GeoJSON
//! feature collection, a CSV report or an HTML page.

pub mod assemble;
pub mod config;
pub mod error;
pub mod geocode;
pub mod loader;
pub mod logging;
pub mod models;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod record_builder;

// Re-export core types for public API
pub use assemble::{Assembly, Unresolved, UnresolvedReason, assemble};
pub use config::{GeopointsConfig, OutputFormat, PipelineConfig};
pub use error::GeopointsError;
pub use geocode::{GeocodeError, Geocoder, GoogleGeocoder};
pub use loader::{InputRow, load_rows};
pub use models::{Coordinates, Feature, FeatureCollection, LocationRecord, MissReason};
pub use pipeline::{Pipeline, RunSummary};
pub use record_builder::{AttributeCoercionError, BuildError, RecordBuilder};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, GeopointsError>;
