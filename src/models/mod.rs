//! Data models for geocoded addresses
//!
//! This module contains the core domain models organized by concern:
//! - Location: validated coordinate pairs
//! - Record: one processed address with its attributes
//! - Feature: the GeoJSON feature collection written for located records

pub mod feature;
pub mod location;
pub mod record;

// Re-export all public types for convenient access
pub use feature::{Feature, FeatureCollection, Geometry};
pub use location::Coordinates;
pub use record::{LocationRecord, MissReason};
