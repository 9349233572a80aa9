//! Feature collection assembly
//!
//! Folds processed records into a GeoJSON [`FeatureCollection`], keeping input
//! order, and enumerates every record that could not be placed.

use serde::Serialize;
use tracing::{info, warn};

use crate::models::{Feature, FeatureCollection, LocationRecord, MissReason};
use crate::record_builder::AttributeCoercionError;

/// Why an address did not make it onto the map
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnresolvedReason {
    NoMatch,
    OutOfRange { latitude: f64, longitude: f64 },
    InvalidAttribute { field: String, value: String },
}

/// An address reported back to the operator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unresolved {
    pub name: String,
    pub reason: UnresolvedReason,
}

impl Unresolved {
    /// Entry for an unlocated record; `None` for located ones
    #[must_use]
    pub fn from_record(record: &LocationRecord) -> Option<Self> {
        let reason = match record.miss_reason()? {
            MissReason::NoMatch => UnresolvedReason::NoMatch,
            MissReason::OutOfRange { latitude, longitude } => UnresolvedReason::OutOfRange {
                latitude: *latitude,
                longitude: *longitude,
            },
        };
        Some(Self {
            name: record.name.clone(),
            reason,
        })
    }

    #[must_use]
    pub fn invalid_attribute(name: &str, err: AttributeCoercionError) -> Self {
        Self {
            name: name.to_string(),
            reason: UnresolvedReason::InvalidAttribute {
                field: err.field,
                value: err.value,
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub collection: FeatureCollection,
    pub unresolved: Vec<Unresolved>,
}

/// One feature per located record, in input order; unlocated records are
/// listed in `unresolved` instead.
#[must_use]
pub fn assemble(records: &[LocationRecord]) -> Assembly {
    let mut assembly = Assembly::default();

    for record in records {
        match Feature::from_record(record) {
            Some(feature) => assembly.collection.features.push(feature),
            None => {
                warn!("Leaving unresolved address out of the collection: {}", record.name);
                assembly.unresolved.extend(Unresolved::from_record(record));
            }
        }
    }

    info!(
        "Assembled {} features ({} unresolved)",
        assembly.collection.len(),
        assembly.unresolved.len()
    );
    assembly
}
