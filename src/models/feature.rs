//! GeoJSON feature collection built from located records

use serde::Serialize;
use serde_json::{Map, Value};

use super::LocationRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    pub geometry: Geometry,
    pub properties: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl Feature {
    /// Point feature for a located record; `None` when it has no coordinates.
    ///
    /// Properties are the record's attributes plus its `name`.
    #[must_use]
    pub fn from_record(record: &LocationRecord) -> Option<Self> {
        let coordinates = record.coordinates()?;

        let mut properties: Map<String, Value> = record
            .attributes
            .iter()
            .map(|(key, count)| (key.clone(), Value::from(*count)))
            .collect();
        properties.insert("name".to_string(), Value::from(record.name.clone()));

        Some(Self {
            geometry: Geometry::Point {
                coordinates: coordinates.position(),
            },
            properties,
        })
    }
}

impl FeatureCollection {
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
