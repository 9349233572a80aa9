//! Location record: one geocoded input row

use std::collections::BTreeMap;

use serde::{Serialize, Serializer, ser::SerializeStruct};

use super::Coordinates;

/// Why a record could not be placed on the map
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MissReason {
    /// The provider had no usable match
    NoMatch,
    /// The provider answered with coordinates outside the valid ranges
    OutOfRange { latitude: f64, longitude: f64 },
}

/// A processed address, located or not
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRecord {
    /// Raw address as read from the spreadsheet
    pub name: String,
    /// Address with the locality suffix, as sent to the geocoder
    pub contextualized_address: String,
    /// Integer attributes keyed by normalized column name
    pub attributes: BTreeMap<String, i64>,
    coordinates: Option<Coordinates>,
    miss: Option<MissReason>,
}

impl LocationRecord {
    #[must_use]
    pub fn located(
        name: String,
        contextualized_address: String,
        attributes: BTreeMap<String, i64>,
        coordinates: Coordinates,
    ) -> Self {
        Self {
            name,
            contextualized_address,
            attributes,
            coordinates: Some(coordinates),
            miss: None,
        }
    }

    #[must_use]
    pub fn unlocated(
        name: String,
        contextualized_address: String,
        attributes: BTreeMap<String, i64>,
        reason: MissReason,
    ) -> Self {
        Self {
            name,
            contextualized_address,
            attributes,
            coordinates: None,
            miss: Some(reason),
        }
    }

    #[must_use]
    pub fn is_located(&self) -> bool {
        self.coordinates.is_some()
    }

    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }

    #[must_use]
    pub fn latitude(&self) -> Option<f64> {
        self.coordinates.map(|c| c.latitude)
    }

    #[must_use]
    pub fn longitude(&self) -> Option<f64> {
        self.coordinates.map(|c| c.longitude)
    }

    #[must_use]
    pub fn miss_reason(&self) -> Option<&MissReason> {
        self.miss.as_ref()
    }
}

// Flattened so that `located`, `latitude` and `longitude` always agree.
impl Serialize for LocationRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("LocationRecord", 6)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("contextualized_address", &self.contextualized_address)?;
        state.serialize_field("attributes", &self.attributes)?;
        state.serialize_field("latitude", &self.latitude())?;
        state.serialize_field("longitude", &self.longitude())?;
        state.serialize_field("located", &self.is_located())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_located_record_exposes_both_coordinates() {
        let record = LocationRecord::located(
            "123 Beach Rd".to_string(),
            "123 Beach Rd,Waiheke Island, NZ".to_string(),
            BTreeMap::new(),
            Coordinates::new(-36.79, 175.10).unwrap(),
        );
        assert!(record.is_located());
        assert_eq!(record.latitude(), Some(-36.79));
        assert_eq!(record.longitude(), Some(175.10));
        assert!(record.miss_reason().is_none());
    }

    #[test]
    fn test_unlocated_record_serializes_nulls() {
        let record = LocationRecord::unlocated(
            "Nowhere Lane".to_string(),
            "Nowhere Lane,Waiheke Island, NZ".to_string(),
            BTreeMap::from([("plums".to_string(), 0)]),
            MissReason::NoMatch,
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["located"], false);
        assert!(value["latitude"].is_null());
        assert!(value["longitude"].is_null());
        assert_eq!(value["attributes"]["plums"], 0);
    }
}
