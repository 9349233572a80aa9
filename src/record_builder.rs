//! Location record construction
//!
//! Turns one spreadsheet row into a [`LocationRecord`]: contextualizes the
//! address, extracts the allowlisted integer attributes and resolves the
//! coordinates with exactly one geocoder call.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::{debug, warn};

use crate::geocode::{GeocodeError, Geocoder};
use crate::loader::InputRow;
use crate::models::{Coordinates, LocationRecord, MissReason};
use crate::normalize::{contextualise, normalize_key};

/// An allowlisted column held something other than an integer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Column '{field}' holds non-numeric value {value:?}")]
pub struct AttributeCoercionError {
    pub field: String,
    pub value: String,
}

#[derive(Error, Debug)]
pub enum BuildError {
    /// Per-record: the row is reported and the run continues
    #[error(transparent)]
    Attribute(#[from] AttributeCoercionError),

    /// Fatal: the provider could not be used at all
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
}

pub struct RecordBuilder<'a, G: Geocoder + ?Sized> {
    attribute_fields: &'a [String],
    context_suffix: &'a str,
    geocoder: &'a G,
}

impl<'a, G: Geocoder + ?Sized> RecordBuilder<'a, G> {
    pub fn new(attribute_fields: &'a [String], context_suffix: &'a str, geocoder: &'a G) -> Self {
        Self {
            attribute_fields,
            context_suffix,
            geocoder,
        }
    }

    /// Build the record for `address`, taking attributes from `row`.
    ///
    /// Attributes are checked before the geocoder is called, so a bad row
    /// costs no request.
    pub fn build(&self, address: &str, row: &InputRow) -> Result<LocationRecord, BuildError> {
        let contextualized = contextualise(address, self.context_suffix);
        let attributes = extract_attributes(row, self.attribute_fields)?;

        let raw = self.geocoder.resolve_address_lat_lng(&contextualized)?;

        let record = match raw {
            Some((latitude, longitude)) => match Coordinates::new(latitude, longitude) {
                Some(coordinates) => {
                    debug!("Located {} at {}", address, coordinates.format_coordinates());
                    LocationRecord::located(
                        address.to_string(),
                        contextualized,
                        attributes,
                        coordinates,
                    )
                }
                None => {
                    warn!(
                        "Geocoder returned out-of-range coordinates for {}: ({}, {})",
                        address, latitude, longitude
                    );
                    LocationRecord::unlocated(
                        address.to_string(),
                        contextualized,
                        attributes,
                        MissReason::OutOfRange { latitude, longitude },
                    )
                }
            },
            None => {
                warn!("No geocoding match for {}", contextualized);
                LocationRecord::unlocated(
                    address.to_string(),
                    contextualized,
                    attributes,
                    MissReason::NoMatch,
                )
            }
        };

        Ok(record)
    }
}

/// Pull every allowlisted column out of `row` as an integer count.
///
/// Columns are matched on their normalized names, so `"Plums "` in the
/// header satisfies the allowlist entry `Plums`. Missing and blank values
/// count as zero.
pub fn extract_attributes(
    row: &InputRow,
    fields: &[String],
) -> Result<BTreeMap<String, i64>, AttributeCoercionError> {
    let mut attributes = BTreeMap::new();
    for field in fields {
        let key = normalize_key(field);
        let raw = row.find_by(|header| normalize_key(header) == key).unwrap_or("");
        attributes.insert(key, coerce_count(field, raw)?);
    }
    Ok(attributes)
}

fn coerce_count(field: &str, raw: &str) -> Result<i64, AttributeCoercionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }
    trimmed.parse().map_err(|_| AttributeCoercionError {
        field: field.to_string(),
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::cell::Cell;

    struct FixedGeocoder {
        answer: Option<(f64, f64)>,
        calls: Cell<usize>,
    }

    impl FixedGeocoder {
        fn new(answer: Option<(f64, f64)>) -> Self {
            Self {
                answer,
                calls: Cell::new(0),
            }
        }
    }

    impl Geocoder for FixedGeocoder {
        fn resolve_address_lat_lng(
            &self,
            _address: &str,
        ) -> Result<Option<(f64, f64)>, GeocodeError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.answer)
        }
    }

    fn fields() -> Vec<String> {
        vec!["Plums".to_string(), "Black Doris".to_string()]
    }

    fn beach_road_row() -> InputRow {
        InputRow::new([
            ("Address", "123 Beach Rd"),
            ("Plums ", "5"),
            ("Black Doris ", ""),
        ])
    }

    #[rstest]
    #[case("", 0)]
    #[case("   ", 0)]
    #[case("12", 12)]
    #[case(" 7 ", 7)]
    #[case("-3", -3)]
    fn test_coerce_count(#[case] raw: &str, #[case] expected: i64) {
        assert_eq!(coerce_count("Plums", raw).unwrap(), expected);
    }

    #[rstest]
    #[case("lots")]
    #[case("2.5")]
    #[case("12a")]
    fn test_coerce_count_rejects_non_numeric(#[case] raw: &str) {
        let err = coerce_count("Plums", raw).unwrap_err();
        assert_eq!(err.field, "Plums");
        assert_eq!(err.value, raw);
    }

    #[test]
    fn test_missing_column_is_zero() {
        let row = InputRow::new([("Address", "9 Sea View Rd")]);
        let attributes = extract_attributes(&row, &fields()).unwrap();
        assert_eq!(attributes.get("plums"), Some(&0));
        assert_eq!(attributes.get("black_doris"), Some(&0));
    }

    #[test]
    fn test_build_located_record() {
        let geocoder = FixedGeocoder::new(Some((-36.79, 175.10)));
        let fields = fields();
        let builder = RecordBuilder::new(&fields, "Waiheke Island, NZ", &geocoder);

        let record = builder.build("123 Beach Rd", &beach_road_row()).unwrap();

        assert!(record.is_located());
        assert_eq!(record.name, "123 Beach Rd");
        assert_eq!(record.contextualized_address, "123 Beach Rd,Waiheke Island, NZ");
        assert_eq!(record.latitude(), Some(-36.79));
        assert_eq!(record.longitude(), Some(175.10));
        assert_eq!(
            record.attributes,
            BTreeMap::from([("plums".to_string(), 5), ("black_doris".to_string(), 0)])
        );
        assert_eq!(geocoder.calls.get(), 1);
    }

    #[test]
    fn test_build_unlocated_record() {
        let geocoder = FixedGeocoder::new(None);
        let fields = fields();
        let builder = RecordBuilder::new(&fields, "Waiheke Island, NZ", &geocoder);

        let record = builder.build("123 Beach Rd", &beach_road_row()).unwrap();

        assert!(!record.is_located());
        assert_eq!(record.latitude(), None);
        assert_eq!(record.longitude(), None);
        assert_eq!(record.miss_reason(), Some(&MissReason::NoMatch));
    }

    #[test]
    fn test_out_of_range_coordinates_are_flagged() {
        let geocoder = FixedGeocoder::new(Some((175.10, -36.79)));
        let fields = fields();
        let builder = RecordBuilder::new(&fields, "Waiheke Island, NZ", &geocoder);

        let record = builder.build("123 Beach Rd", &beach_road_row()).unwrap();

        assert!(!record.is_located());
        assert!(matches!(
            record.miss_reason(),
            Some(MissReason::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_bad_attribute_skips_geocoder() {
        let geocoder = FixedGeocoder::new(Some((-36.79, 175.10)));
        let fields = fields();
        let builder = RecordBuilder::new(&fields, "Waiheke Island, NZ", &geocoder);
        let row = InputRow::new([("Address", "123 Beach Rd"), ("Plums ", "a few")]);

        let err = builder.build("123 Beach Rd", &row).unwrap_err();

        assert!(matches!(err, BuildError::Attribute(ref e) if e.value == "a few"));
        assert_eq!(geocoder.calls.get(), 0);
    }

    #[test]
    fn test_repeated_address_is_geocoded_each_time() {
        let geocoder = FixedGeocoder::new(Some((-36.79, 175.10)));
        let fields = fields();
        let builder = RecordBuilder::new(&fields, "Waiheke Island, NZ", &geocoder);

        builder.build("123 Beach Rd", &beach_road_row()).unwrap();
        builder.build("123 Beach Rd", &beach_road_row()).unwrap();

        assert_eq!(geocoder.calls.get(), 2);
    }
}
