//! Google Geocoding API client

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{GeocodeError, Geocoder};
use crate::config::GeocodingConfig;
use crate::{GeopointsError, Result};

/// Blocking client for the Google Geocoding JSON API
pub struct GoogleGeocoder {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

/// Geocoding response envelope
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodingResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    geometry: ResultGeometry,
}

#[derive(Debug, Deserialize)]
struct ResultGeometry {
    location: LatLng,
}

// Kept loose: a component may come back as a number or a numeric string.
#[derive(Debug, Deserialize)]
struct LatLng {
    lat: Value,
    lng: Value,
}

impl GoogleGeocoder {
    /// Create a new client
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds.into()))
            .user_agent(concat!("geopoints/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GeopointsError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
        })
    }

    fn request_url(&self, address: &str) -> String {
        let mut url = format!("{}?address={}", self.base_url, urlencoding::encode(address));
        if let Some(key) = &self.api_key {
            url.push_str("&key=");
            url.push_str(&urlencoding::encode(key));
        }
        url
    }
}

impl Geocoder for GoogleGeocoder {
    fn resolve_address_lat_lng(
        &self,
        address: &str,
    ) -> std::result::Result<Option<(f64, f64)>, GeocodeError> {
        debug!("Geocoding address: {}", address);

        let response = self
            .client
            .get(self.request_url(address))
            .send()
            .map_err(|e| transport_error("Geocoding request failed", &e))?;

        check_status(response.status())?;

        let body = response
            .text()
            .map_err(|e| transport_error("Failed to read geocoding response", &e))?;

        parse_response(&body)
    }
}

/// Only timeouts, failed connections and interrupted bodies are transient.
fn transport_error(context: &str, err: &reqwest::Error) -> GeocodeError {
    GeocodeError::Transport {
        message: format!("{context}: {err}"),
        retryable: err.is_timeout() || err.is_connect() || err.is_body(),
    }
}

fn check_status(status: StatusCode) -> std::result::Result<(), GeocodeError> {
    if status.is_success() {
        Ok(())
    } else {
        warn!("Geocoding request returned HTTP {}", status);
        Err(GeocodeError::Http {
            status: status.as_u16(),
        })
    }
}

/// Interpret a raw provider body.
///
/// A body that does not parse, or whose first match has no numeric pair, is
/// treated as "no match" rather than as an error.
fn parse_response(body: &str) -> std::result::Result<Option<(f64, f64)>, GeocodeError> {
    let response: GeocodingResponse = match serde_json::from_str(body) {
        Ok(response) => response,
        Err(e) => {
            warn!("Failed to parse geocoding response: {}", e);
            return Ok(None);
        }
    };

    match response.status.as_str() {
        "OK" => {
            let Some(first) = response.results.into_iter().next() else {
                return Ok(None);
            };
            let location = first.geometry.location;
            match (coordinate_component(&location.lat), coordinate_component(&location.lng)) {
                (Some(lat), Some(lng)) => Ok(Some((lat, lng))),
                _ => {
                    warn!(
                        "Geocoding result has non-numeric coordinates: {}, {}",
                        location.lat, location.lng
                    );
                    Ok(None)
                }
            }
        }
        "ZERO_RESULTS" => Ok(None),
        _ => Err(GeocodeError::Provider {
            status: response.status,
            message: response.error_message,
        }),
    }
}

fn coordinate_component(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const OK_BODY: &str = r#"{
        "results": [
            {
                "formatted_address": "123 Beach Rd, Waiheke Island 1081, New Zealand",
                "geometry": { "location": { "lat": -36.79, "lng": 175.1 } }
            },
            {
                "geometry": { "location": { "lat": 0.0, "lng": 0.0 } }
            }
        ],
        "status": "OK"
    }"#;

    #[test]
    fn test_parse_first_result() {
        assert_eq!(parse_response(OK_BODY).unwrap(), Some((-36.79, 175.1)));
    }

    #[test]
    fn test_parse_numeric_strings() {
        let body = r#"{"status":"OK","results":[{"geometry":{"location":{"lat":"-36.8","lng":" 175.0 "}}}]}"#;
        assert_eq!(parse_response(body).unwrap(), Some((-36.8, 175.0)));
    }

    #[test]
    fn test_parse_non_numeric_component_is_no_match() {
        let body = r#"{"status":"OK","results":[{"geometry":{"location":{"lat":"north","lng":175.0}}}]}"#;
        assert_eq!(parse_response(body).unwrap(), None);
    }

    #[test]
    fn test_parse_zero_results() {
        let body = r#"{"results":[],"status":"ZERO_RESULTS"}"#;
        assert_eq!(parse_response(body).unwrap(), None);
    }

    #[test]
    fn test_parse_garbage_is_no_match() {
        assert_eq!(parse_response("<html>busy</html>").unwrap(), None);
    }

    #[test]
    fn test_parse_request_denied() {
        let body = r#"{"results":[],"status":"REQUEST_DENIED","error_message":"The provided API key is invalid."}"#;
        let err = parse_response(body).unwrap_err();
        assert!(
            matches!(err, GeocodeError::Provider { ref status, .. } if status == "REQUEST_DENIED")
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_parse_over_query_limit_is_retryable() {
        let body = r#"{"results":[],"status":"OVER_QUERY_LIMIT"}"#;
        assert!(parse_response(body).unwrap_err().is_retryable());
    }

    #[rstest]
    #[case(StatusCode::OK, None)]
    #[case(StatusCode::TOO_MANY_REQUESTS, Some(true))]
    #[case(StatusCode::SERVICE_UNAVAILABLE, Some(true))]
    #[case(StatusCode::FORBIDDEN, Some(false))]
    #[case(StatusCode::NOT_FOUND, Some(false))]
    fn test_check_status(#[case] status: StatusCode, #[case] retryable: Option<bool>) {
        match (check_status(status), retryable) {
            (Ok(()), None) => {}
            (Err(err), Some(expected)) => {
                assert!(matches!(err, GeocodeError::Http { status: s } if s == status.as_u16()));
                assert_eq!(err.is_retryable(), expected);
            }
            (result, _) => panic!("unexpected result for {status}: {result:?}"),
        }
    }

    #[test]
    fn test_refused_connection_is_retryable_transport_error() {
        // nothing listens on port 1 locally
        let config = GeocodingConfig {
            base_url: "http://127.0.0.1:1/geocode/json".to_string(),
            timeout_seconds: 5,
            ..GeocodingConfig::default()
        };
        let client = GoogleGeocoder::new(&config).unwrap();

        let err = client.resolve_address_lat_lng("1 Ocean View Rd").unwrap_err();

        assert!(matches!(err, GeocodeError::Transport { retryable: true, .. }), "got {err:?}");
    }

    #[test]
    fn test_request_url_encodes_address_and_key() {
        let config = GeocodingConfig {
            api_key: Some("secret+key".to_string()),
            ..GeocodingConfig::default()
        };
        let client = GoogleGeocoder::new(&config).unwrap();
        assert_eq!(
            client.request_url("12 Ocean View Rd,Waiheke Island, NZ"),
            "https://maps.googleapis.com/maps/api/geocode/json?address=12%20Ocean%20View%20Rd%2CWaiheke%20Island%2C%20NZ&key=secret%2Bkey"
        );
    }
}
