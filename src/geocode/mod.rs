//! Geocoding gateway
//!
//! The record builder only talks to the [`Geocoder`] trait, so the HTTP
//! provider can be swapped or replaced by a scripted mock in tests.

pub mod google;

pub use google::GoogleGeocoder;

use thiserror::Error;

/// Failures talking to the geocoding provider.
///
/// A provider that simply has no match is not an error: see
/// [`Geocoder::resolve_address_lat_lng`].
#[derive(Error, Debug)]
pub enum GeocodeError {
    #[error("Network error: {message}")]
    Transport { message: String, retryable: bool },

    #[error("Provider returned HTTP {status}")]
    Http { status: u16 },

    #[error("Provider answered {status}: {}", message.as_deref().unwrap_or("no details"))]
    Provider {
        status: String,
        message: Option<String>,
    },
}

impl GeocodeError {
    /// Whether rerunning later could succeed without any config change
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            GeocodeError::Transport { retryable, .. } => *retryable,
            GeocodeError::Http { status } => *status == 429 || *status >= 500,
            GeocodeError::Provider { status, .. } => {
                matches!(status.as_str(), "OVER_QUERY_LIMIT" | "UNKNOWN_ERROR")
            }
        }
    }
}

pub trait Geocoder {
    /// Resolve a fully contextualized address to a raw `(lat, lng)` pair.
    ///
    /// `Ok(None)` means the provider had no usable match. The pair is not
    /// range-checked here.
    fn resolve_address_lat_lng(&self, address: &str) -> Result<Option<(f64, f64)>, GeocodeError>;
}
