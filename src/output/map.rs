//! Static map image references
//!
//! Only the URL is built; the image itself is never fetched.

use crate::config::ReportConfig;
use crate::models::Coordinates;

const STATIC_MAP_BASE: &str = "http://maps.googleapis.com/maps/api/staticmap";

/// Image size and zoom of the embedded map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapSettings {
    pub width: u32,
    pub height: u32,
    pub zoom: u8,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            width: 150,
            height: 150,
            zoom: 12,
        }
    }
}

impl From<&ReportConfig> for MapSettings {
    fn from(config: &ReportConfig) -> Self {
        Self {
            width: config.map_width,
            height: config.map_height,
            zoom: config.map_zoom,
        }
    }
}

/// Roadmap centred on `coordinates` with a red marker on the point itself
#[must_use]
pub fn static_map_url(coordinates: &Coordinates, settings: MapSettings) -> String {
    let loc = format!("{},{}", coordinates.latitude, coordinates.longitude);
    format!(
        "{STATIC_MAP_BASE}?center={loc}&zoom={}&scale=false&size={}x{}\
         &maptype=roadmap&format=png&visual_refresh=true\
         &markers=size:mid%7Ccolor:0xff0000%7Clabel:%7C{loc}",
        settings.zoom, settings.width, settings.height
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_map_url_defaults() {
        let coordinates = Coordinates::new(-36.79, 175.1).unwrap();
        assert_eq!(
            static_map_url(&coordinates, MapSettings::default()),
            "http://maps.googleapis.com/maps/api/staticmap?center=-36.79,175.1&zoom=12\
             &scale=false&size=150x150&maptype=roadmap&format=png&visual_refresh=true\
             &markers=size:mid%7Ccolor:0xff0000%7Clabel:%7C-36.79,175.1"
        );
    }

    #[test]
    fn test_static_map_url_custom_size() {
        let coordinates = Coordinates::new(1.5, 2.5).unwrap();
        let settings = MapSettings {
            width: 300,
            height: 200,
            zoom: 15,
        };
        let url = static_map_url(&coordinates, settings);
        assert!(url.contains("zoom=15"));
        assert!(url.contains("size=300x200"));
    }

    #[test]
    fn test_settings_from_config() {
        let settings = MapSettings::from(&ReportConfig::default());
        assert_eq!(settings, MapSettings::default());
    }
}
