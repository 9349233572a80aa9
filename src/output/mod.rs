//! Output writers
//!
//! Every writer replaces the destination file, creating missing parent
//! directories first.

pub mod map;
pub mod report;

pub use map::{MapSettings, static_map_url};
pub use report::{ReportItem, report_items, write_csv_report, write_html_report};

use std::fs;
use std::path::Path;

use tracing::info;

use crate::models::FeatureCollection;
use crate::{GeopointsError, Result};

/// Pretty JSON with sorted keys and two-space indentation
pub fn render_geojson(collection: &FeatureCollection) -> serde_json::Result<String> {
    // Going through `Value` sorts object keys.
    let value = serde_json::to_value(collection)?;
    let mut doc = serde_json::to_string_pretty(&value)?;
    doc.push('\n');
    Ok(doc)
}

pub fn write_geojson(collection: &FeatureCollection, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let doc = render_geojson(collection).map_err(|e| GeopointsError::write(path, e.into()))?;
    write_file(path, doc.as_bytes())
}

pub(crate) fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| GeopointsError::write(path, e))?;
    }
    fs::write(path, contents).map_err(|e| GeopointsError::write(path, e))?;
    info!("Wrote {}.", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Feature, Geometry};
    use serde_json::{Map, Value};

    fn collection() -> FeatureCollection {
        let mut properties = Map::new();
        properties.insert("plums".to_string(), Value::from(5));
        properties.insert("name".to_string(), Value::from("123 Beach Rd"));
        properties.insert("black_doris".to_string(), Value::from(0));
        FeatureCollection {
            features: vec![Feature {
                geometry: Geometry::Point {
                    coordinates: [175.1, -36.79],
                },
                properties,
            }],
        }
    }

    #[test]
    fn test_render_geojson_sorted_and_indented() {
        let doc = render_geojson(&collection()).unwrap();
        let expected = r#"{
  "features": [
    {
      "geometry": {
        "coordinates": [
          175.1,
          -36.79
        ],
        "type": "Point"
      },
      "properties": {
        "black_doris": 0,
        "name": "123 Beach Rd",
        "plums": 5
      },
      "type": "Feature"
    }
  ],
  "type": "FeatureCollection"
}
"#;
        assert_eq!(doc, expected);
    }

    #[test]
    fn test_write_geojson_creates_parent_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("geocode.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "stale contents that are longer than nothing").unwrap();

        write_geojson(&FeatureCollection::default(), &path).unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["type"], "FeatureCollection");
        assert_eq!(written["features"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_write_into_missing_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("geocode.json");
        write_geojson(&collection(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_write_failure() {
        let dir = tempfile::tempdir().unwrap();
        // the destination is an existing directory
        let result = write_geojson(&collection(), dir.path());
        assert!(matches!(result, Err(GeopointsError::Write { .. })));
    }
}
