//! Tabular and HTML reports covering every processed address

use std::path::Path;

use minijinja::{Environment, context, path_loader};
use serde::Serialize;
use tracing::debug;

use super::{map::MapSettings, map::static_map_url, write_file};
use crate::models::LocationRecord;
use crate::{GeopointsError, Result};

/// One report line. Fields are declared in sorted order, which is also the
/// CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportItem {
    /// Contextualized address as sent to the geocoder
    pub address: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// Static map URL, only for located addresses
    pub map: Option<String>,
}

impl ReportItem {
    #[must_use]
    pub fn from_record(record: &LocationRecord, settings: MapSettings) -> Self {
        Self {
            address: record.contextualized_address.clone(),
            lat: record.latitude(),
            lng: record.longitude(),
            map: record.coordinates().map(|c| static_map_url(&c, settings)),
        }
    }
}

#[must_use]
pub fn report_items(records: &[LocationRecord], settings: MapSettings) -> Vec<ReportItem> {
    records
        .iter()
        .map(|record| ReportItem::from_record(record, settings))
        .collect()
}

/// Render `items` as CSV with a header row. Unlocated items leave `lat`,
/// `lng` and `map` empty.
pub fn render_csv(items: &[ReportItem]) -> std::result::Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(vec![]);
    if items.is_empty() {
        writer.write_record(["address", "lat", "lng", "map"])?;
    }
    for item in items {
        writer.serialize(item)?;
    }
    writer.flush()?;
    writer.into_inner().map_err(|e| e.into_error().into())
}

pub fn write_csv_report(items: &[ReportItem], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let bytes = render_csv(items).map_err(|e| GeopointsError::write(path, e.into()))?;
    write_file(path, &bytes)
}

/// Render `items` through the page template at `template_path`.
///
/// The template sees a single `items` list; each entry has `address`, `lat`,
/// `lng` and `map`.
pub fn render_html(items: &[ReportItem], template_path: impl AsRef<Path>) -> Result<String> {
    let template_path = template_path.as_ref();
    let dir = template_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = template_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            GeopointsError::template(format!("Invalid template path {}", template_path.display()))
        })?;

    debug!("Rendering {} from {}", name, dir.display());

    let mut env = Environment::new();
    env.set_loader(path_loader(dir));

    let template = env.get_template(name).map_err(|e| {
        GeopointsError::template(format!("Unable to load {}: {e}", template_path.display()))
    })?;

    template.render(context! { items => items }).map_err(|e| {
        GeopointsError::template(format!("Unable to render {}: {e}", template_path.display()))
    })
}

pub fn write_html_report(
    items: &[ReportItem],
    template_path: impl AsRef<Path>,
    path: impl AsRef<Path>,
) -> Result<()> {
    let doc = render_html(items, template_path)?;
    write_file(path.as_ref(), doc.as_bytes())
}
