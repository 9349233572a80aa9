//! Batch geocoding run
//!
//! Rows are processed strictly one at a time, in input order. After every
//! geocoder request the run sleeps for a fixed delay; this is politeness
//! towards the provider, not rate limiting.

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::assemble::{Assembly, Unresolved, UnresolvedReason, assemble};
use crate::config::{GeopointsConfig, OutputFormat, PipelineConfig};
use crate::geocode::Geocoder;
use crate::loader::{InputRow, load_rows};
use crate::models::{FeatureCollection, LocationRecord, MissReason};
use crate::output::{self, MapSettings};
use crate::record_builder::{BuildError, RecordBuilder};
use crate::{GeopointsError, Result};

/// Everything a run produced, in input order
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Located and unlocated records
    pub records: Vec<LocationRecord>,
    /// Located records as GeoJSON features
    pub collection: FeatureCollection,
    /// Addresses that did not end up on the map: unlocated records first,
    /// then rows rejected for a bad attribute
    pub unresolved: Vec<Unresolved>,
    /// Rows without an address
    pub skipped_rows: usize,
}

impl RunSummary {
    #[must_use]
    pub fn located_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_located()).count()
    }
}

pub struct Pipeline<'a, G: Geocoder + ?Sized> {
    config: &'a PipelineConfig,
    throttle: Duration,
    geocoder: &'a G,
}

impl<'a, G: Geocoder + ?Sized> Pipeline<'a, G> {
    pub fn new(config: &'a PipelineConfig, throttle: Duration, geocoder: &'a G) -> Self {
        Self {
            config,
            throttle,
            geocoder,
        }
    }

    /// Process `rows`, printing one status line per address to `out`.
    ///
    /// A geocoder failure aborts the run; no partial summary is returned.
    #[instrument(skip_all, fields(rows = rows.len()))]
    pub fn run(&self, rows: &[InputRow], out: &mut dyn Write) -> Result<RunSummary> {
        let builder = RecordBuilder::new(
            &self.config.attribute_fields,
            &self.config.context_suffix,
            self.geocoder,
        );
        let address_column = self.config.address_column.trim();
        let mut records = Vec::new();
        let mut rejected = Vec::new();
        let mut skipped_rows = 0;

        for row in rows {
            let address = row
                .find_by(|header| header.trim() == address_column)
                .unwrap_or("");
            if address.is_empty() {
                skipped_rows += 1;
                continue;
            }

            match builder.build(address, row) {
                Ok(record) => {
                    status_line(out, &record_status(&record))?;
                    records.push(record);
                    self.pause();
                }
                Err(BuildError::Attribute(err)) => {
                    warn!("Skipping {}: {}", address, err);
                    status_line(
                        out,
                        &format!("{} : invalid attribute {}={:?}", address, err.field, err.value),
                    )?;
                    rejected.push(Unresolved::invalid_attribute(address, err));
                }
                Err(BuildError::Geocode(err)) => return Err(err.into()),
            }
        }

        let processed = records.len() + rejected.len();
        let Assembly {
            collection,
            mut unresolved,
        } = assemble(&records);
        unresolved.extend(rejected);
        let summary = RunSummary {
            records,
            collection,
            unresolved,
            skipped_rows,
        };

        info!(
            "Processed {} addresses: {} located, {} unresolved, {} rows without address",
            processed,
            summary.located_count(),
            summary.unresolved.len(),
            summary.skipped_rows
        );
        Ok(summary)
    }

    fn pause(&self) {
        if !self.throttle.is_zero() {
            thread::sleep(self.throttle);
        }
    }
}

/// Load, geocode, write the configured document and print the report.
pub fn execute<G: Geocoder + ?Sized>(
    config: &GeopointsConfig,
    geocoder: &G,
) -> Result<RunSummary> {
    let mut stdout = io::stdout().lock();
    execute_to(config, geocoder, &mut stdout)
}

/// [`execute`] with the status lines and report sent to `out`
pub fn execute_to<G: Geocoder + ?Sized>(
    config: &GeopointsConfig,
    geocoder: &G,
    out: &mut dyn Write,
) -> Result<RunSummary> {
    let pipeline_config = &config.pipeline;
    let rows = load_rows(&pipeline_config.input_path)?;

    let throttle = Duration::from_millis(config.geocoding.delay_ms);
    let summary = Pipeline::new(pipeline_config, throttle, geocoder).run(&rows, out)?;

    let destination = pipeline_config.resolved_output_path();
    match pipeline_config.format {
        OutputFormat::Geojson => {
            output::write_geojson(&summary.collection, &destination)?;
        }
        OutputFormat::Csv => {
            let items = output::report_items(&summary.records, MapSettings::from(&config.report));
            output::write_csv_report(&items, &destination)?;
        }
        OutputFormat::Html => {
            let items = output::report_items(&summary.records, MapSettings::from(&config.report));
            output::write_html_report(&items, &config.report.template_path, &destination)?;
        }
    }
    status_line(out, &format!("Wrote {}.", destination.display()))?;

    print_unresolved(out, &summary.unresolved)?;
    Ok(summary)
}

/// Final list of addresses that could not be placed
pub fn print_unresolved(out: &mut dyn Write, unresolved: &[Unresolved]) -> Result<()> {
    status_line(out, "")?;
    status_line(out, "* Unresolved:")?;
    if unresolved.is_empty() {
        status_line(out, "  (none)")?;
    }
    for entry in unresolved {
        let line = match &entry.reason {
            UnresolvedReason::NoMatch => format!("  {}", entry.name),
            UnresolvedReason::OutOfRange { latitude, longitude } => {
                format!("  {} (out of range: {latitude}, {longitude})", entry.name)
            }
            UnresolvedReason::InvalidAttribute { field, value } => {
                format!("  {} (invalid {field}: {value:?})", entry.name)
            }
        };
        status_line(out, &line)?;
    }
    Ok(())
}

fn record_status(record: &LocationRecord) -> String {
    match (record.coordinates(), record.miss_reason()) {
        (Some(c), _) => format!(
            "{} : [{}, {}]",
            record.contextualized_address, c.latitude, c.longitude
        ),
        (None, Some(MissReason::OutOfRange { latitude, longitude })) => format!(
            "{} : out of range ({latitude}, {longitude})",
            record.contextualized_address
        ),
        (None, _) => format!("{} : not located", record.contextualized_address),
    }
}

fn status_line(out: &mut dyn Write, line: &str) -> Result<()> {
    writeln!(out, "{line}").map_err(|e| GeopointsError::write("<stdout>", e))
}
