//! Prometheus metrics for the country importer.

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

/// Metrics collector for one import run.
///
/// Each instance owns its registry, so several importers (or tests) can live
/// in the same process.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    countries_imported: IntCounter,
    association_rows: IntCounterVec,
    borders_written: IntCounter,
    borders_skipped: IntCounter,
    records_rejected: IntCounter,
    fetch_errors: IntCounter,
    fetch_latency: Histogram,
}

impl Metrics {
    /// Create a new metrics instance.
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let countries_imported = IntCounter::new(
            "worldtour_countries_imported_total",
            "Total number of country rows written",
        )?;
        let association_rows = IntCounterVec::new(
            Opts::new(
                "worldtour_association_rows_total",
                "Total number of junction rows written",
            ),
            &["relation"],
        )?;
        let borders_written = IntCounter::new(
            "worldtour_borders_written_total",
            "Total number of border rows written",
        )?;
        let borders_skipped = IntCounter::new(
            "worldtour_borders_skipped_total",
            "Total number of border claims naming an unknown country code",
        )?;
        let records_rejected = IntCounter::new(
            "worldtour_records_rejected_total",
            "Total number of source records that failed validation",
        )?;
        let fetch_errors = IntCounter::new(
            "worldtour_fetch_errors_total",
            "Total number of failed dataset fetches",
        )?;
        let fetch_latency = Histogram::with_opts(HistogramOpts::new(
            "worldtour_fetch_latency_seconds",
            "Dataset fetch latency in seconds",
        ))?;

        registry.register(Box::new(countries_imported.clone()))?;
        registry.register(Box::new(association_rows.clone()))?;
        registry.register(Box::new(borders_written.clone()))?;
        registry.register(Box::new(borders_skipped.clone()))?;
        registry.register(Box::new(records_rejected.clone()))?;
        registry.register(Box::new(fetch_errors.clone()))?;
        registry.register(Box::new(fetch_latency.clone()))?;

        Ok(Self {
            registry,
            countries_imported,
            association_rows,
            borders_written,
            borders_skipped,
            records_rejected,
            fetch_errors,
            fetch_latency,
        })
    }

    pub fn inc_countries_imported(&self, count: u64) {
        self.countries_imported.inc_by(count);
    }

    /// Add junction rows written for one relation kind ("capital", ...).
    pub fn inc_association_rows(&self, relation: &str, count: u64) {
        self.association_rows.with_label_values(&[relation]).inc_by(count);
    }

    pub fn inc_borders_written(&self, count: u64) {
        self.borders_written.inc_by(count);
    }

    pub fn inc_borders_skipped(&self, count: u64) {
        self.borders_skipped.inc_by(count);
    }

    pub fn inc_records_rejected(&self, count: u64) {
        self.records_rejected.inc_by(count);
    }

    pub fn inc_fetch_errors(&self) {
        self.fetch_errors.inc();
    }

    /// Record fetch latency.
    pub fn observe_fetch_latency(&self, duration_secs: f64) {
        self.fetch_latency.observe(duration_secs);
    }

    /// Get Prometheus metrics as a string.
    pub fn gather(&self) -> anyhow::Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
