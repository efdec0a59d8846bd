//! Import progress and the summary handed back to the caller.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use worldtour_db::models::StoreCounts;

/// Progress of one import. Each stage's work runs against a freshly created
/// schema inside one transaction; nothing is visible before `Committed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStage {
    Fetched,
    SchemaCreated,
    CountriesLoaded,
    AssociationsLoaded,
    BordersResolved,
    Committed,
}

impl fmt::Display for ImportStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ImportStage::Fetched => "FETCHED",
            ImportStage::SchemaCreated => "SCHEMA_CREATED",
            ImportStage::CountriesLoaded => "COUNTRIES_LOADED",
            ImportStage::AssociationsLoaded => "ASSOCIATIONS_LOADED",
            ImportStage::BordersResolved => "BORDERS_RESOLVED",
            ImportStage::Committed => "COMMITTED",
        };
        f.write_str(text)
    }
}

/// A border claim that named no known country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedBorder {
    pub country: String,
    pub neighbor_code: String,
}

/// A source record that could not be staged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRecord {
    /// Position in the source array.
    pub index: usize,
    pub name: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub stage: ImportStage,
    pub records_received: usize,
    pub overrides_applied: Vec<String>,
    pub counts: StoreCounts,
    pub borders_skipped: Vec<SkippedBorder>,
    pub rejected: Vec<RejectedRecord>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.borders_skipped.is_empty() && self.rejected.is_empty()
    }
}
