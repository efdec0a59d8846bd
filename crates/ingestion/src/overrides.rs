//! Fixed corrections for known-bad source values.
//!
//! Corrections are data: adding one means adding an entry to
//! [`OverrideTable::builtin`], not a new branch in the importer. They are
//! applied to the decoded record before it is validated.

use crate::record::CountryRecord;
use std::collections::BTreeMap;
use tracing::debug;

const INDIA_LANGUAGES: [&str; 23] = [
    "Hindi", "English", "Assamese", "Bengali", "Bodo", "Dogri", "Gujarati", "Kannada", "Kashmiri",
    "Konkani", "Maithili", "Malayalam", "Manipuri", "Marathi", "Nepali", "Odia", "Punjabi",
    "Sanskrit", "Santali", "Sindhi", "Tamil", "Telugu", "Urdu",
];

/// Replacement values for one country. `None` leaves the source value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldOverride {
    pub map_url: Option<String>,
    pub area: Option<f64>,
    pub languages: Option<Vec<String>>,
}

impl FieldOverride {
    pub fn map_url(url: impl Into<String>) -> Self {
        Self {
            map_url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn area(area: f64) -> Self {
        Self {
            area: Some(area),
            ..Self::default()
        }
    }

    pub fn languages<I, S>(languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            languages: Some(languages.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }
}

/// Corrections keyed by the country's common name.
#[derive(Debug, Clone, Default)]
pub struct OverrideTable {
    entries: BTreeMap<String, FieldOverride>,
}

impl OverrideTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The corrections known to be needed for the REST Countries v3.1 data.
    pub fn builtin() -> Self {
        Self::empty()
            // Source map points at Hungary.
            .with(
                "Indonesia",
                FieldOverride::map_url("https://goo.gl/maps/w7M4eCTtCuFdSnJx9"),
            )
            // Source area is -1.
            .with("Svalbard and Jan Mayen", FieldOverride::area(61_399.0))
            // Source lists only three languages.
            .with("India", FieldOverride::languages(INDIA_LANGUAGES))
    }

    /// Add (or replace) the correction for `country`.
    pub fn with(mut self, country: impl Into<String>, fix: FieldOverride) -> Self {
        self.entries.insert(country.into(), fix);
        self
    }

    pub fn get(&self, country: &str) -> Option<&FieldOverride> {
        self.entries.get(country)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Apply the correction for this record's country, if any.
    ///
    /// # Returns
    /// True if the record matched an entry
    pub fn apply(&self, record: &mut CountryRecord) -> bool {
        let Some(fix) = record.common_name().and_then(|name| self.entries.get(name)) else {
            return false;
        };
        let fix = fix.clone();

        if let Some(url) = fix.map_url {
            record.set_map_url(url);
        }
        if let Some(area) = fix.area {
            record.area = Some(area);
        }
        if let Some(languages) = fix.languages {
            record.languages = Some(languages);
        }

        debug!("Applied source correction to {:?}", record.common_name());
        true
    }
}
