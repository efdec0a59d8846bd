//! In-memory staging of source records.
//!
//! Staging is a pure function of the source records and the override table:
//! it applies corrections, validates required fields, substitutes the "None"
//! sentinel for missing relations and sets border claims aside for the
//! second pass. Nothing here touches the store.

use crate::overrides::OverrideTable;
use crate::record::CountryRecord;
use crate::report::RejectedRecord;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Placeholder name used when a record has no data for a relation.
pub const NO_DATA: &str = "None";

/// A validated country, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedCountry {
    pub name: String,
    pub official: String,
    pub code: String,
    pub independent: bool,
    pub flag: Option<String>,
    pub flag_png: Option<String>,
    pub continent: String,
    pub area: f64,
    pub population: i64,
    pub map_url: String,
    pub capitals: Vec<String>,
    pub languages: Vec<String>,
    pub currencies: Vec<String>,
}

/// Neighbor codes listed by one country, resolved after every country exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorderClaims {
    pub country: String,
    pub neighbors: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct StagedImport {
    pub records_received: usize,
    pub countries: Vec<StagedCountry>,
    pub borders: Vec<BorderClaims>,
    pub rejected: Vec<RejectedRecord>,
    /// Countries whose record matched a correction.
    pub overrides_applied: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("record does not decode: {0}")]
    Decode(String),
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("invalid area {0}")]
    InvalidArea(f64),
    #[error("negative population {0}")]
    NegativePopulation(i64),
    #[error("duplicate {field} {value:?}")]
    Duplicate { field: &'static str, value: String },
}

/// Stage every source record.
///
/// Records that fail validation are listed in `rejected` and contribute no
/// country and no border claims; the rest are kept in source order.
pub fn stage(records: &[Value], overrides: &OverrideTable) -> StagedImport {
    let mut staged = StagedImport {
        records_received: records.len(),
        ..StagedImport::default()
    };
    let mut seen = UniqueFields::default();

    for (index, value) in records.iter().enumerate() {
        let mut record = match CountryRecord::from_value(value.clone()) {
            Ok(record) => record,
            Err(e) => {
                reject(&mut staged, index, display_name(value), RecordError::Decode(e.to_string()));
                continue;
            }
        };

        if overrides.apply(&mut record) {
            if let Some(name) = record.common_name() {
                staged.overrides_applied.push(name.to_string());
            }
        }

        let name = record.common_name().map(str::to_owned);
        match stage_record(record).and_then(|staged_record| seen.admit(staged_record)) {
            Ok((country, borders)) => {
                if let Some(neighbors) = borders {
                    staged.borders.push(BorderClaims {
                        country: country.name.clone(),
                        neighbors,
                    });
                }
                staged.countries.push(country);
            }
            Err(e) => reject(&mut staged, index, name, e),
        }
    }

    debug!(
        "Staged {} countries, {} border lists, {} rejected",
        staged.countries.len(),
        staged.borders.len(),
        staged.rejected.len()
    );
    staged
}

/// Validate one (already corrected) record.
///
/// # Returns
/// The staged country and its border claims, if it declared any
pub fn stage_record(
    record: CountryRecord,
) -> Result<(StagedCountry, Option<Vec<String>>), RecordError> {
    let name = record
        .common_name()
        .ok_or(RecordError::MissingField("name.common"))?
        .to_string();
    let official = record
        .official_name()
        .ok_or(RecordError::MissingField("name.official"))?
        .to_string();
    let map_url = record
        .map_url()
        .ok_or(RecordError::MissingField("maps.googleMaps"))?
        .to_string();
    let flag_png = record.flag_png().map(str::to_owned);

    let code = record.cca3.ok_or(RecordError::MissingField("cca3"))?;
    let continent = record
        .continents
        .and_then(|c| c.into_iter().next())
        .ok_or(RecordError::MissingField("continents"))?;

    let area = record.area.ok_or(RecordError::MissingField("area"))?;
    if !area.is_finite() || area < 0.0 {
        return Err(RecordError::InvalidArea(area));
    }
    let population = record
        .population
        .ok_or(RecordError::MissingField("population"))?;
    if population < 0 {
        return Err(RecordError::NegativePopulation(population));
    }

    let borders = record.borders.filter(|b| !b.is_empty());

    let country = StagedCountry {
        name,
        official,
        code,
        independent: record.independent.unwrap_or(true),
        flag: record.flag,
        flag_png,
        continent,
        area,
        population,
        map_url,
        capitals: or_no_data(record.capital),
        languages: or_no_data(record.languages),
        currencies: or_no_data(record.currencies),
    };
    Ok((country, borders))
}

fn or_no_data(names: Option<Vec<String>>) -> Vec<String> {
    match names {
        Some(names) if !names.is_empty() => names,
        _ => vec![NO_DATA.to_string()],
    }
}

fn display_name(value: &Value) -> Option<String> {
    value
        .pointer("/name/common")
        .and_then(Value::as_str)
        .map(str::to_owned)
}

fn reject(staged: &mut StagedImport, index: usize, name: Option<String>, error: RecordError) {
    warn!("Rejected source record {} ({:?}): {}", index, name, error);
    staged.rejected.push(RejectedRecord {
        index,
        name,
        reason: error.to_string(),
    });
}

/// Values that must be unique across the Countries table.
#[derive(Default)]
struct UniqueFields {
    names: HashSet<String>,
    officials: HashSet<String>,
    codes: HashSet<String>,
    maps: HashSet<String>,
}

impl UniqueFields {
    fn admit(
        &mut self,
        staged: (StagedCountry, Option<Vec<String>>),
    ) -> Result<(StagedCountry, Option<Vec<String>>), RecordError> {
        let country = &staged.0;
        let checks = [
            ("name", &self.names, &country.name),
            ("official name", &self.officials, &country.official),
            ("code", &self.codes, &country.code),
            ("map URL", &self.maps, &country.map_url),
        ];
        for (field, seen, value) in checks {
            if seen.contains(value) {
                return Err(RecordError::Duplicate {
                    field,
                    value: value.clone(),
                });
            }
        }

        self.names.insert(country.name.clone());
        self.officials.insert(country.official.clone());
        self.codes.insert(country.code.clone());
        self.maps.insert(country.map_url.clone());
        Ok(staged)
    }
}
