//! Database models and types.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Country row ready to be inserted. The continent is already resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCountry {
    pub name: String,
    pub official: String,
    pub code: String,
    pub independent: bool,
    pub flag: Option<String>,
    pub flag_png: Option<String>,
    pub continent_id: i64,
    pub area: f64,
    pub population: i64,
    pub map_url: String,
}

/// Country data stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Country {
    pub id: i64,
    pub name: String,
    pub official: String,
    pub code: String,
    pub indep: bool,
    pub flag: Option<String>,
    pub flag_png: Option<String>,
    pub continent: i64,
    pub area: f64,
    pub population: i64,
    pub map: String,
}

/// One line of a country listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CountrySummary {
    pub id: i64,
    pub name: String,
    pub area: f64,
    pub population: i64,
}

/// Everything the viewer shows for a single country.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountryCard {
    pub name: String,
    pub official: String,
    pub code: String,
    pub independent: bool,
    pub flag: Option<String>,
    pub flag_png: Option<String>,
    pub continent: String,
    pub area: f64,
    pub population: i64,
    pub map: String,
    pub capitals: Vec<String>,
    pub languages: Vec<String>,
    pub currencies: Vec<String>,
}

/// Row of the area/population export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AreaPopulationRow {
    pub id: i64,
    pub continent: i64,
    pub area: f64,
    pub population: i64,
}

/// Row counts of every table in the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreCounts {
    pub continents: i64,
    pub countries: i64,
    pub capitals: i64,
    pub languages: i64,
    pub currencies: i64,
    pub capital_links: i64,
    pub language_links: i64,
    pub currency_links: i64,
    pub borders: i64,
}

/// Ordering of country listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Alphabetical.
    #[default]
    Name,
    /// Largest first.
    Area,
    /// Most populous first.
    Population,
}

impl SortOrder {
    pub fn order_by(&self) -> &'static str {
        match self {
            SortOrder::Name => "c.name ASC",
            SortOrder::Area => "c.area DESC, c.name ASC",
            SortOrder::Population => "c.population DESC, c.name ASC",
        }
    }
}
