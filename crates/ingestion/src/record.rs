//! Per-country records as delivered by the REST Countries API.
//!
//! Every field is optional at this level; required fields are enforced when a
//! record is staged. Name maps (`languages`, `currencies`) are flattened to
//! their names in source order.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CountryRecord {
    pub name: Option<RecordName>,
    pub cca3: Option<String>,
    pub independent: Option<bool>,
    pub capital: Option<Vec<String>>,
    #[serde(default, deserialize_with = "currency_names")]
    pub currencies: Option<Vec<String>>,
    #[serde(default, deserialize_with = "language_names")]
    pub languages: Option<Vec<String>>,
    pub continents: Option<Vec<String>>,
    pub area: Option<f64>,
    pub population: Option<i64>,
    pub flag: Option<String>,
    pub flags: Option<Flags>,
    pub maps: Option<Maps>,
    pub borders: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RecordName {
    pub common: Option<String>,
    pub official: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Flags {
    pub png: Option<String>,
    pub svg: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Maps {
    #[serde(rename = "googleMaps")]
    pub google_maps: Option<String>,
    #[serde(rename = "openStreetMaps")]
    pub open_street_maps: Option<String>,
}

impl CountryRecord {
    /// Decode one element of the source array.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn common_name(&self) -> Option<&str> {
        self.name.as_ref().and_then(|n| n.common.as_deref())
    }

    pub fn official_name(&self) -> Option<&str> {
        self.name.as_ref().and_then(|n| n.official.as_deref())
    }

    pub fn map_url(&self) -> Option<&str> {
        self.maps.as_ref().and_then(|m| m.google_maps.as_deref())
    }

    pub fn set_map_url(&mut self, url: String) {
        self.maps.get_or_insert_with(Maps::default).google_maps = Some(url);
    }

    pub fn flag_png(&self) -> Option<&str> {
        self.flags.as_ref().and_then(|f| f.png.as_deref())
    }
}

// {"eng": "English", "hin": "Hindi"} -> ["English", "Hindi"]
fn language_names<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let map: Option<Map<String, Value>> = Option::deserialize(deserializer)?;
    Ok(map.map(|m| {
        m.into_iter()
            .filter_map(|(_, v)| v.as_str().map(str::to_owned))
            .collect()
    }))
}

// {"EUR": {"name": "Euro", "symbol": "€"}} -> ["Euro"]
fn currency_names<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let map: Option<Map<String, Value>> = Option::deserialize(deserializer)?;
    Ok(map.map(|m| {
        m.into_iter()
            .filter_map(|(_, v)| v.get("name").and_then(Value::as_str).map(str::to_owned))
            .collect()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decodes_nested_fields() {
        let record = CountryRecord::from_value(json!({
            "name": {"common": "Belgium", "official": "Kingdom of Belgium"},
            "cca3": "BEL",
            "independent": true,
            "capital": ["Brussels"],
            "currencies": {"EUR": {"name": "Euro", "symbol": "€"}},
            "languages": {"deu": "German", "fra": "French", "nld": "Dutch"},
            "continents": ["Europe"],
            "area": 30528.0,
            "population": 11555997,
            "flag": "🇧🇪",
            "flags": {"png": "https://flagcdn.com/w320/be.png", "svg": "https://flagcdn.com/be.svg"},
            "maps": {"googleMaps": "https://goo.gl/maps/UQQzat85TCtPRXAL8"},
            "borders": ["FRA", "DEU", "LUX", "NLD"]
        }))
        .unwrap();

        assert_eq!(record.common_name(), Some("Belgium"));
        assert_eq!(record.official_name(), Some("Kingdom of Belgium"));
        assert_eq!(record.currencies, Some(vec!["Euro".to_string()]));
        assert_eq!(
            record.languages,
            Some(vec!["German".to_string(), "French".to_string(), "Dutch".to_string()])
        );
        assert_eq!(record.map_url(), Some("https://goo.gl/maps/UQQzat85TCtPRXAL8"));
        assert_eq!(record.flag_png(), Some("https://flagcdn.com/w320/be.png"));
        assert_eq!(record.borders.as_ref().map(Vec::len), Some(4));
    }

    #[test]
    fn test_name_maps_keep_source_order() {
        let record = CountryRecord::from_value(json!({
            "languages": {"zho": "Chinese", "eng": "English", "msa": "Malay", "tam": "Tamil"},
            "currencies": {"USD": {"name": "United States dollar"}, "BND": {"name": "Brunei dollar"}}
        }))
        .unwrap();

        assert_eq!(
            record.languages,
            Some(vec![
                "Chinese".to_string(),
                "English".to_string(),
                "Malay".to_string(),
                "Tamil".to_string()
            ])
        );
        assert_eq!(
            record.currencies,
            Some(vec!["United States dollar".to_string(), "Brunei dollar".to_string()])
        );
    }

    #[test]
    fn test_missing_keys_decode_as_none() {
        let record = CountryRecord::from_value(json!({
            "name": {"common": "Antarctica", "official": "Antarctica"}
        }))
        .unwrap();

        assert!(record.capital.is_none());
        assert!(record.languages.is_none());
        assert!(record.currencies.is_none());
        assert!(record.independent.is_none());
        assert!(record.borders.is_none());
    }

    #[test]
    fn test_wrong_field_type_is_a_decode_error() {
        let result = CountryRecord::from_value(json!({"area": "very large"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_set_map_url_creates_maps() {
        let mut record = CountryRecord::default();
        record.set_map_url("https://maps.example/x".to_string());
        assert_eq!(record.map_url(), Some("https://maps.example/x"));
    }
}
