//! Import settings collected from the command line.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://restcountries.com/v3.1/all";
pub const DEFAULT_DATABASE_PATH: &str = "countries.db";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the country records come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    /// One HTTP GET returning the JSON array.
    Api { url: String },
    /// A saved copy of that JSON array.
    File(PathBuf),
}

impl Default for DatasetSource {
    fn default() -> Self {
        DatasetSource::Api {
            url: DEFAULT_API_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub source: DatasetSource,
    pub database_path: PathBuf,
    pub timeout: Duration,
    /// Apply the built-in source corrections.
    pub apply_overrides: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            source: DatasetSource::default(),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            timeout: DEFAULT_TIMEOUT,
            apply_overrides: true,
        }
    }
}
