//! Fetches the world-country dataset and normalizes it into the relational
//! store.
//!
//! The flow is fetch → [`staging::stage`] (pure, in memory) →
//! [`Importer::import`] (one transaction).

pub mod client;
pub mod config;
pub mod error;
pub mod importer;
pub mod overrides;
pub mod pipeline;
pub mod record;
pub mod report;
pub mod staging;

pub use client::CountriesClient;
pub use config::{DatasetSource, ImportConfig};
pub use error::IngestError;
pub use importer::Importer;
pub use overrides::{FieldOverride, OverrideTable};
pub use pipeline::run_import;
pub use report::{ImportReport, ImportStage};
