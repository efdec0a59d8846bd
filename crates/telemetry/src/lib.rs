//! Logging, metrics and run reports for the country importer.

pub mod logging;
pub mod metrics;
pub mod report;

pub use logging::{init_logging, LogFormat};
pub use metrics::Metrics;
