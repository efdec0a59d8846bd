//! End-to-end import: fetch, stage, write.

use crate::client::{load_snapshot, CountriesClient};
use crate::config::{DatasetSource, ImportConfig};
use crate::error::{IngestError, IngestResult};
use crate::importer::Importer;
use crate::overrides::OverrideTable;
use crate::report::{ImportReport, ImportStage};
use crate::staging::stage;
use tracing::info;
use worldtour_db::DbPool;
use worldtour_telemetry::Metrics;

/// Run one full import as described by `config`.
///
/// The dataset is fetched before the database is opened, so a fetch failure
/// leaves the database file untouched.
pub async fn run_import(config: &ImportConfig, metrics: &Metrics) -> IngestResult<ImportReport> {
    let records = match &config.source {
        DatasetSource::Api { url } => {
            CountriesClient::new(url, config.timeout, metrics.clone())?
                .fetch_countries()
                .await?
        }
        DatasetSource::File(path) => load_snapshot(path)?,
    };

    let overrides = if config.apply_overrides {
        OverrideTable::builtin()
    } else {
        OverrideTable::empty()
    };
    let staged = stage(&records, &overrides);

    let db = DbPool::new(&config.database_path)
        .await
        .map_err(|source| IngestError::Store {
            stage: ImportStage::Fetched,
            source,
        })?;
    let report = Importer::new(db.clone(), metrics.clone()).import(&staged).await;
    db.close().await;

    let report = report?;
    info!(
        "Store at {} rebuilt from {} records",
        config.database_path.display(),
        report.records_received
    );
    Ok(report)
}
