//! Writes a staged import into the store.

use crate::error::{IngestError, IngestResult};
use crate::report::{ImportReport, ImportStage, SkippedBorder};
use crate::staging::{BorderClaims, StagedCountry, StagedImport};
use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::{info, warn};
use worldtour_db::models::NewCountry;
use worldtour_db::{queries, schema, store, DbPool, Dimension, Relation};
use worldtour_telemetry::Metrics;

/// Rebuilds the store from a [`StagedImport`].
pub struct Importer {
    db: DbPool,
    metrics: Metrics,
}

/// Outcome of the border resolution pass.
#[derive(Debug, Default)]
pub struct BorderOutcome {
    pub written: u64,
    pub skipped: Vec<SkippedBorder>,
}

impl Importer {
    pub fn new(db: DbPool, metrics: Metrics) -> Self {
        Self { db, metrics }
    }

    /// Drop and recreate the schema, then write every staged country, its
    /// associations and its borders in a single transaction.
    ///
    /// Any store error rolls the transaction back, leaving the previous store
    /// contents untouched.
    pub async fn import(&self, staged: &StagedImport) -> IngestResult<ImportReport> {
        let started_at = Utc::now();
        let mut stage = ImportStage::Fetched;
        info!(
            "Importing {} countries from {} records",
            staged.countries.len(),
            staged.records_received
        );

        let mut tx = self.db.begin().await.map_err(store_error(stage))?;

        schema::recreate(&mut tx).await.map_err(store_error(stage))?;
        stage = advance(stage, ImportStage::SchemaCreated);

        let mut country_ids = Vec::with_capacity(staged.countries.len());
        for country in &staged.countries {
            let id = insert_country(&mut tx, country)
                .await
                .map_err(store_error(stage))?;
            country_ids.push(id);
        }
        self.metrics.inc_countries_imported(country_ids.len() as u64);
        stage = advance(stage, ImportStage::CountriesLoaded);

        for (country, id) in staged.countries.iter().zip(&country_ids) {
            self.write_relations(&mut tx, *id, country)
                .await
                .map_err(store_error(stage))?;
        }
        stage = advance(stage, ImportStage::AssociationsLoaded);

        let borders = resolve_borders(&mut tx, &staged.borders)
            .await
            .map_err(store_error(stage))?;
        self.metrics.inc_borders_written(borders.written);
        self.metrics.inc_borders_skipped(borders.skipped.len() as u64);
        stage = advance(stage, ImportStage::BordersResolved);

        tx.commit()
            .await
            .map_err(|e| store_error(stage)(e.into()))?;
        stage = advance(stage, ImportStage::Committed);

        self.metrics.inc_records_rejected(staged.rejected.len() as u64);
        let counts = queries::counts(&self.db).await.map_err(store_error(stage))?;

        info!(
            "Import committed: {} countries, {} borders written, {} borders skipped, {} records rejected",
            counts.countries,
            borders.written,
            borders.skipped.len(),
            staged.rejected.len()
        );

        Ok(ImportReport {
            started_at,
            finished_at: Utc::now(),
            stage,
            records_received: staged.records_received,
            overrides_applied: staged.overrides_applied.clone(),
            counts,
            borders_skipped: borders.skipped,
            rejected: staged.rejected.clone(),
        })
    }

    async fn write_relations(
        &self,
        conn: &mut SqliteConnection,
        country_id: i64,
        country: &StagedCountry,
    ) -> anyhow::Result<()> {
        let lists = [
            (Relation::Capital, &country.capitals),
            (Relation::Language, &country.languages),
            (Relation::Currency, &country.currencies),
        ];
        for (relation, names) in lists {
            let written = store::write_associations(conn, relation, country_id, names).await?;
            self.metrics
                .inc_association_rows(relation.column(), written);
        }
        Ok(())
    }
}

/// Resolve the continent and insert one country row.
async fn insert_country(conn: &mut SqliteConnection, country: &StagedCountry) -> anyhow::Result<i64> {
    let continent_id = store::resolve_entity(conn, Dimension::Continent, &country.continent).await?;
    let row = NewCountry {
        name: country.name.clone(),
        official: country.official.clone(),
        code: country.code.clone(),
        independent: country.independent,
        flag: country.flag.clone(),
        flag_png: country.flag_png.clone(),
        continent_id,
        area: country.area,
        population: country.population,
        map_url: country.map_url.clone(),
    };
    store::insert_country(conn, &row).await
}

/// Second pass: turn neighbor codes into directed border rows.
///
/// Must run after every country row exists. A code that matches no country
/// is skipped and reported; the pass continues.
pub async fn resolve_borders(
    conn: &mut SqliteConnection,
    claims: &[BorderClaims],
) -> anyhow::Result<BorderOutcome> {
    let mut outcome = BorderOutcome::default();

    for claim in claims {
        let Some(country_id) = store::country_id_by_name(conn, &claim.country).await? else {
            warn!("Border claims from unknown country {:?} ignored", claim.country);
            outcome.skipped.extend(claim.neighbors.iter().map(|code| SkippedBorder {
                country: claim.country.clone(),
                neighbor_code: code.clone(),
            }));
            continue;
        };

        for code in &claim.neighbors {
            match store::country_id_by_code(conn, code).await? {
                Some(neighbor_id) => {
                    store::insert_border(conn, country_id, neighbor_id).await?;
                    outcome.written += 1;
                }
                None => {
                    warn!("Skipping border {} -> {}: no country with that code", claim.country, code);
                    outcome.skipped.push(SkippedBorder {
                        country: claim.country.clone(),
                        neighbor_code: code.clone(),
                    });
                }
            }
        }
    }

    Ok(outcome)
}

fn advance(from: ImportStage, to: ImportStage) -> ImportStage {
    info!("Import stage {} -> {}", from, to);
    to
}

fn store_error(stage: ImportStage) -> impl Fn(anyhow::Error) -> IngestError {
    move |source| IngestError::Store { stage, source }
}
