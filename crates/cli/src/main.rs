//! CLI for building and browsing the world-country store.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};
use worldtour_db::models::{AreaPopulationRow, CountrySummary, SortOrder};
use worldtour_db::{queries, DbPool};
use worldtour_ingestion::config::{DEFAULT_API_URL, DEFAULT_DATABASE_PATH};
use worldtour_ingestion::{run_import, DatasetSource, ImportConfig};
use worldtour_telemetry::{init_logging, report::write_json_report, LogFormat, Metrics};

#[derive(Parser)]
#[command(name = "worldtour")]
#[command(about = "Normalize the REST Countries dataset into SQLite and query it")]
struct Cli {
    /// Database path
    #[arg(long, global = true, env = "WORLDTOUR_DATABASE", default_value = DEFAULT_DATABASE_PATH)]
    database_path: PathBuf,

    /// Log filter (e.g. "info", "worldtour_ingestion=debug")
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit human-readable logs instead of JSON lines
    #[arg(long, global = true, default_value = "false")]
    text_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the dataset and rebuild the store from scratch
    Import {
        /// Endpoint returning the JSON array of countries
        #[arg(long, env = "WORLDTOUR_API_URL", default_value = DEFAULT_API_URL)]
        api_url: String,

        /// Read a saved JSON snapshot instead of calling the API
        #[arg(long, conflicts_with = "api_url")]
        input_file: Option<PathBuf>,

        /// Fetch timeout in seconds
        #[arg(long, default_value = "30")]
        timeout_seconds: u64,

        /// Skip the built-in source corrections
        #[arg(long, default_value = "false")]
        no_overrides: bool,

        /// Write the import report as JSON to this path
        #[arg(long)]
        report_output: Option<PathBuf>,

        /// Write Prometheus metrics text to this path
        #[arg(long)]
        metrics_output: Option<PathBuf>,
    },
    /// List continents
    Continents,
    /// List countries, optionally within one continent
    Countries {
        #[arg(long)]
        continent: Option<String>,

        #[arg(long, value_enum, default_value_t = SortArg::Name)]
        sort_by: SortArg,
    },
    /// Show everything known about one country
    Country { name: String },
    /// List countries where a language is spoken
    Language { name: String },
    /// List the neighbors a country declares
    Borders { name: String },
    /// Show row counts of every table
    Stats,
    /// Write id, continent, area and population of every country as CSV
    ExportCsv {
        #[arg(long, default_value = "area_pop_data.csv")]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Name,
    Area,
    Population,
}

impl From<SortArg> for SortOrder {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Name => SortOrder::Name,
            SortArg::Area => SortOrder::Area,
            SortArg::Population => SortOrder::Population,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let format = if cli.text_logs { LogFormat::Text } else { LogFormat::Json };
    init_logging(cli.log_level.as_deref(), format)?;

    match cli.command {
        Commands::Import {
            api_url,
            input_file,
            timeout_seconds,
            no_overrides,
            report_output,
            metrics_output,
        } => {
            let source = match input_file {
                Some(path) => DatasetSource::File(path),
                None => DatasetSource::Api { url: api_url },
            };
            let config = ImportConfig {
                source,
                database_path: cli.database_path,
                timeout: Duration::from_secs(timeout_seconds),
                apply_overrides: !no_overrides,
            };
            import(&config, report_output.as_deref(), metrics_output.as_deref()).await?;
        }
        command => {
            let db = open_existing(&cli.database_path).await?;
            browse(&db, command).await?;
            db.close().await;
        }
    }

    Ok(())
}

async fn import(
    config: &ImportConfig,
    report_output: Option<&Path>,
    metrics_output: Option<&Path>,
) -> anyhow::Result<()> {
    let metrics = Metrics::new()?;
    let result = run_import(config, &metrics).await;

    if let Some(path) = metrics_output {
        std::fs::write(path, metrics.gather()?)?;
    }
    let report = result?;

    for skipped in &report.borders_skipped {
        warn!("Skipped border {} -> {}", skipped.country, skipped.neighbor_code);
    }
    for rejected in &report.rejected {
        warn!("Rejected record {} ({:?}): {}", rejected.index, rejected.name, rejected.reason);
    }
    if let Some(path) = report_output {
        write_json_report(path, &report)?;
    }

    let counts = report.counts;
    println!(
        "Imported {} countries ({} continents, {} capitals, {} languages, {} currencies, {} borders)",
        counts.countries,
        counts.continents,
        counts.capitals,
        counts.languages,
        counts.currencies,
        counts.borders
    );
    println!(
        "Skipped {} borders, rejected {} of {} records",
        report.borders_skipped.len(),
        report.rejected.len(),
        report.records_received
    );
    Ok(())
}

async fn open_existing(path: &Path) -> anyhow::Result<DbPool> {
    if !path.exists() {
        anyhow::bail!(
            "no store at {}; run `worldtour import` first",
            path.display()
        );
    }
    DbPool::new(path).await
}

async fn browse(db: &DbPool, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Import { .. } => anyhow::bail!("import rebuilds the store; it does not browse it"),
        Commands::Continents => {
            for name in queries::continents(db).await? {
                println!("{name}");
            }
        }
        Commands::Countries { continent, sort_by } => {
            let rows = queries::countries(db, continent.as_deref(), sort_by.into()).await?;
            print_summaries(&rows);
        }
        Commands::Country { name } => match queries::country_card(db, &name).await? {
            Some(card) => {
                println!("{} {}", card.flag.as_deref().unwrap_or(""), card.name);
                println!("  Official:    {}", card.official);
                println!("  Code:        {}", card.code);
                println!("  Independent: {}", if card.independent { "yes" } else { "no" });
                println!("  Continent:   {}", card.continent);
                println!("  Capitals:    {}", card.capitals.join(", "));
                println!("  Languages:   {}", card.languages.join(", "));
                println!("  Currencies:  {}", card.currencies.join(", "));
                println!("  Population:  {}", card.population);
                println!("  Area:        {} km²", card.area);
                println!("  Map:         {}", card.map);
            }
            None => anyhow::bail!("no country named {name:?}"),
        },
        Commands::Language { name } => {
            let rows = queries::countries_speaking(db, &name).await?;
            print_summaries(&rows);
        }
        Commands::Borders { name } => {
            for neighbor in queries::neighbors(db, &name).await? {
                println!("{neighbor}");
            }
        }
        Commands::Stats => {
            let counts = queries::counts(db).await?;
            let rows = [
                ("Continents", counts.continents),
                ("Countries", counts.countries),
                ("Capitals", counts.capitals),
                ("Languages", counts.languages),
                ("Currencies", counts.currencies),
                ("Count_Cap_Jn", counts.capital_links),
                ("Count_Lang_Jn", counts.language_links),
                ("Count_Curr_Jn", counts.currency_links),
                ("Borders", counts.borders),
            ];
            for (table, count) in rows {
                println!("{table:<16} {count:>8}");
            }
        }
        Commands::ExportCsv { output } => {
            let rows = queries::area_population_rows(db).await?;
            write_area_population_csv(&output, &rows)?;
            info!("Exported {} countries to {}", rows.len(), output.display());
        }
    }
    Ok(())
}

fn print_summaries(rows: &[CountrySummary]) {
    for row in rows {
        println!("{:<40} {:>14} km² {:>14}", row.name, row.area, row.population);
    }
    println!("Total: {} countries", rows.len());
}

/// Headerless `id,continent,area,population` lines, one per country.
fn write_area_population_csv(path: &Path, rows: &[AreaPopulationRow]) -> anyhow::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_import_flags_parse() {
        let cli = Cli::try_parse_from([
            "worldtour",
            "--database-path",
            "/tmp/world.db",
            "import",
            "--input-file",
            "all.json",
            "--no-overrides",
        ])
        .unwrap();

        assert_eq!(cli.database_path, PathBuf::from("/tmp/world.db"));
        match cli.command {
            Commands::Import {
                input_file,
                no_overrides,
                timeout_seconds,
                ..
            } => {
                assert_eq!(input_file, Some(PathBuf::from("all.json")));
                assert!(no_overrides);
                assert_eq!(timeout_seconds, 30);
            }
            _ => panic!("expected import"),
        }
    }

    #[test]
    fn test_sort_flag_maps_to_order() {
        let cli = Cli::try_parse_from(["worldtour", "countries", "--sort-by", "population"]).unwrap();
        match cli.command {
            Commands::Countries { continent, sort_by } => {
                assert!(continent.is_none());
                assert_eq!(SortOrder::from(sort_by), SortOrder::Population);
            }
            _ => panic!("expected countries"),
        }
    }

    #[test]
    fn test_csv_export_has_no_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("area_pop_data.csv");
        let rows = vec![
            AreaPopulationRow {
                id: 1,
                continent: 1,
                area: 551_695.0,
                population: 67_391_582,
            },
            AreaPopulationRow {
                id: 2,
                continent: 2,
                area: 14_000_000.0,
                population: 1_000,
            },
        ];

        write_area_population_csv(&path, &rows).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines, vec!["1,1,551695.0,67391582", "2,2,14000000.0,1000"]);
    }
}
