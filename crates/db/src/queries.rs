//! Read-only queries issued by the viewer once the store is built.

use crate::models::{AreaPopulationRow, Country, CountryCard, CountrySummary, SortOrder, StoreCounts};
use crate::schema::Relation;
use crate::DbPool;
use anyhow::Result;

/// All continent names, alphabetically.
pub async fn continents(db: &DbPool) -> Result<Vec<String>> {
    let names: Vec<String> = sqlx::query_scalar("SELECT name FROM Continents ORDER BY name")
        .fetch_all(db.pool())
        .await?;
    Ok(names)
}

/// List countries, optionally restricted to one continent.
///
/// # Arguments
/// * `continent` - Continent name, or `None` for the whole world
/// * `order` - Listing order
pub async fn countries(
    db: &DbPool,
    continent: Option<&str>,
    order: SortOrder,
) -> Result<Vec<CountrySummary>> {
    let rows = match continent {
        Some(continent) => {
            let sql = format!(
                "SELECT c.id, c.name, c.area, c.population FROM Countries c \
                 JOIN Continents co ON c.continent = co.id \
                 WHERE co.name = ? ORDER BY {}",
                order.order_by()
            );
            sqlx::query_as::<_, CountrySummary>(&sql)
                .bind(continent)
                .fetch_all(db.pool())
                .await?
        }
        None => {
            let sql = format!(
                "SELECT c.id, c.name, c.area, c.population FROM Countries c ORDER BY {}",
                order.order_by()
            );
            sqlx::query_as::<_, CountrySummary>(&sql)
                .fetch_all(db.pool())
                .await?
        }
    };
    Ok(rows)
}

pub async fn country_by_name(db: &DbPool, name: &str) -> Result<Option<Country>> {
    let country = sqlx::query_as::<_, Country>(
        r#"
        SELECT id, name, official, code, indep, flag, flag_png,
               continent, area, population, map
        FROM Countries WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(db.pool())
    .await?;
    Ok(country)
}

/// Names linked to a country through `relation`, first occurrence order,
/// without repeats.
pub async fn related_names(db: &DbPool, relation: Relation, country_id: i64) -> Result<Vec<String>> {
    let sql = format!(
        "SELECT d.name FROM {jn} j JOIN {dim} d ON j.{col} = d.id \
         WHERE j.country = ? ORDER BY j.id",
        jn = relation.junction_table(),
        dim = relation.dimension().table(),
        col = relation.column(),
    );
    let rows: Vec<String> = sqlx::query_scalar(&sql)
        .bind(country_id)
        .fetch_all(db.pool())
        .await?;

    let mut names: Vec<String> = Vec::with_capacity(rows.len());
    for name in rows {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    Ok(names)
}

/// General information card for one country, or `None` if no such country.
pub async fn country_card(db: &DbPool, name: &str) -> Result<Option<CountryCard>> {
    let Some(country) = country_by_name(db, name).await? else {
        return Ok(None);
    };

    let continent: String = sqlx::query_scalar("SELECT name FROM Continents WHERE id = ?")
        .bind(country.continent)
        .fetch_one(db.pool())
        .await?;

    let capitals = related_names(db, Relation::Capital, country.id).await?;
    let languages = related_names(db, Relation::Language, country.id).await?;
    let currencies = related_names(db, Relation::Currency, country.id).await?;

    Ok(Some(CountryCard {
        name: country.name,
        official: country.official,
        code: country.code,
        independent: country.indep,
        flag: country.flag,
        flag_png: country.flag_png,
        continent,
        area: country.area,
        population: country.population,
        map: country.map,
        capitals,
        languages,
        currencies,
    }))
}

/// Countries where `language` is spoken, alphabetically.
pub async fn countries_speaking(db: &DbPool, language: &str) -> Result<Vec<CountrySummary>> {
    let rows = sqlx::query_as::<_, CountrySummary>(
        r#"
        SELECT DISTINCT c.id, c.name, c.area, c.population
        FROM Countries c
        JOIN Count_Lang_Jn j ON j.country = c.id
        JOIN Languages l ON j.language = l.id
        WHERE l.name = ?
        ORDER BY c.name
        "#,
    )
    .bind(language)
    .fetch_all(db.pool())
    .await?;
    Ok(rows)
}

/// Countries that `name` lists as neighbors, alphabetically.
pub async fn neighbors(db: &DbPool, name: &str) -> Result<Vec<String>> {
    let names: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT DISTINCT n.name
        FROM Borders b
        JOIN Countries c ON b.country_1 = c.id
        JOIN Countries n ON b.country_2 = n.id
        WHERE c.name = ?
        ORDER BY n.name
        "#,
    )
    .bind(name)
    .fetch_all(db.pool())
    .await?;
    Ok(names)
}

/// Row counts of every table.
pub async fn counts(db: &DbPool) -> Result<StoreCounts> {
    let row: (i64, i64, i64, i64, i64, i64, i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            (SELECT COUNT(*) FROM Continents),
            (SELECT COUNT(*) FROM Countries),
            (SELECT COUNT(*) FROM Capitals),
            (SELECT COUNT(*) FROM Languages),
            (SELECT COUNT(*) FROM Currencies),
            (SELECT COUNT(*) FROM Count_Cap_Jn),
            (SELECT COUNT(*) FROM Count_Lang_Jn),
            (SELECT COUNT(*) FROM Count_Curr_Jn),
            (SELECT COUNT(*) FROM Borders)
        "#,
    )
    .fetch_one(db.pool())
    .await?;

    Ok(StoreCounts {
        continents: row.0,
        countries: row.1,
        capitals: row.2,
        languages: row.3,
        currencies: row.4,
        capital_links: row.5,
        language_links: row.6,
        currency_links: row.7,
        borders: row.8,
    })
}

/// `(id, continent, area, population)` for every country, by id.
pub async fn area_population_rows(db: &DbPool) -> Result<Vec<AreaPopulationRow>> {
    let rows = sqlx::query_as::<_, AreaPopulationRow>(
        "SELECT id, continent, area, population FROM Countries ORDER BY id",
    )
    .fetch_all(db.pool())
    .await?;
    Ok(rows)
}
