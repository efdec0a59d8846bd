//! Write primitives used by the importer.
//!
//! All functions take a bare connection so they can run inside the import
//! transaction.

use crate::models::NewCountry;
use crate::schema::{Dimension, Relation};
use anyhow::Result;
use sqlx::{Row, SqliteConnection};
use tracing::trace;

/// Return the id of the `dimension` row called `name`, inserting it first if
/// it does not exist yet.
///
/// Calling this twice with the same name yields the same id and leaves a
/// single row. The sentinel name `"None"` is stored like any other name.
pub async fn resolve_entity(
    conn: &mut SqliteConnection,
    dimension: Dimension,
    name: &str,
) -> Result<i64> {
    let table = dimension.table();

    let insert = format!("INSERT INTO {table} (name) VALUES (?) ON CONFLICT (name) DO NOTHING");
    let inserted = sqlx::query(&insert).bind(name).execute(&mut *conn).await?;

    let select = format!("SELECT id FROM {table} WHERE name = ?");
    let id: i64 = sqlx::query_scalar(&select)
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;

    if inserted.rows_affected() > 0 {
        trace!("Inserted {} {:?} as id {}", table, name, id);
    }
    Ok(id)
}

/// Insert a country row and return its id.
pub async fn insert_country(conn: &mut SqliteConnection, country: &NewCountry) -> Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO Countries (
            name, official, code, indep, flag, flag_png,
            continent, area, population, map
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(&country.name)
    .bind(&country.official)
    .bind(&country.code)
    .bind(country.independent)
    .bind(country.flag.as_deref())
    .bind(country.flag_png.as_deref())
    .bind(country.continent_id)
    .bind(country.area)
    .bind(country.population)
    .bind(&country.map_url)
    .fetch_one(&mut *conn)
    .await?
    .get::<i64, _>(0);

    Ok(id)
}

/// Link a country to every name in `names`, one junction row per name and in
/// the given order. Duplicate names produce duplicate rows.
///
/// # Returns
/// The number of junction rows written
pub async fn write_associations(
    conn: &mut SqliteConnection,
    relation: Relation,
    country_id: i64,
    names: &[String],
) -> Result<u64> {
    let insert = format!(
        "INSERT INTO {} (country, {}) VALUES (?, ?)",
        relation.junction_table(),
        relation.column()
    );

    let mut written = 0;
    for name in names {
        let entity_id = resolve_entity(conn, relation.dimension(), name).await?;
        sqlx::query(&insert)
            .bind(country_id)
            .bind(entity_id)
            .execute(&mut *conn)
            .await?;
        written += 1;
    }

    Ok(written)
}

pub async fn country_id_by_name(conn: &mut SqliteConnection, name: &str) -> Result<Option<i64>> {
    let id: Option<i64> = sqlx::query_scalar("SELECT id FROM Countries WHERE name = ?")
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(id)
}

pub async fn country_id_by_code(conn: &mut SqliteConnection, code: &str) -> Result<Option<i64>> {
    let id: Option<i64> = sqlx::query_scalar("SELECT id FROM Countries WHERE code = ?")
        .bind(code)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(id)
}

/// Record that `country_1` lists `country_2` as a neighbor.
pub async fn insert_border(
    conn: &mut SqliteConnection,
    country_1: i64,
    country_2: i64,
) -> Result<()> {
    sqlx::query("INSERT INTO Borders (country_1, country_2) VALUES (?, ?)")
        .bind(country_1)
        .bind(country_2)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{schema, DbPool};
    use sqlx::pool::PoolConnection;
    use sqlx::Sqlite;

    async fn fresh() -> (DbPool, PoolConnection<Sqlite>) {
        let db = DbPool::in_memory().await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        schema::recreate(&mut conn).await.unwrap();
        (db, conn)
    }

    async fn count(conn: &mut SqliteConnection, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(&mut *conn)
            .await
            .unwrap()
    }

    fn country(name: &str, code: &str, continent_id: i64) -> NewCountry {
        NewCountry {
            name: name.to_string(),
            official: format!("Republic of {name}"),
            code: code.to_string(),
            independent: true,
            flag: None,
            flag_png: None,
            continent_id,
            area: 100.0,
            population: 10,
            map_url: format!("https://maps.example/{code}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_entity_is_idempotent() {
        let (_db, mut conn) = fresh().await;

        for dimension in Dimension::ALL {
            let first = resolve_entity(&mut conn, dimension, "Arabic").await.unwrap();
            let second = resolve_entity(&mut conn, dimension, "Arabic").await.unwrap();
            assert_eq!(first, second);
            assert_eq!(count(&mut conn, dimension.table()).await, 1);
        }
    }

    #[tokio::test]
    async fn test_resolve_entity_distinguishes_names() {
        let (_db, mut conn) = fresh().await;

        let arabic = resolve_entity(&mut conn, Dimension::Language, "Arabic").await.unwrap();
        let none = resolve_entity(&mut conn, Dimension::Language, "None").await.unwrap();
        assert_ne!(arabic, none);
        assert_eq!(
            resolve_entity(&mut conn, Dimension::Language, "None").await.unwrap(),
            none
        );
        assert_eq!(count(&mut conn, "Languages").await, 2);
    }

    #[tokio::test]
    async fn test_write_associations_keeps_duplicates() {
        let (_db, mut conn) = fresh().await;
        let continent = resolve_entity(&mut conn, Dimension::Continent, "Asia").await.unwrap();
        let id = insert_country(&mut conn, &country("Israel", "ISR", continent))
            .await
            .unwrap();

        let names = vec!["Jerusalem".to_string(), "Jerusalem".to_string()];
        let written = write_associations(&mut conn, Relation::Capital, id, &names)
            .await
            .unwrap();

        assert_eq!(written, 2);
        assert_eq!(count(&mut conn, "Count_Cap_Jn").await, 2);
        assert_eq!(count(&mut conn, "Capitals").await, 1);
    }

    #[tokio::test]
    async fn test_shared_capital_is_one_row() {
        let (_db, mut conn) = fresh().await;
        let asia = resolve_entity(&mut conn, Dimension::Continent, "Asia").await.unwrap();
        let israel = insert_country(&mut conn, &country("Israel", "ISR", asia))
            .await
            .unwrap();
        let palestine = insert_country(&mut conn, &country("Palestine", "PSE", asia))
            .await
            .unwrap();
        let capitals = vec!["Jerusalem".to_string()];

        write_associations(&mut conn, Relation::Capital, israel, &capitals)
            .await
            .unwrap();
        write_associations(&mut conn, Relation::Capital, palestine, &capitals)
            .await
            .unwrap();

        assert_eq!(count(&mut conn, "Capitals").await, 1);
        assert_eq!(count(&mut conn, "Count_Cap_Jn").await, 2);
    }

    #[tokio::test]
    async fn test_country_lookups() {
        let (_db, mut conn) = fresh().await;
        let europe = resolve_entity(&mut conn, Dimension::Continent, "Europe").await.unwrap();
        let france = insert_country(&mut conn, &country("France", "FRA", europe))
            .await
            .unwrap();

        assert_eq!(country_id_by_name(&mut conn, "France").await.unwrap(), Some(france));
        assert_eq!(country_id_by_code(&mut conn, "FRA").await.unwrap(), Some(france));
        assert_eq!(country_id_by_code(&mut conn, "ZZZ").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_country_code_is_rejected_by_store() {
        let (_db, mut conn) = fresh().await;
        let europe = resolve_entity(&mut conn, Dimension::Continent, "Europe").await.unwrap();
        insert_country(&mut conn, &country("France", "FRA", europe))
            .await
            .unwrap();

        let clash = country("Francia", "FRA", europe);
        assert!(insert_country(&mut conn, &clash).await.is_err());
    }

    #[tokio::test]
    async fn test_border_requires_existing_countries() {
        let (_db, mut conn) = fresh().await;
        let europe = resolve_entity(&mut conn, Dimension::Continent, "Europe").await.unwrap();
        let france = insert_country(&mut conn, &country("France", "FRA", europe))
            .await
            .unwrap();
        let spain = insert_country(&mut conn, &country("Spain", "ESP", europe))
            .await
            .unwrap();

        insert_border(&mut conn, france, spain).await.unwrap();
        assert!(insert_border(&mut conn, france, 9_999).await.is_err());
        assert_eq!(count(&mut conn, "Borders").await, 1);
    }
}
