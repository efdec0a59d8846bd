//! Table layout of the country store.
//!
//! The store is rebuilt from scratch on every import: [`recreate`] drops every
//! table and creates it again. Table names used in dynamic SQL only ever come
//! from the closed [`Dimension`] and [`Relation`] enums.

use anyhow::Result;
use sqlx::SqliteConnection;
use tracing::debug;

/// A deduplicated, named table referenced by countries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Continent,
    Capital,
    Language,
    Currency,
}

impl Dimension {
    pub const ALL: [Dimension; 4] = [
        Dimension::Continent,
        Dimension::Capital,
        Dimension::Language,
        Dimension::Currency,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            Dimension::Continent => "Continents",
            Dimension::Capital => "Capitals",
            Dimension::Language => "Languages",
            Dimension::Currency => "Currencies",
        }
    }
}

/// A many-to-many link kind between a country and a dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Capital,
    Language,
    Currency,
}

impl Relation {
    pub const ALL: [Relation; 3] = [Relation::Capital, Relation::Language, Relation::Currency];

    pub fn junction_table(&self) -> &'static str {
        match self {
            Relation::Capital => "Count_Cap_Jn",
            Relation::Language => "Count_Lang_Jn",
            Relation::Currency => "Count_Curr_Jn",
        }
    }

    /// Column of the junction table holding the dimension id.
    pub fn column(&self) -> &'static str {
        match self {
            Relation::Capital => "capital",
            Relation::Language => "language",
            Relation::Currency => "currency",
        }
    }

    pub fn dimension(&self) -> Dimension {
        match self {
            Relation::Capital => Dimension::Capital,
            Relation::Language => Dimension::Language,
            Relation::Currency => Dimension::Currency,
        }
    }
}

// Children before parents so foreign keys never block a drop.
const DROP_ORDER: [&str; 9] = [
    "Borders",
    "Count_Cap_Jn",
    "Count_Lang_Jn",
    "Count_Curr_Jn",
    "Countries",
    "Continents",
    "Capitals",
    "Languages",
    "Currencies",
];

const CREATE_STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE Continents (
        id INTEGER NOT NULL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE Capitals (
        id INTEGER NOT NULL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE Languages (
        id INTEGER NOT NULL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE Currencies (
        id INTEGER NOT NULL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE Countries (
        id INTEGER NOT NULL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        official TEXT NOT NULL UNIQUE,
        code TEXT NOT NULL UNIQUE,
        indep INTEGER NOT NULL,
        flag TEXT,
        flag_png TEXT,
        continent INTEGER NOT NULL REFERENCES Continents (id),
        area REAL NOT NULL CHECK (area >= 0),
        population INTEGER NOT NULL CHECK (population >= 0),
        map TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE Count_Cap_Jn (
        id INTEGER NOT NULL PRIMARY KEY,
        country INTEGER NOT NULL REFERENCES Countries (id),
        capital INTEGER NOT NULL REFERENCES Capitals (id)
    )
    "#,
    r#"
    CREATE TABLE Count_Lang_Jn (
        id INTEGER NOT NULL PRIMARY KEY,
        country INTEGER NOT NULL REFERENCES Countries (id),
        language INTEGER NOT NULL REFERENCES Languages (id)
    )
    "#,
    r#"
    CREATE TABLE Count_Curr_Jn (
        id INTEGER NOT NULL PRIMARY KEY,
        country INTEGER NOT NULL REFERENCES Countries (id),
        currency INTEGER NOT NULL REFERENCES Currencies (id)
    )
    "#,
    r#"
    CREATE TABLE Borders (
        id INTEGER NOT NULL PRIMARY KEY,
        country_1 INTEGER NOT NULL REFERENCES Countries (id),
        country_2 INTEGER NOT NULL REFERENCES Countries (id)
    )
    "#,
    "CREATE INDEX idx_countries_continent ON Countries (continent)",
    "CREATE INDEX idx_cap_jn_country ON Count_Cap_Jn (country)",
    "CREATE INDEX idx_lang_jn_country ON Count_Lang_Jn (country)",
    "CREATE INDEX idx_lang_jn_language ON Count_Lang_Jn (language)",
    "CREATE INDEX idx_curr_jn_country ON Count_Curr_Jn (country)",
    "CREATE INDEX idx_borders_country_1 ON Borders (country_1)",
];

/// Drop every table of the store and create it again, empty.
///
/// Runs on whatever connection it is given, so calling it inside a
/// transaction makes the rebuild part of that transaction.
pub async fn recreate(conn: &mut SqliteConnection) -> Result<()> {
    for table in DROP_ORDER {
        let sql = format!("DROP TABLE IF EXISTS {table}");
        sqlx::query(&sql).execute(&mut *conn).await?;
    }

    for statement in CREATE_STATEMENTS {
        sqlx::query(statement).execute(&mut *conn).await?;
    }

    debug!("Recreated {} tables", DROP_ORDER.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DbPool;

    async fn table_names(db: &DbPool) -> Vec<String> {
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .fetch_all(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_recreate_creates_every_table() {
        let db = DbPool::in_memory().await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        recreate(&mut conn).await.unwrap();
        drop(conn);

        let mut expected: Vec<String> = DROP_ORDER.iter().map(|t| t.to_string()).collect();
        expected.sort();
        assert_eq!(table_names(&db).await, expected);
    }

    #[tokio::test]
    async fn test_recreate_discards_previous_rows() {
        let db = DbPool::in_memory().await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        recreate(&mut conn).await.unwrap();
        sqlx::query("INSERT INTO Continents (name) VALUES ('Europe')")
            .execute(&mut *conn)
            .await
            .unwrap();

        recreate(&mut conn).await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM Continents")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_relation_maps_to_dimension() {
        for relation in Relation::ALL {
            assert!(Dimension::ALL.contains(&relation.dimension()));
            assert_ne!(relation.dimension(), Dimension::Continent);
        }
    }
}
