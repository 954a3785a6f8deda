use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use shared::domain::{City, CityId, NewCity, Position};

const CITY_COLUMNS: &str = "id, city_name, country, emoji, date, notes, lat, lng";

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// All cities in insertion order.
    pub async fn list_cities(&self) -> Result<Vec<City>> {
        let rows = sqlx::query(&format!("SELECT {CITY_COLUMNS} FROM cities ORDER BY seq"))
            .fetch_all(&self.pool)
            .await
            .context("failed to list cities")?;
        rows.iter().map(city_from_row).collect()
    }

    pub async fn get_city(&self, id: CityId) -> Result<Option<City>> {
        let row = sqlx::query(&format!("SELECT {CITY_COLUMNS} FROM cities WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to load city {id}"))?;
        row.as_ref().map(city_from_row).transpose()
    }

    pub async fn count_cities(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cities")
            .fetch_one(&self.pool)
            .await
            .context("failed to count cities")?;
        Ok(count)
    }

    /// Appends a city and returns it with its newly assigned id.
    pub async fn insert_city(&self, draft: &NewCity) -> Result<City> {
        let row = sqlx::query(
            "INSERT INTO cities (id, city_name, country, emoji, date, notes, lat, lng)
             VALUES ((SELECT COALESCE(MAX(id), 0) + 1 FROM cities), ?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&draft.city_name)
        .bind(&draft.country)
        .bind(&draft.emoji)
        .bind(&draft.date)
        .bind(&draft.notes)
        .bind(draft.position.lat)
        .bind(draft.position.lng)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert city")?;

        let id = CityId(row.try_get::<i64, _>(0)?);
        debug!(city_id = %id, city_name = %draft.city_name, "city stored");
        Ok(City::from_draft(id, draft.clone()))
    }

    /// Stores cities that already carry ids, skipping ids that are taken.
    /// Returns how many rows were written.
    pub async fn import_cities(&self, cities: &[City]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut written = 0;
        for city in cities {
            let result = sqlx::query(
                "INSERT OR IGNORE INTO cities (id, city_name, country, emoji, date, notes, lat, lng)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(city.id.0)
            .bind(&city.city_name)
            .bind(&city.country)
            .bind(&city.emoji)
            .bind(&city.date)
            .bind(&city.notes)
            .bind(city.position.lat)
            .bind(city.position.lng)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to import city {}", city.id))?;
            written += result.rows_affected();
        }
        tx.commit().await?;
        Ok(written)
    }

    /// Returns false when no city had that id.
    pub async fn delete_city(&self, id: CityId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cities WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete city {id}"))?;
        Ok(result.rows_affected() > 0)
    }
}

fn city_from_row(row: &SqliteRow) -> Result<City> {
    Ok(City {
        id: CityId(row.try_get("id")?),
        city_name: row.try_get("city_name")?,
        country: row.try_get("country")?,
        emoji: row.try_get("emoji")?,
        date: row.try_get("date")?,
        notes: row.try_get("notes")?,
        position: Position {
            lat: row.try_get("lat")?,
            lng: row.try_get("lng")?,
        },
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
