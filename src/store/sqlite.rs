// SPDX-License-Identifier: GPL-3.0-only
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::Row;
use std::path::Path;
use crate::error::{DirectoryError, Result};
use crate::store::{models::Airline, traits::AirlineStore};
use tracing::{debug, error, info};

const UPSERT_SQL: &str = r#"
    INSERT INTO airlines (code, name, us_name, default_name, site, phone, alliance, category, logo_path, is_favorite)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
    ON CONFLICT(code) DO UPDATE SET
        name = excluded.name,
        us_name = excluded.us_name,
        default_name = excluded.default_name,
        site = excluded.site,
        phone = excluded.phone,
        alliance = excluded.alliance,
        category = excluded.category,
        logo_path = excluded.logo_path,
        is_favorite = excluded.is_favorite
"#;

// Same as UPSERT_SQL, minus the favorite column in the update branch.
const MERGE_REMOTE_SQL: &str = r#"
    INSERT INTO airlines (code, name, us_name, default_name, site, phone, alliance, category, logo_path, is_favorite)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
    ON CONFLICT(code) DO UPDATE SET
        name = excluded.name,
        us_name = excluded.us_name,
        default_name = excluded.default_name,
        site = excluded.site,
        phone = excluded.phone,
        alliance = excluded.alliance,
        category = excluded.category,
        logo_path = excluded.logo_path
"#;

fn read_error(e: sqlx::Error) -> DirectoryError {
    DirectoryError::StoreRead(e.to_string())
}

fn write_error(e: sqlx::Error) -> DirectoryError {
    DirectoryError::StoreWrite(e.to_string())
}

pub struct SqliteAirlineStore {
    pool: SqlitePool,
}

impl SqliteAirlineStore {
    pub async fn new(db_path: &Path) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        let store = Self { pool };
        store.init_schema().await?;

        Ok(store)
    }

    async fn init_schema(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS airlines (
                code TEXT PRIMARY KEY,
                name TEXT,
                us_name TEXT,
                default_name TEXT,
                site TEXT,
                phone TEXT,
                alliance TEXT,
                category TEXT,
                logo_path TEXT,
                is_favorite INTEGER NOT NULL DEFAULT 0
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Initialized SQLite airline store schema");
        Ok(())
    }

    fn airline_from_row(row: &SqliteRow) -> std::result::Result<Airline, sqlx::Error> {
        Ok(Airline {
            code: row.try_get("code")?,
            name: row.try_get("name")?,
            us_name: row.try_get("us_name")?,
            default_name: row.try_get("default_name")?,
            site: row.try_get("site")?,
            phone: row.try_get("phone")?,
            alliance: row.try_get("alliance")?,
            category: row.try_get("category")?,
            logo_path: row.try_get("logo_path")?,
            is_favorite: row.try_get("is_favorite")?,
        })
    }

    async fn fetch_airlines(&self, sql: &str) -> Result<Vec<Airline>> {
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(read_error)?;

        let mut airlines = Vec::with_capacity(rows.len());
        for row in rows {
            match Self::airline_from_row(&row) {
                Ok(airline) => airlines.push(airline),
                Err(e) => {
                    error!(error = %e, "Failed to parse airline from database");
                    return Err(read_error(e));
                }
            }
        }

        Ok(airlines)
    }

    async fn write_batch(&self, sql: &str, airlines: &[Airline]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(write_error)?;

        for airline in airlines {
            sqlx::query(sql)
                .bind(&airline.code)
                .bind(&airline.name)
                .bind(&airline.us_name)
                .bind(&airline.default_name)
                .bind(&airline.site)
                .bind(&airline.phone)
                .bind(&airline.alliance)
                .bind(&airline.category)
                .bind(&airline.logo_path)
                .bind(airline.is_favorite)
                .execute(&mut *tx)
                .await
                .map_err(write_error)?;
        }

        tx.commit().await.map_err(write_error)?;
        Ok(())
    }
}

#[async_trait]
impl AirlineStore for SqliteAirlineStore {
    async fn get_all(&self) -> Result<Vec<Airline>> {
        self.fetch_airlines("SELECT * FROM airlines ORDER BY rowid").await
    }

    async fn get_favorites(&self) -> Result<Vec<Airline>> {
        self.fetch_airlines("SELECT * FROM airlines WHERE is_favorite = 1 ORDER BY rowid")
            .await
    }

    async fn get(&self, code: &str) -> Result<Option<Airline>> {
        let row = sqlx::query("SELECT * FROM airlines WHERE code = ?1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error)?;

        match row {
            Some(row) => Ok(Some(Self::airline_from_row(&row).map_err(read_error)?)),
            None => Ok(None),
        }
    }

    async fn upsert(&self, airlines: &[Airline]) -> Result<()> {
        self.write_batch(UPSERT_SQL, airlines).await?;
        debug!(count = airlines.len(), "Upserted airlines");
        Ok(())
    }

    async fn merge_remote(&self, airlines: &[Airline]) -> Result<()> {
        self.write_batch(MERGE_REMOTE_SQL, airlines).await?;
        info!(count = airlines.len(), "Merged remote airlines into store");
        Ok(())
    }

    async fn set_favorite(&self, code: &str, is_favorite: bool) -> Result<()> {
        let result = sqlx::query("UPDATE airlines SET is_favorite = ?2 WHERE code = ?1")
            .bind(code)
            .bind(is_favorite)
            .execute(&self.pool)
            .await
            .map_err(write_error)?;

        if result.rows_affected() == 0 {
            return Err(DirectoryError::NotFound(code.to_string()));
        }

        debug!(code = %code, is_favorite, "Updated favorite flag");
        Ok(())
    }
}
