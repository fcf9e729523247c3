use crate::models::CleanProduct;
use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Utc};
use duckdb::{params, Connection};
use std::path::Path;
use tracing::info;

// ── Schema ────────────────────────────────────────────────────────────────────

const DDL: &str = r#"
CREATE TABLE IF NOT EXISTS fashion_products (
    title       VARCHAR NOT NULL,
    price       DOUBLE  NOT NULL,
    rating      DOUBLE  NOT NULL,
    colors      INTEGER NOT NULL,
    size        VARCHAR NOT NULL,
    gender      VARCHAR NOT NULL
);

CREATE SEQUENCE IF NOT EXISTS etl_run_id START 1;

CREATE TABLE IF NOT EXISTS etl_runs (
    id               BIGINT PRIMARY KEY DEFAULT nextval('etl_run_id'),
    finished_at      TIMESTAMP NOT NULL,
    products_loaded  BIGINT NOT NULL
);

CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER PRIMARY KEY,
    applied_at  TIMESTAMP NOT NULL
);
"#;

const INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_products_gender ON fashion_products (gender);
"#;

// ── Repository ────────────────────────────────────────────────────────────────

pub struct Repository {
    conn: Connection,
}

impl Repository {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Could not create dir {:?}", parent))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open DuckDB at {:?}", path))?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self { conn: Connection::open_in_memory()? })
    }

    pub fn run_migrations(&self) -> Result<()> {
        info!("Running migrations…");
        self.conn.execute_batch(DDL).context("DDL failed")?;
        self.conn.execute_batch(INDEXES).context("Index creation failed")?;
        self.conn.execute(
            "INSERT OR IGNORE INTO schema_version (version, applied_at) VALUES (1, ?)",
            params![Utc::now().naive_utc()],
        )?;
        info!("Migrations done.");
        Ok(())
    }

    // ── Products ──────────────────────────────────────────────────────────────

    /// Replace the table contents with `products` and log the run, all in one
    /// transaction.
    pub fn replace_products(&self, products: &[CleanProduct]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM fashion_products", [])
            .context("clear fashion_products")?;

        let sql = r#"
            INSERT INTO fashion_products (title, price, rating, colors, size, gender)
            VALUES (?, ?, ?, ?, ?, ?)
        "#;
        for p in products {
            tx.execute(sql, params![
                p.title, p.price, p.rating,
                i64::from(p.colors),
                p.size, p.gender,
            ]).with_context(|| format!("insert product {:?}", p.title))?;
        }

        tx.execute(
            "INSERT INTO etl_runs (finished_at, products_loaded) VALUES (?, ?)",
            params![Utc::now().naive_utc(), products.len() as i64],
        ).context("record etl run")?;

        tx.commit()?;
        Ok(products.len())
    }

    pub fn product_count(&self) -> Result<i64> {
        let mut s = self.conn.prepare("SELECT COUNT(*) FROM fashion_products")?;
        Ok(s.query_row([], |r| r.get(0))?)
    }

    pub fn price_range(&self) -> Result<(Option<f64>, Option<f64>)> {
        let mut s = self.conn.prepare("SELECT MIN(price), MAX(price) FROM fashion_products")?;
        Ok(s.query_row([], |r| Ok((r.get(0)?, r.get(1)?)))?)
    }

    /// Most recent run: when it finished and how many rows it wrote.
    pub fn last_run(&self) -> Result<Option<(NaiveDateTime, i64)>> {
        let mut s = self.conn.prepare(
            "SELECT finished_at, products_loaded FROM etl_runs ORDER BY id DESC LIMIT 1",
        )?;
        let run: Option<(NaiveDateTime, i64)> = s
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))?
            .next()
            .transpose()?;
        Ok(run)
    }
}
