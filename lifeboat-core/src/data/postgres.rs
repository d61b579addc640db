//! PostgreSQL access
//!
//! The workflow is synchronous end to end, so the sqlx pool is driven by a
//! private current-thread runtime and every call blocks the caller.

use crate::error::{LifeboatError, Result};
use polars::prelude::*;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{Column as _, Row as _, TypeInfo as _};
use tracing::info;

/// Blocking PostgreSQL collaborator: `connect`, `fetch_to_dataframe`,
/// `close`
pub struct PostgresManager {
    url: String,
    runtime: tokio::runtime::Runtime,
    pool: Option<PgPool>,
}

impl PostgresManager {
    /// Create a manager for the given connection URL. No connection is
    /// opened until [`connect`](Self::connect).
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| LifeboatError::DatabaseError(e.to_string()))?;

        Ok(Self {
            url: url.into(),
            runtime,
            pool: None,
        })
    }

    /// Open the connection pool
    pub fn connect(&mut self) -> Result<()> {
        let pool = self.runtime.block_on(
            PgPoolOptions::new()
                .max_connections(1)
                .connect(&self.url),
        )?;
        self.pool = Some(pool);
        info!("connected to PostgreSQL");
        Ok(())
    }

    /// Execute a query and collect the result set into a DataFrame.
    ///
    /// Supported column types: the integer family, float4/float8, boolean
    /// and the text family. Anything else is a `DatabaseError`.
    pub fn fetch_to_dataframe(&self, query: &str) -> Result<DataFrame> {
        let pool = self
            .pool
            .as_ref()
            .ok_or_else(|| LifeboatError::DatabaseError("not connected".to_string()))?;

        let rows: Vec<PgRow> = self
            .runtime
            .block_on(sqlx::query(query).fetch_all(pool))?;

        if rows.is_empty() {
            return Ok(DataFrame::empty());
        }

        let mut columns: Vec<polars::prelude::Column> = Vec::new();
        for (idx, column) in rows[0].columns().iter().enumerate() {
            let name = column.name();
            let series = match column.type_info().name() {
                "INT2" => integer_series(&rows, idx, name, |row, i| {
                    row.try_get::<Option<i16>, _>(i).map(|v| v.map(i64::from))
                })?,
                "INT4" => integer_series(&rows, idx, name, |row, i| {
                    row.try_get::<Option<i32>, _>(i).map(|v| v.map(i64::from))
                })?,
                "INT8" => integer_series(&rows, idx, name, |row, i| {
                    row.try_get::<Option<i64>, _>(i)
                })?,
                "FLOAT4" => {
                    let values: Vec<Option<f64>> = rows
                        .iter()
                        .map(|row| {
                            row.try_get::<Option<f32>, _>(idx)
                                .map(|v| v.map(f64::from))
                        })
                        .collect::<std::result::Result<_, _>>()?;
                    Series::new(name.into(), values)
                }
                "FLOAT8" => {
                    let values: Vec<Option<f64>> = rows
                        .iter()
                        .map(|row| row.try_get::<Option<f64>, _>(idx))
                        .collect::<std::result::Result<_, _>>()?;
                    Series::new(name.into(), values)
                }
                "BOOL" => {
                    let values: Vec<Option<bool>> = rows
                        .iter()
                        .map(|row| row.try_get::<Option<bool>, _>(idx))
                        .collect::<std::result::Result<_, _>>()?;
                    Series::new(name.into(), values)
                }
                "TEXT" | "VARCHAR" | "CHAR" | "BPCHAR" | "NAME" => {
                    let values: Vec<Option<String>> = rows
                        .iter()
                        .map(|row| row.try_get::<Option<String>, _>(idx))
                        .collect::<std::result::Result<_, _>>()?;
                    Series::new(name.into(), values)
                }
                other => {
                    return Err(LifeboatError::DatabaseError(format!(
                        "unsupported column type {other} for column {name}"
                    )))
                }
            };
            columns.push(series.into());
        }

        Ok(DataFrame::new(columns)?)
    }

    /// Close the pool. Safe to call when no connection was ever opened.
    pub fn close(&mut self) {
        if let Some(pool) = self.pool.take() {
            self.runtime.block_on(pool.close());
            info!("PostgreSQL connection closed");
        }
    }

    /// Whether a pool is currently open
    pub fn is_connected(&self) -> bool {
        self.pool.is_some()
    }
}

fn integer_series<F>(rows: &[PgRow], idx: usize, name: &str, get: F) -> Result<Series>
where
    F: Fn(&PgRow, usize) -> std::result::Result<Option<i64>, sqlx::Error>,
{
    let values: Vec<Option<i64>> = rows
        .iter()
        .map(|row| get(row, idx))
        .collect::<std::result::Result<_, _>>()?;
    Ok(Series::new(name.into(), values))
}
