use std::fs;
use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use serde_json::Value;
use sqlx::query::QueryScalar;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Caller;
use crate::store::{Filter, Query, RemoteStore, Row, Table};

type JsonQuery<'q> = QueryScalar<'q, Sqlite, String, SqliteArguments<'q>>;

/// Self-hosted table store. Row-level ownership is not enforced here; the
/// record gateway scopes owned tables by filtering on the owner column.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(db_url: &str) -> anyhow::Result<Self> {
        let db_path = db_url.trim_start_matches("sqlite:");
        if let Some(parent) = Path::new(db_path).parent() {
            fs::create_dir_all(parent)?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(SqliteConnectOptions::from_str(db_url)?.create_if_missing(true))
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Single-connection in-memory database; every connection to
    /// `sqlite::memory:` would otherwise see its own empty database.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn column<'a>(table: &Table, name: &'a str) -> Result<&'a str> {
    if table.has_column(name) {
        Ok(name)
    } else {
        Err(Error::Validation(format!(
            "Unknown column '{}' for table '{}'",
            name, table.name
        )))
    }
}

fn projection(table: &Table) -> String {
    let pairs: Vec<String> = table
        .columns
        .iter()
        .map(|c| format!("'{}', \"{}\"", c, c))
        .collect();
    format!("json_object({})", pairs.join(", "))
}

fn where_clause(table: &Table, filters: &[Filter]) -> Result<String> {
    if filters.is_empty() {
        return Ok(String::new());
    }
    let conditions = filters
        .iter()
        .map(|f| column(table, &f.column).map(|c| format!("\"{}\" = ?", c)))
        .collect::<Result<Vec<_>>>()?;
    Ok(format!(" WHERE {}", conditions.join(" AND ")))
}

fn bind<'q>(query: JsonQuery<'q>, value: &Value) -> JsonQuery<'q> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => query.bind(i),
            None => query.bind(n.as_f64()),
        },
        Value::String(s) => query.bind(s.clone()),
        other => query.bind(other.to_string()),
    }
}

fn decode(rows: Vec<String>) -> Result<Vec<Row>> {
    rows.iter()
        .map(|raw| serde_json::from_str::<Row>(raw).map_err(Error::from))
        .collect()
}

#[async_trait]
impl RemoteStore for SqliteStore {
    async fn select(&self, _caller: &Caller, table: &Table, query: &Query) -> Result<Vec<Row>> {
        let mut sql = format!(
            "SELECT {} FROM \"{}\"{}",
            projection(table),
            table.name,
            where_clause(table, &query.filters)?
        );
        if let Some(order) = query.order {
            let col = column(table, order.column)?;
            sql.push_str(&format!(
                " ORDER BY \"{}\" {}",
                col,
                if order.descending { "DESC" } else { "ASC" }
            ));
        }
        debug!(table = table.name, "sqlite select");

        let mut q = sqlx::query_scalar::<_, String>(&sql);
        for f in &query.filters {
            q = bind(q, &f.value);
        }
        decode(q.fetch_all(&self.pool).await?)
    }

    async fn insert(&self, _caller: &Caller, table: &Table, row: Row) -> Result<Row> {
        if row.is_empty() {
            return Err(Error::Validation("Nothing to insert".into()));
        }
        let columns = row
            .keys()
            .map(|k| column(table, k).map(|c| format!("\"{}\"", c)))
            .collect::<Result<Vec<_>>>()?;
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({}) RETURNING {}",
            table.name,
            columns.join(", "),
            placeholders,
            projection(table)
        );
        debug!(table = table.name, "sqlite insert");

        let mut q = sqlx::query_scalar::<_, String>(&sql);
        for value in row.values() {
            q = bind(q, value);
        }
        let raw = q.fetch_one(&self.pool).await?;
        Ok(serde_json::from_str(&raw)?)
    }

    async fn update(&self, _caller: &Caller, table: &Table, filters: &[Filter], patch: Row) -> Result<Vec<Row>> {
        if filters.is_empty() {
            return Err(Error::Validation("Refusing to update without a filter".into()));
        }
        if patch.is_empty() {
            return Err(Error::Validation("At least one field required".into()));
        }
        let assignments = patch
            .keys()
            .map(|k| column(table, k).map(|c| format!("\"{}\" = ?", c)))
            .collect::<Result<Vec<_>>>()?;
        let sql = format!(
            "UPDATE \"{}\" SET {}{} RETURNING {}",
            table.name,
            assignments.join(", "),
            where_clause(table, filters)?,
            projection(table)
        );
        debug!(table = table.name, "sqlite update");

        let mut q = sqlx::query_scalar::<_, String>(&sql);
        for value in patch.values() {
            q = bind(q, value);
        }
        for f in filters {
            q = bind(q, &f.value);
        }
        decode(q.fetch_all(&self.pool).await?)
    }

    async fn delete(&self, _caller: &Caller, table: &Table, filters: &[Filter]) -> Result<Vec<Row>> {
        if filters.is_empty() {
            return Err(Error::Validation("Refusing to delete without a filter".into()));
        }
        let sql = format!(
            "DELETE FROM \"{}\"{} RETURNING {}",
            table.name,
            where_clause(table, filters)?,
            projection(table)
        );
        debug!(table = table.name, "sqlite delete");

        let mut q = sqlx::query_scalar::<_, String>(&sql);
        for f in filters {
            q = bind(q, &f.value);
        }
        decode(q.fetch_all(&self.pool).await?)
    }
}
