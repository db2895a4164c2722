//! Remote Store contract: table rows as JSON objects, equality filters,
//! one optional ordering, every call made on behalf of a caller.

pub mod postgrest;
pub mod sqlite;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::models::Caller;

pub use postgrest::PostgrestStore;
pub use sqlite::SqliteStore;

pub type Row = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub descending: bool,
}

impl Order {
    pub const fn asc(column: &'static str) -> Self {
        Self { column, descending: false }
    }

    pub const fn desc(column: &'static str) -> Self {
        Self { column, descending: true }
    }
}

/// Static description of a remote table.
#[derive(Debug, Clone, Copy)]
pub struct Table {
    pub name: &'static str,
    pub key: &'static str,
    pub columns: &'static [&'static str],
    /// Column holding the owning user's id, for caller-scoped tables.
    pub owner: Option<&'static str>,
    /// Default ordering for full listings.
    pub order: Option<Order>,
}

impl Table {
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(&column)
    }
}

/// `column = value`
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
}

impl Query {
    pub fn filtered(filters: Vec<Filter>) -> Self {
        Self { filters, order: None }
    }

    pub fn order_by(mut self, order: Option<Order>) -> Self {
        self.order = order;
        self
    }
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn select(&self, caller: &Caller, table: &Table, query: &Query) -> Result<Vec<Row>>;

    /// Inserts one row and returns it as stored (with server-assigned columns).
    async fn insert(&self, caller: &Caller, table: &Table, row: Row) -> Result<Row>;

    /// Returns the rows after the update; empty when nothing matched.
    async fn update(&self, caller: &Caller, table: &Table, filters: &[Filter], patch: Row) -> Result<Vec<Row>>;

    /// Returns the deleted rows; empty when nothing matched.
    async fn delete(&self, caller: &Caller, table: &Table, filters: &[Filter]) -> Result<Vec<Row>>;
}
