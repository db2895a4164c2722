//! Record gateway: one generic CRUD contract instantiated per entity.
//!
//! Calls go straight to the [`RemoteStore`]; nothing is cached or retried
//! and every failure reaches the caller with its message intact.

use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::Caller;
use crate::store::{Filter, Query, RemoteStore, Row, Table};

/// Payload checks run before any network round trip.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    type Id: Copy + PartialEq + Display + Serialize + Send + Sync + 'static;
    type New: Serialize + Validate + Send + Sync + 'static;
    type Patch: Serialize + Validate + Send + Sync + 'static;

    const TABLE: Table;
    const LABEL: &'static str;

    fn id(&self) -> Self::Id;
}

#[async_trait]
pub trait RecordGateway<E: Entity>: Send + Sync {
    async fn get_all(&self) -> Result<Vec<E>>;
    async fn get_by_id(&self, id: E::Id) -> Result<E>;
    async fn create(&self, new: E::New) -> Result<E>;
    async fn update(&self, id: E::Id, patch: E::Patch) -> Result<E>;
    async fn delete(&self, id: E::Id) -> Result<()>;
}

/// Store-backed gateway bound to one caller.
pub struct Gateway<E> {
    store: Arc<dyn RemoteStore>,
    caller: Caller,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Gateway<E> {
    pub fn new(store: Arc<dyn RemoteStore>, caller: Caller) -> Self {
        Self {
            store,
            caller,
            _entity: PhantomData,
        }
    }

    pub fn caller(&self) -> &Caller {
        &self.caller
    }

    fn owner_value(&self) -> Value {
        Value::String(self.caller.user_id().to_string())
    }

    /// Filters every statement carries: the owner column for owned tables.
    fn scope(&self) -> Vec<Filter> {
        E::TABLE
            .owner
            .map(|owner| vec![Filter::eq(owner, self.owner_value())])
            .unwrap_or_default()
    }

    fn by_id(&self, id: E::Id) -> Result<Vec<Filter>> {
        let mut filters = vec![Filter::eq(E::TABLE.key, serde_json::to_value(id)?)];
        filters.extend(self.scope());
        Ok(filters)
    }

    fn not_found(id: E::Id) -> Error {
        Error::NotFound(format!("{} {} not found", E::LABEL, id))
    }

    fn payload<T: Serialize>(value: &T) -> Result<Row> {
        match serde_json::to_value(value)? {
            Value::Object(row) => Ok(row),
            _ => Err(Error::Validation("Payload must be a JSON object".into())),
        }
    }

    fn decode(row: Row) -> Result<E> {
        Ok(serde_json::from_value(Value::Object(row))?)
    }

    fn first(rows: Vec<Row>, id: E::Id) -> Result<E> {
        match rows.into_iter().next() {
            Some(row) => Self::decode(row),
            None => Err(Self::not_found(id)),
        }
    }
}

#[async_trait]
impl<E: Entity> RecordGateway<E> for Gateway<E> {
    async fn get_all(&self) -> Result<Vec<E>> {
        let query = Query::filtered(self.scope()).order_by(E::TABLE.order);
        self.store
            .select(&self.caller, &E::TABLE, &query)
            .await?
            .into_iter()
            .map(Self::decode)
            .collect()
    }

    async fn get_by_id(&self, id: E::Id) -> Result<E> {
        let query = Query::filtered(self.by_id(id)?);
        let mut rows = self.store.select(&self.caller, &E::TABLE, &query).await?;
        match rows.len() {
            0 => Err(Self::not_found(id)),
            1 => Self::decode(rows.remove(0)),
            n => Err(Error::Store(format!(
                "Expected a single {} for id {}, found {}",
                E::LABEL,
                id,
                n
            ))),
        }
    }

    async fn create(&self, new: E::New) -> Result<E> {
        new.validate()?;
        let mut row = Self::payload(&new)?;
        if let Some(owner) = E::TABLE.owner {
            row.insert(owner.to_string(), self.owner_value());
        }
        let created = self.store.insert(&self.caller, &E::TABLE, row).await?;
        Self::decode(created)
    }

    async fn update(&self, id: E::Id, patch: E::Patch) -> Result<E> {
        patch.validate()?;
        let mut row = Self::payload(&patch)?;
        // Neither the key nor the owner may be rewritten through a patch.
        row.remove(E::TABLE.key);
        if let Some(owner) = E::TABLE.owner {
            row.remove(owner);
        }
        let rows = self
            .store
            .update(&self.caller, &E::TABLE, &self.by_id(id)?, row)
            .await?;
        Self::first(rows, id)
    }

    async fn delete(&self, id: E::Id) -> Result<()> {
        let rows = self.store.delete(&self.caller, &E::TABLE, &self.by_id(id)?).await?;
        if rows.is_empty() {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}
