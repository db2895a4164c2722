pub mod auth;
pub mod collection;
pub mod collection_work;
pub mod work;

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path,
    },
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::Error;
use crate::gateway::{Entity, RecordGateway};
use crate::models::Caller;
use crate::state::AppState;
use crate::utils::response::{json_body, ApiError};

/// Shared bodies of the per-entity handlers. Each one is a single gateway
/// call; the status mapping lives in [`ApiError`].
pub(crate) mod crud {
    use super::*;

    pub async fn list<E: Entity>(state: AppState, caller: Caller) -> Result<Json<Vec<E>>, ApiError> {
        Ok(Json(state.gateway::<E>(caller).get_all().await?))
    }

    pub async fn get<E: Entity>(
        state: AppState,
        caller: Caller,
        id: Result<Path<E::Id>, PathRejection>,
    ) -> Result<Json<E>, ApiError>
    where
        E::Id: DeserializeOwned,
    {
        let id = path_id::<E>(id)?;
        Ok(Json(state.gateway::<E>(caller).get_by_id(id).await?))
    }

    pub async fn create<E: Entity>(
        state: AppState,
        caller: Caller,
        payload: Result<Json<E::New>, JsonRejection>,
    ) -> Result<(StatusCode, Json<E>), ApiError>
    where
        E::New: DeserializeOwned,
    {
        let new = json_body(payload)?;
        let created = state.gateway::<E>(caller).create(new).await?;
        info!(table = E::TABLE.name, id = %created.id(), "Record created");
        Ok((StatusCode::CREATED, Json(created)))
    }

    pub async fn update<E: Entity>(
        state: AppState,
        caller: Caller,
        id: Result<Path<E::Id>, PathRejection>,
        payload: Result<Json<E::Patch>, JsonRejection>,
    ) -> Result<Json<E>, ApiError>
    where
        E::Id: DeserializeOwned,
        E::Patch: DeserializeOwned,
    {
        let id = path_id::<E>(id)?;
        let patch = json_body(payload)?;
        Ok(Json(state.gateway::<E>(caller).update(id, patch).await?))
    }

    pub async fn delete<E: Entity>(
        state: AppState,
        caller: Caller,
        id: Result<Path<E::Id>, PathRejection>,
    ) -> Result<StatusCode, ApiError>
    where
        E::Id: DeserializeOwned,
    {
        let id = path_id::<E>(id)?;
        state.gateway::<E>(caller).delete(id).await?;
        info!(table = E::TABLE.name, id = %id, "Record deleted");
        Ok(StatusCode::NO_CONTENT)
    }

    /// An id that does not even parse cannot name an existing record.
    fn path_id<E: Entity>(id: Result<Path<E::Id>, PathRejection>) -> Result<E::Id, ApiError> {
        id.map(|Path(id)| id).map_err(|rejection| {
            ApiError(Error::NotFound(format!("{} not found: {}", E::LABEL, rejection.body_text())))
        })
    }
}
