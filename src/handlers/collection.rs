use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};

use super::crud;
use crate::models::{Caller, CollectionEntry, EntryPatch, NewEntry};
use crate::state::AppState;
use crate::utils::response::{ApiError, ErrorBody};

#[utoipa::path(
    get,
    path = "/api/collection",
    responses(
        (status = 200, description = "Entries owned by the caller, newest first", body = [CollectionEntry]),
        (status = 401, description = "Missing or invalid session", body = ErrorBody),
        (status = 500, description = "Remote store failure", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_collection(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<CollectionEntry>>, ApiError> {
    crud::list::<CollectionEntry>(state, caller).await
}

#[utoipa::path(
    post,
    path = "/api/collection",
    request_body = NewEntry,
    responses(
        (status = 201, description = "Entry created", body = CollectionEntry),
        (status = 401, description = "Missing or invalid session", body = ErrorBody),
        (status = 500, description = "Invalid entry or remote store failure", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_entry(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<NewEntry>, JsonRejection>,
) -> Result<(StatusCode, Json<CollectionEntry>), ApiError> {
    crud::create::<CollectionEntry>(state, caller, payload).await
}

#[utoipa::path(
    get,
    path = "/api/collection/{id}",
    params(
        ("id" = i64, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Entry", body = CollectionEntry),
        (status = 401, description = "Missing or invalid session", body = ErrorBody),
        (status = 404, description = "Entry absent or not owned", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_entry(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<CollectionEntry>, ApiError> {
    crud::get::<CollectionEntry>(state, caller, id).await
}

#[utoipa::path(
    put,
    path = "/api/collection/{id}",
    request_body = EntryPatch,
    params(
        ("id" = i64, Path, description = "Entry ID")
    ),
    responses(
        (status = 200, description = "Updated entry", body = CollectionEntry),
        (status = 401, description = "Missing or invalid session", body = ErrorBody),
        (status = 404, description = "Entry absent or not owned", body = ErrorBody),
        (status = 500, description = "Invalid patch or remote store failure", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_entry(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<EntryPatch>, JsonRejection>,
) -> Result<Json<CollectionEntry>, ApiError> {
    crud::update::<CollectionEntry>(state, caller, id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/collection/{id}",
    params(
        ("id" = i64, Path, description = "Entry ID")
    ),
    responses(
        (status = 204, description = "Entry deleted"),
        (status = 401, description = "Missing or invalid session", body = ErrorBody),
        (status = 404, description = "Entry absent or not owned", body = ErrorBody),
        (status = 500, description = "Remote store failure", body = ErrorBody)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_entry(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    crud::delete::<CollectionEntry>(state, caller, id).await
}
