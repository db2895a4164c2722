use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};

use super::crud;
use crate::models::{Caller, CollectionWork, CollectionWorkPatch, NewCollectionWork};
use crate::state::AppState;
use crate::utils::response::{ApiError, ErrorBody};

#[utoipa::path(
    get,
    path = "/api/collection-work",
    responses((status = 200, body = [CollectionWork]), (status = 401, body = ErrorBody)),
    security(("bearer_auth" = []))
)]
pub async fn list_links(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<CollectionWork>>, ApiError> {
    crud::list::<CollectionWork>(state, caller).await
}

#[utoipa::path(
    post,
    path = "/api/collection-work",
    request_body = NewCollectionWork,
    responses((status = 201, body = CollectionWork), (status = 500, body = ErrorBody)),
    security(("bearer_auth" = []))
)]
pub async fn create_link(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<NewCollectionWork>, JsonRejection>,
) -> Result<(StatusCode, Json<CollectionWork>), ApiError> {
    crud::create::<CollectionWork>(state, caller, payload).await
}

#[utoipa::path(
    get,
    path = "/api/collection-work/{id}",
    params(("id" = i64, Path, description = "Link ID")),
    responses((status = 200, body = CollectionWork), (status = 404, body = ErrorBody)),
    security(("bearer_auth" = []))
)]
pub async fn get_link(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<CollectionWork>, ApiError> {
    crud::get::<CollectionWork>(state, caller, id).await
}

#[utoipa::path(
    put,
    path = "/api/collection-work/{id}",
    request_body = CollectionWorkPatch,
    params(("id" = i64, Path, description = "Link ID")),
    responses((status = 200, body = CollectionWork), (status = 404, body = ErrorBody)),
    security(("bearer_auth" = []))
)]
pub async fn update_link(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<CollectionWorkPatch>, JsonRejection>,
) -> Result<Json<CollectionWork>, ApiError> {
    crud::update::<CollectionWork>(state, caller, id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/collection-work/{id}",
    params(("id" = i64, Path, description = "Link ID")),
    responses((status = 204), (status = 404, body = ErrorBody)),
    security(("bearer_auth" = []))
)]
pub async fn delete_link(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    crud::delete::<CollectionWork>(state, caller, id).await
}
