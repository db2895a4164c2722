use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};

use super::crud;
use crate::models::{Caller, NewWork, Work, WorkPatch};
use crate::state::AppState;
use crate::utils::response::{ApiError, ErrorBody};

#[utoipa::path(
    get,
    path = "/api/work",
    responses(
        (status = 200, description = "Work catalog", body = [Work]),
        (status = 401, body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_works(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<Work>>, ApiError> {
    crud::list::<Work>(state, caller).await
}

#[utoipa::path(
    post,
    path = "/api/work",
    request_body = NewWork,
    responses(
        (status = 201, body = Work),
        (status = 401, body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_work(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<NewWork>, JsonRejection>,
) -> Result<(StatusCode, Json<Work>), ApiError> {
    crud::create::<Work>(state, caller, payload).await
}

#[utoipa::path(
    get,
    path = "/api/work/{id}",
    params(("id" = i64, Path, description = "Work ID")),
    responses(
        (status = 200, body = Work),
        (status = 404, body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_work(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<Work>, ApiError> {
    crud::get::<Work>(state, caller, id).await
}

#[utoipa::path(
    put,
    path = "/api/work/{id}",
    request_body = WorkPatch,
    params(("id" = i64, Path, description = "Work ID")),
    responses(
        (status = 200, body = Work),
        (status = 404, body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_work(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<WorkPatch>, JsonRejection>,
) -> Result<Json<Work>, ApiError> {
    crud::update::<Work>(state, caller, id, payload).await
}

#[utoipa::path(
    delete,
    path = "/api/work/{id}",
    params(("id" = i64, Path, description = "Work ID")),
    responses(
        (status = 204),
        (status = 404, body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_work(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    crud::delete::<Work>(state, caller, id).await
}
