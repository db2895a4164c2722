use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::info;

use crate::models::{Caller, Credentials, EmailRequest, PasswordChange, Session, User};
use crate::state::AppState;
use crate::utils::response::{json_body, ApiError, ErrorBody};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = Credentials,
    responses(
        (status = 200, description = "Signed in", body = Session),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Session>, ApiError> {
    let credentials = json_body(payload)?;
    let session = state
        .auth
        .sign_in_with_password(credentials.email.trim(), &credentials.password)
        .await?;
    Ok(Json(session))
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = Credentials,
    responses(
        (status = 204, description = "Account created, confirmation mail sent"),
        (status = 500, description = "Rejected by the auth service", body = ErrorBody),
        (status = 501, description = "Not available on this backend", body = ErrorBody)
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let credentials = json_body(payload)?;
    state
        .auth
        .sign_up(credentials.email.trim(), &credentials.password)
        .await?;
    info!("Sign-up requested");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/auth/magic-link",
    request_body = EmailRequest,
    responses(
        (status = 204, description = "Sign-in link sent"),
        (status = 501, description = "Not available on this backend", body = ErrorBody)
    )
)]
pub async fn magic_link(
    State(state): State<AppState>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let request = json_body(payload)?;
    state.auth.send_magic_link(request.email.trim()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Sends a reset mail whose link lands on `{SITE_URL}/reset`.
#[utoipa::path(
    post,
    path = "/api/auth/recover",
    request_body = EmailRequest,
    responses(
        (status = 204, description = "Reset mail sent"),
        (status = 501, description = "Not available on this backend", body = ErrorBody)
    )
)]
pub async fn recover(
    State(state): State<AppState>,
    payload: Result<Json<EmailRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let request = json_body(payload)?;
    let redirect_to = state.config.reset_redirect();
    state
        .auth
        .reset_password_for_email(request.email.trim(), &redirect_to)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/auth/user",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn current_user(Extension(caller): Extension<Caller>) -> Json<User> {
    Json(caller.user)
}

#[utoipa::path(
    put,
    path = "/api/auth/password",
    request_body = PasswordChange,
    responses(
        (status = 204, description = "Password updated"),
        (status = 401, body = ErrorBody),
        (status = 501, description = "Not available on this backend", body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    payload: Result<Json<PasswordChange>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let change = json_body(payload)?;
    state
        .auth
        .update_password(&caller.access_token, &change.password)
        .await?;
    info!(user = %caller.user_id(), "Password updated");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 204, description = "Signed out"),
        (status = 401, body = ErrorBody)
    ),
    security(("bearer_auth" = []))
)]
pub async fn logout(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<StatusCode, ApiError> {
    state.auth.sign_out(&caller.access_token).await?;
    Ok(StatusCode::NO_CONTENT)
}
