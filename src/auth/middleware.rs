use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::error::Error;
use crate::models::Caller;
use crate::state::AppState;
use crate::utils::response::ApiError;

pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolves the bearer token against the auth provider on every request
/// and hands the resulting [`Caller`] to the handlers as an extension.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match bearer_token(auth_header) {
        Some(token) => token.to_string(),
        None => return Err(ApiError(Error::Unauthorized("Missing bearer token".into()))),
    };

    let user = state.auth.get_user(&token).await.map_err(|e| match e {
        Error::Unauthorized(m) => ApiError(Error::Unauthorized(m)),
        other => ApiError(Error::Unauthorized(format!("Session check failed: {}", other))),
    })?;

    req.extensions_mut().insert(Caller::new(user, token));
    Ok(next.run(req).await)
}
