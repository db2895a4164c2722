use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};

use crate::auth::middleware::auth_middleware;
use crate::handlers;
use crate::state::AppState;

/// Full HTTP surface. Every route except health and the sign-in family
/// goes through the bearer-token check.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route(
            "/api/collection",
            get(handlers::collection::list_collection).post(handlers::collection::create_entry),
        )
        .route(
            "/api/collection/{id}",
            get(handlers::collection::get_entry)
                .put(handlers::collection::update_entry)
                .delete(handlers::collection::delete_entry),
        )
        .route(
            "/api/work",
            get(handlers::work::list_works).post(handlers::work::create_work),
        )
        .route(
            "/api/work/{id}",
            get(handlers::work::get_work)
                .put(handlers::work::update_work)
                .delete(handlers::work::delete_work),
        )
        .route(
            "/api/collection-work",
            get(handlers::collection_work::list_links).post(handlers::collection_work::create_link),
        )
        .route(
            "/api/collection-work/{id}",
            get(handlers::collection_work::get_link)
                .put(handlers::collection_work::update_link)
                .delete(handlers::collection_work::delete_link),
        )
        .route("/api/auth/user", get(handlers::auth::current_user))
        .route("/api/auth/password", put(handlers::auth::change_password))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let public = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/api/auth/magic-link", post(handlers::auth::magic_link))
        .route("/api/auth/recover", post(handlers::auth::recover));

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        )
        .with_state(state)
}
