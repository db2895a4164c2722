use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::handlers;
use crate::models;
use crate::utils::response::ErrorBody;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "WeebList API",
        description = "Track anime, manga and simulcast progress in a personal collection.",
        version = "1.0.0"
    ),
    servers(
        (url = "http://localhost:7783", description = "Local development server")
    ),
    paths(
        handlers::collection::list_collection,
        handlers::collection::create_entry,
        handlers::collection::get_entry,
        handlers::collection::update_entry,
        handlers::collection::delete_entry,
        handlers::work::list_works,
        handlers::work::create_work,
        handlers::work::get_work,
        handlers::work::update_work,
        handlers::work::delete_work,
        handlers::collection_work::list_links,
        handlers::collection_work::create_link,
        handlers::collection_work::get_link,
        handlers::collection_work::update_link,
        handlers::collection_work::delete_link,
        handlers::auth::login,
        handlers::auth::signup,
        handlers::auth::magic_link,
        handlers::auth::recover,
        handlers::auth::current_user,
        handlers::auth::change_password,
        handlers::auth::logout,
    ),
    components(
        schemas(
            models::CollectionEntry,
            models::EntryType,
            models::NewEntry,
            models::EntryPatch,
            models::Work,
            models::NewWork,
            models::WorkPatch,
            models::CollectionWork,
            models::NewCollectionWork,
            models::CollectionWorkPatch,
            models::User,
            models::Session,
            models::Credentials,
            models::EmailRequest,
            models::PasswordChange,
            ErrorBody,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        )
    }
}
