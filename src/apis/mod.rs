use std::sync::Arc;

use axum::Router;
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_scalar::{Scalar, Servable};

use crate::AppState;

pub mod api_models;
pub mod user_handlers;

#[derive(OpenApi)]
#[openapi(
    tags(
        (name = "users", description = "User profiles, follows and search")
    )
)]
pub struct ApiDoc;

pub fn setup_routes() -> Router<Arc<AppState>> {
    let api_doc = ApiDoc::openapi();

    let user_router = OpenApiRouter::new()
        .routes(routes!(
            user_handlers::get_user,
            user_handlers::update_user_profile
        ))
        .routes(routes!(user_handlers::follow_user))
        .routes(routes!(user_handlers::unfollow_user))
        .routes(routes!(user_handlers::get_followers))
        .routes(routes!(user_handlers::get_following))
        .routes(routes!(user_handlers::search_users));

    let user_router = OpenApiRouter::with_openapi(api_doc).nest("/users", user_router);

    let (api_router, api_openapi) = OpenApiRouter::new()
        .nest("/api/v1", user_router)
        .split_for_parts();

    Router::new()
        .merge(Scalar::with_url("/docs", api_openapi))
        .merge(api_router)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_assembles_every_route() {
        // Route registration panics on conflicts, so building is the check.
        let _ = setup_routes();
    }
}
