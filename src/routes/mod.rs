pub mod application;
pub mod auth;
pub mod calendar;
pub mod dashboard;
pub mod docs;
pub mod health;
pub mod profile;

use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::middleware::{
    auth::require_session,
    cors::cors_layer,
    rate_limit::{rps_middleware, RateLimiter},
};
use crate::services::avatar_store::MAX_AVATAR_BYTES;
use crate::AppState;

/// Path ids that are not UUIDs cannot name a row.
pub fn parse_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|_| Error::NotFound("Not found".to_string()))
}

pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    let throttled_auth = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .layer(from_fn_with_state(
            RateLimiter::new(config.auth_rps),
            rps_middleware,
        ));

    let open_routes = Router::new()
        .route("/health", get(health::health))
        .route("/auth/me", get(auth::me))
        .route("/auth/logout", post(auth::logout))
        .route("/api-docs/openapi.json", get(docs::openapi_json));

    let protected = Router::new()
        .route(
            "/applications",
            get(application::list_applications).post(application::create_application),
        )
        .route("/applications/:id", get(application::get_application))
        .route(
            "/applications/:id/timeline",
            post(application::advance_stage),
        )
        .route(
            "/calendar-events",
            get(calendar::list_events).post(calendar::create_event),
        )
        .route(
            "/calendar-events/:id",
            get(calendar::get_event)
                .patch(calendar::update_event)
                .delete(calendar::delete_event),
        )
        .route(
            "/profile",
            get(profile::get_profile).patch(profile::update_profile),
        )
        .route(
            "/profile/avatar",
            post(profile::upload_avatar)
                .layer(DefaultBodyLimit::max(MAX_AVATAR_BYTES + 64 * 1024)),
        )
        .route("/dashboard", get(dashboard::get_dashboard))
        .route_layer(from_fn_with_state(state.clone(), require_session));

    throttled_auth
        .merge(open_routes)
        .merge(protected)
        .nest_service("/uploads", ServeDir::new(&config.uploads_dir))
        .with_state(state)
        .layer(cors_layer(config.cors_origin.as_deref()))
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_ids_are_not_found() {
        assert!(matches!(parse_id("abc"), Err(Error::NotFound(_))));
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
    }
}
