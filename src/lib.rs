pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::services::{
    application_service::ApplicationService, auth_service::AuthService,
    avatar_store::AvatarStore, calendar_service::CalendarService,
    dashboard_service::DashboardService, profile_service::ProfileService,
};
use crate::utils::time::{Clock, SystemClock};

pub use routes::build_router;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub clock: Arc<dyn Clock>,
    pub auth_service: AuthService,
    pub application_service: ApplicationService,
    pub calendar_service: CalendarService,
    pub profile_service: ProfileService,
    pub dashboard_service: DashboardService,
    pub avatar_store: AvatarStore,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config) -> Self {
        Self::with_clock(pool, config, Arc::new(SystemClock))
    }

    pub fn with_clock(pool: PgPool, config: Config, clock: Arc<dyn Clock>) -> Self {
        let auth_service = AuthService::new(pool.clone());
        let application_service =
            ApplicationService::new(pool.clone(), clock.clone(), config.ghosting_window());
        let calendar_service = CalendarService::new(pool.clone(), clock.clone());
        let profile_service = ProfileService::new(pool.clone());
        let dashboard_service = DashboardService::new(
            application_service.clone(),
            calendar_service.clone(),
            clock.clone(),
        );
        let avatar_store = AvatarStore::new(&config.uploads_dir, config.public_base_url.clone());

        Self {
            pool,
            config: Arc::new(config),
            clock,
            auth_service,
            application_service,
            calendar_service,
            profile_service,
            dashboard_service,
            avatar_store,
        }
    }
}
