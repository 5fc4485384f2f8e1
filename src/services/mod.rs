pub mod application_service;
pub mod auth_service;
pub mod avatar_store;
pub mod calendar_service;
pub mod dashboard_service;
pub mod pipeline;
pub mod profile_service;
