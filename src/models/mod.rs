pub mod application;
pub mod calendar_event;
pub mod profile;
pub mod timeline_event;
pub mod user;
