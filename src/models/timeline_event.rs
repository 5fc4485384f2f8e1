use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::application::AppStatus;
use super::calendar_event::LocationMode;

/// One stage transition of an application. Rows are only ever inserted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TimelineEvent {
    pub id: Uuid,
    pub application_id: Uuid,
    pub stage: AppStatus,
    pub detail: Option<String>,
    pub mode: Option<LocationMode>,
    pub meet_link: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

pub const TIMELINE_COLUMNS: &str =
    "id, application_id, stage, detail, mode, meet_link, location, notes, at, created_at";
