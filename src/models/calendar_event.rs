use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "location_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LocationMode {
    Online,
    Offline,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "event_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    InterviewHr,
    InterviewUser,
    TechnicalTest,
    Psychotest,
    Offer,
    FollowUp,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CalendarEvent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub application_id: Option<Uuid>,
    pub title: String,
    pub event_type: EventType,
    pub company: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    pub location_type: Option<LocationMode>,
    pub meet_link: Option<String>,
    pub place: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const CALENDAR_COLUMNS: &str = "id, user_id, application_id, title, event_type, company, \
    start_at, end_at, location_type, meet_link, place, note, created_at, updated_at";
