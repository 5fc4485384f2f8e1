use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::double_option;
use crate::models::calendar_event::{CalendarEvent, EventType, LocationMode};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCalendarEventPayload {
    #[serde(default)]
    pub title: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default)]
    pub start_at: String,
    pub end_at: Option<String>,
    pub company: Option<String>,
    pub location_type: Option<LocationMode>,
    pub meet_link: Option<String>,
    pub place: Option<String>,
    pub note: Option<String>,
    pub application_id: Option<String>,
}

/// Every field is tri-state: absent leaves the stored value, `null` clears
/// it (or is rejected where the column is required).
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCalendarEventPayload {
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub title: Option<Option<String>>,
    #[serde(default, rename = "type", deserialize_with = "double_option")]
    #[schema(value_type = Option<EventType>)]
    pub event_type: Option<Option<EventType>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub start_at: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub end_at: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub company: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<LocationMode>)]
    pub location_type: Option<Option<LocationMode>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub meet_link: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub place: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub note: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub application_id: Option<Option<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CalendarRangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventDto {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub company: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
    pub location_type: Option<LocationMode>,
    pub meet_link: Option<String>,
    pub place: Option<String>,
    pub note: Option<String>,
    pub application_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CalendarEventListResponse {
    pub items: Vec<CalendarEventDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CalendarEventResponse {
    pub item: CalendarEventDto,
}

impl From<CalendarEvent> for CalendarEventDto {
    fn from(value: CalendarEvent) -> Self {
        Self {
            id: value.id,
            title: value.title,
            event_type: value.event_type,
            company: value.company,
            start_at: value.start_at,
            end_at: value.end_at,
            location_type: value.location_type,
            meet_link: value.meet_link,
            place: value.place,
            note: value.note,
            application_id: value.application_id,
        }
    }
}
