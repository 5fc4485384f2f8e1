use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::application::{AppStatus, Application, WorkSetup};
use crate::models::calendar_event::LocationMode;
use crate::models::timeline_event::TimelineEvent;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationPayload {
    #[serde(default)]
    #[validate(custom(
        function = "crate::utils::validation::non_blank",
        message = "Company is required"
    ))]
    pub company: String,
    #[serde(default)]
    #[validate(custom(
        function = "crate::utils::validation::non_blank",
        message = "Role is required"
    ))]
    pub role: String,
    #[serde(default)]
    #[validate(custom(
        function = "crate::utils::validation::non_blank",
        message = "Location is required"
    ))]
    pub location: String,
    pub work_setup: WorkSetup,
    pub status: AppStatus,
    /// `YYYY-MM-DD`, stored as UTC midnight.
    #[serde(default)]
    pub applied_at: String,
    pub job_link: Option<String>,
    pub notes: Option<String>,
    pub source: Option<String>,
    pub required_skills: Option<Vec<String>>,
    pub nice_to_have: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceStagePayload {
    pub stage: AppStatus,
    pub detail: Option<String>,
    /// RFC 3339 timestamp of the stage event.
    #[serde(default)]
    pub at: String,
    pub mode: Option<LocationMode>,
    pub meet_link: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSummary {
    pub id: Uuid,
    pub company: String,
    pub role: String,
    pub location: String,
    pub work_setup: WorkSetup,
    pub status: AppStatus,
    pub status_detail: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
    pub next_event_at: Option<DateTime<Utc>>,
    pub next_event_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetail {
    pub id: Uuid,
    pub company: String,
    pub role: String,
    pub location: String,
    pub work_setup: WorkSetup,
    pub status: AppStatus,
    pub status_detail: Option<String>,
    pub source: Option<String>,
    pub job_link: Option<String>,
    pub required_skills: Vec<String>,
    pub nice_to_have: Vec<String>,
    pub notes: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
    pub next_event_at: Option<DateTime<Utc>>,
    pub next_event_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEventDto {
    pub id: Uuid,
    pub stage: AppStatus,
    pub detail: Option<String>,
    pub at: DateTime<Utc>,
    pub mode: Option<LocationMode>,
    pub meet_link: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApplicationListResponse {
    pub items: Vec<ApplicationSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApplicationDetailResponse {
    pub application: ApplicationDetail,
    pub timeline: Vec<TimelineEventDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatedApplicationRef {
    pub id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateApplicationResponse {
    pub application: CreatedApplicationRef,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdvanceStageResponse {
    pub application: ApplicationDetail,
    pub event: TimelineEventDto,
}

impl From<Application> for ApplicationSummary {
    fn from(value: Application) -> Self {
        Self {
            id: value.id,
            company: value.company,
            role: value.role,
            location: value.location,
            work_setup: value.work_setup,
            status: value.status,
            status_detail: value.status_detail,
            applied_at: value.applied_at,
            last_update: value.last_update,
            next_event_at: value.next_event_at,
            next_event_title: value.next_event_title,
        }
    }
}

impl From<Application> for ApplicationDetail {
    fn from(value: Application) -> Self {
        Self {
            id: value.id,
            company: value.company,
            role: value.role,
            location: value.location,
            work_setup: value.work_setup,
            status: value.status,
            status_detail: value.status_detail,
            source: value.source,
            job_link: value.job_link,
            required_skills: value.required_skills,
            nice_to_have: value.nice_to_have,
            notes: value.notes,
            applied_at: value.applied_at,
            last_update: value.last_update,
            next_event_at: value.next_event_at,
            next_event_title: value.next_event_title,
        }
    }
}

impl From<TimelineEvent> for TimelineEventDto {
    fn from(value: TimelineEvent) -> Self {
        Self {
            id: value.id,
            stage: value.stage,
            detail: value.detail,
            at: value.at,
            mode: value.mode,
            meet_link: value.meet_link,
            location: value.location,
            notes: value.notes,
        }
    }
}
