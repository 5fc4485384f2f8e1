use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "app_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AppStatus {
    Applied,
    Screening,
    Interview,
    TechnicalTest,
    Offer,
    Rejected,
    Ghosting,
    Hired,
    Withdrawn,
}

impl AppStatus {
    pub const ALL: [AppStatus; 9] = [
        AppStatus::Applied,
        AppStatus::Screening,
        AppStatus::Interview,
        AppStatus::TechnicalTest,
        AppStatus::Offer,
        AppStatus::Rejected,
        AppStatus::Ghosting,
        AppStatus::Hired,
        AppStatus::Withdrawn,
    ];

    /// Statuses the ghosting sweep leaves alone.
    pub const TERMINAL: [AppStatus; 4] = [
        AppStatus::Hired,
        AppStatus::Rejected,
        AppStatus::Withdrawn,
        AppStatus::Ghosting,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AppStatus::Applied => "applied",
            AppStatus::Screening => "screening",
            AppStatus::Interview => "interview",
            AppStatus::TechnicalTest => "technical_test",
            AppStatus::Offer => "offer",
            AppStatus::Rejected => "rejected",
            AppStatus::Ghosting => "ghosting",
            AppStatus::Hired => "hired",
            AppStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AppStatus::Applied => "Applied",
            AppStatus::Screening => "Screening",
            AppStatus::Interview => "Interview",
            AppStatus::TechnicalTest => "Technical Test",
            AppStatus::Offer => "Offer",
            AppStatus::Rejected => "Rejected",
            AppStatus::Ghosting => "Ghosting",
            AppStatus::Hired => "Hired",
            AppStatus::Withdrawn => "Withdrawn",
        }
    }

    pub fn is_terminal(self) -> bool {
        Self::TERMINAL.contains(&self)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "work_setup")]
pub enum WorkSetup {
    Onsite,
    Hybrid,
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub user_id: Uuid,
    pub company: String,
    pub role: String,
    pub location: String,
    pub work_setup: WorkSetup,
    pub status: AppStatus,
    pub status_detail: Option<String>,
    pub source: Option<String>,
    pub job_link: Option<String>,
    pub notes: Option<String>,
    pub required_skills: Vec<String>,
    pub nice_to_have: Vec<String>,
    pub applied_at: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
    pub next_event_at: Option<DateTime<Utc>>,
    pub next_event_title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Columns selected for an `Application`, in struct order.
pub const APPLICATION_COLUMNS: &str = "id, user_id, company, role, location, work_setup, status, \
    status_detail, source, job_link, notes, required_skills, nice_to_have, applied_at, \
    last_update, next_event_at, next_event_title, created_at, updated_at";
