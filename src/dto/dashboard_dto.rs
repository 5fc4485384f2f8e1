use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UpcomingSource {
    Application,
    Calendar,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpcomingItem {
    pub source: UpcomingSource,
    pub id: Uuid,
    pub application_id: Option<Uuid>,
    pub title: String,
    pub company: Option<String>,
    pub role: Option<String>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub total: i64,
    pub active: i64,
    pub by_status: BTreeMap<String, i64>,
    pub upcoming: Vec<UpcomingItem>,
}
