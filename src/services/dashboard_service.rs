use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use crate::dto::dashboard_dto::{DashboardResponse, UpcomingItem, UpcomingSource};
use crate::error::Result;
use crate::models::application::AppStatus;
use crate::services::application_service::ApplicationService;
use crate::services::calendar_service::CalendarService;
use crate::utils::time::Clock;

const UPCOMING_DAYS: i64 = 7;

#[derive(Clone)]
pub struct DashboardService {
    applications: ApplicationService,
    calendar: CalendarService,
    clock: Arc<dyn Clock>,
}

/// Every status appears, zero-filled.
pub fn status_breakdown(counts: &[(AppStatus, i64)]) -> (i64, i64, BTreeMap<String, i64>) {
    let mut by_status: BTreeMap<String, i64> = AppStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    let (mut total, mut active) = (0, 0);
    for (status, count) in counts {
        *by_status.entry(status.as_str().to_string()).or_insert(0) += count;
        total += count;
        if !status.is_terminal() {
            active += count;
        }
    }
    (total, active, by_status)
}

impl DashboardService {
    pub fn new(
        applications: ApplicationService,
        calendar: CalendarService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            applications,
            calendar,
            clock,
        }
    }

    pub async fn summary(&self, user_id: Uuid) -> Result<DashboardResponse> {
        self.applications.sweep_ghosting(user_id).await?;

        let counts = self.applications.status_counts(user_id).await?;
        let (total, active, by_status) = status_breakdown(&counts);

        let now = self.clock.now();
        let until = now + Duration::days(UPCOMING_DAYS);

        let mut upcoming: Vec<UpcomingItem> = self
            .applications
            .with_next_event_between(user_id, now, until)
            .await?
            .into_iter()
            .filter_map(|app| {
                let at = app.next_event_at?;
                Some(UpcomingItem {
                    source: UpcomingSource::Application,
                    id: app.id,
                    application_id: Some(app.id),
                    title: app.next_event_title.unwrap_or_else(|| app.status.label().to_string()),
                    company: Some(app.company),
                    role: Some(app.role),
                    at,
                })
            })
            .collect();

        upcoming.extend(
            self.calendar
                .list_between(user_id, now, until)
                .await?
                .into_iter()
                .map(|event| UpcomingItem {
                    source: UpcomingSource::Calendar,
                    id: event.id,
                    application_id: event.application_id,
                    title: event.title,
                    company: event.company,
                    role: None,
                    at: event.start_at,
                }),
        );
        upcoming.sort_by_key(|item| item.at);

        Ok(DashboardResponse {
            total,
            active,
            by_status,
            upcoming,
        })
    }
}
