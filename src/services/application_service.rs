use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::dto::application_dto::{AdvanceStagePayload, CreateApplicationPayload};
use crate::error::{Error, Result};
use crate::models::application::{AppStatus, Application, APPLICATION_COLUMNS};
use crate::models::timeline_event::{TimelineEvent, TIMELINE_COLUMNS};
use crate::services::calendar_service::resolve_location;
use crate::services::pipeline::{compute_next_event, terminal_status_sql_list, SweepWindow};
use crate::utils::time::{parse_date_utc, parse_instant, Clock};
use crate::utils::validation::{clean_list, clean_optional, ensure_url};

#[derive(Clone)]
pub struct ApplicationService {
    pool: PgPool,
    clock: Arc<dyn Clock>,
    ghosting_window: Duration,
}

/// Validated column values for a new application.
#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
    pub company: String,
    pub role: String,
    pub location: String,
    pub work_setup: crate::models::application::WorkSetup,
    pub status: AppStatus,
    pub source: Option<String>,
    pub job_link: Option<String>,
    pub notes: Option<String>,
    pub required_skills: Vec<String>,
    pub nice_to_have: Vec<String>,
    pub applied_at: DateTime<Utc>,
}

impl NewApplication {
    pub fn from_payload(payload: CreateApplicationPayload) -> Result<Self> {
        payload.validate()?;

        let applied_at = parse_date_utc(&payload.applied_at)
            .ok_or_else(|| Error::BadRequest("Applied date invalid".to_string()))?;

        let job_link = clean_optional(payload.job_link);
        if let Some(link) = &job_link {
            ensure_url(link, "Job link is not a valid URL")?;
        }

        Ok(Self {
            company: payload.company.trim().to_string(),
            role: payload.role.trim().to_string(),
            location: payload.location.trim().to_string(),
            work_setup: payload.work_setup,
            status: payload.status,
            source: clean_optional(payload.source),
            job_link,
            notes: clean_optional(payload.notes),
            required_skills: clean_list(payload.required_skills),
            nice_to_have: clean_list(payload.nice_to_have),
            applied_at,
        })
    }
}

/// A parsed stage change, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct StageChange {
    pub stage: AppStatus,
    pub detail: Option<String>,
    pub at: DateTime<Utc>,
    pub mode: Option<crate::models::calendar_event::LocationMode>,
    pub meet_link: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl StageChange {
    pub fn from_payload(payload: AdvanceStagePayload) -> Result<Self> {
        let at = parse_instant(&payload.at)
            .ok_or_else(|| Error::BadRequest("Invalid 'at' date".to_string()))?;

        let (meet_link, location) = match payload.mode {
            Some(_) => resolve_location(payload.mode, payload.meet_link, payload.location)?,
            None => (
                clean_optional(payload.meet_link),
                clean_optional(payload.location),
            ),
        };

        Ok(Self {
            stage: payload.stage,
            detail: clean_optional(payload.detail),
            at,
            mode: payload.mode,
            meet_link,
            location,
            notes: clean_optional(payload.notes),
        })
    }
}

impl ApplicationService {
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>, ghosting_window: Duration) -> Self {
        Self {
            pool,
            clock,
            ghosting_window,
        }
    }

    /// Flips the caller's stale, non-terminal applications to ghosting.
    /// Flipped rows get `last_update` set to the sweep instant and lose
    /// their next-event hint.
    pub async fn sweep_ghosting(&self, user_id: Uuid) -> Result<u64> {
        let window = SweepWindow::from_clock(self.clock.as_ref(), self.ghosting_window);
        let sql = format!(
            r#"
            UPDATE applications
            SET status = 'ghosting',
                last_update = $2,
                next_event_at = NULL,
                next_event_title = NULL,
                updated_at = NOW()
            WHERE user_id = $1
              AND status NOT IN {}
              AND last_update < $3
              AND (next_event_at IS NULL OR next_event_at < $2)
            "#,
            terminal_status_sql_list()
        );
        let res = sqlx::query(&sql)
            .bind(user_id)
            .bind(window.now)
            .bind(window.cutoff)
            .execute(&self.pool)
            .await?;

        let flipped = res.rows_affected();
        if flipped > 0 {
            tracing::info!(%user_id, flipped, "applications marked as ghosting");
        }
        Ok(flipped)
    }

    /// Same predicate as [`sweep_ghosting`](Self::sweep_ghosting) across every user.
    pub async fn sweep_ghosting_all(&self) -> Result<u64> {
        let window = SweepWindow::from_clock(self.clock.as_ref(), self.ghosting_window);
        let sql = format!(
            r#"
            UPDATE applications
            SET status = 'ghosting',
                last_update = $1,
                next_event_at = NULL,
                next_event_title = NULL,
                updated_at = NOW()
            WHERE status NOT IN {}
              AND last_update < $2
              AND (next_event_at IS NULL OR next_event_at < $1)
            "#,
            terminal_status_sql_list()
        );
        let res = sqlx::query(&sql)
            .bind(window.now)
            .bind(window.cutoff)
            .execute(&self.pool)
            .await?;

        let flipped = res.rows_affected();
        tracing::info!(flipped, "scheduled ghosting sweep finished");
        Ok(flipped)
    }

    /// Runs the sweep, then returns the caller's applications, most recently
    /// updated first.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<Application>> {
        self.sweep_ghosting(user_id).await?;

        let sql = format!(
            "SELECT {} FROM applications WHERE user_id = $1 ORDER BY last_update DESC, created_at DESC",
            APPLICATION_COLUMNS
        );
        let items = sqlx::query_as::<_, Application>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn create(&self, user_id: Uuid, payload: CreateApplicationPayload) -> Result<Uuid> {
        let new_app = NewApplication::from_payload(payload)?;

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO applications (
                user_id, company, role, location, work_setup, status, status_detail,
                source, job_link, notes, required_skills, nice_to_have,
                applied_at, last_update, next_event_at, next_event_title
            ) VALUES (
                $1, $2, $3, $4, $5, $6, NULL,
                $7, $8, $9, $10, $11,
                $12, $12, NULL, NULL
            )
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(&new_app.company)
        .bind(&new_app.role)
        .bind(&new_app.location)
        .bind(new_app.work_setup)
        .bind(new_app.status)
        .bind(&new_app.source)
        .bind(&new_app.job_link)
        .bind(&new_app.notes)
        .bind(&new_app.required_skills)
        .bind(&new_app.nice_to_have)
        .bind(new_app.applied_at)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!(%user_id, application_id = %id, company = %new_app.company, "application created");
        Ok(id)
    }

    /// Fetches an application owned by `user_id`; other users' rows are
    /// reported exactly like missing ones.
    pub async fn get_owned(&self, user_id: Uuid, id: Uuid) -> Result<Application> {
        let sql = format!(
            "SELECT {} FROM applications WHERE id = $1 AND user_id = $2",
            APPLICATION_COLUMNS
        );
        sqlx::query_as::<_, Application>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Not found".to_string()))
    }

    pub async fn is_owned(&self, user_id: Uuid, id: Uuid) -> Result<bool> {
        let found: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM applications WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(found.is_some())
    }

    /// Newest first; ties on `at` fall back to insertion order.
    pub async fn timeline(&self, application_id: Uuid) -> Result<Vec<TimelineEvent>> {
        let sql = format!(
            "SELECT {} FROM application_timeline_events WHERE application_id = $1 ORDER BY at DESC, created_at DESC",
            TIMELINE_COLUMNS
        );
        let events = sqlx::query_as::<_, TimelineEvent>(&sql)
            .bind(application_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    /// Appends a timeline row and moves the application to its stage, in one
    /// transaction. No ordering between stages is enforced.
    pub async fn advance_stage(
        &self,
        user_id: Uuid,
        id: Uuid,
        payload: AdvanceStagePayload,
    ) -> Result<(Application, TimelineEvent)> {
        let change = StageChange::from_payload(payload)?;

        if !self.is_owned(user_id, id).await? {
            return Err(Error::NotFound("Not found".to_string()));
        }

        let now = self.clock.now();
        let next = compute_next_event(change.stage, change.detail.as_deref(), change.at, now);
        let (next_at, next_title) = match next {
            Some((at, title)) => (Some(at), Some(title)),
            None => (None, None),
        };

        let mut tx = self.pool.begin().await?;

        let insert_sql = format!(
            r#"
            INSERT INTO application_timeline_events
                (application_id, stage, detail, mode, meet_link, location, notes, at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            TIMELINE_COLUMNS
        );
        let event = sqlx::query_as::<_, TimelineEvent>(&insert_sql)
            .bind(id)
            .bind(change.stage)
            .bind(&change.detail)
            .bind(change.mode)
            .bind(&change.meet_link)
            .bind(&change.location)
            .bind(&change.notes)
            .bind(change.at)
            .fetch_one(&mut *tx)
            .await?;

        let update_sql = format!(
            r#"
            UPDATE applications
            SET status = $3,
                status_detail = $4,
                last_update = $5,
                next_event_at = $6,
                next_event_title = $7,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            APPLICATION_COLUMNS
        );
        let application = sqlx::query_as::<_, Application>(&update_sql)
            .bind(id)
            .bind(user_id)
            .bind(change.stage)
            .bind(&change.detail)
            .bind(change.at)
            .bind(next_at)
            .bind(&next_title)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            %user_id,
            application_id = %id,
            stage = change.stage.as_str(),
            "application stage advanced"
        );
        Ok((application, event))
    }

    pub async fn status_counts(&self, user_id: Uuid) -> Result<Vec<(AppStatus, i64)>> {
        let rows = sqlx::query_as::<_, (AppStatus, i64)>(
            "SELECT status, COUNT(*) FROM applications WHERE user_id = $1 GROUP BY status",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Applications whose next-event hint falls in `[start, end)`, soonest first.
    pub async fn with_next_event_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Application>> {
        let sql = format!(
            r#"
            SELECT {} FROM applications
            WHERE user_id = $1 AND next_event_at >= $2 AND next_event_at < $3
            ORDER BY next_event_at ASC
            "#,
            APPLICATION_COLUMNS
        );
        let items = sqlx::query_as::<_, Application>(&sql)
            .bind(user_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::WorkSetup;
    use crate::models::calendar_event::LocationMode;
    use chrono::TimeZone;

    fn create_payload() -> CreateApplicationPayload {
        CreateApplicationPayload {
            company: "  Acme Corp ".into(),
            role: "Backend Engineer".into(),
            location: "Jakarta".into(),
            work_setup: WorkSetup::Hybrid,
            status: AppStatus::Applied,
            applied_at: "2026-01-15".into(),
            job_link: Some(" https://acme.example/jobs/1 ".into()),
            notes: Some("   ".into()),
            source: Some("LinkedIn".into()),
            required_skills: Some(vec!["Rust".into(), " ".into(), "Postgres".into()]),
            nice_to_have: None,
        }
    }

    fn stage_payload(at: &str) -> AdvanceStagePayload {
        AdvanceStagePayload {
            stage: AppStatus::Interview,
            detail: Some("hr".into()),
            at: at.into(),
            mode: None,
            meet_link: None,
            location: None,
            notes: None,
        }
    }

    #[test]
    fn new_application_is_trimmed_and_dated_at_utc_midnight() {
        let app = NewApplication::from_payload(create_payload()).unwrap();
        assert_eq!(app.company, "Acme Corp");
        assert_eq!(app.job_link.as_deref(), Some("https://acme.example/jobs/1"));
        assert_eq!(app.notes, None);
        assert_eq!(app.required_skills, vec!["Rust", "Postgres"]);
        assert!(app.nice_to_have.is_empty());
        assert_eq!(app.applied_at, Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn blank_company_is_a_validation_error() {
        let mut payload = create_payload();
        payload.company = "   ".into();
        let err = NewApplication::from_payload(payload).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn bad_date_or_link_is_rejected() {
        let mut payload = create_payload();
        payload.applied_at = "15/01/2026".into();
        assert!(matches!(
            NewApplication::from_payload(payload),
            Err(Error::BadRequest(msg)) if msg == "Applied date invalid"
        ));

        let mut payload = create_payload();
        payload.job_link = Some("acme jobs".into());
        assert!(matches!(
            NewApplication::from_payload(payload),
            Err(Error::BadRequest(_))
        ));
    }

    #[test]
    fn stage_change_requires_parseable_instant() {
        assert!(matches!(
            StageChange::from_payload(stage_payload("next tuesday")),
            Err(Error::BadRequest(msg)) if msg == "Invalid 'at' date"
        ));
        let change = StageChange::from_payload(stage_payload("2026-02-01T09:00:00Z")).unwrap();
        assert_eq!(change.at, Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap());
        assert_eq!(change.detail.as_deref(), Some("hr"));
    }

    #[test]
    fn stage_change_keeps_the_field_matching_its_mode() {
        let mut payload = stage_payload("2026-02-01T09:00:00Z");
        payload.mode = Some(LocationMode::Offline);
        payload.meet_link = Some("https://meet.example/x".into());
        payload.location = Some(" Tower A, 5th floor ".into());
        let change = StageChange::from_payload(payload).unwrap();
        assert_eq!(change.meet_link, None);
        assert_eq!(change.location.as_deref(), Some("Tower A, 5th floor"));

        let mut payload = stage_payload("2026-02-01T09:00:00Z");
        payload.mode = Some(LocationMode::Online);
        payload.meet_link = Some("not a link".into());
        assert!(StageChange::from_payload(payload).is_err());
    }

    #[test]
    fn stage_change_without_mode_keeps_both_location_fields() {
        let mut payload = stage_payload("2026-02-01T09:00:00Z");
        payload.meet_link = Some("https://meet.example/x".into());
        payload.location = Some("HQ".into());
        payload.notes = Some("  bring portfolio ".into());
        let change = StageChange::from_payload(payload).unwrap();
        assert_eq!(change.meet_link.as_deref(), Some("https://meet.example/x"));
        assert_eq!(change.location.as_deref(), Some("HQ"));
        assert_eq!(change.notes.as_deref(), Some("bring portfolio"));
    }
}
