use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::calendar_dto::{
    CalendarRangeQuery, CreateCalendarEventPayload, UpdateCalendarEventPayload,
};
use crate::error::{Error, Result};
use crate::models::calendar_event::{CalendarEvent, EventType, LocationMode, CALENDAR_COLUMNS};
use crate::utils::time::{parse_instant, Clock};
use crate::utils::validation::{clean_optional, ensure_url};

const MEET_LINK_INVALID: &str = "Meet link is not a valid URL";
const APPLICATION_NOT_YOURS: &str = "Application not found / not yours";

/// Keeps only the location field that fits `mode`: a meeting link for
/// online (validated as a URL), a place for offline, neither otherwise.
pub fn resolve_location(
    mode: Option<LocationMode>,
    meet_link: Option<String>,
    place: Option<String>,
) -> Result<(Option<String>, Option<String>)> {
    match mode {
        Some(LocationMode::Online) => {
            let link = clean_optional(meet_link);
            if let Some(link) = &link {
                ensure_url(link, MEET_LINK_INVALID)?;
            }
            Ok((link, None))
        }
        Some(LocationMode::Offline) => Ok((None, clean_optional(place))),
        None => Ok((None, None)),
    }
}

/// `[start, end)` to list; both bounds must parse, otherwise the whole
/// default window around `now` is used.
pub fn resolve_range(query: &CalendarRangeQuery, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = query.start.as_deref().and_then(parse_instant);
    let end = query.end.as_deref().and_then(parse_instant);
    match (start, end) {
        (Some(start), Some(end)) => (start, end),
        _ => (now - Duration::days(60), now + Duration::days(30)),
    }
}

fn parse_application_ref(raw: Option<String>) -> Result<Option<Uuid>> {
    match clean_optional(raw) {
        Some(id) => Uuid::parse_str(&id)
            .map(Some)
            .map_err(|_| Error::BadRequest(APPLICATION_NOT_YOURS.to_string())),
        None => Ok(None),
    }
}

fn parse_required_title(raw: Option<String>) -> Result<String> {
    clean_optional(raw).ok_or_else(|| Error::BadRequest("Title is required".to_string()))
}

fn parse_start(raw: Option<&str>) -> Result<DateTime<Utc>> {
    raw.and_then(parse_instant)
        .ok_or_else(|| Error::BadRequest("Start time invalid".to_string()))
}

/// Blank or missing clears the end; anything else must parse.
fn parse_end(raw: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_instant(s)
            .map(Some)
            .ok_or_else(|| Error::BadRequest("End time invalid".to_string())),
        None => Ok(None),
    }
}

fn ensure_end_after_start(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Result<()> {
    match end {
        Some(end) if end <= start => Err(Error::BadRequest(
            "End time must be after start".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Complete set of writable columns for a calendar row.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarDraft {
    pub title: String,
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

impl CalendarDraft {
    pub fn from_create(payload: CreateCalendarEventPayload) -> Result<Self> {
        let title = parse_required_title(Some(payload.title))?;
        let start_at = parse_start(Some(payload.start_at.as_str()))?;
        let end_at = parse_end(payload.end_at.as_deref())?;
        ensure_end_after_start(start_at, end_at)?;

        let application_id = parse_application_ref(payload.application_id)?;
        let (meet_link, place) =
            resolve_location(payload.location_type, payload.meet_link, payload.place)?;

        Ok(Self {
            title,
            event_type: payload.event_type,
            company: clean_optional(payload.company),
            start_at,
            end_at,
            location_type: payload.location_type,
            meet_link,
            place,
            note: clean_optional(payload.note),
            application_id,
        })
    }

    /// Merges a PATCH body into `existing`. The second value is an
    /// application newly linked by this patch, which still needs an
    /// ownership check.
    pub fn from_update(
        existing: &CalendarEvent,
        payload: UpdateCalendarEventPayload,
    ) -> Result<(Self, Option<Uuid>)> {
        let title = match payload.title {
            Some(raw) => parse_required_title(raw)?,
            None => existing.title.clone(),
        };

        let event_type = match payload.event_type {
            Some(Some(t)) => t,
            Some(None) => return Err(Error::BadRequest("Type invalid".to_string())),
            None => existing.event_type,
        };

        let company = match payload.company {
            Some(raw) => clean_optional(raw),
            None => existing.company.clone(),
        };

        let note = match payload.note {
            Some(raw) => clean_optional(raw),
            None => existing.note.clone(),
        };

        let start_at = match &payload.start_at {
            Some(raw) => parse_start(raw.as_deref())?,
            None => existing.start_at,
        };

        let end_at = match &payload.end_at {
            Some(raw) => parse_end(raw.as_deref())?,
            None => existing.end_at,
        };

        ensure_end_after_start(start_at, end_at)?;

        let mode_changed = payload.location_type.is_some();
        let location_type = match payload.location_type {
            Some(mode) => mode,
            None => existing.location_type,
        };

        let (mut application_id, mut newly_linked) = (existing.application_id, None);
        if let Some(raw) = payload.application_id {
            application_id = parse_application_ref(raw)?;
            newly_linked = application_id;
        }

        let meet_link = match payload.meet_link {
            Some(raw) if location_type == Some(LocationMode::Online) => {
                resolve_location(location_type, raw, None)?.0
            }
            Some(_) => None,
            None if mode_changed && location_type != Some(LocationMode::Online) => None,
            None => existing.meet_link.clone(),
        };

        let place = match payload.place {
            Some(raw) if location_type == Some(LocationMode::Offline) => clean_optional(raw),
            Some(_) => None,
            None if mode_changed && location_type != Some(LocationMode::Offline) => None,
            None => existing.place.clone(),
        };

        Ok((
            Self {
                title,
                event_type,
                company,
                start_at,
                end_at,
                location_type,
                meet_link,
                place,
                note,
                application_id,
            },
            newly_linked,
        ))
    }
}

#[derive(Clone)]
pub struct CalendarService {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl CalendarService {
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    pub async fn list(&self, user_id: Uuid, query: &CalendarRangeQuery) -> Result<Vec<CalendarEvent>> {
        let (start, end) = resolve_range(query, self.clock.now());
        self.list_between(user_id, start, end).await
    }

    /// Events starting in `[start, end)`, ascending.
    pub async fn list_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>> {
        let sql = format!(
            r#"
            SELECT {} FROM calendar_events
            WHERE user_id = $1 AND start_at >= $2 AND start_at < $3
            ORDER BY start_at ASC
            "#,
            CALENDAR_COLUMNS
        );
        let items = sqlx::query_as::<_, CalendarEvent>(&sql)
            .bind(user_id)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn get_owned(&self, user_id: Uuid, id: Uuid) -> Result<CalendarEvent> {
        let sql = format!(
            "SELECT {} FROM calendar_events WHERE id = $1 AND user_id = $2",
            CALENDAR_COLUMNS
        );
        sqlx::query_as::<_, CalendarEvent>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Not found".to_string()))
    }

    async fn ensure_application_owned(&self, user_id: Uuid, application_id: Uuid) -> Result<()> {
        let found: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM applications WHERE id = $1 AND user_id = $2")
                .bind(application_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        match found {
            Some(_) => Ok(()),
            None => Err(Error::BadRequest(APPLICATION_NOT_YOURS.to_string())),
        }
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        payload: CreateCalendarEventPayload,
    ) -> Result<CalendarEvent> {
        let draft = CalendarDraft::from_create(payload)?;
        if let Some(application_id) = draft.application_id {
            self.ensure_application_owned(user_id, application_id).await?;
        }

        let sql = format!(
            r#"
            INSERT INTO calendar_events (
                user_id, application_id, title, event_type, company, start_at, end_at,
                location_type, meet_link, place, note
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            CALENDAR_COLUMNS
        );
        let event = sqlx::query_as::<_, CalendarEvent>(&sql)
            .bind(user_id)
            .bind(draft.application_id)
            .bind(&draft.title)
            .bind(draft.event_type)
            .bind(&draft.company)
            .bind(draft.start_at)
            .bind(draft.end_at)
            .bind(draft.location_type)
            .bind(&draft.meet_link)
            .bind(&draft.place)
            .bind(&draft.note)
            .fetch_one(&self.pool)
            .await?;

        tracing::info!(%user_id, event_id = %event.id, "calendar event created");
        Ok(event)
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        payload: UpdateCalendarEventPayload,
    ) -> Result<CalendarEvent> {
        let existing = self.get_owned(user_id, id).await?;
        let (draft, newly_linked) = CalendarDraft::from_update(&existing, payload)?;
        if let Some(application_id) = newly_linked {
            self.ensure_application_owned(user_id, application_id).await?;
        }

        let sql = format!(
            r#"
            UPDATE calendar_events
            SET application_id = $3,
                title = $4,
                event_type = $5,
                company = $6,
                start_at = $7,
                end_at = $8,
                location_type = $9,
                meet_link = $10,
                place = $11,
                note = $12,
                updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            CALENDAR_COLUMNS
        );
        let event = sqlx::query_as::<_, CalendarEvent>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(draft.application_id)
            .bind(&draft.title)
            .bind(draft.event_type)
            .bind(&draft.company)
            .bind(draft.start_at)
            .bind(draft.end_at)
            .bind(draft.location_type)
            .bind(&draft.meet_link)
            .bind(&draft.place)
            .bind(&draft.note)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Not found".to_string()))?;

        tracing::info!(%user_id, event_id = %id, "calendar event updated");
        Ok(event)
    }

    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let res = sqlx::query("DELETE FROM calendar_events WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(Error::NotFound("Not found".to_string()));
        }
        tracing::info!(%user_id, event_id = %id, "calendar event deleted");
        Ok(())
    }
}
