//! Stage rules shared by the request handlers and the scheduled sweep.
//!
//! Any stage may follow any other; the only automatic transition is the
//! ghosting sweep, whose predicate lives here next to its SQL twin.

use chrono::{DateTime, Duration, Utc};

use crate::models::application::AppStatus;
use crate::utils::time::Clock;

/// Title shown for an upcoming stage event.
pub fn next_event_title(stage: AppStatus, detail: Option<&str>) -> String {
    let detail = detail.map(str::trim).unwrap_or("other");
    match stage {
        AppStatus::Interview => match detail {
            "hr" => "HR Interview",
            "user" => "User Interview",
            "technical" => "Technical Interview",
            "cultural" => "Cultural / Fit Interview",
            _ => "Interview",
        }
        .to_string(),
        AppStatus::TechnicalTest => match detail {
            "live_code" => "Live Coding",
            "take_home" => "Take-home Test",
            "offline" => "Offline Technical Test",
            "psychotest" => "Psychotest",
            _ => "Technical Test",
        }
        .to_string(),
        other => other.as_str().replace('_', " "),
    }
}

/// The "next event" hint left on an application after a stage change at
/// `at`: only events strictly after `now` qualify.
pub fn compute_next_event(
    stage: AppStatus,
    detail: Option<&str>,
    at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<(DateTime<Utc>, String)> {
    (at > now).then(|| (at, next_event_title(stage, detail)))
}

/// Whether the sweep would flip an application to ghosting.
pub fn is_stale(
    status: AppStatus,
    last_update: DateTime<Utc>,
    next_event_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    window: Duration,
) -> bool {
    if status.is_terminal() {
        return false;
    }
    let cutoff = now - window;
    let nothing_pending = next_event_at.map_or(true, |at| at < now);
    last_update < cutoff && nothing_pending
}

/// The instant a sweep runs at and the staleness cutoff derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepWindow {
    pub now: DateTime<Utc>,
    pub cutoff: DateTime<Utc>,
}

impl SweepWindow {
    pub fn from_clock(clock: &dyn Clock, window: Duration) -> Self {
        let now = clock.now();
        Self {
            now,
            cutoff: now - window,
        }
    }
}

/// `('hired', 'rejected', ...)` for use in SQL against the `app_status` enum.
pub fn terminal_status_sql_list() -> String {
    let quoted: Vec<String> = AppStatus::TERMINAL
        .iter()
        .map(|s| format!("'{}'", s.as_str()))
        .collect();
    format!("({})", quoted.join(", "))
}
