use chrono::{Duration, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};

/// Remaining time below which a live session is flagged as urgent
pub const URGENT_THRESHOLD_SECS: i64 = 300;

/// Shown in place of a remaining duration once the deadline has passed
pub const PAST_DEADLINE: &str = "past deadline";

/// The single persisted session: a task description and its time budget.
///
/// Timestamps are local wall-clock time at second precision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub request: String,
    pub duration_minutes: i64,
    pub started_at: NaiveDateTime,
    pub deadline: NaiveDateTime,
}

impl SessionRecord {
    /// Build a record starting at `started_at` with the deadline derived from the budget.
    pub fn new(
        request: impl Into<String>,
        duration_minutes: i64,
        started_at: NaiveDateTime,
    ) -> Result<Self> {
        if duration_minutes <= 0 {
            return Err(AgentError::InvalidDuration(duration_minutes));
        }
        let started_at = started_at.trunc_subsecs(0);
        let deadline = Duration::try_minutes(duration_minutes)
            .and_then(|budget| started_at.checked_add_signed(budget))
            .ok_or(AgentError::InvalidDuration(duration_minutes))?;

        Ok(Self {
            request: request.into(),
            duration_minutes,
            started_at,
            deadline,
        })
    }

    pub fn budget_secs(&self) -> i64 {
        self.duration_minutes.saturating_mul(60)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum SessionPhase {
    #[strum(to_string = "Active Session")]
    Active,
    #[strum(to_string = "Session Expired")]
    Expired,
}

/// Metrics derived from a record at a given instant. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionStatus {
    pub record: SessionRecord,
    pub now: NaiveDateTime,
    pub elapsed_secs: i64,
    pub remaining_secs: i64,
    pub percent_complete: i64,
    pub is_active: bool,
    pub is_urgent: bool,
}

impl SessionStatus {
    /// Compute elapsed/remaining/percent for `record` as seen at `now`.
    ///
    /// All three instants are cut to whole seconds first, so records written
    /// with fractional seconds compute the same as ones written by `new`.
    /// Elapsed time is not clamped: a clock set back before `started_at`
    /// yields negative elapsed seconds and a negative percentage.
    pub fn compute(record: &SessionRecord, now: NaiveDateTime) -> Self {
        let now = now.trunc_subsecs(0);
        let started_at = record.started_at.trunc_subsecs(0);
        let deadline = record.deadline.trunc_subsecs(0);
        let elapsed_secs = (now - started_at).num_seconds();
        let remaining_secs = (deadline - now).num_seconds();
        let is_active = remaining_secs > 0;

        Self {
            record: record.clone(),
            now,
            elapsed_secs,
            remaining_secs,
            percent_complete: percent_complete(elapsed_secs, record.budget_secs()),
            is_active,
            is_urgent: is_active && remaining_secs < URGENT_THRESHOLD_SECS,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if self.is_active {
            SessionPhase::Active
        } else {
            SessionPhase::Expired
        }
    }

    pub fn remaining_display(&self) -> String {
        format_remaining(self.remaining_secs)
    }

    pub fn elapsed_display(&self) -> String {
        format_elapsed(self.elapsed_secs)
    }
}

/// `floor(elapsed / budget * 100)`, capped at 100. A zero budget counts as fully spent.
pub fn percent_complete(elapsed_secs: i64, budget_secs: i64) -> i64 {
    if budget_secs == 0 {
        return 100;
    }
    floor_div(elapsed_secs.saturating_mul(100), budget_secs).min(100)
}

fn floor_div(n: i64, d: i64) -> i64 {
    let q = n / d;
    if n % d != 0 && (n < 0) != (d < 0) {
        q - 1
    } else {
        q
    }
}

/// Compact `1h 2m 3s` rendering; zero components are dropped but seconds
/// always appear when nothing larger does.
pub fn format_remaining(remaining_secs: i64) -> String {
    if remaining_secs <= 0 {
        return PAST_DEADLINE.to_string();
    }
    let hours = remaining_secs / 3600;
    let minutes = remaining_secs % 3600 / 60;
    let seconds = remaining_secs % 60;

    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{seconds}s"));
    }
    parts.join(" ")
}

pub fn format_elapsed(elapsed_secs: i64) -> String {
    format!(
        "{}m {}s",
        elapsed_secs.div_euclid(60),
        elapsed_secs.rem_euclid(60)
    )
}
