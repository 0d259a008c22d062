//! Timesheet entries and the hours-worked derivation.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::datetime::parse_timestamp;
use crate::types::{FieldError, UserId};

/// One recorded work day.
///
/// `end` is optional: an entry with no end is still open (or was simply never
/// closed out) and derives zero worked hours until one is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    /// Minutes subtracted from the worked interval.
    pub lunch_minutes: i64,
    pub morning_task: Option<String>,
    pub afternoon_task: Option<String>,
    pub owner: UserId,
}

impl TimeEntry {
    /// Fractional hours worked, recomputed from the interval on every call.
    ///
    /// An entry without an `end` yields `0.0`. An `end` before `start` yields
    /// a negative value: the record's own inconsistency is passed through
    /// rather than silently corrected. A `lunch_minutes` outside the
    /// representable duration range (drafts reject it, but stored records are
    /// not trusted) also derives `0.0` rather than aborting.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hours_worked(&self) -> f64 {
        let Some(end) = self.end else {
            return 0.0;
        };
        let Some(lunch) = Duration::try_minutes(self.lunch_minutes) else {
            return 0.0;
        };
        let duration = end - self.start - lunch;
        duration.num_seconds() as f64 / 3600.0
    }

    /// Copy of the entry with task text stripped.
    ///
    /// Used for shared views that are not allowed to see task descriptions.
    #[must_use]
    pub fn without_task_details(mut self) -> Self {
        self.morning_task = None;
        self.afternoon_task = None;
        self
    }
}

impl fmt::Display for TimeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timesheet Entry: {}", self.start.format("%x"))
    }
}

/// Raw field input for creating or editing an entry.
///
/// Timestamps arrive as text and are only parsed here, so malformed input is
/// rejected with field-level failures before anything touches the store.
#[derive(Debug, Clone, Default)]
pub struct EntryDraft {
    pub start: Option<String>,
    pub end: Option<String>,
    pub lunch_minutes: i64,
    pub morning_task: Option<String>,
    pub afternoon_task: Option<String>,
}

impl EntryDraft {
    /// Validates the draft into a [`TimeEntry`] owned by `owner`.
    ///
    /// All failing fields are reported together rather than stopping at the
    /// first one.
    pub fn validate(&self, owner: &UserId) -> Result<TimeEntry, Vec<FieldError>> {
        let mut failures = Vec::new();

        let start = match self.start.as_deref() {
            None => {
                failures.push(FieldError::new("start", "start time is required"));
                None
            }
            Some(raw) => match parse_timestamp(raw) {
                Ok(parsed) => Some(parsed),
                Err(err) => {
                    failures.push(FieldError::new("start", err.to_string()));
                    None
                }
            },
        };

        let mut end = None;
        if let Some(raw) = self.end.as_deref() {
            match parse_timestamp(raw) {
                Ok(parsed) => end = Some(parsed),
                Err(err) => failures.push(FieldError::new("end", err.to_string())),
            }
        }

        if self.lunch_minutes < 0 {
            failures.push(FieldError::new(
                "lunch_minutes",
                format!("cannot be negative, got {}", self.lunch_minutes),
            ));
        } else if Duration::try_minutes(self.lunch_minutes).is_none() {
            failures.push(FieldError::new(
                "lunch_minutes",
                format!("too large, got {}", self.lunch_minutes),
            ));
        }

        if let (Some(start), true) = (start, failures.is_empty()) {
            Ok(TimeEntry {
                start,
                end,
                lunch_minutes: self.lunch_minutes,
                morning_task: self.morning_task.clone(),
                afternoon_task: self.afternoon_task.clone(),
                owner: owner.clone(),
            })
        } else {
            Err(failures)
        }
    }
}
