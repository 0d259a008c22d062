//! Shareable time slices.
//!
//! A slice is a tokenized date-range view over one user's entries. It stores
//! no entry references; holders of the token see whatever entries currently
//! fall inside the window, resolved fresh on every lookup.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::datetime::parse_timestamp;
use crate::entry::TimeEntry;
use crate::types::{FieldError, SliceToken, UserId};

/// A shareable date range over one user's entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlice {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub owner: UserId,
    /// Assigned once at creation; the external lookup key.
    pub token: SliceToken,
    /// Whether viewers of the slice may see task-description text.
    pub allow_task_details: bool,
}

impl TimeSlice {
    /// Whether an entry falls inside this slice's window.
    ///
    /// Requires the same owner, a `start` on or after the window start, and an
    /// `end` on or before the window end. Open entries never match: without an
    /// `end` the upper bound cannot be satisfied.
    ///
    /// The storage layer expresses this same filter as a query so resolution
    /// stays lazy; this predicate is the single definition both sides follow.
    #[must_use]
    pub fn contains(&self, entry: &TimeEntry) -> bool {
        entry.owner == self.owner
            && entry.start >= self.start
            && entry.end.is_some_and(|end| end <= self.end)
    }
}

/// Raw field input for creating or editing a slice.
#[derive(Debug, Clone, Default)]
pub struct SliceDraft {
    pub start: Option<String>,
    pub end: Option<String>,
    pub allow_task_details: bool,
}

impl SliceDraft {
    /// Validates the draft into a [`TimeSlice`] owned by `owner`.
    ///
    /// The token is supplied by the caller: a freshly generated one when
    /// creating, the existing one when editing (tokens never change).
    pub fn validate(
        &self,
        owner: &UserId,
        token: SliceToken,
    ) -> Result<TimeSlice, Vec<FieldError>> {
        let mut failures = Vec::new();

        let start = Self::required_timestamp(self.start.as_deref(), "start", &mut failures);
        let end = Self::required_timestamp(self.end.as_deref(), "end", &mut failures);

        if let (Some(start), Some(end)) = (start, end) {
            Ok(TimeSlice {
                start,
                end,
                owner: owner.clone(),
                token,
                allow_task_details: self.allow_task_details,
            })
        } else {
            Err(failures)
        }
    }

    fn required_timestamp(
        raw: Option<&str>,
        field: &'static str,
        failures: &mut Vec<FieldError>,
    ) -> Option<DateTime<Utc>> {
        match raw {
            None => {
                failures.push(FieldError::new(field, format!("{field} time is required")));
                None
            }
            Some(raw) => match parse_timestamp(raw) {
                Ok(parsed) => Some(parsed),
                Err(err) => {
                    failures.push(FieldError::new(field, err.to_string()));
                    None
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> UserId {
        UserId::new(name).unwrap()
    }

    fn entry(owner: &UserId, start: &str, end: Option<&str>) -> TimeEntry {
        TimeEntry {
            start: parse_timestamp(start).unwrap(),
            end: end.map(|raw| parse_timestamp(raw).unwrap()),
            lunch_minutes: 0,
            morning_task: None,
            afternoon_task: None,
            owner: owner.clone(),
        }
    }

    fn slice(owner: &UserId, start: &str, end: &str) -> TimeSlice {
        TimeSlice {
            start: parse_timestamp(start).unwrap(),
            end: parse_timestamp(end).unwrap(),
            owner: owner.clone(),
            token: SliceToken::generate(),
            allow_task_details: false,
        }
    }

    #[test]
    fn contains_matches_entry_inside_window() {
        let michael = user("michael");
        let slice = slice(&michael, "2026-01-05 07:00", "2026-01-05 17:00");
        let inside = entry(&michael, "2026-01-05 08:00", Some("2026-01-05 16:00"));
        assert!(slice.contains(&inside));
    }

    #[test]
    fn contains_accepts_exact_bounds() {
        let michael = user("michael");
        let slice = slice(&michael, "2026-01-05 08:00", "2026-01-05 16:00");
        let exact = entry(&michael, "2026-01-05 08:00", Some("2026-01-05 16:00"));
        assert!(slice.contains(&exact));
    }

    #[test]
    fn contains_rejects_other_owner() {
        let michael = user("michael");
        let fred = user("fred");
        let slice = slice(&michael, "2026-01-05 07:00", "2026-01-05 17:00");
        let freds = entry(&fred, "2026-01-05 08:00", Some("2026-01-05 16:00"));
        assert!(!slice.contains(&freds));
    }

    #[test]
    fn contains_rejects_entry_outside_window() {
        let michael = user("michael");
        let slice = slice(&michael, "2026-01-05 07:00", "2026-01-05 17:00");

        let starts_early = entry(&michael, "2026-01-05 06:00", Some("2026-01-05 16:00"));
        assert!(!slice.contains(&starts_early));

        let ends_late = entry(&michael, "2026-01-05 08:00", Some("2026-01-05 18:00"));
        assert!(!slice.contains(&ends_late));

        let next_day = entry(&michael, "2026-01-06 08:00", Some("2026-01-06 16:00"));
        assert!(!slice.contains(&next_day));
    }

    #[test]
    fn contains_rejects_open_entry() {
        let michael = user("michael");
        let slice = slice(&michael, "2026-01-05 07:00", "2026-01-05 17:00");
        let open = entry(&michael, "2026-01-05 08:00", None);
        assert!(!slice.contains(&open));
    }

    #[test]
    fn draft_validates_into_slice() {
        let michael = user("michael");
        let token = SliceToken::generate();
        let draft = SliceDraft {
            start: Some("2026-01-05".to_string()),
            end: Some("2026-01-09".to_string()),
            allow_task_details: true,
        };

        let slice = draft.validate(&michael, token.clone()).unwrap();
        assert_eq!(slice.owner, michael);
        assert_eq!(slice.token, token);
        assert!(slice.allow_task_details);
        assert!(slice.start < slice.end);
    }

    #[test]
    fn draft_requires_both_bounds() {
        let michael = user("michael");
        let failures = SliceDraft::default()
            .validate(&michael, SliceToken::generate())
            .unwrap_err();
        let fields: Vec<_> = failures.iter().map(|failure| failure.field).collect();
        assert_eq!(fields, vec!["start", "end"]);
    }

    #[test]
    fn draft_rejects_malformed_bound() {
        let michael = user("michael");
        let draft = SliceDraft {
            start: Some("2026-01-05".to_string()),
            end: Some("whenever".to_string()),
            allow_task_details: false,
        };

        let failures = draft
            .validate(&michael, SliceToken::generate())
            .unwrap_err();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].field, "end");
    }
}
