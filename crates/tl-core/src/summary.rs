//! Reducing a collection of entries to totals and averages.

use serde::Serialize;

use crate::entry::TimeEntry;

/// Totals over a collection of entries.
///
/// Field order is part of the contract: consumers that display or serialize
/// the summary positionally rely on Total Days, Total Hours, Average Work Day
/// appearing in exactly that order. The serde renames keep JSON keys aligned
/// with the display labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    #[serde(rename = "Total Days")]
    pub total_days: usize,
    #[serde(rename = "Total Hours")]
    pub total_hours: f64,
    #[serde(rename = "Average Work Day")]
    pub average_work_day: f64,
}

impl Summary {
    /// Label/value pairs in display order, for positional consumers.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pairs(&self) -> [(&'static str, f64); 3] {
        [
            ("Total Days", self.total_days as f64),
            ("Total Hours", self.total_hours),
            ("Average Work Day", self.average_work_day),
        ]
    }
}

/// Reduces entries to a [`Summary`].
///
/// The average guard is deliberately on hours, not days: a collection whose
/// hours net to exactly zero reports an average of zero even when the day
/// count is nonzero. Long-standing behavior, kept as-is.
#[allow(clippy::cast_precision_loss)]
pub fn summarize<'a>(entries: impl IntoIterator<Item = &'a TimeEntry>) -> Summary {
    let mut total_days = 0_usize;
    let mut total_hours = 0.0_f64;
    for entry in entries {
        total_days += 1;
        total_hours += entry.hours_worked();
    }

    let average_work_day = if total_hours > 0.0 {
        total_hours / total_days as f64
    } else {
        0.0
    };

    Summary {
        total_days,
        total_hours,
        average_work_day,
    }
}
