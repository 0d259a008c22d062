//! CSV rendering for timesheet exports.

use std::io::{self, Write};

use chrono::NaiveDate;

use crate::datetime::format_timestamp;
use crate::entry::TimeEntry;

/// The fixed header row of an export document.
pub const CSV_HEADER: &str = "Start, End, Hours Worked";

/// Writes the export document: the header plus one row per entry.
///
/// Open entries render an empty `End` column and derive zero hours.
pub fn write_csv<W: Write>(writer: &mut W, entries: &[TimeEntry]) -> io::Result<()> {
    writeln!(writer, "{CSV_HEADER}")?;
    for entry in entries {
        let end = entry.end.map(format_timestamp).unwrap_or_default();
        writeln!(
            writer,
            "{}, {}, {}",
            format_timestamp(entry.start),
            end,
            entry.hours_worked()
        )?;
    }
    Ok(())
}

/// Export filename from the generation date, not any entry's date.
#[must_use]
pub fn export_filename(generated_on: NaiveDate) -> String {
    format!("timesheet_{}.csv", generated_on.format("%Y-%m-%d"))
}
