//! Core domain logic for the timesheet tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Entries: one recorded work day and its derived hours
//! - Slices: tokenized date-range views over one user's entries
//! - Summaries: reducing a collection of entries to totals and averages
//! - Export: rendering entries as a CSV document

pub mod datetime;
mod entry;
mod export;
mod slice;
mod summary;
pub mod types;

pub use entry::{EntryDraft, TimeEntry};
pub use export::{CSV_HEADER, export_filename, write_csv};
pub use slice::{SliceDraft, TimeSlice};
pub use summary::{Summary, summarize};
pub use types::{FieldError, SliceToken, UserId, ValidationError};
