//! Slice subcommands: sharing time-bounded views of a user's entries.
//!
//! Owners create, edit, list, and delete slices. Anyone holding a slice's
//! token can show it: the token is the whole access control on that path, and
//! task text is redacted unless the owner opted into sharing it.

use std::io::Write;

use anyhow::{Result, anyhow, bail};
use clap::Args;
use serde::Serialize;

use tl_core::datetime::format_timestamp;
use tl_core::{SliceDraft, SliceToken, Summary, TimeEntry, UserId, summarize};
use tl_db::Database;

use super::util::{require, validation_failure};

/// Arguments for `tl slice create`.
#[derive(Debug, Args)]
pub struct SliceCreateArgs {
    /// Start of the shared window (e.g. "2026-01-05").
    #[arg(long)]
    pub start: String,

    /// End of the shared window.
    #[arg(long)]
    pub end: String,

    /// Let viewers of the slice see task-description text.
    #[arg(long)]
    pub show_tasks: bool,
}

/// Arguments for `tl slice edit`. Unspecified fields keep their stored value.
#[derive(Debug, Args)]
pub struct SliceEditArgs {
    /// The slice ID.
    pub id: i64,

    /// New window start.
    #[arg(long)]
    pub start: Option<String>,

    /// New window end.
    #[arg(long)]
    pub end: Option<String>,

    /// Whether viewers may see task text.
    #[arg(long)]
    pub show_tasks: Option<bool>,
}

pub fn create<W: Write>(
    writer: &mut W,
    db: &Database,
    user: &UserId,
    args: &SliceCreateArgs,
) -> Result<()> {
    let draft = SliceDraft {
        start: Some(args.start.clone()),
        end: Some(args.end.clone()),
        allow_task_details: args.show_tasks,
    };
    let slice = draft
        .validate(user, SliceToken::generate())
        .map_err(|failures| validation_failure(&failures))?;

    let id = db.insert_slice(&slice)?;
    writeln!(writer, "Created slice {id} with token {}", slice.token)?;
    Ok(())
}

pub fn list<W: Write>(writer: &mut W, db: &Database, user: &UserId, json: bool) -> Result<()> {
    let rows = db.list_slices(user)?;

    if json {
        let views: Vec<SliceSummaryView> = rows
            .iter()
            .map(|row| SliceSummaryView {
                id: row.id,
                token: row.slice.token.to_string(),
                start: format_timestamp(row.slice.start),
                end: format_timestamp(row.slice.end),
                allow_task_details: row.slice.allow_task_details,
            })
            .collect();
        writeln!(writer, "{}", serde_json::to_string_pretty(&views)?)?;
        return Ok(());
    }

    if rows.is_empty() {
        writeln!(writer, "No slices created.")?;
        return Ok(());
    }

    for row in &rows {
        writeln!(
            writer,
            "{}: {} to {} (token {}{})",
            row.id,
            format_timestamp(row.slice.start),
            format_timestamp(row.slice.end),
            row.slice.token,
            if row.slice.allow_task_details {
                ", tasks visible"
            } else {
                ""
            }
        )?;
    }
    Ok(())
}

pub fn show<W: Write>(writer: &mut W, db: &Database, token: &str, json: bool) -> Result<()> {
    let token = SliceToken::new(token).map_err(|err| anyhow!(err))?;
    let Some(row) = db.slice_by_token(&token)? else {
        bail!("slice not found");
    };
    let slice = row.slice;

    // Resolved fresh on every show: the slice stores no entry references.
    let mut entries: Vec<TimeEntry> = db
        .entries_in_slice(&slice)?
        .into_iter()
        .map(|row| row.entry)
        .collect();
    if !slice.allow_task_details {
        entries = entries
            .into_iter()
            .map(TimeEntry::without_task_details)
            .collect();
    }
    let summary = summarize(&entries);

    if json {
        let view = SliceDetailView {
            token: slice.token.to_string(),
            start: format_timestamp(slice.start),
            end: format_timestamp(slice.end),
            owner: slice.owner.to_string(),
            entries: &entries,
            summary,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&view)?)?;
        return Ok(());
    }

    writeln!(writer, "Time slice owned by {}", slice.owner)?;
    writeln!(
        writer,
        "Window: {} to {}",
        format_timestamp(slice.start),
        format_timestamp(slice.end)
    )?;
    for entry in &entries {
        let end = entry
            .end
            .map_or_else(|| "(open)".to_string(), format_timestamp);
        let mut tasks = String::new();
        if entry.morning_task.is_some() || entry.afternoon_task.is_some() {
            let morning = task_or_dash(entry.morning_task.as_deref());
            let afternoon = task_or_dash(entry.afternoon_task.as_deref());
            tasks = format!(" [morning: {morning}; afternoon: {afternoon}]");
        }
        writeln!(
            writer,
            "- {} to {end}: {:.2} hours{tasks}",
            format_timestamp(entry.start),
            entry.hours_worked()
        )?;
    }
    for (label, value) in summary.pairs() {
        writeln!(writer, "{label}: {value}")?;
    }
    Ok(())
}

fn task_or_dash(task: Option<&str>) -> &str {
    task.unwrap_or("-")
}

pub fn edit<W: Write>(
    writer: &mut W,
    db: &Database,
    user: &UserId,
    args: &SliceEditArgs,
) -> Result<()> {
    let row = require(db.slice_for(args.id, user)?, "slice", args.id)?;
    let current = row.slice;

    let draft = SliceDraft {
        start: args
            .start
            .clone()
            .or_else(|| Some(format_timestamp(current.start))),
        end: args
            .end
            .clone()
            .or_else(|| Some(format_timestamp(current.end))),
        allow_task_details: args.show_tasks.unwrap_or(current.allow_task_details),
    };
    // The token never changes, even through an edit.
    let updated = draft
        .validate(user, current.token)
        .map_err(|failures| validation_failure(&failures))?;

    require(db.update_slice(args.id, user, &updated)?, "slice", args.id)?;
    writeln!(writer, "Updated slice {}", args.id)?;
    Ok(())
}

pub fn remove<W: Write>(writer: &mut W, db: &Database, user: &UserId, id: i64) -> Result<()> {
    require(db.delete_slice(id, user)?, "slice", id)?;
    writeln!(writer, "Deleted slice {id}")?;
    Ok(())
}

/// JSON shape of a slice in `tl slice list`.
#[derive(Debug, Serialize)]
struct SliceSummaryView {
    id: i64,
    token: String,
    start: String,
    end: String,
    allow_task_details: bool,
}

/// JSON shape of a shared slice view.
#[derive(Debug, Serialize)]
struct SliceDetailView<'a> {
    token: String,
    start: String,
    end: String,
    owner: String,
    entries: &'a [TimeEntry],
    summary: Summary,
}
