//! Entry subcommands: recording, listing, editing, and deleting work days.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use tl_core::datetime::format_timestamp;
use tl_core::{EntryDraft, UserId};
use tl_db::{Database, EntryRow};

use super::util::{EntryView, require, validation_failure};

/// Arguments for `tl entry add`.
#[derive(Debug, Args)]
pub struct EntryAddArgs {
    /// When the work period began (e.g. "2026-01-05 08:00").
    #[arg(long)]
    pub start: String,

    /// When it ended. Omit for a still-open entry.
    #[arg(long)]
    pub end: Option<String>,

    /// Minutes of lunch to subtract from the worked interval.
    #[arg(long, default_value_t = 0)]
    pub lunch: i64,

    /// What you worked on in the morning.
    #[arg(long)]
    pub morning: Option<String>,

    /// What you worked on in the afternoon.
    #[arg(long)]
    pub afternoon: Option<String>,
}

/// Arguments for `tl entry edit`. Unspecified fields keep their stored value.
#[derive(Debug, Args)]
pub struct EntryEditArgs {
    /// The entry ID.
    pub id: i64,

    /// New start time.
    #[arg(long)]
    pub start: Option<String>,

    /// New end time.
    #[arg(long)]
    pub end: Option<String>,

    /// Reopen the entry by clearing its end time.
    #[arg(long, conflicts_with = "end")]
    pub clear_end: bool,

    /// New lunch minutes.
    #[arg(long)]
    pub lunch: Option<i64>,

    /// New morning task text.
    #[arg(long)]
    pub morning: Option<String>,

    /// Drop the morning task text.
    #[arg(long, conflicts_with = "morning")]
    pub clear_morning: bool,

    /// New afternoon task text.
    #[arg(long)]
    pub afternoon: Option<String>,

    /// Drop the afternoon task text.
    #[arg(long, conflicts_with = "afternoon")]
    pub clear_afternoon: bool,
}

pub fn add<W: Write>(
    writer: &mut W,
    db: &Database,
    user: &UserId,
    args: &EntryAddArgs,
) -> Result<()> {
    let draft = EntryDraft {
        start: Some(args.start.clone()),
        end: args.end.clone(),
        lunch_minutes: args.lunch,
        morning_task: args.morning.clone(),
        afternoon_task: args.afternoon.clone(),
    };
    let entry = draft
        .validate(user)
        .map_err(|failures| validation_failure(&failures))?;

    let id = db.insert_entry(&entry)?;
    writeln!(writer, "Created entry {id} ({entry})")?;
    Ok(())
}

pub fn list<W: Write>(writer: &mut W, db: &Database, user: &UserId, json: bool) -> Result<()> {
    let rows = db.list_entries(user)?;

    if json {
        let views: Vec<EntryView> = rows.iter().map(EntryView::from).collect();
        writeln!(writer, "{}", serde_json::to_string_pretty(&views)?)?;
        return Ok(());
    }

    if rows.is_empty() {
        writeln!(writer, "No entries recorded.")?;
        return Ok(());
    }

    writeln!(
        writer,
        "{:>4}  {:<20}  {:<20}  {:>7}",
        "ID", "START", "END", "HOURS"
    )?;
    for row in &rows {
        let end = row
            .entry
            .end
            .map_or_else(|| "(open)".to_string(), format_timestamp);
        writeln!(
            writer,
            "{:>4}  {:<20}  {:<20}  {:>7.2}",
            row.id,
            format_timestamp(row.entry.start),
            end,
            row.entry.hours_worked()
        )?;
    }
    Ok(())
}

pub fn show<W: Write>(writer: &mut W, db: &Database, user: &UserId, id: i64) -> Result<()> {
    let row = require(db.entry_for(id, user)?, "entry", id)?;
    write_details(writer, &row)?;
    Ok(())
}

pub fn edit<W: Write>(
    writer: &mut W,
    db: &Database,
    user: &UserId,
    args: &EntryEditArgs,
) -> Result<()> {
    let row = require(db.entry_for(args.id, user)?, "entry", args.id)?;
    let current = row.entry;

    // Rebuild a full draft from the stored entry plus the requested changes,
    // so edits run through the same validation as creation.
    let end = if args.clear_end {
        None
    } else {
        args.end
            .clone()
            .or_else(|| current.end.map(format_timestamp))
    };
    let draft = EntryDraft {
        start: args
            .start
            .clone()
            .or_else(|| Some(format_timestamp(current.start))),
        end,
        lunch_minutes: args.lunch.unwrap_or(current.lunch_minutes),
        morning_task: if args.clear_morning {
            None
        } else {
            args.morning.clone().or(current.morning_task)
        },
        afternoon_task: if args.clear_afternoon {
            None
        } else {
            args.afternoon.clone().or(current.afternoon_task)
        },
    };
    let updated = draft
        .validate(user)
        .map_err(|failures| validation_failure(&failures))?;

    require(db.update_entry(args.id, user, &updated)?, "entry", args.id)?;
    writeln!(writer, "Updated entry {} ({updated})", args.id)?;
    Ok(())
}

pub fn remove<W: Write>(writer: &mut W, db: &Database, user: &UserId, id: i64) -> Result<()> {
    require(db.delete_entry(id, user)?, "entry", id)?;
    writeln!(writer, "Deleted entry {id}")?;
    Ok(())
}

fn write_details<W: Write>(writer: &mut W, row: &EntryRow) -> Result<()> {
    let entry = &row.entry;
    writeln!(writer, "{entry}")?;
    writeln!(writer, "ID:            {}", row.id)?;
    writeln!(writer, "Start:         {}", format_timestamp(entry.start))?;
    let end = entry
        .end
        .map_or_else(|| "(open)".to_string(), format_timestamp);
    writeln!(writer, "End:           {end}")?;
    writeln!(writer, "Lunch minutes: {}", entry.lunch_minutes)?;
    writeln!(writer, "Hours worked:  {:.2}", entry.hours_worked())?;
    if let Some(task) = &entry.morning_task {
        writeln!(writer, "Morning:       {task}")?;
    }
    if let Some(task) = &entry.afternoon_task {
        writeln!(writer, "Afternoon:     {task}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn michael() -> UserId {
        UserId::new("michael").unwrap()
    }

    fn add_args(start: &str, end: Option<&str>, lunch: i64) -> EntryAddArgs {
        EntryAddArgs {
            start: start.to_string(),
            end: end.map(String::from),
            lunch,
            morning: None,
            afternoon: None,
        }
    }

    fn run_to_string(
        f: impl FnOnce(&mut Vec<u8>) -> Result<()>,
    ) -> Result<String> {
        let mut output = Vec::new();
        f(&mut output)?;
        Ok(String::from_utf8(output).unwrap())
    }

    #[test]
    fn add_persists_and_reports_the_entry() {
        let db = test_db();
        let user = michael();
        let args = add_args("2026-01-05 08:00", Some("2026-01-05 16:00"), 30);

        let output =
            run_to_string(|writer| add(writer, &db, &user, &args)).unwrap();
        assert_eq!(output, "Created entry 1 (Timesheet Entry: 01/05/26)\n");

        let rows = db.list_entries(&user).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].entry.lunch_minutes, 30);
    }

    #[test]
    fn add_rejects_malformed_input_without_persisting() {
        let db = test_db();
        let user = michael();
        let args = add_args("not a time", None, -5);

        let err = run_to_string(|writer| add(writer, &db, &user, &args)).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("start:"));
        assert!(message.contains("lunch_minutes:"));

        // The store is untouched.
        assert!(db.list_entries(&user).unwrap().is_empty());
    }

    #[test]
    fn list_formats_entries_with_hours() {
        let db = test_db();
        let user = michael();
        run_to_string(|writer| {
            add(
                writer,
                &db,
                &user,
                &add_args("2026-01-05 08:00", Some("2026-01-05 16:00"), 30),
            )
        })
        .unwrap();
        run_to_string(|writer| {
            add(writer, &db, &user, &add_args("2026-01-06 08:00", None, 0))
        })
        .unwrap();

        let output = run_to_string(|writer| list(writer, &db, &user, false)).unwrap();
        let columns: Vec<Vec<&str>> = output
            .lines()
            .map(|line| line.split_whitespace().collect())
            .collect();
        assert_eq!(
            columns,
            vec![
                vec!["ID", "START", "END", "HOURS"],
                vec!["1", "2026-01-05T08:00:00Z", "2026-01-05T16:00:00Z", "7.50"],
                vec!["2", "2026-01-06T08:00:00Z", "(open)", "0.00"],
            ]
        );
    }

    #[test]
    fn list_json_includes_derived_hours() {
        let db = test_db();
        let user = michael();
        run_to_string(|writer| {
            add(
                writer,
                &db,
                &user,
                &add_args("2026-01-05 08:00", Some("2026-01-05 16:00"), 30),
            )
        })
        .unwrap();

        let output = run_to_string(|writer| list(writer, &db, &user, true)).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed[0]["hours_worked"], 7.5);
        assert_eq!(parsed[0]["start"], "2026-01-05T08:00:00Z");
    }

    #[test]
    fn show_is_denied_for_non_owner() {
        let db = test_db();
        let user = michael();
        run_to_string(|writer| {
            add(writer, &db, &user, &add_args("2026-01-05 08:00", None, 0))
        })
        .unwrap();

        let fred = UserId::new("fred").unwrap();
        let err = run_to_string(|writer| show(writer, &db, &fred, 1)).unwrap_err();
        assert_eq!(err.to_string(), "entry 1 belongs to another user");

        let missing = run_to_string(|writer| show(writer, &db, &fred, 99)).unwrap_err();
        assert_eq!(missing.to_string(), "entry not found: 99");
    }

    #[test]
    fn edit_keeps_unspecified_fields() {
        let db = test_db();
        let user = michael();
        run_to_string(|writer| {
            add(
                writer,
                &db,
                &user,
                &EntryAddArgs {
                    morning: Some("planning".to_string()),
                    ..add_args("2026-01-05 08:00", Some("2026-01-05 16:00"), 30)
                },
            )
        })
        .unwrap();

        let args = EntryEditArgs {
            id: 1,
            start: None,
            end: None,
            clear_end: false,
            lunch: Some(45),
            morning: None,
            clear_morning: false,
            afternoon: None,
            clear_afternoon: false,
        };
        run_to_string(|writer| edit(writer, &db, &user, &args)).unwrap();

        let row = db.get_entry(1).unwrap().unwrap();
        assert_eq!(row.entry.lunch_minutes, 45);
        assert_eq!(row.entry.morning_task.as_deref(), Some("planning"));
        assert!(row.entry.end.is_some());
    }

    #[test]
    fn edit_can_reopen_an_entry() {
        let db = test_db();
        let user = michael();
        run_to_string(|writer| {
            add(
                writer,
                &db,
                &user,
                &add_args("2026-01-05 08:00", Some("2026-01-05 16:00"), 0),
            )
        })
        .unwrap();

        let args = EntryEditArgs {
            id: 1,
            start: None,
            end: None,
            clear_end: true,
            lunch: None,
            morning: None,
            clear_morning: false,
            afternoon: None,
            clear_afternoon: false,
        };
        run_to_string(|writer| edit(writer, &db, &user, &args)).unwrap();

        let row = db.get_entry(1).unwrap().unwrap();
        assert!(row.entry.end.is_none());
    }

    #[test]
    fn edit_can_clear_task_text() {
        let db = test_db();
        let user = michael();
        run_to_string(|writer| {
            add(
                writer,
                &db,
                &user,
                &EntryAddArgs {
                    morning: Some("planning".to_string()),
                    afternoon: Some("deploy".to_string()),
                    ..add_args("2026-01-05 08:00", Some("2026-01-05 16:00"), 0)
                },
            )
        })
        .unwrap();

        let args = EntryEditArgs {
            id: 1,
            start: None,
            end: None,
            clear_end: false,
            lunch: None,
            morning: None,
            clear_morning: true,
            afternoon: None,
            clear_afternoon: false,
        };
        run_to_string(|writer| edit(writer, &db, &user, &args)).unwrap();

        let row = db.get_entry(1).unwrap().unwrap();
        assert!(row.entry.morning_task.is_none());
        assert_eq!(row.entry.afternoon_task.as_deref(), Some("deploy"));
    }

    #[test]
    fn remove_deletes_only_for_owner() {
        let db = test_db();
        let user = michael();
        run_to_string(|writer| {
            add(writer, &db, &user, &add_args("2026-01-05 08:00", None, 0))
        })
        .unwrap();

        let fred = UserId::new("fred").unwrap();
        let err = run_to_string(|writer| remove(writer, &db, &fred, 1)).unwrap_err();
        assert_eq!(err.to_string(), "entry 1 belongs to another user");

        let output = run_to_string(|writer| remove(writer, &db, &user, 1)).unwrap();
        assert_eq!(output, "Deleted entry 1\n");

        let again = run_to_string(|writer| remove(writer, &db, &user, 1)).unwrap_err();
        assert_eq!(again.to_string(), "entry not found: 1");
    }
}
