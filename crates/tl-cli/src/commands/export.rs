//! The `tl export` command: CSV export of recorded entries.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;

use tl_core::{UserId, export_filename, write_csv};
use tl_db::Database;

/// Arguments for `tl export`.
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Export every user's entries instead of only your own.
    #[arg(long)]
    pub all_users: bool,

    /// Where to write the CSV. Defaults to timesheet_<today>.csv.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    user: &UserId,
    args: &ExportArgs,
) -> Result<()> {
    let rows = if args.all_users {
        db.list_all_entries()?
    } else {
        db.list_entries(user)?
    };
    let entries: Vec<_> = rows.into_iter().map(|row| row.entry).collect();

    let path = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(export_filename(Local::now().date_naive())));

    let file = File::create(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write_csv(&mut out, &entries)?;
    out.flush()?;

    writeln!(
        writer,
        "Exported {} entries to {}",
        entries.len(),
        path.display()
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tl_core::{CSV_HEADER, EntryDraft};

    fn add_entry(db: &Database, owner: &UserId, start: &str, end: Option<&str>) {
        let draft = EntryDraft {
            start: Some(start.to_string()),
            end: end.map(String::from),
            lunch_minutes: 0,
            morning_task: None,
            afternoon_task: None,
        };
        db.insert_entry(&draft.validate(owner).unwrap()).unwrap();
    }

    #[test]
    fn writes_header_and_rows_to_the_requested_path() {
        let db = Database::open_in_memory().unwrap();
        let user = UserId::new("michael").unwrap();
        add_entry(&db, &user, "2026-01-05 08:00", Some("2026-01-05 16:00"));
        add_entry(&db, &user, "2026-01-06 08:00", None);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let args = ExportArgs {
            all_users: false,
            out: Some(path.clone()),
        };

        let mut output = Vec::new();
        run(&mut output, &db, &user, &args).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert_eq!(
            output,
            format!("Exported 2 entries to {}\n", path.display())
        );

        let csv = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines[1], "2026-01-05T08:00:00Z, 2026-01-05T16:00:00Z, 8");
        assert_eq!(lines[2], "2026-01-06T08:00:00Z, , 0");
    }

    #[test]
    fn scopes_to_the_requesting_user_by_default() {
        let db = Database::open_in_memory().unwrap();
        let user = UserId::new("michael").unwrap();
        let fred = UserId::new("fred").unwrap();
        add_entry(&db, &user, "2026-01-05 08:00", Some("2026-01-05 16:00"));
        add_entry(&db, &fred, "2026-01-05 08:00", Some("2026-01-05 16:00"));

        let dir = tempfile::tempdir().unwrap();

        let mine = dir.path().join("mine.csv");
        let mut output = Vec::new();
        let args = ExportArgs {
            all_users: false,
            out: Some(mine.clone()),
        };
        run(&mut output, &db, &user, &args).unwrap();
        assert_eq!(std::fs::read_to_string(&mine).unwrap().lines().count(), 2);

        let everyone = dir.path().join("all.csv");
        let args = ExportArgs {
            all_users: true,
            out: Some(everyone.clone()),
        };
        run(&mut output, &db, &user, &args).unwrap();
        assert_eq!(
            std::fs::read_to_string(&everyone).unwrap().lines().count(),
            3
        );
    }
}
