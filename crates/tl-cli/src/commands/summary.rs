//! The `tl summary` command.

use std::io::Write;

use anyhow::Result;

use tl_core::{UserId, summarize};
use tl_db::Database;

pub fn run<W: Write>(writer: &mut W, db: &Database, user: &UserId, json: bool) -> Result<()> {
    let rows = db.list_entries(user)?;
    let summary = summarize(rows.iter().map(|row| &row.entry));

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&summary)?)?;
    } else {
        for (label, value) in summary.pairs() {
            writeln!(writer, "{label}: {value}")?;
        }
    }
    Ok(())
}
