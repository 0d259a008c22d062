//! Shared helpers for the subcommands.

use anyhow::{Result, anyhow, bail};
use serde::Serialize;

use tl_core::datetime::format_timestamp;
use tl_core::{FieldError, UserId};
use tl_db::{EntryRow, Lookup};

use crate::Config;

/// Resolves the user the command acts as.
///
/// The `--user` flag wins over the configured identity; without either, the
/// command refuses to run.
pub fn current_user(flag: Option<&str>, config: &Config) -> Result<UserId> {
    let name = flag
        .or(config.user.as_deref())
        .ok_or_else(|| anyhow!("no user configured; set --user, TL_USER, or user in config.toml"))?;
    UserId::new(name).map_err(|err| anyhow!(err))
}

/// Collapses field-level validation failures into one command error.
///
/// Nothing has been persisted by the time this is called.
pub fn validation_failure(failures: &[FieldError]) -> anyhow::Error {
    let details: Vec<String> = failures.iter().map(ToString::to_string).collect();
    anyhow!("invalid input:\n  {}", details.join("\n  "))
}

/// Unwraps an owner-checked lookup, turning the other outcomes into errors.
///
/// "Not found" and "belongs to another user" stay distinct messages.
pub fn require<T>(lookup: Lookup<T>, kind: &str, id: i64) -> Result<T> {
    match lookup {
        Lookup::Found(value) => Ok(value),
        Lookup::NotFound => bail!("{kind} not found: {id}"),
        Lookup::Forbidden => bail!("{kind} {id} belongs to another user"),
    }
}

/// JSON shape of a stored entry.
#[derive(Debug, Serialize)]
pub struct EntryView {
    pub id: i64,
    pub start: String,
    pub end: Option<String>,
    pub lunch_minutes: i64,
    pub morning_task: Option<String>,
    pub afternoon_task: Option<String>,
    pub hours_worked: f64,
}

impl From<&EntryRow> for EntryView {
    fn from(row: &EntryRow) -> Self {
        Self {
            id: row.id,
            start: format_timestamp(row.entry.start),
            end: row.entry.end.map(format_timestamp),
            lunch_minutes: row.entry.lunch_minutes,
            morning_task: row.entry.morning_task.clone(),
            afternoon_task: row.entry.afternoon_task.clone(),
            hours_worked: row.entry.hours_worked(),
        }
    }
}
