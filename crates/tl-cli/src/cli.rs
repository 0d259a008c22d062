//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::entry::{EntryAddArgs, EntryEditArgs};
use crate::commands::export::ExportArgs;
use crate::commands::slice::{SliceCreateArgs, SliceEditArgs};

/// Timesheet tracker.
///
/// Records worked days and produces shareable, time-bounded views ("slices")
/// of them for a second party to read without full account access.
#[derive(Debug, Parser)]
#[command(name = "tl", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Act as this user, overriding the configured identity.
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage timesheet entries.
    Entry {
        #[command(subcommand)]
        action: EntryAction,
    },

    /// Manage shareable time slices.
    Slice {
        #[command(subcommand)]
        action: SliceAction,
    },

    /// Summarize your recorded entries.
    Summary {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Export entries as a CSV document.
    Export(ExportArgs),
}

/// Entry subcommands.
#[derive(Debug, Subcommand)]
pub enum EntryAction {
    /// Record a new entry.
    Add(EntryAddArgs),

    /// List your entries.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show one of your entries.
    Show {
        /// The entry ID.
        id: i64,
    },

    /// Edit an entry you own.
    Edit(EntryEditArgs),

    /// Delete an entry you own.
    Rm {
        /// The entry ID.
        id: i64,
    },
}

/// Slice subcommands.
#[derive(Debug, Subcommand)]
pub enum SliceAction {
    /// Create a shareable slice over a date range.
    Create(SliceCreateArgs),

    /// List your slices.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the entries a slice exposes, looked up by its share token.
    Show {
        /// The slice's share token.
        token: String,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Edit a slice you own.
    Edit(SliceEditArgs),

    /// Delete a slice you own.
    Rm {
        /// The slice ID.
        id: i64,
    },
}
