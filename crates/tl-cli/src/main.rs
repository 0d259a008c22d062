use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tl_cli::commands::util::current_user;
use tl_cli::commands::{entry, export, slice, summary};
use tl_cli::{Cli, Commands, Config, EntryAction, SliceAction};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(tl_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = tl_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Some(Commands::Entry { action }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let user = current_user(cli.user.as_deref(), &config)?;
            match action {
                EntryAction::Add(args) => entry::add(&mut out, &db, &user, args)?,
                EntryAction::List { json } => entry::list(&mut out, &db, &user, *json)?,
                EntryAction::Show { id } => entry::show(&mut out, &db, &user, *id)?,
                EntryAction::Edit(args) => entry::edit(&mut out, &db, &user, args)?,
                EntryAction::Rm { id } => entry::remove(&mut out, &db, &user, *id)?,
            }
        }
        Some(Commands::Slice { action }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            match action {
                // Token lookup is the access control here; no identity needed.
                SliceAction::Show { token, json } => slice::show(&mut out, &db, token, *json)?,
                SliceAction::Create(args) => {
                    let user = current_user(cli.user.as_deref(), &config)?;
                    slice::create(&mut out, &db, &user, args)?;
                }
                SliceAction::List { json } => {
                    let user = current_user(cli.user.as_deref(), &config)?;
                    slice::list(&mut out, &db, &user, *json)?;
                }
                SliceAction::Edit(args) => {
                    let user = current_user(cli.user.as_deref(), &config)?;
                    slice::edit(&mut out, &db, &user, args)?;
                }
                SliceAction::Rm { id } => {
                    let user = current_user(cli.user.as_deref(), &config)?;
                    slice::remove(&mut out, &db, &user, *id)?;
                }
            }
        }
        Some(Commands::Summary { json }) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let user = current_user(cli.user.as_deref(), &config)?;
            summary::run(&mut out, &db, &user, *json)?;
        }
        Some(Commands::Export(args)) => {
            let (db, config) = open_database(cli.config.as_deref())?;
            let user = current_user(cli.user.as_deref(), &config)?;
            export::run(&mut out, &db, &user, args)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}
