use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use rc_cli::commands::{history, import, ingest, person, shift, status};
use rc_cli::{Cli, Commands, Config, PersonAction, ShiftAction};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(rc_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = rc_db::Database::open(&config.database_path).context("failed to open database")?;
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
    let mut writer = stdout.lock();

    match &cli.command {
        Some(Commands::Ingest(args)) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            ingest::run(&mut writer, &mut db, args)?;
        }
        Some(Commands::Import(args)) => {
            let (mut db, _config) = open_database(cli.config.as_deref())?;
            import::run(&mut writer, &mut db, args)?;
        }
        Some(Commands::Status { unit, json }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            status::run(&mut writer, &db, unit.as_deref(), *json)?;
        }
        Some(Commands::History {
            person,
            from,
            to,
            json,
        }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            history::run(
                &mut writer,
                &db,
                person,
                from.as_deref(),
                to.as_deref(),
                *json,
            )?;
        }
        Some(Commands::Person { action }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            match action {
                PersonAction::Add {
                    id,
                    name,
                    unit,
                    role,
                } => person::add(
                    &mut writer,
                    &db,
                    id,
                    name,
                    unit.as_deref(),
                    role.as_deref(),
                )?,
                PersonAction::List { unit, json } => {
                    person::list(&mut writer, &db, unit.as_deref(), *json)?;
                }
            }
        }
        Some(Commands::Shift { action }) => {
            let (db, _config) = open_database(cli.config.as_deref())?;
            match action {
                ShiftAction::Add { person, start, end } => {
                    shift::add(&mut writer, &db, person, start, end.as_deref())?;
                }
                ShiftAction::List { person, json } => {
                    shift::list(&mut writer, &db, person, *json)?;
                }
            }
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            writeln!(writer)?;
        }
    }

    Ok(())
}
