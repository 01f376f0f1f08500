use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sp_cli::commands::{assignment, export, holidays, module, plan, settings};
use sp_cli::{
    AssignmentAction, Cli, Commands, Config, HolidaysAction, ModuleAction, SettingsAction,
};

/// Open the configured database, ensuring the parent directory exists.
fn open_database(config: &Config) -> Result<sp_db::Database> {
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    sp_db::Database::open(&config.database_path).context("failed to open database")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // stdout is reserved for command output.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let config =
        Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let mut db = open_database(&config)?;
    let mut stdout = std::io::stdout().lock();

    match command {
        Commands::Module(action) => match action {
            ModuleAction::Add(args) => {
                module::add(&mut stdout, &db, args)?;
            }
            ModuleAction::List { json } => module::list(&mut stdout, &db, *json)?,
            ModuleAction::Remove { id } => module::remove(&mut stdout, &db, *id)?,
        },
        Commands::Assignment(action) => match action {
            AssignmentAction::Add(args) => {
                assignment::add(&mut stdout, &db, args)?;
            }
            AssignmentAction::List { module, json } => {
                assignment::list(&mut stdout, &db, *module, *json)?;
            }
            AssignmentAction::Remove { id } => assignment::remove(&mut stdout, &db, *id)?,
        },
        Commands::Settings(action) => match action {
            SettingsAction::Show => settings::show(&mut stdout, &db)?,
            SettingsAction::StudyDay { weekday, hours } => {
                settings::study_day(&mut stdout, &mut db, weekday, *hours)?;
            }
            SettingsAction::LeaveDays { count } => {
                settings::leave_days(&mut stdout, &mut db, *count)?;
            }
        },
        Commands::Holidays(action) => match action {
            HolidaysAction::List => holidays::list(&mut stdout, &db)?,
            HolidaysAction::Set {
                date,
                selected,
                unselected,
                hours,
            } => {
                let selection = if *selected {
                    Some(true)
                } else if *unselected {
                    Some(false)
                } else {
                    None
                };
                holidays::set(&mut stdout, &db, *date, selection, *hours)?;
            }
            HolidaysAction::Add {
                date,
                name,
                selected,
                hours,
            } => {
                holidays::add(&mut stdout, &db, *date, name, *selected, *hours)?;
            }
            HolidaysAction::Remove { date } => holidays::remove(&mut stdout, &db, *date)?,
        },
        Commands::Plan { today, json } => {
            plan::run(&mut stdout, &db, plan::resolve_today(*today), *json)?;
        }
        Commands::Export {
            format,
            output,
            today,
        } => {
            let output = output
                .clone()
                .unwrap_or_else(|| config.export_path(format.default_file_name()));
            export::run(
                &mut stdout,
                &db,
                *format,
                &output,
                plan::resolve_today(*today),
            )?;
        }
    }

    Ok(())
}
