//! Command-line argument definitions.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use sp_core::{ValidationError, parse_date};

/// Study planner.
///
/// Spreads study and submission hours for assignments across the days you
/// have available, honouring bank holidays and leave.
#[derive(Debug, Parser)]
#[command(name = "sp", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage modules.
    #[command(subcommand)]
    Module(ModuleAction),

    /// Manage assignments.
    #[command(subcommand)]
    Assignment(AssignmentAction),

    /// Weekly study hours and leave allowance.
    #[command(subcommand)]
    Settings(SettingsAction),

    /// Bank holidays that can be opted into.
    #[command(subcommand)]
    Holidays(HolidaysAction),

    /// Print the study plan.
    Plan {
        /// Plan as if today were this date (YYYY-MM-DD).
        #[arg(long, value_parser = date_arg)]
        today: Option<NaiveDate>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Write the study plan to a file.
    Export {
        /// Output format.
        #[arg(value_enum)]
        format: ExportFormat,

        /// Destination file. Defaults to a file in the configured export directory.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Plan as if today were this date (YYYY-MM-DD).
        #[arg(long, value_parser = date_arg)]
        today: Option<NaiveDate>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ModuleAction {
    /// Add a module, or replace one when --id is given.
    Add(ModuleArgs),

    /// List modules.
    List {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Remove a module and its assignments.
    Remove {
        /// Module ID.
        id: i64,
    },
}

#[derive(Debug, Args)]
pub struct ModuleArgs {
    /// Module name.
    pub name: String,

    /// Hours needed per assignment.
    #[arg(long)]
    pub hours: f64,

    /// Days before a due date that submission work must be done.
    #[arg(long, default_value_t = 0)]
    pub days_before: i64,

    /// Module-level due date, used only when no assignments exist.
    #[arg(long, value_parser = date_arg)]
    pub due: Option<NaiveDate>,

    /// Number of assignments behind the module-level due date.
    #[arg(long, requires = "due")]
    pub assignments: Option<u32>,

    /// Existing module ID to replace.
    #[arg(long)]
    pub id: Option<i64>,
}

#[derive(Debug, Subcommand)]
pub enum AssignmentAction {
    /// Add an assignment, or replace one when --id is given.
    Add(AssignmentArgs),

    /// List assignments.
    List {
        /// Only show assignments of this module.
        #[arg(long)]
        module: Option<i64>,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Remove an assignment.
    Remove {
        /// Assignment ID.
        id: i64,
    },
}

#[derive(Debug, Args)]
pub struct AssignmentArgs {
    /// Assignment name.
    pub name: String,

    /// Owning module ID.
    #[arg(long)]
    pub module: i64,

    /// Due date (YYYY-MM-DD).
    #[arg(long, value_parser = date_arg)]
    pub due: NaiveDate,

    /// Hours of study.
    #[arg(long, default_value_t = 0.0)]
    pub study: f64,

    /// Hours of submission work.
    #[arg(long, default_value_t = 0.0)]
    pub submission: f64,

    /// Existing assignment ID to replace.
    #[arg(long)]
    pub id: Option<i64>,
}

#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    /// Show study settings.
    Show,

    /// Set the hours available on a weekday. Zero clears it.
    StudyDay {
        /// Weekday name, e.g. monday or mon.
        weekday: String,

        /// Hours available.
        hours: u32,
    },

    /// Set the number of leave days to plan with.
    LeaveDays {
        /// Leave days.
        count: u32,
    },
}

#[derive(Debug, Subcommand)]
pub enum HolidaysAction {
    /// List bank holidays.
    List,

    /// Opt a bank holiday in or out.
    Set {
        /// Holiday date (YYYY-MM-DD).
        #[arg(value_parser = date_arg)]
        date: NaiveDate,

        /// Use this holiday in the plan.
        #[arg(long, conflicts_with = "unselected")]
        selected: bool,

        /// Ignore this holiday in the plan.
        #[arg(long)]
        unselected: bool,

        /// Study hours available on the holiday.
        #[arg(long)]
        hours: Option<u32>,
    },

    /// Add a holiday, or replace the one on that date.
    Add {
        /// Holiday date (YYYY-MM-DD).
        #[arg(value_parser = date_arg)]
        date: NaiveDate,

        /// Holiday name.
        name: String,

        /// Use this holiday in the plan.
        #[arg(long)]
        selected: bool,

        /// Study hours available on the holiday.
        #[arg(long, default_value_t = 0)]
        hours: u32,
    },

    /// Remove a holiday.
    Remove {
        /// Holiday date (YYYY-MM-DD).
        #[arg(value_parser = date_arg)]
        date: NaiveDate,
    },
}

/// Export file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Spreadsheet, one row per entry.
    Xlsx,
    /// Calendar page.
    Html,
    /// Calendar page laid out for printing, one month per page.
    Print,
}

impl ExportFormat {
    /// File name used when no output path is given.
    pub const fn default_file_name(self) -> &'static str {
        match self {
            Self::Xlsx => "study_plan.xlsx",
            Self::Html => "study_plan.html",
            Self::Print => "study_plan_print.html",
        }
    }
}

fn date_arg(value: &str) -> Result<NaiveDate, ValidationError> {
    parse_date("date", value)
}
