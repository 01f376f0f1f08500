//! Study planner CLI library.
//!
//! This crate provides the `sp` command: record modules, assignments and
//! availability, then print or export the resulting study plan.

mod cli;
pub mod commands;
mod config;
pub mod render;

pub use cli::{
    AssignmentAction, AssignmentArgs, Cli, Commands, ExportFormat, HolidaysAction, ModuleAction,
    ModuleArgs, SettingsAction,
};
pub use config::Config;
