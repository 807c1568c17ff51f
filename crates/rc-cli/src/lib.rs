//! Presence status board CLI library.
//!
//! This crate provides the CLI interface for the rollcall presence engine.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, PersonAction, ShiftAction};
pub use config::Config;
