//! Command-line interface module

pub mod commands;

pub use commands::{Cli, Commands, ConfigCommands};
