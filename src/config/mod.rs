//! Configuration management module
//!
//! Handles loading the user config from its TOML file, environment variable
//! overrides, and persistence.

pub mod settings;

pub use settings::*;
