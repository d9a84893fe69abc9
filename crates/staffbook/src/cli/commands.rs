//! CLI command definitions.
//!
//! This module defines the structure of the non-interactive subcommands.

use clap::{Args, Subcommand};

/// Arguments for registering a login.
#[derive(Debug, Args)]
pub struct AddUserCommand {
    /// Email address used to log in
    pub email: String,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,
}
