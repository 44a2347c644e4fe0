// ABOUTME: CLI command definitions using clap.
// ABOUTME: Handles subcommands like send, themes, config.

pub mod config;
pub mod send;
pub mod themes;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chirp", about = "chirp - chat with a simulated assistant")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Theme override (dark or light)
    #[arg(long, global = true)]
    pub theme: Option<String>,

    /// Directory holding the stored conversation and preferences
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one message and print the reply
    Send {
        /// Message to send
        message: String,
    },
    /// Manage themes
    Themes {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
    /// Generate shell completions
    Completion {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Show version
    Version,
}

#[derive(Subcommand, Debug)]
pub enum ThemeAction {
    /// List available themes
    List,
    /// Set the stored theme preference
    Set { name: String },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show config file path
    Path,
    /// Print the effective configuration
    Show,
    /// Write a default config file if none exists
    Init,
}
