//! CLI module for Toolchat.

pub mod commands;
mod output;
pub mod preflight;
pub mod repl;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Toolchat - a terminal assistant with tools
///
/// Chat with an LLM that can do arithmetic, look up the current weather,
/// and answer questions from a reference document.
#[derive(Parser, Debug)]
#[command(name = "toolchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start an interactive chat session (default)
    Chat,

    /// Check API keys, knowledge document, and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
