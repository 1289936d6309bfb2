//! Command-line interface definition for Medquiry
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for interactive inquiry chat and session
//! history management.

use clap::{Parser, Subcommand};

/// Medquiry - terminal client for a medical inquiry assistant
///
/// Run multi-turn inquiry conversations against a remote assistant,
/// with conversation history persisted locally.
#[derive(Parser, Debug, Clone)]
#[command(name = "medquiry")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the session store directory
    #[arg(long, env = "MEDQUIRY_STORE_DIR")]
    pub store_dir: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Medquiry
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive inquiry conversation
    Chat {
        /// Resume an existing session by id instead of starting fresh
        #[arg(short, long)]
        resume: Option<String>,
    },

    /// Manage stored inquiry sessions
    Sessions {
        /// Session management subcommand
        #[command(subcommand)]
        command: SessionCommand,
    },
}

/// Session management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum SessionCommand {
    /// List stored sessions, newest first
    List,

    /// Print the transcript of a session
    Show {
        /// Session id to display
        id: String,
    },

    /// Delete a session
    Delete {
        /// Session id to delete
        id: String,
    },

    /// Delete all sessions
    Clear,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
