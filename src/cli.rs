//! Command-line interface definition for Toolboxx Assist
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the interactive chat, history management,
//! authentication, and submissions.

use clap::{Parser, Subcommand};

/// Toolboxx Assist - Trust Inheritance legal assistant chat client
///
/// Talk to the assistant, browse guided support options, and manage your
/// conversation history from the terminal.
#[derive(Parser, Debug, Clone)]
#[command(name = "toolboxx-assist")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the backend API base URL
    #[arg(long, env = "TOOLBOXX_API_BASE")]
    pub api_base: Option<String>,

    /// Override the session database path
    #[arg(long)]
    pub state_db: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Toolboxx Assist
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start an interactive chat session
    Chat,

    /// Manage conversation history
    History {
        /// History subcommand
        #[command(subcommand)]
        command: HistoryCommand,
    },

    /// Log in with email and password
    Login {
        /// Email address (prompted when omitted)
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Register a new account
    Register {
        /// Email address (prompted when omitted)
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Log out of the current session
    Logout,

    /// Show questionnaire submission status (requires login)
    Submissions,
}

/// History management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum HistoryCommand {
    /// List all conversations
    List,

    /// Show the messages of one conversation
    Show {
        /// Conversation id
        id: i64,
    },

    /// Delete a conversation
    Delete {
        /// Conversation id
        id: i64,

        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
