//! Special commands parser for the interactive chat session
//!
//! Commands are prefixed with `/` and are case-insensitive. Anything else
//! is treated as a guided-flow selection or a free-form message.

use colored::Colorize;

/// Special commands available during an interactive session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Display help information
    Help,

    /// Clear the session and start a fresh conversation
    NewChat,

    /// List remote conversation history
    History,

    /// Load a conversation by id
    Load(i64),

    /// Delete a conversation by id (asks for confirmation)
    Delete(i64),

    /// Show questionnaire submissions (requires login)
    Submissions,

    /// Log in with email and password
    Login,

    /// Register a new account
    Register,

    /// Log out of the current session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Exit the interactive session
    Exit,

    /// Input started with `/` but did not match any command
    Unknown(String),

    /// Not a special command; process as chat input
    None,
}

/// Parse a user input line into a special command
pub fn parse_special_command(input: &str) -> SpecialCommand {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return SpecialCommand::None;
    }

    let mut parts = trimmed.split_whitespace();
    let command = parts.next().unwrap_or("").to_lowercase();
    let arg = parts.next();

    match command.as_str() {
        "/help" | "/h" | "/?" => SpecialCommand::Help,
        "/new" => SpecialCommand::NewChat,
        "/history" => SpecialCommand::History,
        "/load" => match arg.and_then(|a| a.parse::<i64>().ok()) {
            Some(id) => SpecialCommand::Load(id),
            None => SpecialCommand::Unknown(trimmed.to_string()),
        },
        "/delete" => match arg.and_then(|a| a.parse::<i64>().ok()) {
            Some(id) => SpecialCommand::Delete(id),
            None => SpecialCommand::Unknown(trimmed.to_string()),
        },
        "/submissions" => SpecialCommand::Submissions,
        "/login" => SpecialCommand::Login,
        "/register" => SpecialCommand::Register,
        "/logout" => SpecialCommand::Logout,
        "/whoami" => SpecialCommand::Whoami,
        "/exit" | "/quit" | "/q" => SpecialCommand::Exit,
        _ => SpecialCommand::Unknown(trimmed.to_string()),
    }
}

/// Print help for the interactive session
pub fn print_help() {
    println!("\n{}", "Available commands:".bold());
    println!("  {}          Show this help", "/help".cyan());
    println!("  {}           Start a fresh conversation", "/new".cyan());
    println!("  {}       List your conversation history", "/history".cyan());
    println!("  {}     Open a conversation from history", "/load <id>".cyan());
    println!("  {}   Delete a conversation", "/delete <id>".cyan());
    println!("  {}   Check questionnaire submissions", "/submissions".cyan());
    println!("  {}         Log in", "/login".cyan());
    println!("  {}      Register a new account", "/register".cyan());
    println!("  {}        Log out", "/logout".cyan());
    println!("  {}        Show who is logged in", "/whoami".cyan());
    println!("  {}          Close the chat", "/exit".cyan());
    println!();
    println!(
        "{}",
        "Anything else is sent to the assistant. While options are offered,\n\
         pick one by number or by typing its label."
            .dimmed()
    );
    println!();
}
