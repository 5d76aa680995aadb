/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes four top-level command modules:

- `chat`        — Interactive chat session
- `history`     — List, show, and delete remote conversations
- `auth`        — Login, registration, and logout
- `submissions` — Questionnaire submission status

These handlers are intentionally small and use the library components:
the API client, the session state machine, and the chat orchestrator.
*/

use crate::error::AssistError;

// Special commands parser for the interactive session
pub mod special_commands;

/// Prefer the server-supplied message for authentication failures
fn auth_error_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<AssistError>() {
        Some(AssistError::Authentication(message)) => message.clone(),
        _ => err.to_string(),
    }
}

/// Ask a yes/no question, defaulting to no
fn confirm(rl: &mut rustyline::DefaultEditor, prompt: &str) -> crate::error::Result<bool> {
    let answer = rl.readline(prompt)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}

// Interactive chat session handler
pub mod chat {
    //! Interactive chat session.
    //!
    //! Builds the session from persisted state, shows the greeting (or
    //! reloads the active conversation), and runs a readline loop that
    //! routes input to special commands, guided-flow selections, or
    //! free-form chat.

    use super::special_commands::{parse_special_command, print_help, SpecialCommand};
    use super::{auth_error_message, confirm};
    use crate::api::ApiClient;
    use crate::auth::{self, AuthSession};
    use crate::chat::ChatSession;
    use crate::config::Config;
    use crate::error::Result;
    use crate::history::{display_title, format_relative_date};
    use crate::state::SessionState;
    use crate::storage::KvStore;
    use crate::view::{ChatView, TerminalView};
    use chrono::Utc;
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start the interactive chat session
    pub async fn run_chat(config: Config) -> Result<()> {
        let store = KvStore::open()?;
        let auth = AuthSession::load(store.clone())?;
        let state = SessionState::load(store)?;
        let api = ApiClient::new(&config.api)?;

        let mut session = ChatSession::new(
            api,
            auth,
            state,
            config.chat.clone(),
            TerminalView::new(),
        );

        print_welcome_banner();
        session.open().await?;

        let mut rl = DefaultEditor::new()?;

        loop {
            match rl.readline(">> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    match parse_special_command(trimmed) {
                        SpecialCommand::Help => print_help(),
                        SpecialCommand::NewChat => session.reset_to_new_chat()?,
                        SpecialCommand::History => show_history(&mut session).await,
                        SpecialCommand::Load(id) => {
                            session.load_conversation(id).await?;
                        }
                        SpecialCommand::Delete(id) => {
                            delete_with_confirmation(&mut session, &mut rl, id).await?;
                        }
                        SpecialCommand::Submissions => session.show_submissions().await?,
                        SpecialCommand::Login => prompt_login(&mut session, &mut rl).await?,
                        SpecialCommand::Register => prompt_register(&mut session, &mut rl).await?,
                        SpecialCommand::Logout => {
                            session.logout()?;
                            println!("{}", "Logged out.".yellow());
                        }
                        SpecialCommand::Whoami => match session.current_user_email() {
                            Some(email) => println!("Logged in as {}", email.bold()),
                            None => println!("{}", "Not logged in.".yellow()),
                        },
                        SpecialCommand::Exit => {
                            // Closing the chat resets the session, exactly
                            // like closing the widget window. Ctrl-C leaves
                            // the session in place to resume later.
                            session.close()?;
                            break;
                        }
                        SpecialCommand::Unknown(command) => {
                            println!(
                                "{}",
                                format!("Unknown command: {} (try /help)", command).yellow()
                            );
                        }
                        SpecialCommand::None => {
                            if let Some(choice) = match_guided_option(&session, trimmed) {
                                session.handle_guided_option(&choice).await?;
                            } else if let Err(err) = session.send_message(trimmed).await {
                                // The apology message is already rendered.
                                tracing::warn!("Chat request failed: {}", err);
                            }
                        }
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            }
        }

        println!("{}", "Goodbye!".dimmed());
        Ok(())
    }

    fn print_welcome_banner() {
        println!("{}", "Toolboxx Assist".green().bold());
        println!("{}", "Trust Inheritance Legal AI Assistant".dimmed());
        println!("{}", "Type /help for commands, /exit to close.".dimmed());
        println!();
    }

    /// Resolve input against the currently offered guided-flow options
    ///
    /// Accepts either the option number or its label (case-insensitive).
    pub fn match_guided_option<V: ChatView>(
        session: &ChatSession<V>,
        input: &str,
    ) -> Option<String> {
        let options = session.guided_options()?;

        if let Ok(number) = input.parse::<usize>() {
            if number >= 1 && number <= options.len() {
                return Some(options[number - 1].clone());
            }
        }

        options
            .iter()
            .find(|option| option.eq_ignore_ascii_case(input))
            .cloned()
    }

    async fn show_history<V: ChatView>(session: &mut ChatSession<V>) {
        let conversations = match session.fetch_conversations().await {
            Ok(conversations) => conversations,
            Err(err) => {
                tracing::warn!("Failed to fetch conversations: {}", err);
                println!("{}", "Failed to load conversations".red());
                return;
            }
        };

        if conversations.is_empty() {
            println!("{}", "No conversations yet".yellow());
            return;
        }

        let now = Utc::now();
        println!("\n{}", "Conversation history:".bold());
        for conversation in &conversations {
            println!(
                "  {} {} {}",
                format!("[{}]", conversation.id).cyan(),
                display_title(conversation),
                format_relative_date(conversation.created_at, now).dimmed()
            );
        }
        println!(
            "{}",
            "Use /load <id> to open one, /delete <id> to remove it.\n".dimmed()
        );
    }

    async fn delete_with_confirmation<V: ChatView>(
        session: &mut ChatSession<V>,
        rl: &mut DefaultEditor,
        id: i64,
    ) -> Result<()> {
        let prompt = format!("Delete conversation {}? This cannot be undone. [y/N] ", id);
        if !confirm(rl, &prompt)? {
            println!("{}", "Kept.".dimmed());
            return Ok(());
        }

        match session.delete_conversation(id).await {
            Ok(remaining) => {
                println!("{}", format!("Deleted conversation {}", id).green());
                println!("{}", format!("{} conversations remaining", remaining.len()).dimmed());
            }
            Err(err) => {
                tracing::warn!("Failed to delete conversation {}: {}", id, err);
                println!(
                    "{}",
                    "Failed to delete conversation. Please try again.".red()
                );
            }
        }
        Ok(())
    }

    async fn prompt_login<V: ChatView>(
        session: &mut ChatSession<V>,
        rl: &mut DefaultEditor,
    ) -> Result<()> {
        let email = rl.readline("Email: ")?;
        let password = rl.readline("Password: ")?;

        if let Err(message) = auth::validate_login(&email, &password) {
            println!("{}", message.red());
            return Ok(());
        }

        match session.login(email.trim(), &password).await {
            Ok(response) => println!(
                "{}",
                format!("Logged in as {}", response.user.email).green()
            ),
            Err(err) => println!("{}", auth_error_message(&err).red()),
        }
        Ok(())
    }

    async fn prompt_register<V: ChatView>(
        session: &mut ChatSession<V>,
        rl: &mut DefaultEditor,
    ) -> Result<()> {
        let email = rl.readline("Email: ")?;
        let password = rl.readline("Password: ")?;
        let confirm_password = rl.readline("Confirm password: ")?;

        if let Err(message) = auth::validate_registration(&email, &password, &confirm_password) {
            println!("{}", message.red());
            return Ok(());
        }

        match session.register(email.trim(), &password).await {
            Ok(response) => println!(
                "{}",
                format!("Registered and logged in as {}", response.user.email).green()
            ),
            Err(err) => println!("{}", auth_error_message(&err).red()),
        }
        Ok(())
    }
}

// History command handler
pub mod history {
    //! Non-interactive history management.

    use super::confirm;
    use crate::api::ApiClient;
    use crate::auth::AuthSession;
    use crate::chat::ChatSession;
    use crate::cli::HistoryCommand;
    use crate::config::Config;
    use crate::error::Result;
    use crate::history::{display_title, format_relative_date};
    use crate::state::SessionState;
    use crate::storage::KvStore;
    use crate::view::TerminalView;
    use chrono::Utc;
    use colored::Colorize;
    use prettytable::{format, Table};

    /// Handle history subcommands
    pub async fn run_history(config: Config, command: HistoryCommand) -> Result<()> {
        let store = KvStore::open()?;
        let auth = AuthSession::load(store.clone())?;
        let state = SessionState::load(store)?;
        let api = ApiClient::new(&config.api)?;
        let mut session = ChatSession::new(
            api,
            auth,
            state,
            config.chat.clone(),
            TerminalView::new(),
        );

        match command {
            HistoryCommand::List => {
                let conversations = session.fetch_conversations().await?;

                if conversations.is_empty() {
                    println!("{}", "No conversations yet".yellow());
                    return Ok(());
                }

                let now = Utc::now();
                let mut table = Table::new();
                table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
                table.add_row(prettytable::row![
                    "ID".bold(),
                    "Title".bold(),
                    "Messages".bold(),
                    "Created".bold()
                ]);

                for conversation in &conversations {
                    let title = display_title(conversation);
                    let title = if title.len() > 40 {
                        format!("{}...", &title[..37])
                    } else {
                        title
                    };

                    table.add_row(prettytable::row![
                        conversation.id.to_string().cyan(),
                        title,
                        conversation.message_count,
                        format_relative_date(conversation.created_at, now)
                    ]);
                }

                println!("\nConversation History:");
                table.printstd();
                println!();
                println!(
                    "Use {} to read one.",
                    "toolboxx-assist history show <ID>".cyan()
                );
                println!();
            }
            HistoryCommand::Show { id } => {
                session.load_conversation(id).await?;
            }
            HistoryCommand::Delete { id, force } => {
                if !force {
                    let mut rl = rustyline::DefaultEditor::new()?;
                    let prompt =
                        format!("Delete conversation {}? This cannot be undone. [y/N] ", id);
                    if !confirm(&mut rl, &prompt)? {
                        println!("{}", "Kept.".dimmed());
                        return Ok(());
                    }
                }

                session.delete_conversation(id).await?;
                println!("{}", format!("Deleted conversation {}", id).green());
            }
        }

        Ok(())
    }
}

// Authentication command handlers
pub mod auth {
    //! Login, registration, and logout from the command line.
    //!
    //! Field validation happens before any network call; a validation
    //! failure is shown inline and never reaches the backend.

    use super::auth_error_message;
    use crate::api::ApiClient;
    use crate::auth::{validate_login, validate_registration, AuthSession};
    use crate::config::Config;
    use crate::error::Result;
    use crate::storage::KvStore;
    use colored::Colorize;
    use rustyline::DefaultEditor;

    /// Log in, prompting for any missing credentials
    pub async fn run_login(config: Config, email: Option<String>) -> Result<()> {
        let store = KvStore::open()?;
        let mut auth = AuthSession::load(store)?;
        let api = ApiClient::new(&config.api)?;

        let mut rl = DefaultEditor::new()?;
        let email = match email {
            Some(email) => email,
            None => rl.readline("Email: ")?,
        };
        let password = rl.readline("Password: ")?;

        if let Err(message) = validate_login(&email, &password) {
            println!("{}", message.red());
            return Ok(());
        }

        match auth.login(&api, email.trim(), &password).await {
            Ok(response) => {
                println!(
                    "{}",
                    format!("Logged in as {}", response.user.email).green()
                );
            }
            Err(err) => println!("{}", auth_error_message(&err).red()),
        }
        Ok(())
    }

    /// Register a new account and log in with it
    pub async fn run_register(config: Config, email: Option<String>) -> Result<()> {
        let store = KvStore::open()?;
        let mut auth = AuthSession::load(store)?;
        let api = ApiClient::new(&config.api)?;

        let mut rl = DefaultEditor::new()?;
        let email = match email {
            Some(email) => email,
            None => rl.readline("Email: ")?,
        };
        let password = rl.readline("Password: ")?;
        let confirm = rl.readline("Confirm password: ")?;

        if let Err(message) = validate_registration(&email, &password, &confirm) {
            println!("{}", message.red());
            return Ok(());
        }

        match auth.register(&api, email.trim(), &password).await {
            Ok(response) => {
                println!(
                    "{}",
                    format!("Registered and logged in as {}", response.user.email).green()
                );
            }
            Err(err) => println!("{}", auth_error_message(&err).red()),
        }
        Ok(())
    }

    /// Clear the local session
    pub fn run_logout() -> Result<()> {
        let store = KvStore::open()?;
        let mut auth = AuthSession::load(store)?;

        if !auth.is_authenticated() {
            println!("{}", "Not logged in.".yellow());
            return Ok(());
        }

        auth.logout()?;
        println!("{}", "Logged out.".green());
        Ok(())
    }
}

// Submissions command handler
pub mod submissions {
    //! Questionnaire submission status listing.

    use crate::api::{ApiClient, Submission};
    use crate::auth::AuthSession;
    use crate::config::Config;
    use crate::error::{AssistError, Result};
    use crate::storage::KvStore;
    use colored::Colorize;
    use prettytable::{format, Table};

    /// List the authenticated user's submissions
    pub async fn run_submissions(config: Config) -> Result<()> {
        let store = KvStore::open()?;
        let mut auth = AuthSession::load(store)?;
        let api = ApiClient::new(&config.api)?;

        let Some(token) = auth.token().map(|t| t.to_string()) else {
            println!(
                "{}",
                "Please log in to check your submissions (toolboxx-assist login).".yellow()
            );
            return Ok(());
        };

        match api.submissions(&token).await {
            Ok(submissions) => {
                print_submissions_table(&submissions);
                Ok(())
            }
            Err(err) => {
                if matches!(
                    err.downcast_ref::<AssistError>(),
                    Some(AssistError::Authentication(_))
                ) {
                    auth.logout()?;
                    println!(
                        "{}",
                        "Your session has expired, so you have been logged out. \
                         Please log in again to view your submissions."
                            .yellow()
                    );
                    Ok(())
                } else {
                    Err(err)
                }
            }
        }
    }

    fn print_submissions_table(submissions: &[Submission]) {
        if submissions.is_empty() {
            println!("{}", "You have no submissions yet.".yellow());
            return;
        }

        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_BORDERS_ONLY);
        table.add_row(prettytable::row!["Questionnaire".bold(), "Status".bold()]);

        for submission in submissions {
            let status = if submission.is_complete {
                "Completed".green().to_string()
            } else {
                format!("In progress (step {})", submission.step)
            };
            table.add_row(prettytable::row![submission.questionnaire_title, status]);
        }

        println!("\nYour submissions:");
        table.printstd();
        println!();
    }
}
