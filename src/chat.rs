//! Chat session orchestration
//!
//! Ties the pieces together: user input, guided flow, conversation state,
//! the backend API, and the rendering view. One `ChatSession` corresponds
//! to one open chat window.

use crate::api::{ApiClient, Submission, TokenResponse};
use crate::auth::AuthSession;
use crate::config::ChatConfig;
use crate::error::{AssistError, Result};
use crate::guided_flow::{self, FlowOutcome};
use crate::state::SessionState;
use crate::view::{ChatView, Role};

/// Fixed message rendered when the backend cannot be reached
pub const APOLOGY: &str = "⚠️ Sorry, I couldn't reach the server. Please try again.";

/// One open chat session
pub struct ChatSession<V> {
    api: ApiClient,
    auth: AuthSession,
    state: SessionState,
    chat_config: ChatConfig,
    view: V,
}

impl<V: ChatView> ChatSession<V> {
    pub fn new(
        api: ApiClient,
        auth: AuthSession,
        state: SessionState,
        chat_config: ChatConfig,
        view: V,
    ) -> Self {
        Self {
            api,
            auth,
            state,
            chat_config,
            view,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    pub fn current_user_email(&self) -> Option<String> {
        self.auth.current_user().map(|user| user.email.clone())
    }

    /// Options currently offered by the guided flow, if it is active
    pub fn guided_options(&self) -> Option<Vec<String>> {
        if self.state.guided_active() {
            guided_flow::options_for(self.state.guided_step())
        } else {
            None
        }
    }

    /// Window-opening behavior: reload the active conversation from the
    /// remote source, or show the greeting if it has never been rendered
    pub async fn open(&mut self) -> Result<()> {
        if let Some(remote_id) = self.state.active_remote_id() {
            self.load_conversation(remote_id).await
        } else {
            if !self.state.greeting_rendered() {
                self.show_greeting();
            }
            Ok(())
        }
    }

    /// Render the greeting and root options once per session
    pub fn show_greeting(&mut self) {
        guided_flow::show_greeting(&mut self.state, &mut self.view, &self.chat_config.greeting);
    }

    /// Dispatch a guided-flow option selection
    pub async fn handle_guided_option(&mut self, choice: &str) -> Result<()> {
        match guided_flow::handle_option(&mut self.state, &mut self.view, choice) {
            FlowOutcome::Continue => Ok(()),
            FlowOutcome::CheckSubmissions => self.show_submissions().await,
        }
    }

    /// Send a free-form message to the backend
    ///
    /// Empty input is a no-op. Leaves the guided flow, renders the user's
    /// message optimistically, and creates a local conversation when none
    /// is active; the conversation only becomes active once the backend
    /// confirms it. A transport failure renders the apology message and
    /// propagates the error.
    pub async fn send_message(&mut self, text: &str) -> Result<()> {
        let message = text.trim();
        if message.is_empty() {
            return Ok(());
        }

        self.state.exit_guided_flow();
        self.view.message(Role::User, message);

        let was_active = self.state.focus().active().is_some();
        if was_active {
            self.state.append_message(Role::User, message)?;
        } else {
            let title = generate_title(message, self.chat_config.title_max_words);
            self.state.create_conversation(&title)?;
        }

        let conversation_id = self.state.active_remote_id();
        self.view.thinking(true);
        let response = match self.api.chat(message, conversation_id).await {
            Ok(response) => {
                self.view.thinking(false);
                response
            }
            Err(err) => {
                self.view.thinking(false);
                self.view.message(Role::Ai, APOLOGY);
                return Err(err);
            }
        };

        self.view.message(Role::Ai, &response.answer);
        if was_active {
            self.state.append_message(Role::Ai, &response.answer)?;
        }
        self.state.confirm_remote(response.conversation_id)?;

        Ok(())
    }

    /// Clear everything and start a fresh conversation
    pub fn reset_to_new_chat(&mut self) -> Result<()> {
        self.state.clear()?;
        self.view.clear();
        self.show_greeting();
        Ok(())
    }

    /// Window-closing behavior: clear everything without re-showing the
    /// greeting, since the window is no longer open
    pub fn close(&mut self) -> Result<()> {
        self.state.clear()?;
        self.view.clear();
        Ok(())
    }

    /// Render the authenticated user's questionnaire submissions
    ///
    /// An expired token (401) forces a logout and a re-login prompt.
    pub async fn show_submissions(&mut self) -> Result<()> {
        if !self.auth.is_authenticated() {
            self.view.message(
                Role::Ai,
                "Please log in to check your submissions. Use /login to sign in.",
            );
            return Ok(());
        }

        let token = self
            .auth
            .token()
            .map(|t| t.to_string())
            .unwrap_or_default();

        self.view.thinking(true);
        match self.api.submissions(&token).await {
            Ok(submissions) => {
                self.view.thinking(false);
                let listing = format_submissions(&submissions);
                self.view.message(Role::Ai, &listing);
                Ok(())
            }
            Err(err) => {
                self.view.thinking(false);
                if is_auth_error(&err) {
                    self.auth.logout()?;
                    self.view.message(
                        Role::Ai,
                        "Your session has expired, so you have been logged out. \
                         Please log in again with /login to view your submissions.",
                    );
                    Ok(())
                } else {
                    tracing::warn!("Failed to fetch submissions: {}", err);
                    self.view
                        .message(Role::Ai, "Failed to load submissions. Please try again.");
                    Ok(())
                }
            }
        }
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<TokenResponse> {
        self.auth.login(&self.api, email, password).await
    }

    pub async fn register(&mut self, email: &str, password: &str) -> Result<TokenResponse> {
        self.auth.register(&self.api, email, password).await
    }

    pub fn logout(&mut self) -> Result<()> {
        self.auth.logout()
    }

    pub(crate) fn api(&self) -> &ApiClient {
        &self.api
    }

    pub(crate) fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    pub(crate) fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }
}

/// Check whether an error is an authentication rejection
fn is_auth_error(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<AssistError>(),
        Some(AssistError::Authentication(_))
    )
}

/// Generate a conversation title from the first message
///
/// Takes the first `max_words` whitespace-separated words, appending an
/// ellipsis when the message was longer.
pub fn generate_title(message: &str, max_words: usize) -> String {
    let words: Vec<&str> = message.split_whitespace().collect();
    let title = words
        .iter()
        .take(max_words)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    if words.len() > max_words {
        format!("{}...", title)
    } else {
        title
    }
}

/// Render submissions as a plain status list
pub fn format_submissions(submissions: &[Submission]) -> String {
    if submissions.is_empty() {
        return "You have no submissions yet.".to_string();
    }

    let mut lines = vec!["Your submissions:".to_string()];
    for submission in submissions {
        let status = if submission.is_complete {
            "Completed".to_string()
        } else {
            format!("In progress (step {})", submission.step)
        };
        lines.push(format!("• {} — {}", submission.questionnaire_title, status));
    }
    lines.join("\n")
}
