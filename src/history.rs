//! Conversation history
//!
//! Listing, loading, and deleting conversations held by the backend, and
//! reflecting the result into session state and the view.

use crate::api::ConversationSummary;
use crate::chat::ChatSession;
use crate::error::Result;
use crate::guided_flow::GuidedStep;
use crate::view::{ChatView, Role};
use chrono::{DateTime, Utc};

impl<V: ChatView> ChatSession<V> {
    /// Fetch the full conversation list, newest first
    pub async fn fetch_conversations(&mut self) -> Result<Vec<ConversationSummary>> {
        let mut conversations = self.api().conversations().await?;
        conversations.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(conversations)
    }

    /// Load a conversation from the remote source into the view
    ///
    /// An empty conversation renders a notice and changes no identifiers;
    /// a fetch failure renders an error message. Only a non-empty result
    /// activates the conversation.
    pub async fn load_conversation(&mut self, id: i64) -> Result<()> {
        self.view_mut().clear();
        self.view_mut().message(Role::Ai, "Loading conversation...");

        let messages = match self.api().conversation_messages(id).await {
            Ok(messages) => messages,
            Err(err) => {
                tracing::warn!("Failed to load conversation {}: {}", id, err);
                self.view_mut().clear();
                self.view_mut()
                    .message(Role::Ai, "Failed to load conversation. Please try again.");
                return Ok(());
            }
        };

        if messages.is_empty() {
            self.view_mut()
                .message(Role::Ai, "No messages in this conversation.");
            return Ok(());
        }

        self.view_mut().clear();

        self.state_mut().open_remote(id)?;
        self.state_mut().set_greeting_rendered(true);
        self.state_mut().exit_guided_flow();
        self.state_mut().set_guided_step(GuidedStep::Chat);

        for message in &messages {
            self.view_mut()
                .message(Role::from_wire(&message.role), &message.content);
        }

        Ok(())
    }

    /// Delete a conversation on the backend
    ///
    /// Callers must have confirmed the deletion with the user. Deleting the
    /// active conversation resets the view to a fresh chat; the refreshed
    /// conversation list is returned either way.
    pub async fn delete_conversation(&mut self, id: i64) -> Result<Vec<ConversationSummary>> {
        self.api().delete_conversation(id).await?;

        if self.state().active_remote_id() == Some(id) {
            self.reset_to_new_chat()?;
        }

        self.fetch_conversations().await
    }
}

/// Human-friendly date for history listings
pub fn format_relative_date(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - date).num_days();

    if days <= 0 {
        "Today".to_string()
    } else if days == 1 {
        "Yesterday".to_string()
    } else if days < 7 {
        format!("{} days ago", days)
    } else {
        date.format("%Y-%m-%d").to_string()
    }
}

/// Listing title with the untitled fallback
pub fn display_title(conversation: &ConversationSummary) -> String {
    conversation
        .title
        .clone()
        .unwrap_or_else(|| "Untitled Conversation".to_string())
}
