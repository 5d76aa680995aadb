//! Backend API client
//!
//! Typed reqwest client for the Toolboxx backend REST API: authentication,
//! chat completion, conversation history, and questionnaire submissions.
//! The backend is a black box to this crate; every endpoint is consumed
//! as-is with no retries, and a failed call is surfaced exactly once.

use crate::config::ApiConfig;
use crate::error::{AssistError, Result};
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Endpoint paths, relative to the configured base URL
mod endpoints {
    pub const LOGIN: &str = "/login";
    pub const REGISTER: &str = "/register";
    pub const CHAT: &str = "/chat";
    pub const CONVERSATIONS: &str = "/conversations";
    pub const SUBMISSIONS: &str = "/submissions";

    /// Messages for one conversation live under the chat prefix, not the
    /// conversations prefix.
    pub fn conversation_messages(id: i64) -> String {
        format!("/chat/{}/messages", id)
    }

    pub fn conversation_delete(id: i64) -> String {
        format!("/conversations/{}", id)
    }
}

/// Request body for POST /chat
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
    conversation_id: Option<i64>,
    use_history: bool,
}

/// Response body from POST /chat
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    /// Assistant's answer; may contain constrained HTML
    pub answer: String,
    /// Conversation the answer was appended to (server-assigned on first send)
    pub conversation_id: i64,
    /// Source documents used by the backend, when reported
    #[serde(default)]
    pub sources: Option<Vec<serde_json::Value>>,
}

/// One message of a stored conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

/// Conversation metadata from GET /conversations
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationSummary {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message_count: i64,
}

#[derive(Debug, Deserialize)]
struct ConversationListResponse {
    #[serde(default)]
    conversations: Vec<ConversationSummary>,
    #[serde(default)]
    #[allow(dead_code)]
    total: i64,
}

/// The messages endpoint has shipped both a bare array and a wrapped object;
/// accept either shape.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessagesPayload {
    Bare(Vec<WireMessage>),
    Wrapped { messages: Vec<WireMessage> },
}

impl MessagesPayload {
    fn into_messages(self) -> Vec<WireMessage> {
        match self {
            Self::Bare(messages) => messages,
            Self::Wrapped { messages } => messages,
        }
    }
}

#[derive(Debug, Serialize)]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Authenticated user record returned by login/register
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

/// Response body from POST /login and POST /register
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: AuthUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// One questionnaire submission from GET /submissions
#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub id: i64,
    pub questionnaire_title: String,
    #[serde(default = "default_step")]
    pub step: i64,
    #[serde(default)]
    pub is_complete: bool,
}

fn default_step() -> i64 {
    1
}

/// Error body shape used by the backend for rejected requests
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
}

/// Client for the Toolboxx backend API
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if HTTP client initialization fails
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AssistError::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Extract the server-supplied detail message from an error response
    async fn error_detail(response: reqwest::Response) -> String {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorBody>(&body) {
            Ok(ErrorBody {
                detail: Some(detail),
            }) => detail,
            _ => format!("status {}", status),
        }
    }

    /// Log in with email and password
    ///
    /// A non-success status surfaces the server-supplied message as an
    /// authentication error.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse> {
        self.credentials_call(endpoints::LOGIN, email, password, "Login failed")
            .await
    }

    /// Register a new account
    ///
    /// The backend issues a token immediately, so a successful registration
    /// doubles as a login.
    pub async fn register(&self, email: &str, password: &str) -> Result<TokenResponse> {
        self.credentials_call(endpoints::REGISTER, email, password, "Registration failed")
            .await
    }

    async fn credentials_call(
        &self,
        path: &str,
        email: &str,
        password: &str,
        fallback: &str,
    ) -> Result<TokenResponse> {
        let response = self
            .client
            .post(self.url(path))
            .json(&CredentialsRequest { email, password })
            .send()
            .await
            .map_err(AssistError::Http)?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = Self::error_detail(response).await;
            tracing::warn!("{} returned {}: {}", path, status, detail);
            let message = if detail.starts_with("status ") {
                fallback.to_string()
            } else {
                detail
            };
            return Err(AssistError::Authentication(message).into());
        }

        let token: TokenResponse = response.json().await.map_err(AssistError::Http)?;
        Ok(token)
    }

    /// Send a chat message
    ///
    /// # Arguments
    ///
    /// * `message` - The user's message text
    /// * `conversation_id` - Numeric id of the active conversation, or None
    ///   to let the backend create one
    pub async fn chat(&self, message: &str, conversation_id: Option<i64>) -> Result<ChatResponse> {
        let request = ChatRequest {
            message,
            conversation_id,
            use_history: true,
        };

        let response = self
            .client
            .post(self.url(endpoints::CHAT))
            .json(&request)
            .send()
            .await
            .map_err(AssistError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let detail = Self::error_detail(response).await;
            tracing::error!("Chat endpoint returned {}: {}", status, detail);
            return Err(AssistError::Api(format!("Chat request failed: {}", detail)).into());
        }

        let chat: ChatResponse = response.json().await.map_err(AssistError::Http)?;
        Ok(chat)
    }

    /// List all conversations
    pub async fn conversations(&self) -> Result<Vec<ConversationSummary>> {
        let response = self
            .client
            .get(self.url(endpoints::CONVERSATIONS))
            .send()
            .await
            .map_err(AssistError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let detail = Self::error_detail(response).await;
            tracing::error!("Conversations endpoint returned {}: {}", status, detail);
            return Err(
                AssistError::Api(format!("Failed to fetch conversations: {}", detail)).into(),
            );
        }

        let list: ConversationListResponse = response.json().await.map_err(AssistError::Http)?;
        Ok(list.conversations)
    }

    /// Fetch the ordered messages of one conversation
    pub async fn conversation_messages(&self, id: i64) -> Result<Vec<WireMessage>> {
        let response = self
            .client
            .get(self.url(&endpoints::conversation_messages(id)))
            .send()
            .await
            .map_err(AssistError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let detail = Self::error_detail(response).await;
            tracing::error!("Messages endpoint returned {}: {}", status, detail);
            return Err(AssistError::Api(format!(
                "Failed to fetch messages for conversation {}: {}",
                id, detail
            ))
            .into());
        }

        let payload: MessagesPayload = response.json().await.map_err(AssistError::Http)?;
        Ok(payload.into_messages())
    }

    /// Delete one conversation
    pub async fn delete_conversation(&self, id: i64) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&endpoints::conversation_delete(id)))
            .send()
            .await
            .map_err(AssistError::Http)?;

        let status = response.status();
        if !status.is_success() {
            let detail = Self::error_detail(response).await;
            tracing::error!("Delete endpoint returned {}: {}", status, detail);
            return Err(AssistError::Api(format!(
                "Failed to delete conversation {}: {}",
                id, detail
            ))
            .into());
        }

        Ok(())
    }

    /// List the authenticated user's questionnaire submissions
    ///
    /// # Errors
    ///
    /// A 401 response is distinguished as `AssistError::Authentication` so
    /// the caller can force a logout and re-prompt for credentials.
    pub async fn submissions(&self, token: &str) -> Result<Vec<Submission>> {
        let response = self
            .client
            .get(self.url(endpoints::SUBMISSIONS))
            .bearer_auth(token)
            .send()
            .await
            .map_err(AssistError::Http)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            let detail = Self::error_detail(response).await;
            tracing::warn!("Submissions endpoint rejected token: {}", detail);
            return Err(AssistError::Authentication(
                "Your session has expired. Please log in again.".to_string(),
            )
            .into());
        }

        if !status.is_success() {
            let detail = Self::error_detail(response).await;
            tracing::error!("Submissions endpoint returned {}: {}", status, detail);
            return Err(
                AssistError::Api(format!("Failed to fetch submissions: {}", detail)).into(),
            );
        }

        let submissions: Vec<Submission> = response.json().await.map_err(AssistError::Http)?;
        Ok(submissions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;

    #[test]
    fn test_client_trims_trailing_slash() {
        let config = ApiConfig {
            base_url: "http://localhost:8000/api/v1/".to_string(),
            ..Default::default()
        };
        let client = ApiClient::new(&config).expect("client init failed");
        assert_eq!(client.url("/chat"), "http://localhost:8000/api/v1/chat");
    }

    #[test]
    fn test_messages_payload_bare_array() {
        let json = r#"[{"role": "user", "content": "hi"}]"#;
        let payload: MessagesPayload = serde_json::from_str(json).expect("parse failed");
        let messages = payload.into_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
    }

    #[test]
    fn test_messages_payload_wrapped_object() {
        let json = r#"{"messages": [{"role": "assistant", "content": "hello"}]}"#;
        let payload: MessagesPayload = serde_json::from_str(json).expect("parse failed");
        let messages = payload.into_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "hello");
    }

    #[test]
    fn test_chat_response_without_sources() {
        let json = r#"{"answer": "42", "conversation_id": 7}"#;
        let response: ChatResponse = serde_json::from_str(json).expect("parse failed");
        assert_eq!(response.answer, "42");
        assert_eq!(response.conversation_id, 7);
        assert!(response.sources.is_none());
    }

    #[test]
    fn test_conversation_summary_defaults() {
        let json = r#"{"id": 3, "created_at": "2026-01-02T03:04:05Z"}"#;
        let summary: ConversationSummary = serde_json::from_str(json).expect("parse failed");
        assert_eq!(summary.id, 3);
        assert!(summary.title.is_none());
        assert_eq!(summary.message_count, 0);
    }

    #[test]
    fn test_submission_defaults() {
        let json = r#"{"questionnaire_title": "Will Writing"}"#;
        let submission: Submission = serde_json::from_str(json).expect("parse failed");
        assert_eq!(submission.step, 1);
        assert!(!submission.is_complete);
    }

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(endpoints::conversation_messages(12), "/chat/12/messages");
        assert_eq!(endpoints::conversation_delete(12), "/conversations/12");
    }
}
