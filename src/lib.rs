//! Toolboxx Assist - legal assistant chat client library
//!
//! This library provides the core functionality for the Toolboxx Assist
//! chat client, including the conversation state machine, the guided
//! support flow, authentication, and the backend API client.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `state`: Conversation identity and guided-flow state machine
//! - `guided_flow`: Menu-driven support flow with fixed options and links
//! - `chat`: Session orchestration between input, state, API, and view
//! - `history`: Remote conversation listing, loading, and deletion
//! - `auth`: Authentication state and credential validation
//! - `api`: Typed client for the backend REST API
//! - `storage`: Embedded key-value store for persisted session state
//! - `sanitize`: Allowlist sanitization of assistant-authored HTML
//! - `view`: Rendering abstraction with terminal and recording impls
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use toolboxx_assist::Config;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::default();
//! config.validate()?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod guided_flow;
pub mod history;
pub mod sanitize;
pub mod state;
pub mod storage;
pub mod view;

// Re-export commonly used types
pub use api::ApiClient;
pub use auth::AuthSession;
pub use chat::ChatSession;
pub use config::Config;
pub use error::{AssistError, Result};
pub use state::{ConversationFocus, ConversationId, SessionState};
pub use view::{ChatView, RecordingView, Role, TerminalView};
