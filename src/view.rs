//! Chat view abstraction
//!
//! The session logic renders into a `ChatView` rather than printing
//! directly, mirroring how the rendering surface is an external
//! collaborator of the state machine. `TerminalView` is the production
//! implementation; `RecordingView` captures render calls for tests.

use crate::sanitize;
use colored::Colorize;
use serde::{Deserialize, Serialize};

/// Who authored a rendered message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

impl Role {
    /// Map a wire role string onto a display role
    ///
    /// The backend reports "user" and "assistant"; older conversations may
    /// carry "ai". Anything that is not the user renders as the assistant.
    pub fn from_wire(role: &str) -> Self {
        if role.eq_ignore_ascii_case("user") {
            Self::User
        } else {
            Self::Ai
        }
    }
}

/// Rendering surface for the chat session
pub trait ChatView {
    /// Render one message. Assistant text may contain constrained HTML and
    /// must be sanitized by the implementation before display.
    fn message(&mut self, role: Role, text: &str);

    /// Replace the currently offered option set with a fresh one
    fn options(&mut self, options: &[String]);

    /// Show or hide the thinking indicator
    fn thinking(&mut self, active: bool);

    /// Clear all rendered output
    fn clear(&mut self);
}

/// Terminal implementation of the chat view
#[derive(Debug, Default)]
pub struct TerminalView;

impl TerminalView {
    pub fn new() -> Self {
        Self
    }
}

impl ChatView for TerminalView {
    fn message(&mut self, role: Role, text: &str) {
        match role {
            Role::User => println!("{} {}", "You:".bold(), text),
            Role::Ai => {
                let rendered = sanitize::render(text);
                println!("{} {}", "Assistant:".green().bold(), rendered);
            }
        }
    }

    fn options(&mut self, options: &[String]) {
        for (index, option) in options.iter().enumerate() {
            println!("  {} {}", format!("{}.", index + 1).cyan(), option);
        }
        println!(
            "{}",
            "Pick an option by number or label, or just type a message.".dimmed()
        );
    }

    fn thinking(&mut self, active: bool) {
        if active {
            println!("{}", "Thinking...".dimmed());
        }
    }

    fn clear(&mut self) {
        // Scrollback stays; a separator marks the fresh view.
        println!("\n{}\n", "────────────────────────────".dimmed());
    }
}

/// A render call captured by [`RecordingView`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Message { role: Role, text: String },
    Options(Vec<String>),
    Thinking(bool),
    Clear,
}

/// Recording implementation used by tests
///
/// Captures every render call verbatim, in order, without side effects.
#[derive(Debug, Default)]
pub struct RecordingView {
    pub events: Vec<ViewEvent>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    /// All rendered messages, in render order
    pub fn messages(&self) -> Vec<(Role, String)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                ViewEvent::Message { role, text } => Some((*role, text.clone())),
                _ => None,
            })
            .collect()
    }

    /// The most recently rendered option set, if any
    pub fn last_options(&self) -> Option<&Vec<String>> {
        self.events.iter().rev().find_map(|event| match event {
            ViewEvent::Options(options) => Some(options),
            _ => None,
        })
    }
}

impl ChatView for RecordingView {
    fn message(&mut self, role: Role, text: &str) {
        self.events.push(ViewEvent::Message {
            role,
            text: text.to_string(),
        });
    }

    fn options(&mut self, options: &[String]) {
        self.events.push(ViewEvent::Options(options.to_vec()));
    }

    fn thinking(&mut self, active: bool) {
        self.events.push(ViewEvent::Thinking(active));
    }

    fn clear(&mut self) {
        self.events.push(ViewEvent::Clear);
    }
}
