//! Session state: conversation identity and guided-flow tracking
//!
//! One tagged [`ConversationFocus`] value replaces the pair of loosely
//! synchronized "last touched" / "active" identifiers the widget UI
//! tracks: `Pending` is a conversation minted locally that the backend has
//! not yet confirmed, `Active` is one explicitly loaded from history or
//! confirmed by the backend. All transitions go through this module, and
//! every transition is mirrored into the key-value store.

use crate::error::Result;
use crate::guided_flow::GuidedStep;
use crate::storage::{keys, KvStore};
use crate::view::Role;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use ulid::Ulid;

/// Identifier of a conversation
///
/// Locally minted conversations carry a time-ordered ULID until the
/// backend assigns a numeric id; history entries are always numeric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationId {
    Local(String),
    Remote(i64),
}

impl ConversationId {
    /// Mint a fresh local identifier
    pub fn new_local() -> Self {
        Self::Local(Ulid::new().to_string())
    }

    /// Parse a persisted identifier
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<i64>() {
            Ok(id) => Self::Remote(id),
            Err(_) => Self::Local(raw.to_string()),
        }
    }

    /// Numeric form, present only for backend-assigned ids
    pub fn as_remote(&self) -> Option<i64> {
        match self {
            Self::Remote(id) => Some(*id),
            Self::Local(_) => None,
        }
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(id) => write!(f, "{}", id),
            Self::Remote(id) => write!(f, "{}", id),
        }
    }
}

/// Which conversation the session is pointed at
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConversationFocus {
    /// No conversation has been touched this session
    #[default]
    Idle,
    /// Touched (created locally or carried over from a previous session)
    /// but not confirmed active
    Pending(ConversationId),
    /// Explicitly loaded from history or confirmed by the backend
    Active(ConversationId),
}

impl ConversationFocus {
    /// The most recently touched identifier, regardless of confirmation
    pub fn last_touched(&self) -> Option<&ConversationId> {
        match self {
            Self::Idle => None,
            Self::Pending(id) | Self::Active(id) => Some(id),
        }
    }

    /// The confirmed conversation, if any
    pub fn active(&self) -> Option<&ConversationId> {
        match self {
            Self::Active(id) => Some(id),
            _ => None,
        }
    }
}

/// One message in the local conversation cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedMessage {
    pub role: Role,
    pub text: String,
}

/// Locally cached conversation record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalConversation {
    pub title: String,
    #[serde(default)]
    pub messages: Vec<CachedMessage>,
}

impl LocalConversation {
    fn untitled() -> Self {
        Self {
            title: "New Conversation".to_string(),
            messages: Vec::new(),
        }
    }
}

/// In-memory session state with write-through persistence
pub struct SessionState {
    store: KvStore,
    focus: ConversationFocus,
    greeting_rendered: bool,
    guided_step: GuidedStep,
    guided_active: bool,
    conversations: BTreeMap<String, LocalConversation>,
}

impl SessionState {
    /// Hydrate session state from the store
    ///
    /// The last-touched conversation id is restored as `Pending`; a
    /// conversation only becomes `Active` through an explicit load or a
    /// backend confirmation within the session, never at startup.
    pub fn load(store: KvStore) -> Result<Self> {
        let focus = match store.get(keys::CONVERSATION_ID)? {
            Some(raw) => ConversationFocus::Pending(ConversationId::parse(&raw)),
            None => ConversationFocus::Idle,
        };

        let conversations = store
            .get_json::<BTreeMap<String, LocalConversation>>(keys::CONVERSATIONS)?
            .unwrap_or_default();

        Ok(Self {
            store,
            focus,
            greeting_rendered: false,
            guided_step: GuidedStep::Root,
            guided_active: true,
            conversations,
        })
    }

    pub fn focus(&self) -> &ConversationFocus {
        &self.focus
    }

    /// Numeric id of the active conversation, for backend calls
    pub fn active_remote_id(&self) -> Option<i64> {
        self.focus.active().and_then(ConversationId::as_remote)
    }

    pub fn greeting_rendered(&self) -> bool {
        self.greeting_rendered
    }

    pub fn set_greeting_rendered(&mut self, rendered: bool) {
        self.greeting_rendered = rendered;
    }

    pub fn guided_step(&self) -> GuidedStep {
        self.guided_step
    }

    pub fn set_guided_step(&mut self, step: GuidedStep) {
        self.guided_step = step;
    }

    pub fn guided_active(&self) -> bool {
        self.guided_active
    }

    /// Deactivate the guided flow without resetting its step
    pub fn exit_guided_flow(&mut self) {
        self.guided_active = false;
    }

    /// Return the guided flow to the root step and reactivate it
    ///
    /// Also allows the greeting to render again on the next entry.
    pub fn reset_guided_flow(&mut self) {
        self.guided_step = GuidedStep::Root;
        self.guided_active = true;
        self.greeting_rendered = false;
    }

    /// Look up a cached conversation
    pub fn cached(&self, id: &ConversationId) -> Option<&LocalConversation> {
        self.conversations.get(&id.to_string())
    }

    /// Mint a local conversation with the given title
    ///
    /// The new conversation is registered in the cache and becomes the
    /// last-touched (`Pending`) conversation. It is not activated; that
    /// happens only once the backend confirms creation.
    pub fn create_conversation(&mut self, title: &str) -> Result<ConversationId> {
        let id = ConversationId::new_local();
        self.conversations.insert(
            id.to_string(),
            LocalConversation {
                title: title.to_string(),
                messages: Vec::new(),
            },
        );
        self.persist_cache()?;

        self.focus = ConversationFocus::Pending(id.clone());
        self.persist_focus()?;
        Ok(id)
    }

    /// Append a message to the active conversation's cached record
    ///
    /// A no-op when no conversation is active.
    pub fn append_message(&mut self, role: Role, text: &str) -> Result<()> {
        let Some(active) = self.focus.active() else {
            return Ok(());
        };

        let entry = self
            .conversations
            .entry(active.to_string())
            .or_insert_with(LocalConversation::untitled);
        entry.messages.push(CachedMessage {
            role,
            text: text.to_string(),
        });
        self.persist_cache()
    }

    /// Activate a conversation from the local cache
    ///
    /// Returns false, mutating nothing, when the id is not cached.
    pub fn load_cached(&mut self, id: &ConversationId) -> Result<bool> {
        if !self.conversations.contains_key(&id.to_string()) {
            return Ok(false);
        }

        self.focus = ConversationFocus::Active(id.clone());
        self.persist_focus()?;
        Ok(true)
    }

    /// Record a backend confirmation of the current conversation
    ///
    /// Activates the returned id only when nothing is active yet; an
    /// already-active conversation is authoritative.
    pub fn confirm_remote(&mut self, remote_id: i64) -> Result<()> {
        if self.focus.active().is_none() {
            self.focus = ConversationFocus::Active(ConversationId::Remote(remote_id));
            self.persist_focus()?;
        }
        Ok(())
    }

    /// Activate a conversation explicitly loaded from remote history
    pub fn open_remote(&mut self, remote_id: i64) -> Result<()> {
        self.focus = ConversationFocus::Active(ConversationId::Remote(remote_id));
        self.persist_focus()
    }

    /// Reset every field and drop the persisted conversation keys
    pub fn clear(&mut self) -> Result<()> {
        self.focus = ConversationFocus::Idle;
        self.greeting_rendered = false;
        self.guided_step = GuidedStep::Root;
        self.guided_active = true;
        self.conversations.clear();

        self.store.remove(keys::CONVERSATION_ID)?;
        self.store.remove(keys::ACTIVE_CONVERSATION_ID)?;
        self.store.remove(keys::CONVERSATIONS)?;
        Ok(())
    }

    fn persist_cache(&self) -> Result<()> {
        self.store.put_json(keys::CONVERSATIONS, &self.conversations)
    }

    fn persist_focus(&self) -> Result<()> {
        match &self.focus {
            ConversationFocus::Idle => {
                self.store.remove(keys::CONVERSATION_ID)?;
                self.store.remove(keys::ACTIVE_CONVERSATION_ID)?;
            }
            ConversationFocus::Pending(id) => {
                self.store.put(keys::CONVERSATION_ID, &id.to_string())?;
                self.store.remove(keys::ACTIVE_CONVERSATION_ID)?;
            }
            ConversationFocus::Active(id) => {
                self.store.put(keys::CONVERSATION_ID, &id.to_string())?;
                self.store
                    .put(keys::ACTIVE_CONVERSATION_ID, &id.to_string())?;
            }
        }
        Ok(())
    }
}
