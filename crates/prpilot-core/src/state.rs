//! UI-agnostic session state
//!
//! Everything a front-end needs to draw a session lives here; the
//! orchestrator is the only thing that mutates it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::kind::TargetSystemKind;
use crate::model::GenerationResult;

pub const GREETING: &str = "Hi there! I'm your PR generation assistant. I can help you create PRs for Kafka topics, Kong routes, or Gatekeeper routes. What would you like to create today?";

/// A message in the conversation log. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: Uuid,
    pub role: ChatRole,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl ConversationMessage {
    pub fn new(role: ChatRole, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reachability {
    #[default]
    Unknown,
    Reachable,
    Unreachable,
}

impl From<bool> for Reachability {
    fn from(reachable: bool) -> Self {
        if reachable {
            Reachability::Reachable
        } else {
            Reachability::Unreachable
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionState {
    messages: Vec<ConversationMessage>,
    pub active_kind: TargetSystemKind,
    pub last_result: Option<GenerationResult>,
    pub backend_reachable: Reachability,
    pub generating: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            messages: vec![ConversationMessage::new(ChatRole::Assistant, GREETING)],
            active_kind: TargetSystemKind::MessageTopic,
            last_result: None,
            backend_reachable: Reachability::Unknown,
            generating: false,
        }
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }

    pub(crate) fn push(&mut self, role: ChatRole, text: impl Into<String>) {
        self.messages.push(ConversationMessage::new(role, text));
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}
