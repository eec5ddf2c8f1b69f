//! Conversation transcript types

use serde::{Deserialize, Serialize};

/// Speaker attribution for a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One finalized message in the conversation.
///
/// Turns are immutable once created; the constructors stamp the creation
/// time in unix milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub timestamp: i64,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content.into())
    }

    fn new(role: Role, content: String) -> Self {
        Self {
            role,
            content,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Ordered history of turns for the current session.
///
/// Insertion order is the conversation order and the only ordering
/// guarantee. Only finalized turns enter the transcript; partial speech
/// text never does.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
