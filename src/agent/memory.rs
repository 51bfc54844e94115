//! Conversation memory.

use crate::llm::ChatMessage;
use chrono::{DateTime, Utc};

/// Who said a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

/// One utterance in the conversation.
#[derive(Debug, Clone)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// Append-only record of completed exchanges.
///
/// Only user inputs and final answers are kept; intermediate tool traffic
/// stays inside the turn that produced it.
#[derive(Debug, Clone, Default)]
pub struct ConversationMemory {
    turns: Vec<Turn>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed exchange.
    pub fn record_exchange(&mut self, input: &str, output: &str) {
        let at = Utc::now();
        self.turns.push(Turn {
            speaker: Speaker::User,
            text: input.to_string(),
            at,
        });
        self.turns.push(Turn {
            speaker: Speaker::Assistant,
            text: output.to_string(),
            at,
        });
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

    /// History as chat messages, oldest first.
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        self.turns
            .iter()
            .map(|turn| match turn.speaker {
                Speaker::User => ChatMessage::User(turn.text.clone()),
                Speaker::Assistant => ChatMessage::assistant(turn.text.clone()),
            })
            .collect()
    }
}
