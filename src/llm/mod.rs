//! Chat model abstraction.
//!
//! The agent loop and the knowledge base answer chain both talk to the model
//! through [`ChatModel`], which keeps them independent of the wire client.

mod openai;

pub use openai::OpenAIChatModel;

use crate::error::Result;
use crate::tools::ToolSpec;
use async_trait::async_trait;

/// A message in a chat completion request.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatMessage {
    System(String),
    User(String),
    Assistant {
        content: Option<String>,
        tool_calls: Vec<RequestedToolCall>,
    },
    Tool {
        call_id: String,
        content: String,
    },
}

impl ChatMessage {
    /// Plain assistant text with no tool calls.
    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage::Assistant {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestedToolCall {
    pub id: String,
    pub name: String,
    /// Raw JSON arguments as produced by the model.
    pub arguments: String,
}

/// What the model decided to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    /// A final natural-language answer.
    Final(String),
    /// One or more tool calls, optionally with accompanying text.
    ToolCalls {
        content: Option<String>,
        calls: Vec<RequestedToolCall>,
    },
}

/// A chat completion endpoint.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Complete a conversation, optionally offering tools.
    async fn complete(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ModelReply>;
}
