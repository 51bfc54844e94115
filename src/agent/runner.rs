//! Agent session with a tool calling loop.

use super::memory::ConversationMemory;
use super::tools::ToolRegistry;
use crate::config::Prompts;
use crate::error::{Result, ToolchatError};
use crate::llm::{ChatMessage, ChatModel, ModelReply, RequestedToolCall};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const DEFAULT_MAX_ITERATIONS: usize = 10;

/// A conversational agent that can call tools between user turns.
pub struct AgentSession {
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    memory: ConversationMemory,
    system_prompt: String,
    max_iterations: usize,
    handle_parsing_errors: bool,
}

impl AgentSession {
    /// Create a new session over the given model and tools.
    pub fn new(model: Arc<dyn ChatModel>, tools: ToolRegistry) -> Self {
        Self {
            model,
            tools,
            memory: ConversationMemory::new(),
            system_prompt: Prompts::default().agent_system(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            handle_parsing_errors: true,
        }
    }

    /// Set a custom system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Set maximum model calls per turn.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    /// Feed malformed tool calls back to the model instead of failing the turn.
    pub fn with_parsing_error_handling(mut self, enabled: bool) -> Self {
        self.handle_parsing_errors = enabled;
        self
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run one user turn to completion.
    ///
    /// Memory is only updated when the turn produces a final answer.
    #[instrument(skip(self), fields(history = self.memory.len()))]
    pub async fn invoke(&mut self, input: &str) -> Result<AgentOutput> {
        let mut messages = Vec::with_capacity(self.memory.len() + 2);
        messages.push(ChatMessage::System(self.system_prompt.clone()));
        messages.extend(self.memory.to_messages());
        messages.push(ChatMessage::User(input.to_string()));

        let specs = self.tools.specs();
        let mut tool_calls_made = Vec::new();
        let mut iterations = 0;

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(ToolchatError::Agent(format!(
                    "Agent exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Agent iteration {}", iterations);

            match self.model.complete(&messages, &specs).await? {
                ModelReply::Final(output) => {
                    self.memory.record_exchange(input, &output);
                    return Ok(AgentOutput {
                        output,
                        tool_calls: tool_calls_made,
                        iterations,
                    });
                }
                ModelReply::ToolCalls { content, calls } => {
                    messages.push(ChatMessage::Assistant {
                        content,
                        tool_calls: calls.clone(),
                    });

                    for call in &calls {
                        let record = self.execute_tool_call(call).await?;
                        messages.push(ChatMessage::Tool {
                            call_id: call.id.clone(),
                            content: record.result.clone(),
                        });
                        tool_calls_made.push(record);
                    }
                }
            }
        }
    }

    /// Execute a single tool call and return a record of it.
    async fn execute_tool_call(&self, call: &RequestedToolCall) -> Result<ToolCallRecord> {
        info!("Agent calling tool: {} with args: {}", call.name, call.arguments);

        let (result, ok) = match self.tools.run(&call.name, &call.arguments).await {
            Ok(output) => (output, true),
            Err(e) if e.is_parse_error() => {
                if !self.handle_parsing_errors {
                    return Err(ToolchatError::Agent(format!(
                        "Failed to parse tool call {}: {}",
                        call.name, e
                    )));
                }
                warn!("Malformed tool call {}: {}", call.name, e);
                (format!("Failed to parse tool call: {}", e), false)
            }
            Err(e) => (e.to_string(), false),
        };

        Ok(ToolCallRecord {
            name: call.name.clone(),
            arguments: call.arguments.clone(),
            result,
            ok,
        })
    }
}

/// Result of one agent turn.
#[derive(Debug)]
pub struct AgentOutput {
    /// The final answer.
    pub output: String,
    /// Record of all tool calls made during the turn.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of model calls used.
    pub iterations: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Text observation returned to the model.
    pub result: String,
    /// Whether the tool succeeded.
    pub ok: bool,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}
