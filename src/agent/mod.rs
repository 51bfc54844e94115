//! Agent session with a tool-calling loop.
//!
//! The session keeps the conversation history, offers the registered tools
//! to the chat model, runs whatever tools it asks for, and returns the final
//! answer for each user turn.

mod memory;
mod runner;
mod tools;

pub use memory::{ConversationMemory, Speaker, Turn};
pub use runner::{AgentOutput, AgentSession, ToolCallRecord};
pub use tools::{
    calculator_spec, parse_tool_call, weather_spec, ToolCall, ToolRegistry, CALCULATOR_TOOL_NAME,
    WEATHER_TOOL_NAME,
};
