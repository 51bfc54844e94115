//! Toolchat - a terminal assistant with tools
//!
//! Wires an OpenAI-compatible chat model to three tools and a conversational
//! agent loop.
//!
//! # Overview
//!
//! Toolchat allows you to:
//! - Do exact arithmetic through a calculator tool
//! - Look up the current weather for a city
//! - Ask questions about a reference document (PDF, text or Markdown)
//! - Hold a multi-turn conversation that remembers earlier answers
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Settings and prompt templates
//! - `tools` - Calculator and weather tools, tool schemas
//! - `knowledge` - Knowledge base tool: document loading and splitting
//! - `embedding` - Embedding generation
//! - `vector_store` - In-memory vector index
//! - `rag` - Retrieval and answer chain
//! - `llm` - Chat model abstraction
//! - `agent` - Tool-calling agent session and memory
//! - `assistant` - Builds the agent from settings
//! - `cli` - Command line interface and REPL
//!
//! # Example
//!
//! ```rust,no_run
//! use toolchat::assistant::create_agent;
//! use toolchat::config::Settings;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?.with_env_keys();
//!     let mut agent = create_agent(&settings).await?;
//!
//!     let reply = agent.invoke("What is 2 to the power of 10?").await?;
//!     println!("{}", reply.output);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod assistant;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod knowledge;
pub mod llm;
pub mod openai;
pub mod rag;
pub mod tools;
pub mod vector_store;

pub use error::{Result, ToolError, ToolchatError};
