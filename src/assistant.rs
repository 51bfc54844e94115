//! Assembles the agent session from settings.

use crate::agent::{AgentSession, ToolRegistry};
use crate::config::{Prompts, Settings};
use crate::error::Result;
use crate::knowledge::setup_knowledge_base_tool;
use crate::llm::{ChatModel, OpenAIChatModel};
use crate::tools::WeatherClient;
use std::sync::Arc;
use tracing::{info, warn};

/// Build the agent with all three tools.
///
/// Fails only when the chat model cannot be created. A missing weather key or
/// knowledge document degrades the corresponding tool instead.
pub async fn create_agent(settings: &Settings) -> Result<AgentSession> {
    let model: Arc<dyn ChatModel> = Arc::new(OpenAIChatModel::from_settings(&settings.model)?);
    create_agent_with_model(settings, model).await
}

/// Build the agent around an existing chat model.
pub async fn create_agent_with_model(
    settings: &Settings,
    model: Arc<dyn ChatModel>,
) -> Result<AgentSession> {
    let weather = WeatherClient::new(&settings.weather)?;
    if !weather.has_api_key() {
        warn!("OPENWEATHER_API_KEY not set; the weather tool will report the missing key");
    }

    let prompts = Prompts::from_settings(&settings.prompts);

    let knowledge = setup_knowledge_base_tool(
        settings.document_path(),
        settings,
        model.clone(),
        prompts.clone(),
    )
    .await;
    info!("Knowledge base tool: {:?}", knowledge);

    Ok(AgentSession::new(model, ToolRegistry::new(weather, knowledge))
        .with_system_prompt(prompts.agent_system())
        .with_max_iterations(settings.model.max_iterations)
        .with_parsing_error_handling(settings.model.handle_parsing_errors))
}
