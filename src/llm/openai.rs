//! OpenAI-compatible chat completion client.

use super::{ChatMessage, ChatModel, ModelReply, RequestedToolCall};
use crate::config::ModelSettings;
use crate::error::{Result, ToolchatError};
use crate::openai::create_client_with_timeout;
use crate::tools::ToolSpec;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    ChatCompletionTool, ChatCompletionToolType, CreateChatCompletionRequestArgs, FunctionCall,
    FunctionObject,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Chat model reached through an OpenAI-compatible endpoint (DeepSeek by default).
pub struct OpenAIChatModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAIChatModel {
    /// Create a chat model from settings.
    ///
    /// Fails when no model API key is configured.
    pub fn from_settings(settings: &ModelSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ToolchatError::Config("DEEPSEEK_API_KEY not set".to_string()))?;

        Ok(Self {
            client: create_client_with_timeout(
                &settings.api_base,
                api_key,
                Duration::from_secs(settings.timeout_secs),
            )?,
            model: settings.model.clone(),
            temperature: settings.temperature,
        })
    }

    /// Model name.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    #[instrument(skip(self, messages, tools), fields(model = %self.model, messages = messages.len()))]
    async fn complete(&self, messages: &[ChatMessage], tools: &[ToolSpec]) -> Result<ModelReply> {
        let request_messages = messages
            .iter()
            .map(to_request_message)
            .collect::<Result<Vec<_>>>()?;

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model)
            .messages(request_messages)
            .temperature(self.temperature);
        if !tools.is_empty() {
            args.tools(tools.iter().map(tool_definition).collect::<Vec<_>>());
        }

        let request = args.build().map_err(|e| ToolchatError::Agent(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| ToolchatError::OpenAI(format!("Chat API error: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ToolchatError::Agent("No response from model".to_string()))?;

        let content = choice.message.content;
        let calls: Vec<RequestedToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| RequestedToolCall {
                id: call.id,
                name: call.function.name,
                arguments: call.function.arguments,
            })
            .collect();

        debug!("Model replied with {} tool call(s)", calls.len());

        if calls.is_empty() {
            Ok(ModelReply::Final(content.unwrap_or_default()))
        } else {
            Ok(ModelReply::ToolCalls { content, calls })
        }
    }
}

/// Convert a tool spec into an OpenAI function definition.
pub fn tool_definition(spec: &ToolSpec) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: spec.name.to_string(),
            description: Some(spec.description.clone()),
            parameters: Some(spec.parameters_schema()),
            strict: None,
        },
    }
}

fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
    let built: ChatCompletionRequestMessage = match message {
        ChatMessage::System(content) => ChatCompletionRequestSystemMessageArgs::default()
            .content(content.clone())
            .build()
            .map_err(|e| ToolchatError::Agent(e.to_string()))?
            .into(),
        ChatMessage::User(content) => ChatCompletionRequestUserMessageArgs::default()
            .content(content.clone())
            .build()
            .map_err(|e| ToolchatError::Agent(e.to_string()))?
            .into(),
        ChatMessage::Assistant { content, tool_calls } => {
            let mut args = ChatCompletionRequestAssistantMessageArgs::default();
            if let Some(content) = content {
                args.content(content.clone());
            }
            if !tool_calls.is_empty() {
                args.tool_calls(
                    tool_calls
                        .iter()
                        .map(|call| ChatCompletionMessageToolCall {
                            id: call.id.clone(),
                            r#type: ChatCompletionToolType::Function,
                            function: FunctionCall {
                                name: call.name.clone(),
                                arguments: call.arguments.clone(),
                            },
                        })
                        .collect::<Vec<_>>(),
                );
            }
            args.build()
                .map_err(|e| ToolchatError::Agent(e.to_string()))?
                .into()
        }
        ChatMessage::Tool { call_id, content } => ChatCompletionRequestToolMessageArgs::default()
            .tool_call_id(call_id.clone())
            .content(content.clone())
            .build()
            .map_err(|e| ToolchatError::Agent(e.to_string()))?
            .into(),
    };
    Ok(built)
}
