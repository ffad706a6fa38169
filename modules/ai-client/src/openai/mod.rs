mod client;
pub(crate) mod types;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{AiError, AiResult};
use crate::tool::ToolDefinition;
use crate::traits::{ChatModel, Message};

use client::OpenAiClient;
use types::{supports_temperature, ChatRequest, ToolDefinitionWire, WireMessage};

// =============================================================================
// OpenAi Chat Model
// =============================================================================

#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    model: String,
    temperature: Option<f32>,
    base_url: Option<String>,
    http: reqwest::Client,
}

impl std::fmt::Debug for OpenAi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAi")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            temperature: None,
            base_url: None,
            http: reqwest::Client::new(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    fn client(&self) -> OpenAiClient {
        let client = OpenAiClient::new(&self.api_key, self.http.clone());
        if let Some(ref url) = self.base_url {
            client.with_base_url(url)
        } else {
            client
        }
    }

    fn build_request(&self, messages: &[Message], tools: &[ToolDefinition]) -> ChatRequest {
        let mut request =
            ChatRequest::new(&self.model).messages(messages.iter().map(WireMessage::from));

        if let Some(temp) = self.temperature {
            if supports_temperature(&self.model) {
                request = request.temperature(temp);
            }
        }

        for def in tools {
            request = request.tool(ToolDefinitionWire::from(def));
        }

        request
    }
}

// =============================================================================
// ChatModel Implementation
// =============================================================================

#[async_trait]
impl ChatModel for OpenAi {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, messages: &[Message], tools: &[ToolDefinition]) -> AiResult<Message> {
        let request = self.build_request(messages, tools);
        let response = self.client().chat(&request).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or(AiError::EmptyResponse)?;

        debug!(
            finish_reason = choice.finish_reason.as_deref().unwrap_or("unknown"),
            "OpenAI chat response"
        );

        Ok(choice.message.into_message())
    }
}
