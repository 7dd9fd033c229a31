use crate::domain::ports::{ChatBackend, ChatMessage};
use crate::utils::error::{Result, TriageError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SERVICE: &str = "chat backend";

/// Where chat completions are sent. Exactly one endpoint is used per client.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEndpoint {
    /// Self-hosted OpenAI-compatible server (e.g. Ollama); no authentication.
    Local { base_url: String, model: String },
    /// Hosted API authenticated with a bearer token.
    Hosted {
        url: String,
        model: String,
        api_key: String,
    },
}

impl ChatEndpoint {
    pub fn url(&self) -> String {
        match self {
            ChatEndpoint::Local { base_url, .. } => {
                format!("{}/v1/chat/completions", base_url.trim_end_matches('/'))
            }
            ChatEndpoint::Hosted { url, .. } => url.clone(),
        }
    }

    pub fn model(&self) -> &str {
        match self {
            ChatEndpoint::Local { model, .. } | ChatEndpoint::Hosted { model, .. } => model.as_str(),
        }
    }

    fn api_key(&self) -> Option<&str> {
        match self {
            ChatEndpoint::Local { .. } => None,
            ChatEndpoint::Hosted { api_key, .. } => Some(api_key.as_str()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

pub struct OpenAiChatClient {
    client: Client,
    endpoint: ChatEndpoint,
    temperature: f32,
}

impl OpenAiChatClient {
    pub fn new(endpoint: ChatEndpoint, temperature: f32, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        match &endpoint {
            ChatEndpoint::Local { .. } => tracing::debug!(
                "Using local chat backend at {} with model {}",
                endpoint.url(),
                endpoint.model()
            ),
            ChatEndpoint::Hosted { .. } => {
                tracing::debug!("Using hosted chat backend with model {}", endpoint.model())
            }
        }

        Ok(Self {
            client,
            endpoint,
            temperature,
        })
    }

    pub fn endpoint(&self) -> &ChatEndpoint {
        &self.endpoint
    }
}

#[async_trait]
impl ChatBackend for OpenAiChatClient {
    async fn complete(&self, messages: Vec<ChatMessage>, max_tokens: u32) -> Result<String> {
        let body = ChatCompletionRequest {
            model: self.endpoint.model(),
            messages: &messages,
            temperature: self.temperature,
            max_tokens,
        };

        let mut request = self.client.post(self.endpoint.url()).json(&body);
        if let Some(api_key) = self.endpoint.api_key() {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::debug!("Chat backend error body: {}", detail);
            return Err(TriageError::UpstreamStatus {
                service: SERVICE.to_string(),
                status: status.as_u16(),
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .ok_or_else(|| TriageError::MalformedResponse {
                service: SERVICE.to_string(),
                message: "no completion content in response".to_string(),
            })
    }
}
