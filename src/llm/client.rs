//! Client for the local OpenAI-compatible chat completion server

use crate::config::ModelSettings;
use crate::error::{JobAppError, Result};
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Something that turns a prompt into generated text.
pub trait Completer {
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String>> + Send;

    /// Complete with a system instruction; implementations must not drop it.
    fn complete_with_system(
        &self,
        system: &str,
        prompt: &str,
    ) -> impl Future<Output = Result<String>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Fold every system message into the leading user message.
///
/// Local servers such as LM Studio reject anything but `user` and
/// `assistant` roles. System text is prepended to the first user message in
/// its original order; if there is no user message one is created.
pub fn merge_system_messages(messages: Vec<ChatMessage>) -> Vec<ChatMessage> {
    let (system, mut rest): (Vec<_>, Vec<_>) = messages
        .into_iter()
        .partition(|m| m.role == Role::System);

    let system_text = system
        .into_iter()
        .map(|m| m.content)
        .filter(|c| !c.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    if system_text.is_empty() {
        return rest;
    }

    match rest.iter_mut().find(|m| m.role == Role::User) {
        Some(user) => {
            user.content = format!("{}\n\n{}", system_text, user.content);
        }
        None => rest.insert(0, ChatMessage::new(Role::User, system_text)),
    }
    rest
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

pub struct CompletionClient {
    client: Client,
    settings: ModelSettings,
}

impl CompletionClient {
    pub fn new(settings: ModelSettings) -> Result<Self> {
        let timeout = Duration::from_secs(settings.timeout_secs.max(1));
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| JobAppError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.settings.base_url.trim_end_matches('/'), path)
    }

    fn request_error(&self, err: reqwest::Error) -> JobAppError {
        if err.is_connect() || err.is_timeout() {
            JobAppError::Connection(format!(
                "Could not reach the model server at {}: {}. \
                 Ensure LM Studio is running and the API server is enabled.",
                self.settings.base_url, err
            ))
        } else if err.is_builder() {
            JobAppError::Configuration(format!(
                "Invalid model server URL '{}': {}",
                self.settings.base_url, err
            ))
        } else {
            JobAppError::from(err)
        }
    }

    /// Send one chat request and return the trimmed completion text.
    pub async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String> {
        let messages = merge_system_messages(messages);
        let url = self.endpoint("chat/completions");
        let body = ChatRequest {
            model: &self.settings.model,
            messages: &messages,
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        debug!("POST {} (model: {}, {} messages)", url, self.settings.model, messages.len());
        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.request_error(e))?;
        if !status.is_success() {
            return Err(JobAppError::Api(format!("{} returned {}: {}", url, status, text.trim())));
        }

        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| JobAppError::Api(format!("Malformed completion response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(JobAppError::Api("Model returned an empty completion".to_string()));
        }
        Ok(content)
    }

    /// Model identifiers the server currently offers.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = self.endpoint("models");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(JobAppError::Api(format!("{} returned {}", url, status)));
        }

        let text = response.text().await.map_err(|e| self.request_error(e))?;
        let models: ModelList = serde_json::from_str(&text)
            .map_err(|e| JobAppError::Api(format!("Malformed model list: {}", e)))?;

        let mut ids: Vec<String> = models.data.into_iter().map(|m| m.id).collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

impl Completer for CompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.chat(vec![ChatMessage::new(Role::User, prompt)]).await
    }

    async fn complete_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        self.chat(vec![
            ChatMessage::new(Role::System, system),
            ChatMessage::new(Role::User, prompt),
        ])
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prepends_system_to_user() {
        let merged = merge_system_messages(vec![
            ChatMessage::new(Role::System, "You parse resumes."),
            ChatMessage::new(Role::User, "Parse this."),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].role, Role::User);
        assert_eq!(merged[0].content, "You parse resumes.\n\nParse this.");
    }

    #[test]
    fn test_merge_keeps_order_and_assistant_turns() {
        let merged = merge_system_messages(vec![
            ChatMessage::new(Role::User, "Hi"),
            ChatMessage::new(Role::System, "first"),
            ChatMessage::new(Role::Assistant, "Hello"),
            ChatMessage::new(Role::System, "second"),
        ]);

        assert_eq!(
            merged,
            vec![
                ChatMessage::new(Role::User, "first\n\nsecond\n\nHi"),
                ChatMessage::new(Role::Assistant, "Hello"),
            ]
        );
    }

    #[test]
    fn test_merge_without_user_creates_one() {
        let merged = merge_system_messages(vec![ChatMessage::new(Role::System, "only system")]);
        assert_eq!(merged, vec![ChatMessage::new(Role::User, "only system")]);
    }

    #[test]
    fn test_merge_is_identity_without_system() {
        let messages = vec![
            ChatMessage::new(Role::User, "a"),
            ChatMessage::new(Role::Assistant, "b"),
        ];
        assert_eq!(merge_system_messages(messages.clone()), messages);
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&ChatMessage::new(Role::Assistant, "x")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"x"}"#);
    }

    #[test]
    fn test_endpoint_handles_trailing_slash() {
        let client = CompletionClient::new(ModelSettings {
            base_url: "http://localhost:1234/v1/".to_string(),
            ..ModelSettings::default()
        })
        .unwrap();
        assert_eq!(client.endpoint("models"), "http://localhost:1234/v1/models");
    }
}
