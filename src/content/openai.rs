use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ContentError, LanguageModel, Prompt, LANGUAGE_MODEL};
use crate::config::LlmConfig;

/// Chat completions client for OpenAI-compatible endpoints
pub struct OpenAiClient {
    endpoint: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    client: Client,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self, ContentError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(unavailable)?;

        Ok(Self {
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn request_body<'a>(&'a self, prompt: &'a Prompt) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: self.temperature,
            max_tokens: prompt.max_tokens.unwrap_or(self.max_tokens),
        }
    }
}

fn unavailable(err: reqwest::Error) -> ContentError {
    ContentError::Unavailable {
        service: LANGUAGE_MODEL,
        detail: err.to_string(),
    }
}

fn first_choice_text(response: ChatResponse) -> Result<String, ContentError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| ContentError::Malformed {
            service: LANGUAGE_MODEL,
            detail: "completion has no message content".to_string(),
        })
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, prompt: &Prompt) -> Result<String, ContentError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| ContentError::Unavailable {
            service: LANGUAGE_MODEL,
            detail: "OPENAI_API_KEY is not set".to_string(),
        })?;

        debug!("Requesting completion from {} ({})", self.endpoint, self.model);
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(unavailable)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ContentError::Rejected {
                service: LANGUAGE_MODEL,
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = response.json().await.map_err(|e| ContentError::Malformed {
            service: LANGUAGE_MODEL,
            detail: e.to_string(),
        })?;
        first_choice_text(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use serde_json::json;

    fn client(api_key: Option<&str>) -> OpenAiClient {
        let mut config = AppConfig::for_tests().llm;
        config.api_key = api_key.map(str::to_string);
        config.base_url = "http://127.0.0.1:9/v1/".to_string();
        OpenAiClient::new(&config).unwrap()
    }

    #[test]
    fn request_uses_prompt_budget_over_default() {
        let client = client(Some("key"));
        let prompt = Prompt {
            system: "sys".into(),
            user: "usr".into(),
            max_tokens: Some(42),
        };

        let body = serde_json::to_value(client.request_body(&prompt)).unwrap();
        assert_eq!(body["max_tokens"], 42);
        assert_eq!(body["messages"][0], json!({"role": "system", "content": "sys"}));
        assert_eq!(body["messages"][1], json!({"role": "user", "content": "usr"}));
        assert_eq!(client.endpoint, "http://127.0.0.1:9/v1/chat/completions");
    }

    #[test]
    fn reads_first_choice() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [
                {"message": {"role": "assistant", "content": "rust, tokio"}},
                {"message": {"role": "assistant", "content": "ignored"}}
            ]
        }))
        .unwrap();
        assert_eq!(first_choice_text(response).unwrap(), "rust, tokio");

        let empty: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(matches!(first_choice_text(empty), Err(ContentError::Malformed { .. })));
    }

    #[tokio::test]
    async fn missing_key_is_unavailable() {
        let prompt = Prompt {
            system: String::new(),
            user: String::new(),
            max_tokens: None,
        };
        let err = client(None).complete(&prompt).await.unwrap_err();
        assert!(matches!(err, ContentError::Unavailable { .. }));
    }
}
