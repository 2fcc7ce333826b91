use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::lookup::{Completion, CompletionRequest, LookupError};

pub const DEFAULT_LLM_URL: &str = "https://api.groq.com/openai/v1";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible chat completion client (Groq by default).
pub struct ChatCompletionClient {
    base_url: String,
    api_key: String,
    model: String,
    #[cfg(feature = "network")]
    client: Option<reqwest::blocking::Client>,
}

impl ChatCompletionClient {
    pub fn new(base_url: &str, api_key: &str, model: &str, timeout: Duration) -> Self {
        #[cfg(not(feature = "network"))]
        let _ = timeout;
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            #[cfg(feature = "network")]
            client: reqwest::blocking::Client::builder()
                .timeout(timeout)
                .build()
                .ok(),
        }
    }

    /// Reads the API key from `key_env`; `None` leaves the collaborator unconfigured.
    pub fn from_env(base_url: &str, key_env: &str, model: &str, timeout: Duration) -> Option<Self> {
        let key = std::env::var(key_env).ok().filter(|k| !k.trim().is_empty())?;
        Some(Self::new(base_url, key.trim(), model, timeout))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn body<'a>(&'a self, request: &'a CompletionRequest) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = request.system.as_deref() {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });
        ChatRequest {
            model: &self.model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

fn first_choice_text(body: &str) -> Result<String, LookupError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| LookupError::Malformed(e.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| LookupError::Malformed("empty completion".to_string()))
}

#[cfg(feature = "network")]
impl Completion for ChatCompletionClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String, LookupError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| LookupError::Unavailable("http client not initialized".to_string()))?;
        let url = format!("{}/chat/completions", self.base_url);

        let response = client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.body(request))
            .send()
            .map_err(|e| LookupError::Unavailable(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Unavailable(format!("status {status}")));
        }
        let text = response
            .text()
            .map_err(|e| LookupError::Unavailable(e.to_string()))?;
        first_choice_text(&text)
    }
}

#[cfg(not(feature = "network"))]
impl Completion for ChatCompletionClient {
    fn complete(&self, request: &CompletionRequest) -> Result<String, LookupError> {
        let _ = (&self.api_key, self.body(request));
        Err(LookupError::Unavailable(format!(
            "built without network support ({})",
            self.base_url
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CompletionRequest {
        CompletionRequest {
            system: Some("be brief".to_string()),
            prompt: "Define \"terse\"".to_string(),
            max_tokens: 80,
            temperature: 0.3,
        }
    }

    #[test]
    fn test_request_body_has_system_then_user() {
        let client = ChatCompletionClient::new(DEFAULT_LLM_URL, "k", "llama", Duration::from_secs(1));
        let req = request();
        let json = serde_json::to_value(client.body(&req)).unwrap();
        assert_eq!(json["model"], "llama");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["max_tokens"], 80);
    }

    #[test]
    fn test_first_choice_is_trimmed() {
        let body = r#"{"choices":[{"message":{"content":"  Adjective (terss) Brief.  "}}]}"#;
        assert_eq!(first_choice_text(body).unwrap(), "Adjective (terss) Brief.");
    }

    #[test]
    fn test_empty_choices_are_malformed() {
        assert!(matches!(
            first_choice_text(r#"{"choices":[]}"#),
            Err(LookupError::Malformed(_))
        ));
    }

    #[test]
    fn test_missing_env_key_leaves_client_unconfigured() {
        let client = ChatCompletionClient::from_env(
            DEFAULT_LLM_URL,
            "LEXDR_TEST_KEY_THAT_IS_NEVER_SET",
            "llama",
            Duration::from_secs(1),
        );
        assert!(client.is_none());
    }
}
