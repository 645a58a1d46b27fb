//! Text completion against external LLM APIs (OpenAI-compatible, Anthropic).
//!
//! The portal only needs prompt-in/text-out, so both providers are wrapped
//! behind one trait and the response is collected, not streamed.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use coopnet_core::{Error, Result};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-5-haiku-20241022";

/// LLM provider identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Anthropic,
}

impl Provider {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "openai" => Some(Provider::OpenAI),
            "anthropic" => Some(Provider::Anthropic),
            _ => None,
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAI => DEFAULT_OPENAI_MODEL,
            Provider::Anthropic => DEFAULT_ANTHROPIC_MODEL,
        }
    }
}

/// Provider selection from the environment.
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub provider: Provider,
    pub model: String,
    pub api_key: String,
}

impl CompletionConfig {
    pub fn from_env() -> Result<Self> {
        let provider_name =
            std::env::var("COOPNET_LLM_PROVIDER").unwrap_or_else(|_| "openai".into());
        let provider = Provider::parse(&provider_name)
            .ok_or_else(|| Error::Config(format!("unknown LLM provider: {provider_name}")))?;

        let key_var = match provider {
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        };
        let api_key = std::env::var(key_var)
            .map_err(|_| Error::Config(format!("missing env var {key_var}")))?;

        let model = std::env::var("COOPNET_LLM_MODEL")
            .unwrap_or_else(|_| provider.default_model().into());

        Ok(Self {
            provider,
            model,
            api_key,
        })
    }
}

/// Opaque prompt-in/text-out capability.
#[async_trait]
pub trait TextCompletion: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String>;
}

pub struct LlmClient {
    client: Client,
    config: CompletionConfig,
}

impl LlmClient {
    pub fn new(config: CompletionConfig, timeout: std::time::Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, config })
    }

    async fn complete_openai(&self, system: &str, user: &str) -> Result<String> {
        let body = json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        });

        debug!("completion request to openai model {}", self.config.model);
        let response = self
            .client
            .post("https://api.openai.com/v1/chat/completions")
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()
            .await?;
        let parsed: serde_json::Value = check_status(response).await?.json().await?;

        parsed["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::Completion("response carried no message content".into()))
    }

    async fn complete_anthropic(&self, system: &str, user: &str) -> Result<String> {
        let body = json!({
            "model": self.config.model,
            "max_tokens": 1024,
            "system": system,
            "messages": [{"role": "user", "content": user}],
        });

        debug!("completion request to anthropic model {}", self.config.model);
        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await?;
        let parsed: serde_json::Value = check_status(response).await?.json().await?;

        parsed["content"][0]["text"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| Error::Completion("response carried no text block".into()))
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(Error::RemoteStatus {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl TextCompletion for LlmClient {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        match self.config.provider {
            Provider::OpenAI => self.complete_openai(system, user).await,
            Provider::Anthropic => self.complete_anthropic(system, user).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse() {
        assert_eq!(Provider::parse("openai"), Some(Provider::OpenAI));
        assert_eq!(Provider::parse("anthropic"), Some(Provider::Anthropic));
        assert_eq!(Provider::parse("groq"), None);
    }

    #[test]
    fn test_openai_response_shape() {
        let parsed: serde_json::Value = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "hola"}}]}"#,
        )
        .unwrap();
        assert_eq!(
            parsed["choices"][0]["message"]["content"].as_str(),
            Some("hola")
        );
    }

    #[test]
    fn test_anthropic_response_shape() {
        let parsed: serde_json::Value =
            serde_json::from_str(r#"{"content": [{"type": "text", "text": "hola"}]}"#).unwrap();
        assert_eq!(parsed["content"][0]["text"].as_str(), Some("hola"));
    }
}
