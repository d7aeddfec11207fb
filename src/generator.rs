use crate::config::Config;
use crate::error::{Result, ShellError};
use crate::executor::shell_quote;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

/// Turns a natural-language request into one candidate shell command.
///
/// Implementations never retry and never cache; a failure is handed back to
/// the caller as-is.
#[async_trait]
pub trait CommandGenerator: Send + Sync {
    async fn generate(&self, prompt_text: &str) -> Result<String>;
}

/// Builds the generator selected by the configuration.
pub fn from_config(config: &Config) -> Box<dyn CommandGenerator> {
    if config.is_mock_mode() {
        info!("Using mock generator (AI_SHELL_USE_MOCK)");
        return Box::new(MockGenerator::new());
    }
    let http = ReqwestHttpClient::new(Duration::from_secs(config.request_timeout_secs));
    Box::new(AnthropicGenerator::new(config, Box::new(http)))
}

pub struct AnthropicGenerator {
    http: Box<dyn HttpClient>,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    url: String,
}

impl AnthropicGenerator {
    pub fn new(config: &Config, http: Box<dyn HttpClient>) -> Self {
        Self {
            http,
            api_key: config.get_api_key().cloned(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            url: MESSAGES_URL.to_string(),
        }
    }

    fn build_prompt(prompt_text: &str) -> String {
        format!(
            "Provide a precise bash command to: {}. Only return the exact command, no explanation. \
             Ensure it works for Mac/Linux, keep it simple.",
            prompt_text
        )
    }

    fn parse_response(body: &str) -> Result<String> {
        let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
            ShellError::Generation(format!("Response was not valid JSON ({}): {}", e, body))
        })?;

        let text = value
            .get("content")
            .and_then(|c| c.as_array())
            .and_then(|blocks| {
                blocks
                    .iter()
                    .find(|b| b.get("type").and_then(|t| t.as_str()).unwrap_or("text") == "text")
            })
            .and_then(|block| block.get("text"))
            .and_then(|text| text.as_str())
            .ok_or_else(|| {
                ShellError::Generation(format!("Response contained no text content: {}", body))
            })?;

        let command = clean_command(text);
        if command.is_empty() {
            return Err(ShellError::Generation("The model returned an empty command".to_string()));
        }
        Ok(command)
    }

    fn api_error_message(body: &str) -> String {
        serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| body.trim().to_string())
    }
}

#[async_trait]
impl CommandGenerator for AnthropicGenerator {
    async fn generate(&self, prompt_text: &str) -> Result<String> {
        let prompt_text = prompt_text.trim();
        if prompt_text.is_empty() {
            return Err(ShellError::InvalidInput("The prompt is empty".to_string()));
        }

        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ShellError::Configuration(
                "ANTHROPIC_API_KEY not found. \
                 Please set it with: export ANTHROPIC_API_KEY='your_api_key'"
                    .to_string(),
            )
        })?;

        info!("Generating command for prompt: {}", prompt_text);

        let request_body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [
                {
                    "role": "user",
                    "content": Self::build_prompt(prompt_text)
                }
            ]
        });

        let headers = [
            ("x-api-key", api_key),
            ("content-type", "application/json"),
            ("anthropic-version", API_VERSION),
        ];

        let response = self
            .http
            .post_json(&self.url, &headers, &request_body)
            .await
            .map_err(ShellError::Generation)?;
        debug!("Anthropic API responded with status {}", response.status);

        if !response.is_success() {
            let message = Self::api_error_message(&response.body);
            warn!("Anthropic API error {}: {}", response.status, message);
            return Err(ShellError::Generation(format!(
                "API returned status {}: {}",
                response.status, message
            )));
        }

        let command = Self::parse_response(&response.body)?;
        info!("Generated command: {}", command);
        Ok(command)
    }
}

/// Strips whitespace and a surrounding Markdown code fence, if any.
pub fn clean_command(text: &str) -> String {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("```") {
        // The opening fence may carry a language tag such as ```bash.
        let body = match rest.find('\n') {
            Some(newline) => &rest[newline + 1..],
            None => rest,
        };
        let body = body.trim_end();
        let body = body.strip_suffix("```").unwrap_or(body);
        return body.trim().to_string();
    }
    trimmed.to_string()
}

/// Offline generator with canned answers, for demos and tests.
pub struct MockGenerator;

impl MockGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn mock_command(prompt_text: &str) -> String {
        let lowered = prompt_text.to_lowercase();
        if lowered.contains("list") && lowered.contains("size") {
            "ls -lS".to_string()
        } else if lowered.contains("list") && lowered.contains("file") {
            "ls -la".to_string()
        } else if lowered.contains("disk") {
            "df -h".to_string()
        } else if lowered.contains("date") || lowered.contains("time") {
            "date".to_string()
        } else {
            format!("echo {}", shell_quote(prompt_text))
        }
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandGenerator for MockGenerator {
    async fn generate(&self, prompt_text: &str) -> Result<String> {
        let prompt_text = prompt_text.trim();
        if prompt_text.is_empty() {
            return Err(ShellError::InvalidInput("The prompt is empty".to_string()));
        }
        Ok(Self::mock_command(prompt_text))
    }
}
