/// LLM Client: the single point of entry for all model calls in the screener.
///
/// ARCHITECTURAL RULE: No other module may call the Anthropic API directly.
/// Extraction, match analysis and chat all go through this module so retry,
/// fence stripping and token accounting stay in one place.
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";
pub const DEFAULT_COST_PER_1K_TOKENS: f64 = 0.01;
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Connection and pricing settings, built from `Config`.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub cost_per_1k_tokens: f64,
    /// First backoff step; doubles per retry.
    pub retry_base_delay: Duration,
}

impl LlmSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            cost_per_1k_tokens: DEFAULT_COST_PER_1K_TOKENS,
            retry_base_delay: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Usage,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct AnthropicError {
    error: AnthropicErrorBody,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    message: String,
}

/// Tokens spent on a call and what they cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageReport {
    pub tokens: u32,
    pub cost: f64,
}

impl UsageReport {
    pub fn from_usage(usage: &Usage, cost_per_1k_tokens: f64) -> Self {
        let tokens = usage.input_tokens + usage.output_tokens;
        Self {
            tokens,
            cost: f64::from(tokens) / 1000.0 * cost_per_1k_tokens,
        }
    }
}

/// Parsed output of a JSON call plus its usage.
#[derive(Debug)]
pub struct LlmOutput<T> {
    pub value: T,
    pub usage: UsageReport,
}

/// One prior turn of a chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

/// The single LLM client used by all services.
/// Wraps the Anthropic Messages API with retry logic and structured output helpers.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    settings: LlmSettings,
}

impl LlmClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self { client, settings })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    /// Makes a single-turn call, returning the full response object.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<LlmResponse, LlmError> {
        let messages = vec![AnthropicMessage {
            role: "user",
            content: prompt,
        }];
        self.send(system, messages).await
    }

    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    async fn send(
        &self,
        system: &str,
        messages: Vec<AnthropicMessage<'_>>,
    ) -> Result<LlmResponse, LlmError> {
        let request_body = AnthropicRequest {
            model: &self.settings.model,
            max_tokens: MAX_TOKENS,
            system,
            messages,
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = self.settings.retry_base_delay * (1 << (attempt - 1));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(&self.settings.api_url)
                .header("x-api-key", &self.settings.api_key)
                .header("anthropic-version", ANTHROPIC_VERSION)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<AnthropicError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let llm_response: LlmResponse = response.json().await?;

            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                llm_response.usage.input_tokens, llm_response.usage.output_tokens
            );

            return Ok(llm_response);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }

    /// Calls the model and deserializes the text response as JSON.
    /// The prompt must instruct the model to return valid JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<LlmOutput<T>, LlmError> {
        let response = self.call(prompt, system).await?;
        let usage = self.usage_of(&response);

        let text = response.text().ok_or(LlmError::EmptyContent)?;
        let value = serde_json::from_str(strip_json_fences(text))?;

        Ok(LlmOutput { value, usage })
    }

    /// Multi-turn conversation: prior turns followed by the new user message.
    pub async fn chat(
        &self,
        system: &str,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<LlmOutput<String>, LlmError> {
        let mut messages: Vec<AnthropicMessage<'_>> = history
            .iter()
            .map(|turn| AnthropicMessage {
                role: &turn.role,
                content: &turn.content,
            })
            .collect();
        messages.push(AnthropicMessage {
            role: "user",
            content: message,
        });

        let response = self.send(system, messages).await?;
        let usage = self.usage_of(&response);
        let text = response.text().ok_or(LlmError::EmptyContent)?.to_string();

        Ok(LlmOutput { value: text, usage })
    }

    fn usage_of(&self, response: &LlmResponse) -> UsageReport {
        let usage = UsageReport::from_usage(&response.usage, self.settings.cost_per_1k_tokens);
        debug!(tokens = usage.tokens, cost = usage.cost, "LLM usage");
        usage
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> LlmClient {
        let mut settings = LlmSettings::new("test-key");
        settings.api_url = format!("{}/v1/messages", server.uri());
        settings.retry_base_delay = Duration::from_millis(1);
        LlmClient::new(settings).unwrap()
    }

    fn reply(text: &str, input_tokens: u32, output_tokens: u32) -> Value {
        json!({
            "content": [{"type": "text", "text": text}],
            "usage": {"input_tokens": input_tokens, "output_tokens": output_tokens}
        })
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_usage_cost_is_per_thousand_tokens() {
        let usage = Usage {
            input_tokens: 1500,
            output_tokens: 500,
        };
        let report = UsageReport::from_usage(&usage, 0.01);
        assert_eq!(report.tokens, 2000);
        assert!((report.cost - 0.02).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_call_json_parses_fenced_reply_and_reports_usage() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(body_partial_json(json!({"model": DEFAULT_MODEL})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(reply("```json\n{\"name\": \"Ada\"}\n```", 700, 300)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let output: LlmOutput<Value> = client_for(&server)
            .call_json("extract", "system")
            .await
            .unwrap();
        assert_eq!(output.value, json!({"name": "Ada"}));
        assert_eq!(output.usage.tokens, 1000);
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("{}", 1, 1)))
            .mount(&server)
            .await;

        let output: LlmOutput<Value> = client_for(&server).call_json("p", "s").await.unwrap();
        assert_eq!(output.value, json!({}));
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"error": {"message": "bad request body"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server).call("p", "s").await.unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad request body");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_chat_sends_history_then_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "messages": [
                    {"role": "user", "content": "hi"},
                    {"role": "assistant", "content": "hello"},
                    {"role": "user", "content": "how is the candidate?"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply("Strong fit.", 10, 5)))
            .expect(1)
            .mount(&server)
            .await;

        let history = vec![
            ChatTurn {
                role: "user".into(),
                content: "hi".into(),
            },
            ChatTurn {
                role: "assistant".into(),
                content: "hello".into(),
            },
        ];
        let output = client_for(&server)
            .chat("system", &history, "how is the candidate?")
            .await
            .unwrap();
        assert_eq!(output.value, "Strong fit.");
        assert_eq!(output.usage.tokens, 15);
    }
}
