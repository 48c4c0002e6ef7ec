//! OpenAI Gateway for LLM interactions.
//!
//! This module streams chat completions from OpenAI or any OpenAI-compatible
//! endpoint. Server-sent events are decoded into [`GatewayChunk`]s: text deltas are
//! passed through as they arrive, tool-call fragments are reassembled and reported
//! once the model finishes the turn.

use crate::config::ClientConfig;
use crate::error::{GenflowError, Result};
use crate::llm::gateway::{CompletionConfig, GatewayChunk, GatewayStream, LlmGateway};
use crate::llm::gateways::openai_messages_adapter::{
    adapt_messages_to_openai, adapt_tools_to_openai, parse_tool_arguments,
};
use crate::llm::gateways::openai_model_catalog::{get_model_catalog, ModelCapabilities};
use crate::llm::models::{LlmMessage, LlmToolCall};
use crate::llm::tools::ToolHandle;
use futures::stream::StreamExt;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration for connecting to OpenAI API.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout: Option<Duration>,
}

impl From<&ClientConfig> for OpenAIConfig {
    fn from(config: &ClientConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            timeout: config.timeout,
        }
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self::from(&ClientConfig::default())
    }
}

/// Gateway for OpenAI LLM service.
pub struct OpenAIGateway {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIGateway {
    /// Create a new OpenAI gateway with custom configuration.
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder
            .build()
            .map_err(|e| GenflowError::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Create gateway with custom API key and base URL.
    pub fn with_api_key_and_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        Self::with_config(OpenAIConfig {
            api_key: Some(api_key.into()),
            base_url: base_url.into(),
            ..Default::default()
        })
    }

    fn build_request_body(
        &self,
        model: &str,
        messages: &[LlmMessage],
        tools: &[ToolHandle],
        config: &CompletionConfig,
        capabilities: &ModelCapabilities,
    ) -> Result<Value> {
        let mut body = serde_json::json!({
            "model": model,
            "messages": adapt_messages_to_openai(messages)?,
            "stream": true
        });

        body[capabilities.token_limit_param()] = serde_json::json!(config.max_tokens);

        if capabilities.supports_temperature(config.temperature) {
            body["temperature"] = serde_json::json!(config.temperature);
        } else if capabilities.supported_temperatures.as_ref().is_some_and(|t| t.is_empty()) {
            warn!(
                model = model,
                requested_temperature = config.temperature,
                "Model does not support temperature parameter at all"
            );
        } else {
            warn!(
                model = model,
                requested_temperature = config.temperature,
                default_temperature = 1.0,
                "Model does not support requested temperature, using default"
            );
            body["temperature"] = serde_json::json!(1.0);
        }

        if !tools.is_empty() {
            if capabilities.supports_tools {
                body["tools"] = adapt_tools_to_openai(tools)?;
            } else {
                warn!(model = model, "Model does not support tools, ignoring tool configuration");
            }
        }

        Ok(body)
    }
}

impl LlmGateway for OpenAIGateway {
    fn complete_stream<'a>(
        &'a self,
        model: &'a str,
        messages: &'a [LlmMessage],
        tools: &'a [ToolHandle],
        config: &'a CompletionConfig,
    ) -> GatewayStream<'a> {
        Box::pin(async_stream::stream! {
            info!("Starting OpenAI streaming completion");
            debug!(model = model, message_count = messages.len(), tool_count = tools.len());

            let Some(api_key) = self.config.api_key.as_deref() else {
                yield Err(GenflowError::AuthenticationError(
                    "no OpenAI API key configured (set OPENAI_API_KEY)".to_string(),
                ));
                return;
            };

            let capabilities = get_model_catalog().get_model_capabilities(model);
            if !capabilities.supports_streaming {
                yield Err(GenflowError::ModelNotSupported(format!(
                    "{} does not support streaming",
                    model
                )));
                return;
            }

            let body = match self.build_request_body(model, messages, tools, config, &capabilities) {
                Ok(body) => body,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            let response = match self
                .client
                .post(format!("{}/chat/completions", self.config.base_url))
                .bearer_auth(api_key)
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    yield Err(e.into());
                    return;
                }
            };

            let status = response.status();
            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_default();
                yield Err(status_error(status, &error_text));
                return;
            }

            let mut stream = response.bytes_stream();
            let mut parser = ChatStreamParser::default();

            while let Some(chunk_result) = stream.next().await {
                match chunk_result {
                    Ok(bytes) => match parser.feed(&bytes) {
                        Ok(chunks) => {
                            for chunk in chunks {
                                yield Ok(chunk);
                            }
                        }
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    },
                    Err(e) => {
                        yield Err(e.into());
                        return;
                    }
                }
            }

            for chunk in parser.finish() {
                yield Ok(chunk);
            }
        })
    }
}

fn status_error(status: StatusCode, body: &str) -> GenflowError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => GenflowError::AuthenticationError(
            format!("OpenAI rejected the credentials: {} - {}", status, body),
        ),
        _ => GenflowError::ProviderError(format!("OpenAI API error: {} - {}", status, body)),
    }
}

/// Accumulator for streaming tool calls.
#[derive(Debug, Default)]
struct ToolCallAccumulator {
    id: Option<String>,
    name: Option<String>,
    arguments: String,
}

/// Incremental decoder for the chat completions event stream.
///
/// Bytes are buffered until a full line is available, so events and multi-byte
/// characters split across network reads are decoded intact.
#[derive(Debug, Default)]
struct ChatStreamParser {
    buffer: Vec<u8>,
    tool_calls: BTreeMap<usize, ToolCallAccumulator>,
}

impl ChatStreamParser {
    fn feed(&mut self, bytes: &[u8]) -> Result<Vec<GatewayChunk>> {
        self.buffer.extend_from_slice(bytes);
        let mut chunks = Vec::new();

        while let Some(line_end) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=line_end).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim();

            let Some(data) = line.strip_prefix("data:") else {
                continue;
            };
            self.handle_event(data.trim(), &mut chunks)?;
        }

        Ok(chunks)
    }

    /// Flush tool calls left pending when the stream ended without a terminator.
    fn finish(&mut self) -> Vec<GatewayChunk> {
        self.take_tool_calls().into_iter().collect()
    }

    fn handle_event(&mut self, data: &str, chunks: &mut Vec<GatewayChunk>) -> Result<()> {
        if data == "[DONE]" {
            chunks.extend(self.take_tool_calls());
            return Ok(());
        }

        let json: Value = serde_json::from_str(data)
            .map_err(|e| GenflowError::ProviderError(format!("malformed stream event: {}", e)))?;

        if let Some(error) = json.get("error").filter(|e| !e.is_null()) {
            let message = error["message"].as_str().unwrap_or("unknown error");
            return Err(GenflowError::ProviderError(format!("OpenAI stream error: {}", message)));
        }

        let Some(choice) = json["choices"].as_array().and_then(|c| c.first()) else {
            return Ok(());
        };
        let delta = &choice["delta"];

        if let Some(content) = delta["content"].as_str() {
            if !content.is_empty() {
                chunks.push(GatewayChunk::Content(content.to_string()));
            }
        }

        if let Some(tool_calls) = delta["tool_calls"].as_array() {
            for tc in tool_calls {
                let Some(index) = tc["index"].as_u64() else {
                    continue;
                };
                let acc = self.tool_calls.entry(index as usize).or_default();

                if let Some(id) = tc["id"].as_str() {
                    acc.id = Some(id.to_string());
                }
                if let Some(name) = tc["function"]["name"].as_str() {
                    acc.name = Some(name.to_string());
                }
                if let Some(args) = tc["function"]["arguments"].as_str() {
                    acc.arguments.push_str(args);
                }
            }
        }

        if choice["finish_reason"].as_str() == Some("tool_calls") {
            chunks.extend(self.take_tool_calls());
        }

        Ok(())
    }

    fn take_tool_calls(&mut self) -> Option<GatewayChunk> {
        let calls = build_complete_tool_calls(std::mem::take(&mut self.tool_calls));
        if calls.is_empty() {
            None
        } else {
            Some(GatewayChunk::ToolCalls(calls))
        }
    }
}

/// Build complete tool calls from accumulators, in index order.
fn build_complete_tool_calls(accumulators: BTreeMap<usize, ToolCallAccumulator>) -> Vec<LlmToolCall> {
    accumulators
        .into_values()
        .filter_map(|acc| {
            let Some(name) = acc.name else {
                warn!(id = ?acc.id, "Dropping streamed tool call without a name");
                return None;
            };

            Some(LlmToolCall {
                id: acc.id,
                name,
                arguments: parse_tool_arguments(&acc.arguments),
            })
        })
        .collect()
}
