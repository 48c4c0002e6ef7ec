use crate::error::Result;
use crate::llm::models::{LlmMessage, LlmToolCall};
use crate::llm::tools::ToolHandle;
use futures::stream::Stream;
use std::pin::Pin;

/// Configuration for LLM completion
#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub temperature: f32,
    pub max_tokens: usize,
    /// Upper bound on consecutive tool-call rounds within one generation.
    pub max_tool_rounds: usize,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            max_tokens: 16384,
            max_tool_rounds: 8,
        }
    }
}

/// Unit emitted by a gateway's streaming completion.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayChunk {
    /// A fragment of assistant text.
    Content(String),
    /// Fully assembled tool calls requested by the model for this turn.
    ToolCalls(Vec<LlmToolCall>),
}

/// Stream of gateway chunks borrowed from the call arguments.
pub type GatewayStream<'a> = Pin<Box<dyn Stream<Item = Result<GatewayChunk>> + Send + 'a>>;

/// Abstract interface for LLM providers
pub trait LlmGateway: Send + Sync {
    /// Stream a single completion turn.
    ///
    /// Tool calls are reported, not executed; running them and re-prompting is the
    /// broker's job.
    fn complete_stream<'a>(
        &'a self,
        model: &'a str,
        messages: &'a [LlmMessage],
        tools: &'a [ToolHandle],
        config: &'a CompletionConfig,
    ) -> GatewayStream<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_config_default() {
        let config = CompletionConfig::default();

        assert_eq!(config.temperature, 1.0);
        assert_eq!(config.max_tokens, 16384);
        assert_eq!(config.max_tool_rounds, 8);
    }

    #[test]
    fn test_gateway_chunk_equality() {
        assert_eq!(
            GatewayChunk::Content("a".to_string()),
            GatewayChunk::Content("a".to_string())
        );
        assert_ne!(GatewayChunk::Content("a".to_string()), GatewayChunk::ToolCalls(vec![]));
    }
}
