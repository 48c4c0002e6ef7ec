use crate::llm::gateway::CompletionConfig;
use crate::llm::tools::ToolHandle;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message role in LLM conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

/// Tool call from LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmToolCall {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// Arguments exactly as the model produced them; schema validation runs on this value.
    pub arguments: Value,
}

/// Message in LLM conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmMessage {
    #[serde(default = "default_role")]
    pub role: MessageRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<LlmToolCall>>,
}

fn default_role() -> MessageRole {
    MessageRole::User
}

impl LlmMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: Some(content.into()),
            tool_calls: None,
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: Some(content.into()),
            tool_calls: None,
        }
    }

    /// Assistant turn that requested tool calls. Empty text is dropped.
    pub fn assistant_tool_calls(content: String, tool_calls: Vec<LlmToolCall>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: if content.is_empty() { None } else { Some(content) },
            tool_calls: Some(tool_calls),
        }
    }

    /// Result of a single tool call, linked back to it by the call id.
    pub fn tool_result(call: &LlmToolCall, content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Tool,
            content: Some(content.into()),
            tool_calls: Some(vec![call.clone()]),
        }
    }
}

/// One incremental fragment of generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamChunk {
    pub text: String,
}

/// Aggregate outcome of a finished generation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResult {
    pub text: String,
}

/// A single generation call: prompt, model and the tools the model may use.
#[derive(Clone)]
pub struct GenerationRequest {
    /// Overrides the broker's default model when set.
    pub model: Option<String>,
    pub system: Option<String>,
    pub prompt: String,
    pub tools: Vec<ToolHandle>,
    pub config: CompletionConfig,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            model: None,
            system: None,
            prompt: prompt.into(),
            tools: Vec::new(),
            config: CompletionConfig::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolHandle>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_config(mut self, config: CompletionConfig) -> Self {
        self.config = config;
        self
    }

    /// Opening conversation for this request.
    pub fn messages(&self) -> Vec<LlmMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.system {
            messages.push(LlmMessage::system(system.clone()));
        }
        messages.push(LlmMessage::user(self.prompt.clone()));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_role_serialization() {
        assert_eq!(serde_json::to_string(&MessageRole::System).unwrap(), "\"system\"");
        assert_eq!(serde_json::to_string(&MessageRole::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&MessageRole::Assistant).unwrap(), "\"assistant\"");
        assert_eq!(serde_json::to_string(&MessageRole::Tool).unwrap(), "\"tool\"");
    }

    #[test]
    fn test_user_message() {
        let msg = LlmMessage::user("Hello");
        assert_eq!(msg.role, MessageRole::User);
        assert_eq!(msg.content, Some("Hello".to_string()));
        assert!(msg.tool_calls.is_none());
    }

    #[test]
    fn test_assistant_tool_calls_drops_empty_content() {
        let call = LlmToolCall {
            id: Some("call_1".to_string()),
            name: "getWeather".to_string(),
            arguments: json!({"location": "Seattle"}),
        };

        let msg = LlmMessage::assistant_tool_calls(String::new(), vec![call]);
        assert_eq!(msg.role, MessageRole::Assistant);
        assert!(msg.content.is_none());
        assert_eq!(msg.tool_calls.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_tool_result_links_call() {
        let call = LlmToolCall {
            id: Some("call_7".to_string()),
            name: "getWeather".to_string(),
            arguments: json!({}),
        };

        let msg = LlmMessage::tool_result(&call, "{}");
        assert_eq!(msg.role, MessageRole::Tool);
        assert_eq!(msg.tool_calls.unwrap()[0].id.as_deref(), Some("call_7"));
    }

    #[test]
    fn test_llm_tool_call_without_id() {
        let tool_call = LlmToolCall {
            id: None,
            name: "test_tool".to_string(),
            arguments: json!({}),
        };

        let json = serde_json::to_string(&tool_call).unwrap();
        assert!(!json.contains("\"id\""));
        assert!(json.contains("test_tool"));
    }

    #[test]
    fn test_llm_message_default_role() {
        let json = r#"{"content":"test"}"#;
        let msg: LlmMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.role, MessageRole::User);
    }

    #[test]
    fn test_request_messages_with_system() {
        let request = GenerationRequest::new("What is the weather like in Seattle?")
            .with_system("Answer briefly.");

        let messages = request.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[1].content.as_deref(), Some("What is the weather like in Seattle?"));
    }

    #[test]
    fn test_request_defaults() {
        let request = GenerationRequest::new("Hi");
        assert!(request.model.is_none());
        assert!(request.tools.is_empty());
        assert_eq!(request.messages().len(), 1);
    }
}
