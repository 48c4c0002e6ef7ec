//! Adapter for converting LLM messages and tools to OpenAI format.

use crate::error::Result;
use crate::llm::models::{LlmMessage, MessageRole};
use crate::llm::tools::ToolHandle;
use serde_json::{json, Value};

/// Adapt LLM messages to OpenAI format.
pub fn adapt_messages_to_openai(messages: &[LlmMessage]) -> Result<Vec<Value>> {
    let mut result = Vec::with_capacity(messages.len());

    for msg in messages {
        let openai_msg = match msg.role {
            MessageRole::System => json!({
                "role": "system",
                "content": msg.content.as_deref().unwrap_or("")
            }),
            MessageRole::User => json!({
                "role": "user",
                "content": msg.content.as_deref().unwrap_or("")
            }),
            MessageRole::Assistant => {
                let mut assistant_msg = json!({ "role": "assistant" });

                if let Some(ref content) = msg.content {
                    assistant_msg["content"] = json!(content);
                }

                if let Some(ref tool_calls) = msg.tool_calls {
                    let formatted_calls = tool_calls
                        .iter()
                        .map(|tc| -> Result<Value> {
                            Ok(json!({
                                "id": tc.id.as_deref().unwrap_or(""),
                                "type": "function",
                                "function": {
                                    "name": tc.name,
                                    "arguments": serde_json::to_string(&tc.arguments)?
                                }
                            }))
                        })
                        .collect::<Result<Vec<Value>>>()?;
                    assistant_msg["tool_calls"] = Value::Array(formatted_calls);
                }

                assistant_msg
            }
            MessageRole::Tool => {
                // One tool message answers exactly one call
                let tool_call_id = msg
                    .tool_calls
                    .as_ref()
                    .and_then(|tcs| tcs.first())
                    .and_then(|tc| tc.id.clone())
                    .unwrap_or_default();

                json!({
                    "role": "tool",
                    "content": msg.content.as_deref().unwrap_or(""),
                    "tool_call_id": tool_call_id
                })
            }
        };

        result.push(openai_msg);
    }

    Ok(result)
}

/// Function-tool declarations for the `tools` request field.
pub fn adapt_tools_to_openai(tools: &[ToolHandle]) -> Result<Value> {
    let descriptors: Vec<_> = tools.iter().map(|t| t.descriptor()).collect();
    Ok(serde_json::to_value(descriptors)?)
}

/// Parse the argument string of a tool call.
///
/// A blank string means no arguments. A string that is not valid JSON is kept
/// verbatim as a JSON string so schema validation rejects it downstream.
pub fn parse_tool_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return json!({});
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
