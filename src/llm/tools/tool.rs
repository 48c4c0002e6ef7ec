use crate::error::{GenflowError, Result};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Descriptor for tool function parameters, in the shape providers expect
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolDescriptor {
    pub r#type: String,
    pub function: FunctionDescriptor,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FunctionDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Name, description and the structural contract of a tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub output_schema: Value,
}

impl ToolDefinition {
    /// Define a tool from raw JSON schemas.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Value,
        output_schema: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
            output_schema,
        }
    }

    /// Define a tool whose schemas are derived from its input and output types.
    pub fn typed<I, O>(name: impl Into<String>, description: impl Into<String>) -> Result<Self>
    where
        I: JsonSchema,
        O: JsonSchema,
    {
        let input_schema = serde_json::to_value(schemars::schema_for!(I))?;
        let output_schema = serde_json::to_value(schemars::schema_for!(O))?;
        Ok(Self::new(name, description, input_schema, output_schema))
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            r#type: "function".to_string(),
            function: FunctionDescriptor {
                name: self.name.clone(),
                description: self.description.clone(),
                parameters: self.input_schema.clone(),
            },
        }
    }
}

/// Trait for LLM tools
#[async_trait]
pub trait LlmTool: Send + Sync {
    /// Execute the tool with the arguments the model supplied
    async fn run(&self, args: &Value) -> Result<Value>;

    /// Get tool descriptor for LLM
    fn descriptor(&self) -> ToolDescriptor;

    /// Check if this tool matches the given name
    fn matches(&self, name: &str) -> bool {
        self.descriptor().function.name == name
    }
}

/// Shared reference to a registered tool.
///
/// Handles are what a [`GenerationRequest`](crate::llm::GenerationRequest) carries;
/// cloning one only bumps a reference count.
#[derive(Clone)]
pub struct ToolHandle {
    name: String,
    tool: Arc<dyn LlmTool>,
}

impl ToolHandle {
    pub fn new(tool: impl LlmTool + 'static) -> Self {
        Self::from_arc(Arc::new(tool))
    }

    pub fn from_arc(tool: Arc<dyn LlmTool>) -> Self {
        Self {
            name: tool.descriptor().function.name,
            tool,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        self.tool.descriptor()
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name == name
    }

    pub async fn run(&self, args: &Value) -> Result<Value> {
        self.tool.run(args).await
    }
}

impl fmt::Debug for ToolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolHandle").field("name", &self.name).finish()
    }
}

/// Compiled JSON schema used to check tool arguments and results.
pub(crate) struct SchemaCheck {
    validator: jsonschema::Validator,
}

impl SchemaCheck {
    pub(crate) fn compile(schema: &Value, tool: &str, side: &str) -> Result<Self> {
        let validator = jsonschema::validator_for(schema).map_err(|e| {
            GenflowError::ConfigError(format!("invalid {} schema for tool '{}': {}", side, tool, e))
        })?;
        Ok(Self { validator })
    }

    pub(crate) fn check(&self, value: &Value, tool: &str, side: &str) -> Result<()> {
        let errors: Vec<String> = self.validator.iter_errors(value).map(|e| e.to_string()).collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(GenflowError::ValidationError(format!(
                "{} of tool '{}' does not match its schema: {}",
                side,
                tool,
                errors.join("; ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_descriptor_serialization() {
        let descriptor = ToolDescriptor {
            r#type: "function".to_string(),
            function: FunctionDescriptor {
                name: "getWeather".to_string(),
                description: "Gets the current weather in a given location".to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "location": {"type": "string"}
                    }
                }),
            },
        };

        let json = serde_json::to_string(&descriptor).unwrap();
        assert!(json.contains("getWeather"));
        assert!(json.contains("\"type\":\"function\""));
    }

    #[test]
    fn test_definition_descriptor_uses_input_schema() {
        let definition = ToolDefinition::new(
            "lookup",
            "Look something up",
            json!({"type": "object", "required": ["q"]}),
            json!({"type": "string"}),
        );

        let descriptor = definition.descriptor();
        assert_eq!(descriptor.function.name, "lookup");
        assert_eq!(descriptor.function.parameters["required"][0], "q");
    }

    #[test]
    fn test_typed_definition_derives_schemas() {
        #[derive(schemars::JsonSchema)]
        #[allow(dead_code)]
        struct Query {
            term: String,
        }

        let definition = ToolDefinition::typed::<Query, u32>("search", "Search").unwrap();
        assert_eq!(definition.input_schema["type"], "object");
        assert_eq!(definition.input_schema["required"][0], "term");
        assert_eq!(definition.output_schema["type"], "integer");
    }

    #[test]
    fn test_schema_check_reports_violations() {
        let schema = json!({
            "type": "object",
            "properties": {"n": {"type": "integer", "maximum": 10}},
            "required": ["n"]
        });
        let check = SchemaCheck::compile(&schema, "counter", "input").unwrap();

        assert!(check.check(&json!({"n": 3}), "counter", "input").is_ok());

        match check.check(&json!({"n": 11}), "counter", "input") {
            Err(GenflowError::ValidationError(msg)) => assert!(msg.contains("counter")),
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_check_rejects_invalid_schema() {
        let result = SchemaCheck::compile(&json!({"type": 12}), "broken", "output");
        assert!(matches!(result, Err(GenflowError::ConfigError(_))));
    }

    struct EchoTool;

    #[async_trait]
    impl LlmTool for EchoTool {
        async fn run(&self, args: &Value) -> Result<Value> {
            Ok(args.clone())
        }

        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor {
                r#type: "function".to_string(),
                function: FunctionDescriptor {
                    name: "echo".to_string(),
                    description: "Echo arguments".to_string(),
                    parameters: json!({}),
                },
            }
        }
    }

    #[test]
    fn test_tool_matches() {
        assert!(EchoTool.matches("echo"));
        assert!(!EchoTool.matches("other_tool"));
    }

    #[tokio::test]
    async fn test_handle_runs_tool() {
        let handle = ToolHandle::new(EchoTool);
        assert_eq!(handle.name(), "echo");
        assert!(handle.matches("echo"));

        let result = handle.run(&json!({"x": 1})).await.unwrap();
        assert_eq!(result, json!({"x": 1}));
        assert!(format!("{:?}", handle).contains("echo"));
    }
}
