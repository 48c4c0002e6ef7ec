//! Tool registry and closure-backed tools.
//!
//! [`ToolRegistry::define_tool`] turns a [`ToolDefinition`] plus an async handler into a
//! [`ToolHandle`]. Arguments are checked against the input schema before the handler
//! runs, and the handler's result is checked against the output schema before it is
//! returned to the model.

use crate::error::{GenflowError, Result};
use crate::llm::tools::tool::SchemaCheck;
use crate::llm::tools::{LlmTool, ToolDefinition, ToolDescriptor, ToolHandle};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::marker::PhantomData;
use tracing::debug;

/// A tool backed by an async function over typed input and output.
pub struct FnTool<I, O, F> {
    definition: ToolDefinition,
    input_check: SchemaCheck,
    output_check: SchemaCheck,
    handler: F,
    _types: PhantomData<fn(I) -> O>,
}

impl<I, O, F, Fut> FnTool<I, O, F>
where
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O>> + Send + 'static,
{
    pub fn new(definition: ToolDefinition, handler: F) -> Result<Self> {
        let input_check = SchemaCheck::compile(&definition.input_schema, &definition.name, "input")?;
        let output_check =
            SchemaCheck::compile(&definition.output_schema, &definition.name, "output")?;

        Ok(Self {
            definition,
            input_check,
            output_check,
            handler,
            _types: PhantomData,
        })
    }
}

#[async_trait]
impl<I, O, F, Fut> LlmTool for FnTool<I, O, F>
where
    I: DeserializeOwned + Send + 'static,
    O: Serialize + Send + 'static,
    F: Fn(I) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<O>> + Send + 'static,
{
    async fn run(&self, args: &Value) -> Result<Value> {
        let name = &self.definition.name;
        self.input_check.check(args, name, "input")?;

        let input: I = serde_json::from_value(args.clone()).map_err(|e| {
            GenflowError::ValidationError(format!("input of tool '{}' is malformed: {}", name, e))
        })?;

        let output = (self.handler)(input).await?;
        let value = serde_json::to_value(output)?;
        self.output_check.check(&value, name, "output")?;

        Ok(value)
    }

    fn descriptor(&self) -> ToolDescriptor {
        self.definition.descriptor()
    }

    fn matches(&self, name: &str) -> bool {
        self.definition.name == name
    }
}

/// Registered tools, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolHandle>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define a tool from its definition and async handler, and register it.
    pub fn define_tool<I, O, F, Fut>(
        &mut self,
        definition: ToolDefinition,
        handler: F,
    ) -> Result<ToolHandle>
    where
        I: DeserializeOwned + Send + 'static,
        O: Serialize + Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O>> + Send + 'static,
    {
        self.register(FnTool::new(definition, handler)?)
    }

    /// Register any [`LlmTool`]. Names must be non-empty and unique.
    pub fn register(&mut self, tool: impl LlmTool + 'static) -> Result<ToolHandle> {
        let handle = ToolHandle::new(tool);
        let name = handle.name().to_string();

        if name.trim().is_empty() {
            return Err(GenflowError::ToolError("tool name must not be empty".to_string()));
        }
        if self.tools.contains_key(&name) {
            return Err(GenflowError::ToolError(format!("tool '{}' is already registered", name)));
        }

        debug!(tool = %name, "Registered tool");
        self.tools.insert(name, handle.clone());
        Ok(handle)
    }

    pub fn get(&self, name: &str) -> Option<ToolHandle> {
        self.tools.get(name).cloned()
    }

    /// All registered tools, ordered by name.
    pub fn handles(&self) -> Vec<ToolHandle> {
        let mut handles: Vec<ToolHandle> = self.tools.values().cloned().collect();
        handles.sort_by(|a, b| a.name().cmp(b.name()));
        handles
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
