//! Streaming flow runner.
//!
//! A [`StreamingFlow`] binds a broker to a fixed set of tools and forwards each
//! generated chunk to a caller-supplied callback as it arrives.

use crate::error::Result;
use crate::llm::{CompletionConfig, GenerationRequest, GenerationResult, LlmBroker, ToolHandle};
use futures::stream::StreamExt;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Lifecycle of a single flow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Streaming,
    Completed,
    Failed,
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlowState::Idle => "idle",
            FlowState::Streaming => "streaming",
            FlowState::Completed => "completed",
            FlowState::Failed => "failed",
        };
        f.write_str(name)
    }
}

pub struct StreamingFlow {
    name: String,
    broker: Arc<LlmBroker>,
    tools: Vec<ToolHandle>,
    model: Option<String>,
    system: Option<String>,
    config: Option<CompletionConfig>,
}

impl StreamingFlow {
    pub fn new(name: impl Into<String>, broker: Arc<LlmBroker>) -> Self {
        Self {
            name: name.into(),
            broker,
            tools: Vec::new(),
            model: None,
            system: None,
            config: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolHandle>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_system_prompt(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_config(mut self, config: CompletionConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tools(&self) -> &[ToolHandle] {
        &self.tools
    }

    fn request(&self, prompt: &str) -> GenerationRequest {
        let mut request = GenerationRequest::new(prompt).with_tools(self.tools.clone());
        if let Some(model) = &self.model {
            request = request.with_model(model.clone());
        }
        if let Some(system) = &self.system {
            request = request.with_system(system.clone());
        }
        if let Some(config) = &self.config {
            request = request.with_config(config.clone());
        }
        request
    }

    /// Run one generation, handing every chunk to `on_chunk` in order.
    ///
    /// The next chunk is not requested until `on_chunk` returns. Errors are returned
    /// as they were raised; chunks already delivered stay delivered.
    pub async fn run<F>(&self, prompt: &str, on_chunk: F) -> Result<GenerationResult>
    where
        F: FnMut(&str),
    {
        let run_id = Uuid::new_v4();
        let span = info_span!("flow", flow = %self.name, run_id = %run_id);
        self.run_inner(prompt, on_chunk).instrument(span).await
    }

    async fn run_inner<F>(&self, prompt: &str, mut on_chunk: F) -> Result<GenerationResult>
    where
        F: FnMut(&str),
    {
        let mut state = FlowState::Idle;
        info!(tools = self.tools.len(), "Starting flow run");

        let mut stream = self.broker.generate_stream(self.request(prompt));
        transition(&mut state, FlowState::Streaming);

        let mut chunk_count = 0usize;
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(chunk) => {
                    chunk_count += 1;
                    on_chunk(&chunk.text);
                }
                Err(e) => {
                    transition(&mut state, FlowState::Failed);
                    warn!("Flow run failed after {} chunk(s): {}", chunk_count, e);
                    return Err(e);
                }
            }
        }

        let result = stream.response().await;
        match &result {
            Ok(r) => {
                transition(&mut state, FlowState::Completed);
                info!(chunks = chunk_count, length = r.text.len(), "Flow run completed");
            }
            Err(e) => {
                transition(&mut state, FlowState::Failed);
                warn!("Flow run failed: {}", e);
            }
        }
        result
    }
}

fn transition(state: &mut FlowState, next: FlowState) {
    debug!("Flow state {} -> {}", state, next);
    *state = next;
}
