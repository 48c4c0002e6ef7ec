use crate::error::{GenflowError, Result};
use crate::llm::gateway::{GatewayChunk, LlmGateway};
use crate::llm::models::{GenerationRequest, GenerationResult, LlmMessage, StreamChunk};
use futures::stream::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tracing::{debug, info, warn};

/// Main interface for LLM interactions
pub struct LlmBroker {
    model: String,
    gateway: Arc<dyn LlmGateway>,
}

impl LlmBroker {
    /// Create a new LLM broker with a default model
    pub fn new(model: impl Into<String>, gateway: Arc<dyn LlmGateway>) -> Self {
        Self {
            model: model.into(),
            gateway,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate a response and wait for the full text.
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult> {
        self.generate_stream(request).response().await
    }

    /// Generate streaming text response from LLM
    ///
    /// Returns a [`GenerationStream`] that yields content chunks as they arrive. When
    /// the model asks for tools, the broker runs them, feeds their results back, and
    /// keeps streaming the model's follow-up; the caller only sees more chunks.
    ///
    /// Nothing is sent to the provider until the stream is polled.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use futures::stream::StreamExt;
    ///
    /// let broker = LlmBroker::new("gpt-4o", gateway);
    /// let mut stream = broker.generate_stream(GenerationRequest::new("Tell me a story"));
    /// while let Some(chunk) = stream.next().await {
    ///     print!("{}", chunk?.text);
    /// }
    /// let result = stream.response().await?;
    /// ```
    pub fn generate_stream(&self, request: GenerationRequest) -> GenerationStream<'_> {
        let model = request.model.clone().unwrap_or_else(|| self.model.clone());

        let inner = Box::pin(async_stream::stream! {
            if request.prompt.trim().is_empty() {
                yield Err(GenflowError::ValidationError("prompt must not be empty".to_string()));
                return;
            }

            let tools = &request.tools;
            let config = &request.config;
            let mut messages = request.messages();
            let mut tool_rounds = 0;

            loop {
                let mut turn_content = String::new();
                let mut pending_calls = Vec::new();

                {
                    let mut stream = self.gateway.complete_stream(&model, &messages, tools, config);

                    while let Some(chunk_result) = stream.next().await {
                        match chunk_result {
                            Ok(GatewayChunk::Content(content)) => {
                                turn_content.push_str(&content);
                                yield Ok(content);
                            }
                            Ok(GatewayChunk::ToolCalls(tool_calls)) => {
                                pending_calls.extend(tool_calls);
                            }
                            Err(e) => {
                                yield Err(e);
                                return;
                            }
                        }
                    }
                }

                if pending_calls.is_empty() {
                    return;
                }

                tool_rounds += 1;
                if tool_rounds > config.max_tool_rounds {
                    yield Err(GenflowError::ToolError(format!(
                        "model requested tools more than {} times in one generation",
                        config.max_tool_rounds
                    )));
                    return;
                }

                info!("Processing {} tool call(s) in stream", pending_calls.len());
                messages.push(LlmMessage::assistant_tool_calls(turn_content, pending_calls.clone()));

                for tool_call in &pending_calls {
                    let Some(tool) = tools.iter().find(|t| t.matches(&tool_call.name)) else {
                        warn!("Tool not found: {}", tool_call.name);
                        messages.push(LlmMessage::tool_result(
                            tool_call,
                            format!("Error: unknown tool '{}'", tool_call.name),
                        ));
                        continue;
                    };

                    info!("Executing tool: {}", tool_call.name);
                    debug!(tool = %tool_call.name, arguments = %tool_call.arguments);

                    let output = match tool.run(&tool_call.arguments).await {
                        Ok(output) => output,
                        Err(e) => {
                            warn!("Tool execution failed: {}", e);
                            yield Err(e);
                            return;
                        }
                    };

                    let output_str = match serde_json::to_string(&output) {
                        Ok(s) => s,
                        Err(e) => {
                            yield Err(GenflowError::from(e));
                            return;
                        }
                    };
                    messages.push(LlmMessage::tool_result(tool_call, output_str));
                }
            }
        });

        GenerationStream::new(inner)
    }
}

/// The in-flight result of [`LlmBroker::generate_stream`].
///
/// As a [`Stream`] it yields [`StreamChunk`]s in emission order. [`response`](Self::response)
/// resolves to the aggregated [`GenerationResult`] of the same generation, draining
/// whatever has not been consumed yet. After the stream ends or fails it only yields
/// `None`; dropping it early stops the generation.
pub struct GenerationStream<'a> {
    inner: Pin<Box<dyn Stream<Item = Result<String>> + Send + 'a>>,
    text: String,
    state: GenerationState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum GenerationState {
    Streaming,
    Completed,
    Failed(String),
}

impl<'a> GenerationStream<'a> {
    fn new(inner: Pin<Box<dyn Stream<Item = Result<String>> + Send + 'a>>) -> Self {
        Self {
            inner,
            text: String::new(),
            state: GenerationState::Streaming,
        }
    }

    /// Text delivered so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_terminated(&self) -> bool {
        self.state != GenerationState::Streaming
    }

    /// Wait for the generation to finish and return the full text.
    pub async fn response(mut self) -> Result<GenerationResult> {
        while let Some(chunk) = self.next().await {
            chunk?;
        }

        match self.state {
            GenerationState::Failed(reason) => Err(GenflowError::ProviderError(format!(
                "generation already failed: {}",
                reason
            ))),
            _ => Ok(GenerationResult { text: self.text }),
        }
    }
}

impl Stream for GenerationStream<'_> {
    type Item = Result<StreamChunk>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.state != GenerationState::Streaming {
            return Poll::Ready(None);
        }

        match this.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(text))) => {
                this.text.push_str(&text);
                Poll::Ready(Some(Ok(StreamChunk { text })))
            }
            Poll::Ready(Some(Err(e))) => {
                this.state = GenerationState::Failed(e.to_string());
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                this.state = GenerationState::Completed;
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
