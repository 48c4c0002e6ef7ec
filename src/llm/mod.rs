pub mod broker;
pub mod gateway;
pub mod gateways;
pub mod models;
pub mod tools;

pub use broker::{GenerationStream, LlmBroker};
pub use gateway::{CompletionConfig, GatewayChunk, LlmGateway};
pub use models::{
    GenerationRequest, GenerationResult, LlmMessage, LlmToolCall, MessageRole, StreamChunk,
};
pub use tools::{LlmTool, ToolDefinition, ToolHandle, ToolRegistry};
