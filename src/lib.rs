pub mod config;
pub mod error;
pub mod flow;
pub mod llm;

pub use error::{GenflowError, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::config::{load_environment, ClientConfig, ModelRef};
    pub use crate::error::{GenflowError, Result};
    pub use crate::flow::{FlowState, StreamingFlow};
    pub use crate::llm::gateways::{OpenAIConfig, OpenAIGateway};
    pub use crate::llm::tools::{LlmTool, ToolDefinition, ToolHandle, ToolRegistry};
    pub use crate::llm::{
        CompletionConfig, GenerationRequest, GenerationResult, GenerationStream, LlmBroker,
        LlmGateway, StreamChunk,
    };
}
