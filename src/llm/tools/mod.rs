mod registry;
mod tool;
pub mod weather_tool;

pub use registry::{FnTool, ToolRegistry};
pub use tool::{FunctionDescriptor, LlmTool, ToolDefinition, ToolDescriptor, ToolHandle};
