pub mod openai;
pub mod openai_messages_adapter;
pub mod openai_model_catalog;

pub use openai::{OpenAIConfig, OpenAIGateway};
pub use openai_model_catalog::{get_model_catalog, ModelCapabilities, ModelType, OpenAIModelCatalog};
