//! Catalog of OpenAI model families and the request parameters they accept.
//!
//! Model ids are resolved in three steps: exact family name, family name after
//! stripping a dated release suffix (`gpt-4o-2024-11-20` → `gpt-4o`), then prefix
//! patterns. Anything left over is treated as a plain chat model so that
//! OpenAI-compatible providers serving other models keep working.

use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::warn;

/// Classification of OpenAI model types based on the parameters they take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelType {
    /// Models like o1, o3 that use max_completion_tokens
    Reasoning,
    /// Standard chat models that use max_tokens
    Chat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelCapabilities {
    pub model_type: ModelType,
    pub supports_tools: bool,
    pub supports_streaming: bool,
    /// None means all temperatures supported, empty vec means no temperature parameter allowed
    pub supported_temperatures: Option<Vec<f32>>,
}

impl ModelCapabilities {
    fn chat() -> Self {
        Self {
            model_type: ModelType::Chat,
            supports_tools: true,
            supports_streaming: true,
            supported_temperatures: None,
        }
    }

    fn reasoning(supports_tools: bool, supported_temperatures: Vec<f32>) -> Self {
        Self {
            model_type: ModelType::Reasoning,
            supports_tools,
            supports_streaming: supports_tools,
            supported_temperatures: Some(supported_temperatures),
        }
    }

    pub fn token_limit_param(&self) -> &'static str {
        match self.model_type {
            ModelType::Reasoning => "max_completion_tokens",
            ModelType::Chat => "max_tokens",
        }
    }

    pub fn supports_temperature(&self, temperature: f32) -> bool {
        match &self.supported_temperatures {
            None => true,
            Some(temps) => temps.iter().any(|t| (*t - temperature).abs() < 0.01),
        }
    }
}

impl Default for ModelCapabilities {
    fn default() -> Self {
        Self::chat()
    }
}

pub struct OpenAIModelCatalog {
    families: HashMap<&'static str, ModelCapabilities>,
    prefixes: Vec<(&'static str, ModelType)>,
}

impl OpenAIModelCatalog {
    pub fn new() -> Self {
        let mut families = HashMap::new();

        for family in [
            "gpt-4",
            "gpt-4-turbo",
            "gpt-4.1",
            "gpt-4.1-mini",
            "gpt-4.1-nano",
            "gpt-4o",
            "gpt-4o-mini",
            "chatgpt-4o-latest",
            "gpt-3.5-turbo",
        ] {
            families.insert(family, ModelCapabilities::chat());
        }

        for family in ["o1", "o1-mini", "o1-pro"] {
            families.insert(family, ModelCapabilities::reasoning(false, vec![1.0]));
        }
        for family in ["o3", "o3-mini", "o3-pro"] {
            families.insert(family, ModelCapabilities::reasoning(true, vec![]));
        }
        for family in ["o4-mini", "gpt-5", "gpt-5-mini", "gpt-5-nano"] {
            families.insert(family, ModelCapabilities::reasoning(true, vec![1.0]));
        }

        Self {
            families,
            prefixes: vec![
                ("gpt-5", ModelType::Reasoning),
                ("o1", ModelType::Reasoning),
                ("o3", ModelType::Reasoning),
                ("o4", ModelType::Reasoning),
                ("gpt-", ModelType::Chat),
                ("chatgpt-", ModelType::Chat),
            ],
        }
    }

    pub fn get_model_capabilities(&self, model: &str) -> ModelCapabilities {
        if let Some(caps) = self.families.get(model) {
            return caps.clone();
        }

        if let Some(caps) = strip_release_date(model).and_then(|family| self.families.get(family)) {
            return caps.clone();
        }

        for (prefix, model_type) in &self.prefixes {
            if model.starts_with(prefix) {
                return match model_type {
                    ModelType::Chat => ModelCapabilities::chat(),
                    ModelType::Reasoning => ModelCapabilities::reasoning(true, vec![1.0]),
                };
            }
        }

        warn!(model = model, "Unknown model, using default chat capabilities");
        ModelCapabilities::default()
    }

    pub fn is_reasoning_model(&self, model: &str) -> bool {
        self.get_model_capabilities(model).model_type == ModelType::Reasoning
    }
}

impl Default for OpenAIModelCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// `gpt-4o-2024-11-20` → `gpt-4o`
fn strip_release_date(model: &str) -> Option<&str> {
    if model.len() < 11 || !model.is_char_boundary(model.len() - 11) {
        return None;
    }
    let (family, suffix) = model.split_at(model.len() - 11);
    let date = suffix.strip_prefix('-')?;
    let well_formed = date.char_indices().all(|(i, c)| match i {
        4 | 7 => c == '-',
        _ => c.is_ascii_digit(),
    });
    if well_formed && !family.is_empty() {
        Some(family)
    } else {
        None
    }
}

static MODEL_CATALOG: LazyLock<OpenAIModelCatalog> = LazyLock::new(OpenAIModelCatalog::new);

pub fn get_model_catalog() -> &'static OpenAIModelCatalog {
    &MODEL_CATALOG
}
