//! Streams a weather answer for Seattle, letting the model call the fake
//! `getWeather` tool along the way.
//!
//! Requires `OPENAI_API_KEY` (environment or `.env`). Logs go to stderr and are
//! controlled by `RUST_LOG`.

use genflow::llm::tools::weather_tool::define_weather_tool;
use genflow::prelude::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const FLOW_NAME: &str = "testStreamingFlow";
const PROMPT: &str = "What is the weather like in Seattle?";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    load_environment();
    let config = ClientConfig::from_env();

    let gateway = OpenAIGateway::with_config(OpenAIConfig::from(&config))?;
    let broker = Arc::new(LlmBroker::new(config.model.id(), Arc::new(gateway)));

    let mut registry = ToolRegistry::new();
    let weather = define_weather_tool(&mut registry)?;

    let flow = StreamingFlow::new(FLOW_NAME, broker).with_tools(vec![weather]);

    let result = flow.run(PROMPT, |chunk| println!("Chunk: {}", chunk)).await?;
    println!("Final response: {}", result.text);

    Ok(())
}
