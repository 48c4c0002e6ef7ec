use crate::error::Result;
use crate::llm::tools::{ToolDefinition, ToolHandle, ToolRegistry};
use rand::Rng;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const WEATHER_TOOL_NAME: &str = "getWeather";
pub const WEATHER_TOOL_DESCRIPTION: &str = "Gets the current weather in a given location";

/// Arguments of the weather lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeatherQuery {
    /// The location to get the current weather for
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    Sunny,
    Cloudy,
    Rainy,
    Snowy,
}

impl WeatherCondition {
    pub const ALL: [WeatherCondition; 4] = [
        WeatherCondition::Sunny,
        WeatherCondition::Cloudy,
        WeatherCondition::Rainy,
        WeatherCondition::Snowy,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeatherReport {
    pub location: String,
    /// The current temperature in degrees Fahrenheit
    #[schemars(range(min = 50, max = 80))]
    pub temperature: i64,
    /// The current weather condition
    pub condition: WeatherCondition,
}

/// Fake weather lookup: random temperature in 50..80 and a random condition.
///
/// The shape is fixed, the values are not; nothing is fetched.
pub async fn get_weather(query: WeatherQuery) -> Result<WeatherReport> {
    Ok(random_report(query.location))
}

fn random_report(location: String) -> WeatherReport {
    let mut rng = rand::rng();
    let temperature = rng.random_range(50..80);
    let condition = WeatherCondition::ALL[rng.random_range(0..WeatherCondition::ALL.len())];

    WeatherReport {
        location,
        temperature,
        condition,
    }
}

pub fn weather_tool_definition() -> Result<ToolDefinition> {
    ToolDefinition::typed::<WeatherQuery, WeatherReport>(
        WEATHER_TOOL_NAME,
        WEATHER_TOOL_DESCRIPTION,
    )
}

/// Register the fake weather tool.
pub fn define_weather_tool(registry: &mut ToolRegistry) -> Result<ToolHandle> {
    registry.define_tool(weather_tool_definition()?, get_weather)
}
