use std::{collections::HashMap, time::Duration};

use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::services::FetchStrategy;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub scraper: ScraperSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ScraperSettings {
    #[serde(default)]
    pub default_strategy: FetchStrategy,
    /// Per-site override keyed by profile id, e.g. `flipkart: rendered`
    #[serde(default)]
    pub site_strategies: HashMap<String, FetchStrategy>,
    pub static_fetch: StaticFetchSettings,
    pub rendered_fetch: RenderedFetchSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct StaticFetchSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
    pub user_agent: String,
    #[serde(default)]
    pub rotate_user_agent: bool,
}

impl StaticFetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct RenderedFetchSettings {
    pub webdriver_url: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_secs: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub settle_millis: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub viewport_width: u32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub viewport_height: u32,
    pub headless: bool,
    /// Turning this off passes `--no-sandbox`, needed when chrome runs as root in a container
    #[serde(default = "default_sandbox")]
    pub sandbox: bool,
    /// Bound on each element lookup against the live page
    #[serde(
        default = "default_query_timeout_millis",
        deserialize_with = "deserialize_number_from_string"
    )]
    pub query_timeout_millis: u64,
    pub user_agent: String,
}

fn default_sandbox() -> bool {
    true
}

fn default_query_timeout_millis() -> u64 {
    2000
}

impl RenderedFetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_millis)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_millis)
    }
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir().map_err(|e| {
        config::ConfigError::Message(format!("Failed to determine the current directory: {}", e))
    })?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(
            configuration_directory.join("base.yaml"),
        ))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // APP_APPLICATION__PORT=5001 sets Settings.application.port
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

#[cfg(test)]
mod tests {
    use super::Environment;

    #[test]
    fn environment_parses_case_insensitively() {
        let env: Environment = "Production".to_string().try_into().unwrap();
        assert_eq!(env.as_str(), "production");
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let env: Result<Environment, String> = "staging".to_string().try_into();
        assert!(env.is_err());
    }
}
