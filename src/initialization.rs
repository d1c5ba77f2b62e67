use std::{env, fs};
use log::{info, warn};
use serde::Deserialize;
use crate::errors::ConfigError;
use crate::logging::setup_logger;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WebServerParameters {
    pub bind_address: String,
    pub bind_port: u16,
    pub static_dir: String,
}

impl Default for WebServerParameters {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            bind_port: 3000,
            static_dir: "public".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OpenWeatherParameters {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for OpenWeatherParameters {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org/data/2.5".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct General {
    pub log_path: Option<String>,
    pub log_level: String,
}

impl Default for General {
    fn default() -> Self {
        Self { log_path: None, log_level: "info".to_string() }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub web_server: WebServerParameters,
    pub openweather: OpenWeatherParameters,
    pub general: General,
}

/// Returns a configuration struct for the application and starts logging
///
/// The config file is given with '--config=<path>', without it the defaults are used.
/// OPENWEATHER_API_KEY and PORT in the environment take precedence over the file.
pub fn config() -> Result<Config, ConfigError> {
    let config_path = env::args().find_map(|a| a.strip_prefix("--config=").map(String::from));

    let mut config = match &config_path {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    apply_env(&mut config, env::var("OPENWEATHER_API_KEY").ok(), env::var("PORT").ok())?;

    setup_logger(config.general.log_path.as_deref(), &config.general.log_level)?;

    if let Some(path) = config_path {
        info!("configuration loaded from {}", path);
    }
    if config.openweather.api_key.is_none() {
        warn!("OPENWEATHER_API_KEY is not set, all weather requests will fail");
    }

    Ok(config)
}

/// Loads the configuration file
///
/// # Arguments
///
/// * 'config_path' - path to the config file
fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(config_path)?;
    parse_config(&content)
}

fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let mut config: Config = toml::from_str(content)?;
    config.openweather.api_key = config.openweather.api_key.filter(|k| !k.trim().is_empty());

    Ok(config)
}

/// Applies environment overrides on top of the loaded configuration
///
/// # Arguments
///
/// * 'config' - configuration to update
/// * 'api_key' - value of OPENWEATHER_API_KEY, an empty value is ignored
/// * 'port' - value of PORT
fn apply_env(config: &mut Config, api_key: Option<String>, port: Option<String>) -> Result<(), ConfigError> {
    if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
        config.openweather.api_key = Some(key);
    }

    if let Some(port) = port {
        config.web_server.bind_port = port.trim().parse::<u16>()
            .map_err(|_| ConfigError(format!("invalid PORT: {}", port)))?;
    }

    Ok(())
}
