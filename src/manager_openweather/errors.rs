use std::fmt;
use crate::manager_forecast::ForecastError;

#[derive(Debug)]
pub enum OpenWeatherError {
    Configuration,
    MissingParameters,
    Upstream(String),
    MalformedData(String),
}

impl fmt::Display for OpenWeatherError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OpenWeatherError::Configuration => write!(f, "OpenWeatherError::Configuration: API key not configured"),
            OpenWeatherError::MissingParameters => write!(f, "OpenWeatherError::MissingParameters: expected q or lat/lon"),
            OpenWeatherError::Upstream(e) => write!(f, "OpenWeatherError::Upstream: {}", e),
            OpenWeatherError::MalformedData(e) => write!(f, "OpenWeatherError::MalformedData: {}", e),
        }
    }
}
impl From<reqwest::Error> for OpenWeatherError {
    fn from(e: reqwest::Error) -> Self {
        OpenWeatherError::Upstream(e.to_string())
    }
}
impl From<serde_json::Error> for OpenWeatherError {
    fn from(e: serde_json::Error) -> Self {
        OpenWeatherError::MalformedData(e.to_string())
    }
}
impl From<ForecastError> for OpenWeatherError {
    fn from(e: ForecastError) -> Self {
        OpenWeatherError::MalformedData(e.to_string())
    }
}
