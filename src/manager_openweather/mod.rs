pub mod errors;
pub mod models;

use std::time::Duration;
use reqwest::Client;
use serde_json::Value;
use crate::manager_forecast::ForecastEntry;
use crate::manager_openweather::errors::OpenWeatherError;
use crate::manager_openweather::models::{FullForecast, Location, LocationQuery};

/// Units requested from OpenWeather, temperatures in Celsius and wind in m/s
const UNITS: &str = "metric";

impl LocationQuery {
    /// Resolves the raw query into a location.
    ///
    /// A non-blank `q` wins over coordinates, otherwise both `lat` and `lon` must be present
    /// and numeric.
    pub fn location(&self) -> Result<Location, OpenWeatherError> {
        if let Some(q) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            return Ok(Location::Query(q.to_string()));
        }

        match (self.lat.as_deref(), self.lon.as_deref()) {
            (Some(lat), Some(lon)) => {
                Ok(Location::Coordinates { lat: coordinate(lat)?, lon: coordinate(lon)? })
            }
            _ => Err(OpenWeatherError::MissingParameters),
        }
    }
}

/// Parses one coordinate, NaN and infinities count as missing
fn coordinate(value: &str) -> Result<f64, OpenWeatherError> {
    value.trim().parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or(OpenWeatherError::MissingParameters)
}

/// Struct for proxying current weather and forecasts from OpenWeather
#[derive(Clone)]
pub struct OpenWeather {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenWeather {
    /// Returns an OpenWeather struct ready for fetching weather data
    ///
    /// A missing api key is accepted here, every request will then fail with
    /// `OpenWeatherError::Configuration` instead.
    ///
    /// # Arguments
    ///
    /// * 'base_url' - base url of the OpenWeather data api, without trailing slash
    /// * 'api_key' - the OpenWeather api key (appid)
    /// * 'timeout_secs' - request timeout in seconds
    pub fn new(base_url: &str, api_key: Option<String>, timeout_secs: u64) -> Result<OpenWeather, OpenWeatherError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }

    /// Retrieves current weather for the given location and returns the upstream document as is
    ///
    /// # Arguments
    ///
    /// * 'query' - raw location query from the client
    pub async fn current_weather(&self, query: &LocationQuery) -> Result<Value, OpenWeatherError> {
        let json = self.get("weather", query).await?;

        Ok(serde_json::from_str(&json)?)
    }

    /// Retrieves the 3-hourly forecast list for the given location
    ///
    /// # Arguments
    ///
    /// * 'query' - raw location query from the client
    pub async fn forecast(&self, query: &LocationQuery) -> Result<Vec<ForecastEntry>, OpenWeatherError> {
        let json = self.get("forecast", query).await?;
        let forecast: FullForecast = serde_json::from_str(&json)?;

        Ok(forecast.list)
    }

    /// Makes a GET request to the given endpoint and returns the body of a successful response
    ///
    /// The api key is checked before the location so that an unconfigured server always
    /// reports the configuration problem.
    ///
    /// # Arguments
    ///
    /// * 'endpoint' - endpoint name relative to the base url
    /// * 'query' - raw location query from the client
    async fn get(&self, endpoint: &str, query: &LocationQuery) -> Result<String, OpenWeatherError> {
        let api_key = self.api_key.as_deref().ok_or(OpenWeatherError::Configuration)?;

        let mut params: Vec<(&str, String)> = match query.location()? {
            Location::Query(q) => vec![("q", q)],
            Location::Coordinates { lat, lon } => vec![("lat", lat.to_string()), ("lon", lon.to_string())],
        };
        params.push(("appid", api_key.to_string()));
        params.push(("units", UNITS.to_string()));

        let url = format!("{}/{}", self.base_url, endpoint);
        let req = self.client
            .get(url)
            .query(&params)
            .send().await?;

        let status = req.status();
        if !status.is_success() {
            return Err(OpenWeatherError::Upstream(format!("Error while fetching {} from OpenWeather: {}", endpoint, status)));
        }

        Ok(req.text().await?)
    }
}
