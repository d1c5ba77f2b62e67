use serde::Deserialize;
use crate::manager_forecast::ForecastEntry;

/// Raw query parameters accepted by the weather and forecast endpoints
///
#[derive(Deserialize, Debug, Default, Clone)]
pub struct LocationQuery {
    pub q: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
}

/// A location the upstream provider can resolve
///
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Query(String),
    Coordinates { lat: f64, lon: f64 },
}

#[derive(Deserialize)]
pub struct FullForecast {
    pub list: Vec<ForecastEntry>,
}
