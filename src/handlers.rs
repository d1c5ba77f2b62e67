use std::path::PathBuf;
use actix_files::{Files, NamedFile};
use actix_web::dev::{fn_service, ServiceRequest, ServiceResponse};
use actix_web::{get, web, HttpResponse, Responder};
use log::{error, info};
use serde::Serialize;
use crate::AppState;
use crate::manager_forecast::{daily_summaries, DailySummary};
use crate::manager_openweather::errors::OpenWeatherError;
use crate::manager_openweather::models::LocationQuery;
use crate::manager_openweather::OpenWeather;

/// Number of days returned by the forecast endpoint
const FORECAST_DAYS: usize = 3;

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

#[derive(Serialize)]
struct ForecastBody {
    daily: Vec<DailySummary>,
}

// q=Johannesburg or lat=-26.2&lon=28.04
#[get("/api/weather")]
pub async fn weather(params: web::Query<LocationQuery>, data: web::Data<AppState>) -> impl Responder {
    info!("weather {:?}", params);

    match data.openweather.current_weather(&params).await {
        Ok(json) => HttpResponse::Ok().json(json),
        Err(e) => {
            error!("failed to fetch weather: {}", e);
            error_response(&e, "Weather fetch failed")
        }
    }
}

#[get("/api/forecast")]
pub async fn forecast(params: web::Query<LocationQuery>, data: web::Data<AppState>) -> impl Responder {
    info!("forecast {:?}", params);

    match daily_forecast(&data.openweather, &params).await {
        Ok(daily) => HttpResponse::Ok().json(ForecastBody { daily }),
        Err(e) => {
            error!("failed to fetch forecast: {}", e);
            error_response(&e, "Forecast fetch failed")
        }
    }
}

/// Serves the single page frontend, unknown paths get index.html
///
/// # Arguments
///
/// * 'static_dir' - directory holding index.html and its assets
pub fn frontend(static_dir: &str) -> Files {
    let index = PathBuf::from(static_dir).join("index.html");

    Files::new("/", static_dir)
        .index_file("index.html")
        .default_handler(fn_service(move |req: ServiceRequest| {
            let index = index.clone();
            async move {
                let (req, _) = req.into_parts();
                let file = NamedFile::open_async(index).await?;
                let res = file.into_response(&req);
                Ok::<ServiceResponse, actix_web::Error>(ServiceResponse::new(req, res))
            }
        }))
}

async fn daily_forecast(openweather: &OpenWeather, params: &LocationQuery) -> Result<Vec<DailySummary>, OpenWeatherError> {
    let list = openweather.forecast(params).await?;

    Ok(daily_summaries(&list, FORECAST_DAYS)?)
}

/// Maps an error to the response shown to the browser, details stay in the log
///
/// # Arguments
///
/// * 'e' - the error
/// * 'fetch_failed' - message for upstream and data errors
fn error_response(e: &OpenWeatherError, fetch_failed: &'static str) -> HttpResponse {
    match e {
        OpenWeatherError::Configuration =>
            HttpResponse::InternalServerError().json(ErrorBody { error: "API key not configured" }),
        OpenWeatherError::MissingParameters =>
            HttpResponse::BadRequest().json(ErrorBody { error: "Missing parameters" }),
        OpenWeatherError::Upstream(_) | OpenWeatherError::MalformedData(_) =>
            HttpResponse::InternalServerError().json(ErrorBody { error: fetch_failed }),
    }
}
