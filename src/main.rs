mod errors;
mod logging;
mod initialization;
mod handlers;
mod manager_forecast;
mod manager_openweather;

use actix_web::{web, App, HttpServer};
use log::info;
use crate::errors::UnrecoverableError;
use crate::handlers::{forecast, frontend, weather};
use crate::initialization::config;
use crate::manager_openweather::OpenWeather;

struct AppState {
    openweather: OpenWeather,
}

#[actix_web::main]
async fn main() -> Result<(), UnrecoverableError> {
    let config = config()?;

    let openweather = OpenWeather::new(
        &config.openweather.base_url,
        config.openweather.api_key.clone(),
        config.openweather.timeout_secs,
    )?;
    let static_dir = config.web_server.static_dir.clone();

    info!("server running on {}:{}", config.web_server.bind_address, config.web_server.bind_port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(AppState { openweather: openweather.clone() }))
            .service(weather)
            .service(forecast)
            .service(frontend(&static_dir))
    })
        .bind((config.web_server.bind_address, config.web_server.bind_port))?
        .run()
        .await?;

    Ok(())
}
