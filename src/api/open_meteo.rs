//! Open-Meteo forecast API client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::http::{add_extra_headers, build_http_client, ResponseExt};
use crate::options::{TransportOptions, WeatherOptions};
use crate::source::{WeatherError, WeatherSource};
use crate::weather::{Coordinates, CurrentConditions};

/// Variables requested in the `current` block.
pub const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current: CurrentConditions,
}

/// Fetches current conditions from `{base_url}/v1/forecast`.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: Client,
    base_url: String,
    transport_options: TransportOptions,
}

impl OpenMeteoClient {
    pub fn new(options: &WeatherOptions) -> Result<Self, WeatherError> {
        if options.base_url.trim().is_empty() {
            return Err(WeatherError::Config("weather base URL is empty".to_string()));
        }

        Ok(Self {
            http: build_http_client(&options.transport)?,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            transport_options: options.transport.clone(),
        })
    }

    pub fn forecast_url(&self) -> String {
        format!("{}/v1/forecast", self.base_url)
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoClient {
    async fn current(&self, coordinates: Coordinates) -> Result<CurrentConditions, WeatherError> {
        let url = self.forecast_url();
        debug!(
            "GET {} latitude={} longitude={}",
            url, coordinates.latitude, coordinates.longitude
        );

        let request = self.http.get(&url).query(&[
            ("latitude", coordinates.latitude.to_string()),
            ("longitude", coordinates.longitude.to_string()),
            ("current", CURRENT_FIELDS.to_string()),
        ]);
        let response = add_extra_headers(request, &self.transport_options)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("weather API returned {}", status);
            return Err(WeatherError::Status(status));
        }

        let forecast: ForecastResponse = response.json_logged().await?;
        Ok(forecast.current)
    }
}
