//! Weather source trait and error types.

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::weather::{Coordinates, CurrentConditions};

/// Errors that can occur while fetching current conditions.
///
/// The `Display` text is what the weather widget shows to the user.
#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to fetch weather data")]
    Status(StatusCode),

    #[error("Invalid weather response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Anything that can report current conditions for a coordinate pair.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self, coordinates: Coordinates) -> Result<CurrentConditions, WeatherError>;
}
