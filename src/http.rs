//! HTTP client utilities shared by weather API clients.

use reqwest::{Client, RequestBuilder};

use crate::options::TransportOptions;
use crate::source::WeatherError;

/// Build a configured HTTP client from transport options.
pub fn build_http_client(transport_options: &TransportOptions) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder();

    match transport_options {
        TransportOptions::Http {
            timeout,
            proxy,
            user_agent,
            ..
        } => {
            if let Some(t) = timeout {
                builder = builder.timeout(*t);
            }
            if let Some(proxy_url) = proxy {
                match reqwest::Proxy::all(proxy_url) {
                    Ok(p) => builder = builder.proxy(p),
                    Err(e) => tracing::warn!("ignoring invalid proxy {}: {}", proxy_url, e),
                }
            }
            if let Some(agent) = user_agent {
                builder = builder.user_agent(agent.clone());
            }
        }
    }

    builder.build()
}

/// Add extra headers to a request if specified in transport options.
pub fn add_extra_headers(
    mut request: RequestBuilder,
    transport_options: &TransportOptions,
) -> RequestBuilder {
    match transport_options {
        TransportOptions::Http {
            headers: Some(h), ..
        } => {
            for (key, value) in h {
                request = request.header(key, value);
            }
        }
        TransportOptions::Http { headers: None, .. } => {}
    }
    request
}

/// Extension trait for Response that logs the body before decoding it.
#[async_trait::async_trait]
pub trait ResponseExt {
    /// Parse response as JSON and log it. Consumes the response.
    async fn json_logged<T: serde::de::DeserializeOwned>(self) -> Result<T, WeatherError>;
}

#[async_trait::async_trait]
impl ResponseExt for reqwest::Response {
    async fn json_logged<T: serde::de::DeserializeOwned>(self) -> Result<T, WeatherError> {
        let bytes = self.bytes().await?;

        if let Ok(text) = std::str::from_utf8(&bytes) {
            tracing::debug!("API response ({} bytes):\n{}", text.len(), text);
        }

        serde_json::from_slice(&bytes).map_err(WeatherError::from)
    }
}
