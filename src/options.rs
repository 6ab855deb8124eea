//! Configuration for the weather client, its transport and the widget server.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::collections::HashMap;
use std::time::Duration;

use crate::weather::CityCatalog;

/// Default Open-Meteo endpoint.
pub const DEFAULT_WEATHER_URL: &str = "https://api.open-meteo.com";

/// Default upper bound on live widget sessions.
pub const DEFAULT_MAX_SESSIONS: usize = 1024;

/// Transport configuration options.
///
/// Controls how weather requests are sent over the network.
#[derive(Debug, Clone)]
pub enum TransportOptions {
    /// HTTP transport configuration
    Http {
        /// Request timeout. If None, requests never time out.
        timeout: Option<Duration>,
        /// HTTP proxy URL.
        proxy: Option<String>,
        /// Additional HTTP headers to send with every request.
        headers: Option<HashMap<String, String>>,
        /// Value of the `User-Agent` header.
        user_agent: Option<String>,
    },
}

impl Default for TransportOptions {
    fn default() -> Self {
        TransportOptions::Http {
            timeout: None,
            proxy: None,
            headers: None,
            user_agent: Some(concat!("widgetry/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

impl TransportOptions {
    /// Create new default HTTP transport options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, duration: Duration) -> Self {
        match &mut self {
            TransportOptions::Http { timeout, .. } => *timeout = Some(duration),
        }
        self
    }

    pub fn with_proxy(mut self, proxy_url: impl Into<String>) -> Self {
        match &mut self {
            TransportOptions::Http { proxy, .. } => *proxy = Some(proxy_url.into()),
        }
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        match &mut self {
            TransportOptions::Http { headers, .. } => {
                headers
                    .get_or_insert_with(HashMap::new)
                    .insert(key.into(), value.into());
            }
        }
        self
    }

    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        match &mut self {
            TransportOptions::Http { user_agent, .. } => *user_agent = Some(agent.into()),
        }
        self
    }
}

/// Where and how current conditions are fetched.
#[derive(Debug, Clone)]
pub struct WeatherOptions {
    /// Base URL of the forecast API, without the `/v1/forecast` path.
    pub base_url: String,
    pub transport: TransportOptions,
    /// Cities offered by the weather widget.
    pub catalog: CityCatalog,
}

impl Default for WeatherOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WEATHER_URL.to_string(),
            transport: TransportOptions::default(),
            catalog: CityCatalog::default(),
        }
    }
}

impl WeatherOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_transport(mut self, transport: TransportOptions) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_catalog(mut self, catalog: CityCatalog) -> Self {
        self.catalog = catalog;
        self
    }
}

/// Identity and limits of the MCP widget server.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerOptions {
    pub name: String,
    pub version: String,
    /// Optional instructions advertised to the host.
    pub instructions: Option<String>,
    /// Oldest sessions are evicted beyond this count.
    pub max_sessions: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            name: "widgetry".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            instructions: None,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl ServerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max.max(1);
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }
}
