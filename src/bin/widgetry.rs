use std::time::Duration;

use clap::Parser;
use rmcp::ServiceExt;
use tracing_subscriber::EnvFilter;
use widgetry::options::{ServerOptions, TransportOptions, WeatherOptions, DEFAULT_MAX_SESSIONS, DEFAULT_WEATHER_URL};
use widgetry::WidgetServer;

/// Serve the counter and weather widgets over MCP on stdio.
#[derive(Debug, Parser)]
#[command(name = "widgetry", version, about)]
struct Args {
    /// Base URL of the Open-Meteo compatible forecast API
    #[arg(long, env = "WIDGETRY_WEATHER_URL", default_value = DEFAULT_WEATHER_URL)]
    weather_url: String,

    /// Timeout for weather requests, in seconds
    #[arg(long, env = "WIDGETRY_HTTP_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Proxy for weather requests
    #[arg(long, env = "WIDGETRY_HTTP_PROXY")]
    proxy: Option<String>,

    /// Maximum number of live widget sessions
    #[arg(long, env = "WIDGETRY_MAX_SESSIONS", default_value_t = DEFAULT_MAX_SESSIONS)]
    max_sessions: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries the MCP stream
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let args = Args::parse();

    let mut transport = TransportOptions::new();
    if let Some(secs) = args.timeout_secs {
        transport = transport.with_timeout(Duration::from_secs(secs));
    }
    if let Some(proxy) = args.proxy {
        transport = transport.with_proxy(proxy);
    }

    let weather = WeatherOptions::new()
        .with_base_url(args.weather_url)
        .with_transport(transport);
    let options = ServerOptions::new().with_max_sessions(args.max_sessions);

    let server = WidgetServer::new(weather, options)?;
    tracing::info!("widgetry serving on stdio");

    let service = server.serve(rmcp::transport::stdio()).await?;
    let reason = service.waiting().await?;
    tracing::info!("widgetry stopped: {:?}", reason);

    Ok(())
}
