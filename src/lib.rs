//! # widgetry - interactive widgets served as MCP tools
//!
//! A small crate that exposes two presentational widgets, a counter and a
//! weather display, to hosts that invoke tools and render the UI they return.
//!
//! ## Architecture
//!
//! 1. **Widgets** declare static metadata and a parameter schema, and mount
//!    fresh **instances** when invoked.
//! 2. **Sessions** keep mounted instances alive and apply UI events to them,
//!    running the one effect a widget can request (a weather fetch).
//! 3. The **server** speaks MCP: widgets become tools, their HTML templates
//!    become resources, and `widget_event` routes clicks back to sessions.
//!
//! ## Example
//! ```no_run
//! use rmcp::ServiceExt;
//! use widgetry::options::{ServerOptions, WeatherOptions};
//! use widgetry::WidgetServer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = WidgetServer::new(WeatherOptions::default(), ServerOptions::default())?;
//!     let service = server.serve(rmcp::transport::stdio()).await?;
//!     service.waiting().await?;
//!     Ok(())
//! }
//! ```

extern crate self as widgetry;

pub mod api;
pub mod counter;
pub mod http;
pub mod options;
pub mod server;
pub mod session;
pub mod source;
pub mod template;
pub mod view;
pub mod weather;
pub mod widget;

pub use counter::{Counter, CounterAction, CounterWidget};
pub use server::{WidgetServer, EVENT_TOOL};
pub use session::{Effect, Instance, RenderedWidget, SessionStore, WidgetEvent};
pub use source::{WeatherError, WeatherSource};
pub use weather::{City, CityCatalog, Coordinates, CurrentConditions, WeatherState, WeatherWidget};
pub use widget::{Widget, WidgetDefinition, WidgetError, WidgetMetadata};

// Re-export rmcp for convenience
pub use rmcp;

// Re-export the proc macro attribute
pub use widgetry_macros::widget;
