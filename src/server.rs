//! MCP server exposing the widgets as tools and their templates as resources.

use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, ErrorData as McpError, Implementation,
    ListResourcesResult, ListToolsResult, PaginatedRequestParam, ReadResourceRequestParam,
    ReadResourceResult, ServerCapabilities, ServerInfo,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::ServerHandler;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, info, warn};

use crate::api::OpenMeteoClient;
use crate::counter::CounterWidget;
use crate::options::{ServerOptions, WeatherOptions};
use crate::session::{RenderedWidget, SessionStore, WidgetEvent};
use crate::source::{WeatherError, WeatherSource};
use crate::template::render_template;
use crate::weather::{CityCatalog, WeatherWidget};
use crate::widget::{Widget, WidgetError, TEMPLATE_MIME_TYPE};

/// Tool the rendered widgets call to report UI events.
pub const EVENT_TOOL: &str = "widget_event";

/// Parameters of the `widget_event` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WidgetEventArgs {
    #[schemars(description = "Session returned when the widget was mounted")]
    pub session_id: String,
    pub event: WidgetEvent,
}

impl From<WidgetError> for McpError {
    fn from(err: WidgetError) -> Self {
        match err {
            WidgetError::Serialization(_) => McpError::internal_error(err.to_string(), None),
            _ => McpError::invalid_params(err.to_string(), None),
        }
    }
}

/// Serves the counter and weather widgets over MCP.
#[derive(Clone)]
pub struct WidgetServer {
    widgets: Arc<Vec<Arc<dyn Widget>>>,
    sessions: Arc<SessionStore>,
    options: Arc<ServerOptions>,
}

impl WidgetServer {
    /// Create a server that fetches weather from Open-Meteo.
    pub fn new(weather: WeatherOptions, options: ServerOptions) -> Result<Self, WeatherError> {
        let client = OpenMeteoClient::new(&weather)?;
        Ok(Self::with_source(Arc::new(client), weather.catalog, options))
    }

    /// Create a server around any weather source.
    pub fn with_source(
        source: Arc<dyn WeatherSource>,
        catalog: CityCatalog,
        options: ServerOptions,
    ) -> Self {
        let widgets: Vec<Arc<dyn Widget>> = vec![
            Arc::new(CounterWidget),
            Arc::new(WeatherWidget::new(catalog)),
        ];

        Self {
            widgets: Arc::new(widgets),
            sessions: Arc::new(SessionStore::new(source, options.max_sessions)),
            options: Arc::new(options),
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn widget(&self, name: &str) -> Option<&Arc<dyn Widget>> {
        self.widgets.iter().find(|w| w.widget_name() == name)
    }

    /// Tool descriptors in MCP wire form.
    pub fn tool_descriptors(&self) -> Vec<Value> {
        let mut tools: Vec<Value> = self
            .widgets
            .iter()
            .map(|widget| {
                let definition = widget.definition();
                json!({
                    "name": definition.metadata.name,
                    "description": definition.metadata.description,
                    "inputSchema": definition.input_schema(),
                    "_meta": definition.metadata.openai_meta(),
                })
            })
            .collect();

        let event_schema = match serde_json::to_value(schemars::schema_for!(WidgetEventArgs)) {
            Ok(schema) => schema,
            Err(e) => {
                warn!("falling back to an open schema for {}: {}", EVENT_TOOL, e);
                json!({ "type": "object" })
            }
        };
        tools.push(json!({
            "name": EVENT_TOOL,
            "description": "Apply a UI event to a mounted widget and return its new view",
            "inputSchema": event_schema,
        }));

        tools
    }

    /// Resource descriptors for the widget templates in MCP wire form.
    pub fn resource_descriptors(&self) -> Vec<Value> {
        self.widgets
            .iter()
            .map(|widget| {
                let metadata = widget.definition().metadata;
                json!({
                    "uri": metadata.template_uri(),
                    "name": metadata.name,
                    "description": metadata.description,
                    "mimeType": TEMPLATE_MIME_TYPE,
                })
            })
            .collect()
    }

    /// Mount a widget or route an event, depending on the tool name.
    pub async fn invoke(&self, name: &str, args: Value) -> Result<RenderedWidget, WidgetError> {
        if name == EVENT_TOOL {
            let args: WidgetEventArgs = serde_json::from_value(args)
                .map_err(|e| WidgetError::InvalidArguments(e.to_string()))?;
            return self.sessions.dispatch(&args.session_id, args.event).await;
        }

        let widget = self
            .widget(name)
            .ok_or_else(|| WidgetError::WidgetNotFound(name.to_string()))?;
        let instance = widget.mount(args).await?;
        self.sessions.open(instance).await
    }

    fn template(&self, uri: &str) -> Option<String> {
        self.widgets
            .iter()
            .map(|widget| widget.definition().metadata)
            .find(|metadata| metadata.template_uri() == uri)
            .map(|metadata| render_template(&metadata))
    }
}

fn from_wire<T: DeserializeOwned>(value: Value) -> Result<T, McpError> {
    serde_json::from_value(value).map_err(|e| McpError::internal_error(e.to_string(), None))
}

impl ServerHandler for WidgetServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: self.options.name.clone(),
                version: self.options.version.clone(),
                ..Default::default()
            },
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            instructions: self.options.instructions.clone(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        from_wire(json!({ "tools": self.tool_descriptors() }))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let args = Value::Object(request.arguments.unwrap_or_else(Map::new));
        info!("tool call: {}", request.name);

        let rendered = self.invoke(&request.name, args).await?;
        let structured = serde_json::to_value(&rendered)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;

        let mut result = CallToolResult::success(vec![Content::text(rendered.summary)]);
        result.structured_content = Some(structured);
        Ok(result)
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        from_wire(json!({ "resources": self.resource_descriptors() }))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        debug!("read resource: {}", request.uri);
        let text = self.template(&request.uri).ok_or_else(|| {
            McpError::invalid_params(format!("Resource not found: {}", request.uri), None)
        })?;

        from_wire(json!({
            "contents": [{
                "uri": request.uri,
                "mimeType": TEMPLATE_MIME_TYPE,
                "text": text,
            }]
        }))
    }
}
