//! Widget trait, static metadata and error types.

use async_trait::async_trait;
use schemars::schema::RootSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use serde_with::skip_serializing_none;
use thiserror::Error;

use crate::session::Instance;

/// MIME type hosts expect for widget templates.
pub const TEMPLATE_MIME_TYPE: &str = "text/html+skybridge";

/// Errors raised while mounting widgets or applying events to them.
#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Unknown city: {0}")]
    UnknownCity(String),

    #[error("Widget '{widget}' does not handle '{event}' events")]
    UnsupportedEvent {
        widget: &'static str,
        event: &'static str,
    },

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("Widget not found: {0}")]
    WidgetNotFound(String),

    #[error("Failed to serialize widget state: {0}")]
    Serialization(String),
}

/// Status lines the host shows while the tool runs and once it returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub invoking: String,
    pub invoked: String,
}

/// Static description of a widget, consumed by the host that lists and renders it.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetMetadata {
    /// Tool name the host invokes.
    pub name: String,

    /// Human readable description shown next to the tool.
    pub description: String,

    /// Optional progress hints.
    pub tool_invocation: Option<ToolInvocation>,

    /// Whether the rendered widget may call tools on its own.
    pub widget_accessible: bool,

    /// Whether a call result can be rendered as a widget.
    pub result_can_produce_widget: bool,
}

impl WidgetMetadata {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            tool_invocation: None,
            widget_accessible: true,
            result_can_produce_widget: true,
        }
    }

    /// Set the invoking/invoked status lines.
    pub fn with_invocation(mut self, invoking: impl Into<String>, invoked: impl Into<String>) -> Self {
        self.tool_invocation = Some(ToolInvocation {
            invoking: invoking.into(),
            invoked: invoked.into(),
        });
        self
    }

    /// URI of the HTML template the host loads to render this widget.
    pub fn template_uri(&self) -> String {
        format!("ui://widget/{}.html", self.name)
    }

    /// Flatten the display hints into OpenAI Apps `_meta` keys.
    pub fn openai_meta(&self) -> Map<String, Value> {
        let mut meta = Map::new();
        meta.insert("openai/outputTemplate".into(), json!(self.template_uri()));
        if let Some(invocation) = &self.tool_invocation {
            meta.insert(
                "openai/toolInvocation/invoking".into(),
                json!(invocation.invoking),
            );
            meta.insert(
                "openai/toolInvocation/invoked".into(),
                json!(invocation.invoked),
            );
        }
        meta.insert(
            "openai/widgetAccessible".into(),
            json!(self.widget_accessible),
        );
        meta.insert(
            "openai/resultCanProduceWidget".into(),
            json!(self.result_can_produce_widget),
        );
        meta
    }
}

/// Metadata plus the JSON Schema of the widget's parameters.
#[derive(Debug, Clone)]
pub struct WidgetDefinition {
    pub metadata: WidgetMetadata,
    pub parameters: RootSchema,
}

impl WidgetDefinition {
    /// Parameter schema as a plain JSON object, the shape MCP `inputSchema` expects.
    pub fn input_schema(&self) -> Map<String, Value> {
        match serde_json::to_value(&self.parameters) {
            Ok(Value::Object(mut schema)) => {
                schema.entry("type").or_insert_with(|| json!("object"));
                schema
            }
            other => {
                tracing::warn!(
                    "falling back to an open schema for {}: {:?}",
                    self.metadata.name,
                    other.err()
                );
                let mut schema = Map::new();
                schema.insert("type".into(), json!("object"));
                schema
            }
        }
    }
}

/// A widget the host can invoke. Usually implemented through `#[widget(...)]`.
#[async_trait]
pub trait Widget: Send + Sync {
    /// Tool name, identical to `definition().metadata.name`.
    fn widget_name(&self) -> &'static str;

    fn definition(&self) -> WidgetDefinition;

    /// Validate raw arguments and create a fresh widget instance.
    async fn mount(&self, args: Value) -> Result<Instance, WidgetError>;
}
