//! HTML shell the host loads for every widget.
//!
//! The shell paints `structuredContent.html` from the tool result and
//! forwards clicks on `[data-widget-event]` elements to the `widget_event`
//! tool, repainting from its result.

use crate::widget::WidgetMetadata;

const BRIDGE: &str = r#"
const root = document.getElementById("widget-root");
let sessionId = null;

function paint(output) {
  if (!output || !output.html) return;
  sessionId = output.sessionId;
  root.innerHTML = output.html;
  root.removeAttribute("aria-busy");
}

root.addEventListener("click", async (click) => {
  const target = click.target.closest("[data-widget-event]");
  if (!target || !sessionId || !window.openai) return;
  const event = { type: target.dataset.widgetEvent };
  if (target.dataset.city) event.city = target.dataset.city;
  root.setAttribute("aria-busy", "true");
  try {
    const result = await window.openai.callTool("widget_event", { sessionId, event });
    paint(result && result.structuredContent);
  } finally {
    root.removeAttribute("aria-busy");
  }
});

paint(window.openai && window.openai.toolOutput);
window.addEventListener("openai:set_globals", () => paint(window.openai.toolOutput));
"#;

/// Render the template served at `metadata.template_uri()`.
pub fn render_template(metadata: &WidgetMetadata) -> String {
    format!(
        concat!(
            "<!doctype html>\n",
            "<html lang=\"en\">\n",
            "<head>\n",
            "<meta charset=\"utf-8\">\n",
            "<title>{title}</title>\n",
            "<script src=\"https://cdn.tailwindcss.com\"></script>\n",
            "</head>\n",
            "<body class=\"bg-black\">\n",
            "<div id=\"widget-root\" data-widget=\"{name}\" aria-busy=\"true\"></div>\n",
            "<script type=\"module\">{bridge}</script>\n",
            "</body>\n",
            "</html>\n"
        ),
        title = metadata.description,
        name = metadata.name,
        bridge = BRIDGE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_names_widget_and_bridges_events() {
        let html = render_template(&WidgetMetadata::new("counter", "Interactive counter"));

        assert!(html.contains("data-widget=\"counter\""));
        assert!(html.contains("<title>Interactive counter</title>"));
        assert!(html.contains("callTool(\"widget_event\""));
    }
}
