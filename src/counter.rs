//! Counter widget: one integer and three pure transitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use widgetry_macros::widget;

use crate::session::Instance;
use crate::view::{Element, Node};
use crate::widget::WidgetError;

/// Parameters accepted by the `counter` tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CounterArgs {
    #[serde(rename = "initialCount")]
    #[schemars(description = "The initial count value")]
    pub initial_count: i64,
}

/// A transition the counter view can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterAction {
    Increment,
    Decrement,
    Reset,
}

/// Counter state. Arithmetic wraps at the `i64` bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Counter {
    count: i64,
}

impl Counter {
    pub fn new(initial: i64) -> Self {
        Self { count: initial }
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    pub fn increment(&mut self) {
        self.count = self.count.wrapping_add(1);
    }

    pub fn decrement(&mut self) {
        self.count = self.count.wrapping_sub(1);
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    pub fn apply(&mut self, action: CounterAction) {
        match action {
            CounterAction::Increment => self.increment(),
            CounterAction::Decrement => self.decrement(),
            CounterAction::Reset => self.reset(),
        }
    }

    pub fn summary(&self) -> String {
        format!("Counter: {}", self.count)
    }

    pub fn render(&self) -> Node {
        const CONTROL: &str = "px-8 py-4 bg-white/5 hover:bg-white/10 border border-white/10 hover:border-white/20 transition-all duration-200 text-sm font-mono uppercase tracking-wider";

        let display = Element::div()
            .class("text-center mb-16")
            .child(
                Element::div()
                    .class("text-sm font-mono text-zinc-500 uppercase tracking-wider mb-4")
                    .child("Counter"),
            )
            .child(
                Element::div()
                    .class("text-8xl font-light tracking-tight mb-2")
                    .attr("data-role", "count")
                    .child(self.count.to_string()),
            );

        let controls = Element::div()
            .class("space-y-4")
            .child(
                Element::div()
                    .class("grid grid-cols-2 gap-4")
                    .child(Element::button().class(CONTROL).on_event("decrement").child("Decrement"))
                    .child(Element::button().class(CONTROL).on_event("increment").child("Increment")),
            )
            .child(
                Element::button()
                    .class("w-full px-8 py-4 bg-white text-black hover:bg-zinc-200 transition-all duration-200 text-sm font-mono uppercase tracking-wider")
                    .on_event("reset")
                    .child("Reset"),
            );

        Element::div()
            .class("min-h-screen bg-black text-white flex items-center justify-center p-8")
            .child(
                Element::div()
                    .class("w-full max-w-md")
                    .child(display)
                    .child(controls),
            )
            .into()
    }
}

/// The `counter` tool.
#[derive(Debug, Clone, Default)]
pub struct CounterWidget;

#[widget(
    name = "counter",
    description = "Interactive counter",
    invoking = "Loading counter",
    invoked = "Counter loaded"
)]
impl CounterWidget {
    async fn call(&self, args: CounterArgs) -> Result<Instance, WidgetError> {
        Ok(Instance::Counter(Counter::new(args.initial_count)))
    }
}
