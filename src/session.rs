//! Mounted widget instances and the driver that applies UI events to them.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::counter::{Counter, CounterAction};
use crate::source::{WeatherError, WeatherSource};
use crate::weather::{CurrentConditions, FetchTicket, WeatherState};
use crate::widget::WidgetError;

/// A UI event raised by a rendered widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WidgetEvent {
    Increment,
    Decrement,
    Reset,
    SelectCity {
        #[schemars(description = "Name of a city offered by the widget")]
        city: String,
    },
}

impl WidgetEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WidgetEvent::Increment => "increment",
            WidgetEvent::Decrement => "decrement",
            WidgetEvent::Reset => "reset",
            WidgetEvent::SelectCity { .. } => "selectCity",
        }
    }
}

/// Work a widget asks for after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    FetchWeather(FetchTicket),
}

/// State of one mounted widget.
#[derive(Debug, Clone)]
pub enum Instance {
    Counter(Counter),
    Weather(WeatherState),
}

impl Instance {
    pub fn widget_name(&self) -> &'static str {
        match self {
            Instance::Counter(_) => "counter",
            Instance::Weather(_) => "weather",
        }
    }

    /// Effect to run right after mounting.
    pub fn mount(&mut self) -> Effect {
        match self {
            Instance::Counter(_) => Effect::None,
            Instance::Weather(state) => {
                let default = state.catalog().default_city().name.clone();
                match state.select(&default) {
                    Ok(ticket) => Effect::FetchWeather(ticket),
                    Err(_) => Effect::None,
                }
            }
        }
    }

    pub fn handle(&mut self, event: WidgetEvent) -> Result<Effect, WidgetError> {
        match (self, event) {
            (Instance::Counter(counter), WidgetEvent::Increment) => {
                counter.apply(CounterAction::Increment);
                Ok(Effect::None)
            }
            (Instance::Counter(counter), WidgetEvent::Decrement) => {
                counter.apply(CounterAction::Decrement);
                Ok(Effect::None)
            }
            (Instance::Counter(counter), WidgetEvent::Reset) => {
                counter.apply(CounterAction::Reset);
                Ok(Effect::None)
            }
            (Instance::Weather(state), WidgetEvent::SelectCity { city }) => {
                state.select(&city).map(Effect::FetchWeather)
            }
            (instance, event) => Err(WidgetError::UnsupportedEvent {
                widget: instance.widget_name(),
                event: event.name(),
            }),
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Instance::Counter(counter) => counter.summary(),
            Instance::Weather(state) => state.summary(),
        }
    }

    pub fn state(&self) -> Result<Value, WidgetError> {
        let state = match self {
            Instance::Counter(counter) => serde_json::to_value(counter),
            Instance::Weather(state) => serde_json::to_value(state),
        };
        state.map_err(|e| WidgetError::Serialization(e.to_string()))
    }

    fn snapshot(&self, id: &str) -> Result<RenderedWidget, WidgetError> {
        Ok(RenderedWidget {
            session_id: id.to_string(),
            widget: self.widget_name(),
            html: self.to_html(),
            state: self.state()?,
            summary: self.summary(),
        })
    }

    pub fn to_html(&self) -> String {
        match self {
            Instance::Counter(counter) => counter.render().to_html(),
            Instance::Weather(state) => state.render().to_html(),
        }
    }
}

/// Snapshot of a session handed back to the host.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedWidget {
    pub session_id: String,
    pub widget: &'static str,
    pub html: String,
    pub state: Value,
    #[serde(skip)]
    pub summary: String,
}

#[derive(Default)]
struct Sessions {
    instances: HashMap<String, Instance>,
    order: VecDeque<String>,
}

/// In-memory store of mounted widgets.
///
/// The lock is released while a weather request is in flight; a later
/// selection on the same session supersedes the earlier one.
pub struct SessionStore {
    sessions: Mutex<Sessions>,
    weather: Arc<dyn WeatherSource>,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(weather: Arc<dyn WeatherSource>, max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(Sessions::default()),
            weather,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Run the mount effect of a fresh instance, then store and render it.
    ///
    /// The instance is not visible to other callers until its mount effect
    /// has resolved, so eviction cannot race the initial fetch.
    pub async fn open(&self, mut instance: Instance) -> Result<RenderedWidget, WidgetError> {
        let id = Uuid::new_v4().to_string();

        if let Effect::FetchWeather(ticket) = instance.mount() {
            let outcome = self.fetch(&ticket).await;
            if let Instance::Weather(state) = &mut instance {
                state.resolve(&ticket, outcome);
            }
        }

        let rendered = instance.snapshot(&id)?;
        info!("opened {} session {}", instance.widget_name(), id);

        let mut sessions = self.sessions.lock().await;
        sessions.instances.insert(id.clone(), instance);
        sessions.order.push_back(id);
        while sessions.order.len() > self.max_sessions {
            if let Some(oldest) = sessions.order.pop_front() {
                sessions.instances.remove(&oldest);
                debug!("evicted session {}", oldest);
            }
        }

        Ok(rendered)
    }

    /// Apply a UI event to a session and render the result.
    pub async fn dispatch(
        &self,
        id: &str,
        event: WidgetEvent,
    ) -> Result<RenderedWidget, WidgetError> {
        debug!("session {} <- {:?}", id, event);
        let effect = {
            let mut sessions = self.sessions.lock().await;
            let instance = sessions
                .instances
                .get_mut(id)
                .ok_or_else(|| WidgetError::SessionNotFound(id.to_string()))?;
            instance.handle(event)?
        };

        self.drive(id, effect).await
    }

    pub async fn render(&self, id: &str) -> Result<RenderedWidget, WidgetError> {
        let sessions = self.sessions.lock().await;
        let instance = sessions
            .instances
            .get(id)
            .ok_or_else(|| WidgetError::SessionNotFound(id.to_string()))?;

        instance.snapshot(id)
    }

    /// Drop a session. Returns false if it did not exist.
    pub async fn close(&self, id: &str) -> bool {
        let mut sessions = self.sessions.lock().await;
        sessions.order.retain(|key| key != id);
        sessions.instances.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.instances.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn drive(&self, id: &str, effect: Effect) -> Result<RenderedWidget, WidgetError> {
        if let Effect::FetchWeather(ticket) = effect {
            let outcome = self.fetch(&ticket).await;

            let mut sessions = self.sessions.lock().await;
            if let Some(Instance::Weather(state)) = sessions.instances.get_mut(id) {
                if !state.resolve(&ticket, outcome) {
                    debug!("discarded superseded response for {}", ticket.city.name);
                }
            }
        }

        self.render(id).await
    }

    async fn fetch(&self, ticket: &FetchTicket) -> Result<CurrentConditions, WeatherError> {
        let outcome = self.weather.current(ticket.coordinates()).await;
        if let Err(err) = &outcome {
            warn!("weather fetch for {} failed: {}", ticket.city.name, err);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::CityCatalog;

    #[test]
    fn state_serializes_both_widgets() {
        let counter = Instance::Counter(Counter::new(4));
        assert_eq!(counter.state().unwrap()["count"], 4);

        let weather = Instance::Weather(WeatherState::new(CityCatalog::default()));
        let state = weather.state().unwrap();
        assert_eq!(state["selectedCity"], "Buenos Aires");
        assert_eq!(state["loading"], false);
    }

    #[test]
    fn snapshot_carries_session_and_summary() {
        let rendered = Instance::Counter(Counter::new(-2)).snapshot("abc").unwrap();

        assert_eq!(rendered.session_id, "abc");
        assert_eq!(rendered.widget, "counter");
        assert_eq!(rendered.summary, "Counter: -2");
        assert!(rendered.html.contains(">-2</div>"));
    }
}
