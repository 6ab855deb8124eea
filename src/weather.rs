//! Weather widget: a city picker backed by current conditions from a [`WeatherSource`].
//!
//! [`WeatherSource`]: crate::source::WeatherSource

use nonempty::NonEmpty;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use widgetry_macros::widget;

use crate::session::Instance;
use crate::source::WeatherError;
use crate::view::{Element, Node};
use crate::widget::WidgetError;

/// A point on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub coordinates: Coordinates,
}

impl City {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            coordinates: Coordinates {
                latitude,
                longitude,
            },
        }
    }
}

/// Ordered set of selectable cities. The first entry is the default selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityCatalog {
    cities: NonEmpty<City>,
}

impl Default for CityCatalog {
    fn default() -> Self {
        Self::new(
            City::new("Buenos Aires", -34.6037, -58.3816),
            vec![
                City::new("San Francisco", 37.7749, -122.4194),
                City::new("Berlin", 52.52, 13.405),
                City::new("Tokyo", 35.6762, 139.6503),
                City::new("New York", 40.7128, -74.006),
            ],
        )
    }
}

impl CityCatalog {
    pub fn new(default: City, others: Vec<City>) -> Self {
        Self {
            cities: NonEmpty {
                head: default,
                tail: others,
            },
        }
    }

    pub fn default_city(&self) -> &City {
        &self.cities.head
    }

    pub fn find(&self, name: &str) -> Option<&City> {
        self.cities.iter().find(|city| city.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &City> {
        self.cities.iter()
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Fields read from the `current` block of a forecast response.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temperature_2m: f64,
    pub relative_humidity_2m: f64,
    pub wind_speed_10m: f64,
    pub weather_code: Option<i64>,
    pub time: Option<String>,
}

/// Proof that a fetch was started for a given selection.
///
/// Only the ticket from the most recent selection is accepted by
/// [`WeatherState::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub struct FetchTicket {
    generation: u64,
    pub city: City,
}

impl FetchTicket {
    pub fn coordinates(&self) -> Coordinates {
        self.city.coordinates
    }
}

/// View state of one mounted weather widget.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherState {
    #[serde(skip)]
    catalog: CityCatalog,
    selected_city: String,
    report: Option<CurrentConditions>,
    loading: bool,
    error: Option<String>,
    #[serde(skip)]
    generation: u64,
}

impl WeatherState {
    pub fn new(catalog: CityCatalog) -> Self {
        let selected_city = catalog.default_city().name.clone();
        Self {
            catalog,
            selected_city,
            report: None,
            loading: false,
            error: None,
            generation: 0,
        }
    }

    pub fn selected_city(&self) -> &str {
        &self.selected_city
    }

    pub fn report(&self) -> Option<&CurrentConditions> {
        self.report.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn catalog(&self) -> &CityCatalog {
        &self.catalog
    }

    /// Select a catalog city and start loading it. Unknown names leave the state untouched.
    pub fn select(&mut self, name: &str) -> Result<FetchTicket, WidgetError> {
        let city = self
            .catalog
            .find(name)
            .cloned()
            .ok_or_else(|| WidgetError::UnknownCity(name.to_string()))?;

        self.generation += 1;
        self.selected_city = city.name.clone();
        self.loading = true;
        self.error = None;

        Ok(FetchTicket {
            generation: self.generation,
            city,
        })
    }

    /// Apply the outcome of a fetch. Returns false when the ticket was superseded.
    pub fn resolve(
        &mut self,
        ticket: &FetchTicket,
        outcome: Result<CurrentConditions, WeatherError>,
    ) -> bool {
        if ticket.generation != self.generation {
            return false;
        }

        match outcome {
            Ok(report) => {
                self.report = Some(report);
                self.error = None;
            }
            Err(err) => {
                self.report = None;
                self.error = Some(err.to_string());
            }
        }
        self.loading = false;
        true
    }

    pub fn summary(&self) -> String {
        if self.loading {
            return format!("Loading weather for {}", self.selected_city);
        }
        if let Some(error) = &self.error {
            return format!("Weather for {} unavailable: {}", self.selected_city, error);
        }
        match &self.report {
            Some(report) => format!(
                "Weather in {}: {}°, {}% humidity, {} km/h wind",
                self.selected_city,
                report.temperature_2m,
                report.relative_humidity_2m,
                report.wind_speed_10m
            ),
            None => format!("Weather for {}", self.selected_city),
        }
    }

    pub fn render(&self) -> Node {
        const LABEL: &str = "text-sm font-mono text-zinc-500 uppercase tracking-wider mb-4";

        let header = Element::div()
            .class("text-center mb-12")
            .child(
                Element::div()
                    .class("text-sm font-mono text-zinc-500 uppercase tracking-wider mb-2")
                    .child("Weather"),
            )
            .child(
                Element::new("h1")
                    .class("text-5xl font-light tracking-tight")
                    .child(self.selected_city.as_str()),
            );

        let picker = Element::div().class("mb-16").child(
            Element::div()
                .class("flex flex-wrap justify-center gap-3")
                .children(self.catalog.iter().map(|city| {
                    let look = if city.name == self.selected_city {
                        "bg-white text-black"
                    } else {
                        "bg-white/5 hover:bg-white/10 border border-white/10 hover:border-white/20"
                    };
                    Element::button()
                        .class(format!(
                            "px-6 py-3 text-sm font-mono uppercase tracking-wider transition-all duration-200 {}",
                            look
                        ))
                        .on_event("selectCity")
                        .attr("data-city", city.name.as_str())
                        .child(city.name.as_str())
                })),
        );

        let mut body = Element::div()
            .class("max-w-4xl mx-auto")
            .child(header)
            .child(picker);

        if self.loading {
            body = body.child(
                Element::div()
                    .class("text-center text-zinc-500 font-mono text-sm")
                    .child("Loading..."),
            );
        }

        if let Some(error) = &self.error {
            body = body.child(
                Element::div()
                    .class("text-center text-red-400 font-mono text-sm border border-red-400/20 bg-red-400/5 py-4")
                    .attr("role", "alert")
                    .child(format!("Error: {}", error)),
            );
        }

        if let (Some(report), false) = (&self.report, self.loading) {
            let card = |label: &str, value: Node| {
                Element::div()
                    .class("border border-white/10 bg-white/5 p-8 hover:border-white/20 transition-all duration-200")
                    .child(Element::div().class(LABEL).child(label))
                    .child(
                        Element::div()
                            .class("text-5xl font-light tracking-tight")
                            .child(value),
                    )
            };

            body = body.child(
                Element::div()
                    .class("grid grid-cols-1 md:grid-cols-3 gap-6")
                    .child(card(
                        "Temperature",
                        Node::text(format!("{}°", report.temperature_2m)),
                    ))
                    .child(card(
                        "Humidity",
                        Node::text(format!("{}%", report.relative_humidity_2m)),
                    ))
                    .child(card(
                        "Wind Speed",
                        Element::new("span")
                            .child(report.wind_speed_10m.to_string())
                            .child(
                                Element::new("span")
                                    .class("text-2xl text-zinc-500 ml-2")
                                    .child("km/h"),
                            )
                            .into(),
                    )),
            );
        }

        Element::div()
            .class("min-h-screen bg-black text-white p-8")
            .child(body)
            .into()
    }
}

/// The weather tool takes no parameters.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct WeatherArgs {}

/// The `weather` tool.
#[derive(Debug, Clone, Default)]
pub struct WeatherWidget {
    catalog: CityCatalog,
}

impl WeatherWidget {
    pub fn new(catalog: CityCatalog) -> Self {
        Self { catalog }
    }
}

#[widget(
    name = "weather",
    description = "Current weather for a handful of cities",
    invoking = "Loading weather",
    invoked = "Weather loaded"
)]
impl WeatherWidget {
    async fn call(&self, _args: WeatherArgs) -> Result<Instance, WidgetError> {
        Ok(Instance::Weather(WeatherState::new(self.catalog.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    fn sunny() -> CurrentConditions {
        CurrentConditions {
            temperature_2m: 22.5,
            relative_humidity_2m: 60.0,
            wind_speed_10m: 12.3,
            weather_code: Some(1),
            time: None,
        }
    }

    #[test]
    fn starts_on_default_city_without_data() {
        let state = WeatherState::new(CityCatalog::default());

        assert_eq!(state.selected_city(), "Buenos Aires");
        assert!(!state.is_loading());
        assert!(state.report().is_none());
        assert!(state.error().is_none());
    }

    #[test]
    fn select_uses_stored_coordinates() {
        let mut state = WeatherState::new(CityCatalog::default());
        let ticket = state.select("Berlin").unwrap();

        assert_eq!(
            ticket.coordinates(),
            Coordinates {
                latitude: 52.52,
                longitude: 13.405
            }
        );
        assert!(state.is_loading());
        assert_eq!(state.selected_city(), "Berlin");
    }

    #[test]
    fn unknown_city_leaves_state_untouched() {
        let mut state = WeatherState::new(CityCatalog::default());
        let err = state.select("Atlantis").unwrap_err();

        assert!(matches!(err, WidgetError::UnknownCity(name) if name == "Atlantis"));
        assert_eq!(state.selected_city(), "Buenos Aires");
        assert!(!state.is_loading());
    }

    #[test]
    fn failure_clears_stale_report() {
        let mut state = WeatherState::new(CityCatalog::default());
        let first = state.select("Tokyo").unwrap();
        assert!(state.resolve(&first, Ok(sunny())));

        let second = state.select("Berlin").unwrap();
        assert!(state.resolve(&second, Err(WeatherError::Status(StatusCode::BAD_GATEWAY))));

        assert!(state.report().is_none());
        assert_eq!(state.error(), Some("Failed to fetch weather data"));
        assert!(!state.is_loading());

        let html = state.render().to_html();
        assert!(html.contains("Error: Failed to fetch weather data"));
        assert!(!html.contains("Temperature"));
    }

    #[test]
    fn superseded_ticket_is_discarded() {
        let mut state = WeatherState::new(CityCatalog::default());
        let stale = state.select("Tokyo").unwrap();
        let fresh = state.select("New York").unwrap();

        assert!(!state.resolve(&stale, Ok(sunny())));
        assert!(state.is_loading());
        assert!(state.report().is_none());

        assert!(state.resolve(&fresh, Ok(sunny())));
        assert_eq!(state.selected_city(), "New York");
        assert!(state.report().is_some());
    }

    #[test]
    fn render_hides_report_while_loading() {
        let mut state = WeatherState::new(CityCatalog::default());
        let ticket = state.select("Tokyo").unwrap();
        state.resolve(&ticket, Ok(sunny()));

        let html = state.render().to_html();
        assert!(html.contains("22.5°"));
        assert!(html.contains("60%"));
        assert!(html.contains("km/h"));

        state.select("Berlin").unwrap();
        let html = state.render().to_html();
        assert!(html.contains("Loading..."));
        assert!(!html.contains("22.5°"));
    }

    #[test]
    fn render_highlights_selected_city() {
        let state = WeatherState::new(CityCatalog::default());
        let html = state.render().to_html();

        assert!(html.contains(
            "class=\"px-6 py-3 text-sm font-mono uppercase tracking-wider transition-all duration-200 bg-white text-black\" data-widget-event=\"selectCity\" data-city=\"Buenos Aires\""
        ));
        assert_eq!(html.matches("data-widget-event=\"selectCity\"").count(), 5);
    }
}
