use async_trait::async_trait;
use rmcp::model::{CallToolRequestParam, ReadResourceRequestParam, ResourceContents};
use rmcp::service::{RoleClient, RunningService};
use rmcp::ServiceExt;
use serde_json::{json, Value};
use std::sync::Arc;
use widgetry::options::ServerOptions;
use widgetry::source::{WeatherError, WeatherSource};
use widgetry::weather::{CityCatalog, Coordinates, CurrentConditions};
use widgetry::WidgetServer;

struct FixedWeather;

#[async_trait]
impl WeatherSource for FixedWeather {
    async fn current(&self, coordinates: Coordinates) -> Result<CurrentConditions, WeatherError> {
        Ok(CurrentConditions {
            temperature_2m: 15.0,
            relative_humidity_2m: 70.0,
            wind_speed_10m: coordinates.longitude.abs(),
            weather_code: None,
            time: None,
        })
    }
}

async fn connect() -> RunningService<RoleClient, ()> {
    let server = WidgetServer::with_source(
        Arc::new(FixedWeather),
        CityCatalog::default(),
        ServerOptions::default(),
    );
    let (client_transport, server_transport) = tokio::io::duplex(64 * 1024);

    tokio::spawn(async move {
        let service = server
            .serve(server_transport)
            .await
            .expect("Failed to start server");
        service.waiting().await.expect("Server error");
    });

    ().serve(client_transport).await.expect("Failed to connect")
}

fn call(name: &str, args: Value) -> CallToolRequestParam {
    CallToolRequestParam {
        name: name.to_string().into(),
        arguments: args.as_object().cloned(),
    }
}

#[tokio::test]
async fn lists_widget_tools_with_host_hints() {
    let client = connect().await;
    let tools = client.list_tools(None).await.unwrap().tools;

    let names: Vec<String> = tools.iter().map(|t| t.name.to_string()).collect();
    assert_eq!(names, vec!["counter", "weather", "widget_event"]);

    let counter = &tools[0];
    assert_eq!(counter.input_schema["required"], json!(["initialCount"]));
    assert_eq!(
        counter.input_schema["properties"]["initialCount"]["description"],
        "The initial count value"
    );
    assert_eq!(
        counter.description.as_deref(),
        Some("Interactive counter")
    );

    client.cancel().await.unwrap();
}

#[tokio::test]
async fn counter_round_trip_through_widget_event() {
    let client = connect().await;

    let mounted = client
        .call_tool(call("counter", json!({ "initialCount": 41 })))
        .await
        .unwrap();
    let structured = mounted.structured_content.unwrap();
    assert_eq!(structured["widget"], "counter");
    assert_eq!(structured["state"]["count"], 41);
    let session = structured["sessionId"].as_str().unwrap().to_string();

    let bumped = client
        .call_tool(call(
            "widget_event",
            json!({ "sessionId": session, "event": { "type": "increment" } }),
        ))
        .await
        .unwrap();
    let structured = bumped.structured_content.unwrap();
    assert_eq!(structured["state"]["count"], 42);
    assert!(structured["html"].as_str().unwrap().contains(">42</div>"));

    client.cancel().await.unwrap();
}

#[tokio::test]
async fn counter_requires_initial_count() {
    let client = connect().await;

    let result = client.call_tool(call("counter", json!({}))).await;
    assert!(result.is_err());

    client.cancel().await.unwrap();
}

#[tokio::test]
async fn weather_mounts_and_switches_city() {
    let client = connect().await;

    let mounted = client
        .call_tool(call("weather", json!({})))
        .await
        .unwrap();
    let structured = mounted.structured_content.unwrap();
    assert_eq!(structured["state"]["selectedCity"], "Buenos Aires");
    assert_eq!(structured["state"]["report"]["wind_speed_10m"], 58.3816);
    let session = structured["sessionId"].as_str().unwrap().to_string();

    let switched = client
        .call_tool(call(
            "widget_event",
            json!({
                "sessionId": session,
                "event": { "type": "selectCity", "city": "New York" }
            }),
        ))
        .await
        .unwrap();
    let structured = switched.structured_content.unwrap();
    assert_eq!(structured["state"]["selectedCity"], "New York");
    assert_eq!(structured["state"]["report"]["wind_speed_10m"], 74.006);

    client.cancel().await.unwrap();
}

#[tokio::test]
async fn serves_widget_templates() {
    let client = connect().await;

    let resources = client.list_resources(None).await.unwrap().resources;
    let uris: Vec<String> = resources.iter().map(|r| r.uri.clone()).collect();
    assert_eq!(
        uris,
        vec!["ui://widget/counter.html", "ui://widget/weather.html"]
    );

    let read = client
        .read_resource(ReadResourceRequestParam {
            uri: "ui://widget/weather.html".to_string(),
        })
        .await
        .unwrap();
    match &read.contents[0] {
        ResourceContents::TextResourceContents {
            text, mime_type, ..
        } => {
            assert_eq!(mime_type.as_deref(), Some("text/html+skybridge"));
            assert!(text.contains("data-widget=\"weather\""));
        }
        other => panic!("Expected text resource, got {:?}", other),
    }

    client.cancel().await.unwrap();
}
