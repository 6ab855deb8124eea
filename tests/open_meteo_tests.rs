use serde_json::json;
use widgetry::api::OpenMeteoClient;
use widgetry::options::{TransportOptions, WeatherOptions};
use widgetry::source::{WeatherError, WeatherSource};
use widgetry::weather::Coordinates;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn forecast_body() -> serde_json::Value {
    json!({
        "latitude": 52.52,
        "longitude": 13.419998,
        "current_units": {
            "temperature_2m": "°C",
            "relative_humidity_2m": "%",
            "wind_speed_10m": "km/h"
        },
        "current": {
            "time": "2025-06-01T12:00",
            "interval": 900,
            "temperature_2m": 21.4,
            "relative_humidity_2m": 48,
            "weather_code": 3,
            "wind_speed_10m": 11.2
        }
    })
}

fn client(server: &MockServer) -> OpenMeteoClient {
    OpenMeteoClient::new(&WeatherOptions::new().with_base_url(server.uri())).unwrap()
}

#[tokio::test]
async fn requests_current_fields_for_exact_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "52.52"))
        .and(query_param("longitude", "13.405"))
        .and(query_param(
            "current",
            "temperature_2m,relative_humidity_2m,weather_code,wind_speed_10m",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&server)
        .await;

    let current = client(&server)
        .current(Coordinates {
            latitude: 52.52,
            longitude: 13.405,
        })
        .await
        .unwrap();

    assert_eq!(current.temperature_2m, 21.4);
    assert_eq!(current.relative_humidity_2m, 48.0);
    assert_eq!(current.wind_speed_10m, 11.2);
    assert_eq!(current.weather_code, Some(3));
    assert_eq!(current.time.as_deref(), Some("2025-06-01T12:00"));
}

#[tokio::test]
async fn non_success_status_becomes_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client(&server)
        .current(Coordinates {
            latitude: -34.6037,
            longitude: -58.3816,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, WeatherError::Status(status) if status.as_u16() == 503));
    assert_eq!(err.to_string(), "Failed to fetch weather data");
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "current": {} })))
        .mount(&server)
        .await;

    let err = client(&server)
        .current(Coordinates {
            latitude: 0.0,
            longitude: 0.0,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, WeatherError::Parse(_)));
}

#[tokio::test]
async fn extra_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(header("x-api-key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&server)
        .await;

    let options = WeatherOptions::new()
        .with_base_url(format!("{}/", server.uri()))
        .with_transport(TransportOptions::new().with_header("x-api-key", "secret"));
    let client = OpenMeteoClient::new(&options).unwrap();

    assert_eq!(client.forecast_url(), format!("{}/v1/forecast", server.uri()));
    client
        .current(Coordinates {
            latitude: 35.6762,
            longitude: 139.6503,
        })
        .await
        .unwrap();
}

#[test]
fn empty_base_url_is_rejected() {
    let err = OpenMeteoClient::new(&WeatherOptions::new().with_base_url("  ")).unwrap_err();
    assert!(matches!(err, WeatherError::Config(_)));
}
