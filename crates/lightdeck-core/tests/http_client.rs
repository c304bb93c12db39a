//! Tests for the signed HTTP client against an in-process fake service.
//!
//! The fake service verifies the `sign` header of every request with the
//! shared secret, the same way the real service does, and answers with
//! SwitchBot-style envelopes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use lightdeck_core::signing::signature;
use lightdeck_core::{
    Controller, Credentials, DeviceApi, DeviceStore, Error, Light, Point, RecordingDisplay,
    Sensor, SwitchBotClient, Timings,
};

const TOKEN: &str = "test-token";
const SECRET: &str = "test-secret";

#[derive(Clone, Default)]
struct FakeService {
    commands: Arc<Mutex<Vec<(String, Value)>>>,
    statuses: Arc<Mutex<HashMap<String, Value>>>,
}

impl FakeService {
    fn with_status(self, id: &str, body: Value) -> Self {
        self.statuses.lock().unwrap().insert(id.to_string(), body);
        self
    }

    fn commands(&self) -> Vec<(String, Value)> {
        self.commands.lock().unwrap().clone()
    }
}

fn header<'a>(headers: &'a HeaderMap, key: &str) -> &'a str {
    headers
        .get(key)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

fn is_signed(headers: &HeaderMap) -> bool {
    let nonce = header(headers, "nonce");
    nonce.len() == 32
        && signature(header(headers, "authorization"), SECRET, header(headers, "t"), nonce)
            .is_ok_and(|expected| expected == header(headers, "sign"))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Unauthorized"})),
    )
        .into_response()
}

async fn command(
    State(service): State<FakeService>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !is_signed(&headers) {
        return unauthorized();
    }
    service.commands.lock().unwrap().push((id, body));
    Json(json!({"statusCode": 100, "body": {}, "message": "success"})).into_response()
}

async fn status(
    State(service): State<FakeService>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !is_signed(&headers) {
        return unauthorized();
    }
    match id.as_str() {
        "broken" => (StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"power": "on", "brightness": 1})).into_response()
        }
        _ => {
            let stored = service.statuses.lock().unwrap().get(&id).cloned();
            match stored {
                Some(body) => Json(json!({"statusCode": 100, "body": body, "message": "success"}))
                    .into_response(),
                None => (
                    StatusCode::NOT_FOUND,
                    Json(json!({"message": "device not found"})),
                )
                    .into_response(),
            }
        }
    }
}

/// Start the fake service and return its base URL.
async fn spawn(service: FakeService) -> String {
    let router = Router::new()
        .route("/v1.1/devices/{id}/commands", post(command))
        .route("/v1.1/devices/{id}/status", get(status))
        .with_state(service);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/v1.1", addr)
}

fn client(base_url: &str) -> SwitchBotClient {
    SwitchBotClient::new(base_url, Credentials::new(TOKEN, SECRET)).unwrap()
}

#[tokio::test]
async fn test_send_command_is_signed_and_delivered() {
    let service = FakeService::default();
    let base = spawn(service.clone()).await;

    client(&base)
        .send_command("94A99076A08A", "setBrightness", "42")
        .await
        .unwrap();

    assert_eq!(
        service.commands(),
        vec![(
            "94A99076A08A".to_string(),
            json!({"command": "setBrightness", "parameter": "42", "commandType": "command"})
        )]
    );
}

#[tokio::test]
async fn test_read_light_status_from_envelope() {
    let service = FakeService::default().with_status(
        "94A99076A08A",
        json!({"deviceId": "94A99076A08A", "power": "on", "brightness": 42, "color": "255:0:0"}),
    );
    let base = spawn(service).await;

    let status = client(&base).read_light_status("94A99076A08A").await.unwrap();
    assert!(status.is_on);
    assert_eq!(status.brightness.get(), 42);
}

#[tokio::test]
async fn test_read_sensor_status() {
    let service = FakeService::default().with_status(
        "CA323435166C",
        json!({"temperature": 23.4, "humidity": 51, "battery": 100}),
    );
    let base = spawn(service).await;

    let reading = client(&base).read_sensor_status("CA323435166C").await.unwrap();
    assert!((reading.temperature_c - 23.4).abs() < 0.01);
    assert_eq!(reading.humidity, 51);
}

#[tokio::test]
async fn test_wrong_secret_is_rejected() {
    let service = FakeService::default();
    let base = spawn(service.clone()).await;
    let client = SwitchBotClient::new(&base, Credentials::new(TOKEN, "wrong")).unwrap();

    let err = client
        .send_command("94A99076A08A", "turnOn", "default")
        .await
        .unwrap_err();
    match err {
        Error::CommandFailed { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Unauthorized");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(service.commands().is_empty());
}

#[tokio::test]
async fn test_non_json_error_body() {
    let base = spawn(FakeService::default()).await;
    let err = client(&base).read_status("broken").await.unwrap_err();
    assert!(matches!(err, Error::CommandFailed { status: 502, .. }));
    assert!(err.is_dispatch_failure());
}

#[tokio::test]
async fn test_missing_field_is_malformed() {
    let service = FakeService::default().with_status("AAA", json!({"power": "on"}));
    let base = spawn(service).await;

    let err = client(&base).read_light_status("AAA").await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse(_)));
}

#[tokio::test]
async fn test_unknown_device() {
    let base = spawn(FakeService::default()).await;
    let err = client(&base).read_status("nope").await.unwrap_err();
    assert!(matches!(err, Error::CommandFailed { status: 404, ref message } if message == "device not found"));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{}/v1.1", addr))
        .send_command("AAA", "turnOn", "default")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport { .. }));
    assert!(err.is_dispatch_failure());
}

#[tokio::test]
async fn test_timeout_is_transport_error() {
    let base = spawn(FakeService::default()).await;
    let client = SwitchBotClient::with_timeout(
        &base,
        Credentials::new(TOKEN, SECRET),
        Duration::from_millis(200),
    )
    .unwrap();

    let err = client.read_status("slow").await.unwrap_err();
    assert!(matches!(err, Error::Transport { .. }));
}

#[tokio::test]
async fn test_panel_long_press_reaches_service() {
    let service = FakeService::default()
        .with_status("AAA", json!({"power": "off", "brightness": 30}));
    let base = spawn(service.clone()).await;

    let store = DeviceStore::new(vec![Light::new("AAA", "Desk")], Sensor::new("", ""));
    let mut panel = Controller::new(
        client(&base),
        RecordingDisplay::new(),
        store,
        Timings::default(),
    );

    let t0 = Instant::now();
    panel.start(t0).await;
    assert_eq!(panel.store().get(0).unwrap().brightness.get(), 30);

    let button = panel.layout().power_button(0);
    let finger = Some(Point::new(button.x + 10, button.y + 10));
    panel.tick(t0 + Duration::from_millis(10), finger).await;
    panel.tick(t0 + Duration::from_millis(600), finger).await;
    panel.tick(t0 + Duration::from_millis(610), None).await;

    assert!(panel.store().get(0).unwrap().is_on);
    assert_eq!(
        service.commands(),
        vec![(
            "AAA".to_string(),
            json!({"command": "turnOn", "parameter": "default", "commandType": "command"})
        )]
    );
}
