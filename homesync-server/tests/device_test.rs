use axum::http::{Method, StatusCode};
use homesync_core::RemoteStore;
use homesync_core::device::DeviceCommand;
use serde_json::json;

mod common;
use common::mock_app::MockApp;

#[tokio::test]
async fn test_get_devices() {
    let app = MockApp::new();

    let (status, body) = app.request(Method::GET, "/devices", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["esp32-hall"], json!({ "name": "Hall", "ip": "10.0.0.12" }));
    assert_eq!(body["esp32-garage"], json!({ "name": "Unknown", "ip": null }));

    // No realtime database configured
    let app = MockApp::without_store();

    let (status, _) = app.request(Method::GET, "/devices", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_reboot_device() {
    let app = MockApp::new();

    let (status, body) = app.request(Method::POST, "/devices/esp32-hall/reboot", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], json!(503));
    assert!(app.transport.sent().is_empty());

    app.transport.set_connected(true);
    let (status, body) = app.request(Method::POST, "/devices/esp32-hall/reboot", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["command"], json!("reboot"));
    assert_eq!(app.transport.sent(), vec![(String::from("esp32-hall"), DeviceCommand::Reboot)]);

    // Send failure
    app.transport.fail_for("esp32-garage");
    let (status, _) = app.request(Method::POST, "/devices/esp32-garage/reboot", None).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_reset_device_wifi() {
    let app = MockApp::new();

    let (status, body) = app.request(Method::POST, "/devices/esp32-hall/wifi", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["command_sent"], json!(false));
    assert_eq!(body["guide"]["ssid"], json!("ESP32_SmartHome"));
    assert_eq!(body["guide"]["portal_url"], json!("http://192.168.4.1"));
    assert_eq!(body["guide"]["steps"][1], json!("Mở trình duyệt và truy cập http://192.168.4.1"));

    app.transport.set_connected(true);
    let (_, body) = app.request(Method::POST, "/devices/esp32-hall/wifi", None).await;

    assert_eq!(body["command_sent"], json!(true));
    assert_eq!(app.transport.sent(), vec![(String::from("esp32-hall"), DeviceCommand::FactoryReset)]);
}

#[tokio::test]
async fn test_sync_device_time() {
    let app = MockApp::new();
    app.transport.set_connected(true);

    let (status, body) = app
        .request(Method::POST, "/devices/esp32-hall/time", Some(json!({ "timestamp": 1_700_000_000 })))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timestamp"], json!(1_700_025_200));
    assert_eq!(
        app.transport.sent(),
        vec![(String::from("esp32-hall"), DeviceCommand::SetTimestamp { timestamp: 1_700_025_200 })]
    );
}

#[tokio::test]
async fn test_sync_device_time_body() {
    let app = MockApp::new();
    app.transport.set_connected(true);

    // Wrong type is rejected, nothing is published
    let (status, body) = app
        .request(Method::POST, "/devices/esp32-hall/time", Some(json!({ "timestamp": "yesterday" })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], json!(400));
    assert!(app.transport.sent().is_empty());

    // Out of range for the device clock
    let (status, _) = app
        .request(Method::POST, "/devices/esp32-hall/time", Some(json!({ "timestamp": i64::MAX })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app
        .request(Method::POST, "/devices/time", Some(json!({ "timestamp": i64::MAX })))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.transport.sent().is_empty());

    // No body syncs to now
    let (status, body) = app.request(Method::POST, "/devices/esp32-hall/time", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["timestamp"].as_i64().unwrap() > 1_700_025_200);
    assert_eq!(app.transport.sent().len(), 1);
}

#[tokio::test]
async fn test_sync_all_devices_time() {
    let app = MockApp::new();
    app.transport.set_connected(true);
    app.transport.fail_for("esp32-garage");

    let (status, body) = app
        .request(Method::POST, "/devices/time", Some(json!({ "timestamp": 1_700_000_000 })))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timestamp"], json!(1_700_025_200));
    assert_eq!(body["accepted"], json!(["esp32-hall"]));
    assert_eq!(body["failed"], json!(["esp32-garage"]));

    // Empty registry
    app.remote.write("devices", serde_json::Value::Null).await.unwrap();
    let (status, _) = app.request(Method::POST, "/devices/time", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
