use axum::http::{Method, StatusCode};
use serde_json::json;

mod common;
use common::mock_app::MockApp;

#[tokio::test]
async fn test_check_credentials() {
    let app = MockApp::new();

    let (status, body) = app
        .request(
            Method::POST,
            "/auth/check",
            Some(json!({ "mode": "sign_in", "email": " user@home.vn ", "password": "secret" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], json!("user@home.vn"));

    let (status, body) = app
        .request(
            Method::POST,
            "/auth/check",
            Some(json!({
                "mode": "sign_up",
                "email": "user@home.vn",
                "password": "abc",
                "confirm_password": "abc",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], json!("Mật khẩu phải có ít nhất 6 ký tự."));
}

#[tokio::test]
async fn test_describe_auth_error() {
    let app = MockApp::new();

    let (status, body) = app
        .request(
            Method::POST,
            "/auth/describe",
            Some(json!({ "code": "auth/email-already-in-use", "message": "EMAIL_EXISTS" })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Email đã được sử dụng."));

    let (_, body) = app
        .request(Method::POST, "/auth/describe", Some(json!({ "code": "auth/unknown" })))
        .await;

    assert_eq!(body["message"], json!("Đã có lỗi xảy ra."));
}
