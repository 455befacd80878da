use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tokio_stream::StreamExt;
use tower::ServiceExt;

mod common;
use common::mock_app::MockApp;

#[tokio::test]
async fn test_event_stream_pushes_refresh() {
    let app = MockApp::new();

    let request = Request::builder().uri("/event").body(Body::empty()).unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
        Some("text/event-stream")
    );

    let mut stream = response.into_body().into_data_stream();
    app.dashboard.refresh().await;

    let chunk = stream.next().await.unwrap().unwrap();
    let frame = String::from_utf8(chunk.to_vec()).unwrap();

    assert!(frame.starts_with("event: refresh\n"));
    assert!(frame.contains("\"room_name\":\"Living Room\""));
}
