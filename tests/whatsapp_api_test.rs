use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value as JsonValue};
use tokio::net::TcpListener;

use reviewbox_backend::config::WhatsAppConfig;
use reviewbox_backend::services::review_message_service::OutboundTemplate;
use reviewbox_backend::services::whatsapp_service::WhatsAppService;

/// In-process stand-in for the WhatsApp messaging API: records every
/// request and answers with a scripted sequence of status codes.
#[derive(Clone, Default)]
struct MockApi {
    requests: Arc<Mutex<Vec<(Option<String>, JsonValue)>>>,
    statuses: Arc<Mutex<VecDeque<u16>>>,
}

impl MockApi {
    fn script(&self, statuses: &[u16]) {
        self.statuses.lock().unwrap().extend(statuses.iter().copied());
    }

    fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn request(&self, idx: usize) -> (Option<String>, JsonValue) {
        self.requests.lock().unwrap()[idx].clone()
    }
}

async fn handle_messages(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Json(body): Json<JsonValue>,
) -> (StatusCode, Json<JsonValue>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    api.requests.lock().unwrap().push((auth, body));

    let status = api.statuses.lock().unwrap().pop_front().unwrap_or(200);
    let status = StatusCode::from_u16(status).unwrap();
    if status.is_success() {
        (status, Json(json!({ "messages": [{ "id": "wamid.test" }] })))
    } else {
        (status, Json(json!({ "error": { "message": "scripted failure" } })))
    }
}

async fn spawn_mock_api() -> (MockApi, String) {
    let api = MockApi::default();
    let app = Router::new()
        .route("/:phone_number_id/messages", post(handle_messages))
        .with_state(api.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock server");
    });
    (api, format!("http://{}", addr))
}

fn config(base_url: &str) -> WhatsAppConfig {
    WhatsAppConfig {
        base_url: base_url.to_string(),
        phone_number_id: "5550001111".into(),
        api_key: "test-key".into(),
        language_code: "en".into(),
        day0_template_name: "review_request_day0".into(),
        day1_template_name: "review_reminder_day1".into(),
        day3_template_name: "review_reminder_day3".into(),
        day0_language_code: None,
        day0_header_image_link: None,
        day0_header_image_id: None,
        send_hi_before_template: false,
    }
}

fn template() -> OutboundTemplate {
    OutboundTemplate {
        template_name: "review_reminder_day1".into(),
        language_code: None,
        body_params: vec!["Acme Solar".into(), "https://g.co/x".into()],
        button_suffix: Some("42".into()),
        header_image_link: None,
        header_image_id: None,
    }
}

#[tokio::test]
async fn transient_failure_is_retried_once_and_succeeds() {
    let (api, base_url) = spawn_mock_api().await;
    api.script(&[500, 200]);

    let service = WhatsAppService::new(config(&base_url));
    let sent = service.send_template("919876543210", &template()).await;

    assert!(sent);
    assert_eq!(api.request_count(), 2);
}

#[tokio::test]
async fn persistent_transient_failure_stops_after_two_attempts() {
    let (api, base_url) = spawn_mock_api().await;
    api.script(&[503, 503, 503]);

    let service = WhatsAppService::new(config(&base_url));
    let sent = service.send_template("919876543210", &template()).await;

    assert!(!sent);
    assert_eq!(api.request_count(), 2);
}

#[tokio::test]
async fn non_transient_rejection_fails_without_retry() {
    let (api, base_url) = spawn_mock_api().await;
    api.script(&[400]);

    let service = WhatsAppService::new(config(&base_url));
    let sent = service.send_template("919876543210", &template()).await;

    assert!(!sent);
    assert_eq!(api.request_count(), 1);
}

#[tokio::test]
async fn template_request_carries_auth_and_ordered_components() {
    let (api, base_url) = spawn_mock_api().await;
    api.script(&[200]);

    let mut message = template();
    message.header_image_id = Some("media-7".into());
    message.header_image_link = Some("https://cdn.example/img.png".into());

    let service = WhatsAppService::new(config(&base_url));
    let sent = service.send_template("919876543210", &message).await;
    assert!(sent);

    let (auth, body) = api.request(0);
    assert_eq!(auth.as_deref(), Some("Bearer test-key"));
    assert_eq!(body["messaging_product"], "whatsapp");
    assert_eq!(body["recipient_type"], "individual");
    assert_eq!(body["to"], "919876543210");
    assert_eq!(body["type"], "template");
    assert_eq!(body["template"]["name"], "review_reminder_day1");

    let components = body["template"]["components"].as_array().unwrap();
    assert_eq!(components.len(), 3);
    assert_eq!(components[0]["type"], "header");
    // Media id takes precedence over the link.
    assert_eq!(components[0]["parameters"][0]["image"]["id"], "media-7");
    assert_eq!(components[1]["type"], "body");
    assert_eq!(components[2]["type"], "button");
    assert_eq!(components[2]["index"], "0");
    assert_eq!(components[2]["parameters"][0]["text"], "42");
}

#[tokio::test]
async fn text_message_is_single_attempt() {
    let (api, base_url) = spawn_mock_api().await;
    api.script(&[500]);

    let service = WhatsAppService::new(config(&base_url));
    let sent = service.send_text("919876543210", "Hi").await;

    assert!(!sent);
    assert_eq!(api.request_count(), 1);

    api.script(&[200]);
    let sent = service.send_text("919876543210", "Hi").await;
    assert!(sent);
    let (_, body) = api.request(1);
    assert_eq!(body["type"], "text");
    assert_eq!(body["text"]["body"], "Hi");
}

#[tokio::test]
async fn unconfigured_credentials_skip_the_request() {
    let (api, base_url) = spawn_mock_api().await;

    let mut cfg = config(&base_url);
    cfg.api_key = String::new();

    let service = WhatsAppService::new(cfg);
    assert!(!service.send_template("919876543210", &template()).await);
    assert!(!service.send_text("919876543210", "Hi").await);
    assert_eq!(api.request_count(), 0);
}
