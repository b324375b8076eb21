use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::application::errors::RelayError;
use crate::application::services::Delivery;

use super::auth;
use super::pairing::{self, PairingView};
use super::AppState;

fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

/// 401 when a secret is configured and the request does not prove it
fn authorize(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<(), Response> {
    match state.secret.as_deref() {
        Some(secret) if !auth::verify_request(secret, headers, body) => {
            tracing::warn!("Rejected request with missing or invalid webhook secret");
            Err(api_error(StatusCode::UNAUTHORIZED, "Invalid webhook secret"))
        }
        _ => Ok(()),
    }
}

// GET /health
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "bot_connected": state.session.is_connected(),
        "timestamp": chrono::Local::now().to_rfc3339(),
    }))
}

// POST /webhook/jira
pub async fn jira_webhook(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    if let Err(rejection) = authorize(&state, &headers, &body) {
        return rejection;
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return api_error(StatusCode::BAD_REQUEST, "No data provided");
    }
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!("Webhook body is not JSON: {}", e);
            return api_error(StatusCode::BAD_REQUEST, "No data provided");
        }
    };

    match state.notifications.relay(&payload).await {
        Ok(Delivery::Sent { key, .. }) => Json(json!({
            "status": "success",
            "message": "Notification sent to WhatsApp",
            "key": key,
        }))
        .into_response(),
        Ok(Delivery::Ignored { event_kind }) => Json(json!({
            "status": "ignored",
            "message": format!("Event {} not processed", event_kind),
        }))
        .into_response(),
        Err(RelayError::InvalidPayload(_)) => api_error(StatusCode::BAD_REQUEST, "No data provided"),
        Err(RelayError::NoDestination) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "No WhatsApp group configured",
                "message": "Add the bot to a group or set WHATSAPP_GROUP_JID",
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Webhook delivery failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "message": "Failed to send WhatsApp message",
                })),
            )
                .into_response()
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct TestSendRequest {
    jid: Option<String>,
    message: Option<String>,
}

// POST /test/send
pub async fn test_send(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    if let Err(rejection) = authorize(&state, &headers, &body) {
        return rejection;
    }

    let request: TestSendRequest = if body.iter().all(u8::is_ascii_whitespace) {
        TestSendRequest::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(request) => request,
            Err(e) => return api_error(StatusCode::BAD_REQUEST, format!("Invalid request body: {}", e)),
        }
    };

    match state
        .notifications
        .send_manual(request.jid.as_deref(), request.message.as_deref())
        .await
    {
        Ok(destination) => Json(json!({
            "status": "success",
            "message": "Test message sent",
            "jid": destination.to_string(),
        }))
        .into_response(),
        Err(RelayError::NoDestination) => {
            api_error(StatusCode::BAD_REQUEST, "JID not provided and no active group found")
        }
        Err(RelayError::Destination(e)) => api_error(StatusCode::BAD_REQUEST, format!("Invalid JID: {}", e)),
        Err(e) => {
            tracing::error!("Test send failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "message": "Failed to send message",
                })),
            )
                .into_response()
        }
    }
}

// GET /qr
pub async fn qr(State(state): State<AppState>) -> Response {
    let view = PairingView::from_session(state.session.state(), state.session.current_pairing_material());

    match view {
        PairingView::Connected => Html(pairing::CONNECTED_PAGE).into_response(),
        PairingView::Generating => Html(pairing::GENERATING_PAGE).into_response(),
        PairingView::Code(material) => match pairing::render_svg(&material) {
            Ok(svg) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
            Err(e) => {
                tracing::error!("Failed to render pairing code: {}", e);
                api_error(StatusCode::INTERNAL_SERVER_ERROR, "Failed to render QR code")
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::Request;
    use tokio::sync::mpsc::UnboundedSender;
    use tower::ServiceExt;

    use super::super::{router, AppState};
    use super::*;
    use crate::application::services::{DestinationResolver, NotificationFormatter, NotificationService};
    use crate::application::session::SessionManager;
    use crate::domain::entities::Destination;
    use crate::domain::traits::TransportEvent;
    use crate::test_support::{wait_for, MemoryStore, ScriptedTransport};

    struct Harness {
        state: AppState,
        transport: Arc<ScriptedTransport>,
        events: UnboundedSender<TransportEvent>,
    }

    fn harness(store: Arc<MemoryStore>, secret: Option<&str>) -> Harness {
        let (transport, events) = ScriptedTransport::new();
        let session = Arc::new(
            SessionManager::new(Arc::clone(&transport) as _).with_connect_timeout(Duration::from_millis(200)),
        );
        let notifications = Arc::new(NotificationService::new(
            Arc::clone(&session) as _,
            DestinationResolver::new(store, None),
            NotificationFormatter::new("https://jira.example.com"),
        ));
        Harness {
            state: AppState {
                session,
                notifications,
                secret: secret.map(str::to_string),
            },
            transport,
            events,
        }
    }

    async fn connect(h: &Harness) {
        h.events.send(TransportEvent::Connected).unwrap();
        assert!(h.state.session.start().await);
    }

    async fn call(state: &AppState, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn post(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn json_body(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    const CREATED: &str = r#"{"webhookEvent":"jira:issue_created","issue":{"key":"OPS-1","fields":{"summary":"Disk full"}}}"#;

    #[tokio::test]
    async fn test_health_reports_connection() {
        let h = harness(MemoryStore::new(), None);

        let (status, body) = call(&h.state, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["bot_connected"], false);
        assert!(body["timestamp"].is_string());

        connect(&h).await;
        let (_, body) = call(&h.state, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(json_body(&body)["bot_connected"], true);
    }

    #[tokio::test]
    async fn test_webhook_delivers_created_issue() {
        let group = Destination::group("120363").unwrap();
        let h = harness(MemoryStore::with(group.clone()), None);
        connect(&h).await;

        let (status, body) = call(&h.state, post("/webhook/jira", CREATED)).await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        assert_eq!(body["status"], "success");
        assert_eq!(body["key"], "OPS-1");

        let sent = h.transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, group);
        assert!(sent[0].1.contains("Disk full"));
    }

    #[tokio::test]
    async fn test_webhook_ignores_other_events() {
        let h = harness(MemoryStore::new(), None);

        let (status, body) = call(&h.state, post("/webhook/jira", r#"{"webhookEvent":"jira:issue_updated"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        let body = json_body(&body);
        assert_eq!(body["status"], "ignored");
        assert_eq!(body["message"], "Event jira:issue_updated not processed");
    }

    #[tokio::test]
    async fn test_webhook_rejects_missing_payload() {
        let h = harness(MemoryStore::new(), None);

        for body in ["", "not json", "null", "{}", "[]", "[1]", "\"\"", "false", "0"] {
            let (status, response) = call(&h.state, post("/webhook/jira", body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
            assert_eq!(json_body(&response)["error"], "No data provided");
        }
    }

    #[tokio::test]
    async fn test_webhook_without_destination() {
        let h = harness(MemoryStore::new(), None);
        connect(&h).await;

        let (status, body) = call(&h.state, post("/webhook/jira", CREATED)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(&body)["error"], "No WhatsApp group configured");
        assert!(h.transport.sent().is_empty());
    }

    #[tokio::test]
    async fn test_webhook_while_disconnected() {
        let h = harness(MemoryStore::with(Destination::group("1").unwrap()), None);

        let (status, body) = call(&h.state, post("/webhook/jira", CREATED)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(&body)["status"], "error");
    }

    #[tokio::test]
    async fn test_webhook_secret_is_enforced() {
        let h = harness(MemoryStore::with(Destination::group("1").unwrap()), Some("s3cret"));
        connect(&h).await;

        let (status, _) = call(&h.state, post("/webhook/jira", CREATED)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let request = Request::post("/webhook/jira")
            .header("x-webhook-secret", "s3cret")
            .body(Body::from(CREATED))
            .unwrap();
        let (status, _) = call(&h.state, request).await;
        assert_eq!(status, StatusCode::OK);

        let signature = auth::sign("s3cret", CREATED.as_bytes()).unwrap();
        let request = Request::post("/webhook/jira")
            .header("x-hub-signature-256", signature)
            .body(Body::from(CREATED))
            .unwrap();
        let (status, _) = call(&h.state, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(h.transport.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_manual_send() {
        let group = Destination::group("55").unwrap();
        let h = harness(MemoryStore::with(group.clone()), None);
        connect(&h).await;

        let (status, body) = call(&h.state, post("/test/send", "")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body)["jid"], "55@g.us");

        let (status, body) = call(&h.state, post("/test/send", r#"{"jid":"519","message":"ping"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json_body(&body)["jid"], "519@s.whatsapp.net");

        let sent = h.transport.sent();
        assert_eq!(sent[0].0, group);
        assert_eq!(sent[1], (Destination::user("519").unwrap(), "ping".to_string()));
    }

    #[tokio::test]
    async fn test_manual_send_errors() {
        let h = harness(MemoryStore::new(), None);

        let (status, body) = call(&h.state, post("/test/send", "{}")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json_body(&body)["error"], "JID not provided and no active group found");

        let (status, _) = call(&h.state, post("/test/send", r#"{"jid":"@g.us"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Valid target, but the session is not connected
        let (status, _) = call(&h.state, post("/test/send", r#"{"jid":"1@g.us"}"#)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_qr_follows_session_state() {
        let h = harness(MemoryStore::new(), None);

        let (status, body) = call(&h.state, Request::get("/qr").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("Generando"));

        h.events.send(TransportEvent::PairingCode("2@abc,def".into())).unwrap();
        assert!(!h.state.session.start().await);
        assert!(wait_for(|| h.state.session.current_pairing_material().is_some()).await);

        let response = router(h.state.clone())
            .oneshot(Request::get("/qr").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/svg+xml");

        h.events.send(TransportEvent::Connected).unwrap();
        assert!(wait_for(|| h.state.session.is_connected()).await);
        let (_, body) = call(&h.state, Request::get("/qr").body(Body::empty()).unwrap()).await;
        assert!(String::from_utf8(body).unwrap().contains("conectado"));
    }
}
