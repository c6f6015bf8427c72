//! Practicum client and Telegram bot against throwaway local HTTP servers.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use homework_bot::config::{PracticumConfig, TelegramConfig};
use homework_bot::error::RelayError;
use homework_bot::practicum::{HomeworkSource, PracticumClient};
use homework_bot::telegram::{Notifier, TelegramBot};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct Seen(Arc<Mutex<Vec<(Option<String>, Option<String>)>>>);

async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn practicum(addr: SocketAddr, path: &str) -> PracticumClient {
    let config = PracticumConfig {
        endpoint: format!("http://{}{}", addr, path),
        request_timeout_ms: 2_000,
    };
    PracticumClient::new(&config, "y0_secret".to_string()).unwrap()
}

async fn homework_statuses(
    State(seen): State<Seen>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    seen.0.lock().unwrap().push((auth, query.get("from_date").cloned()));
    Json(json!({
        "homeworks": [{"homework_name": "hw1", "status": "approved"}],
        "current_date": 1_700_000_000,
    }))
}

#[tokio::test]
async fn test_practicum_sends_auth_header_and_from_date() {
    let seen = Seen::default();
    let app = Router::new()
        .route("/api/user_api/homework_statuses/", get(homework_statuses))
        .with_state(seen.clone());
    let addr = serve(app).await;

    let body = practicum(addr, "/api/user_api/homework_statuses/")
        .fetch_statuses(1_678_458_842)
        .await
        .unwrap();

    assert_eq!(body["homeworks"][0]["homework_name"], "hw1");
    let seen = seen.0.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0.as_deref(), Some("OAuth y0_secret"));
    assert_eq!(seen[0].1.as_deref(), Some("1678458842"));
}

#[tokio::test]
async fn test_practicum_non_success_status() {
    let app = Router::new().route("/", get(|| async { (StatusCode::UNAUTHORIZED, "bad token") }));
    let addr = serve(app).await;

    let result = practicum(addr, "/").fetch_statuses(0).await;
    match result {
        Err(RelayError::UnexpectedStatus(status)) => assert_eq!(status.as_u16(), 401),
        other => panic!("expected UnexpectedStatus, got {:?}", other),
    }
}

#[tokio::test]
async fn test_practicum_non_json_body() {
    let app = Router::new().route("/", get(|| async { "<html>maintenance</html>" }));
    let addr = serve(app).await;

    let result = practicum(addr, "/").fetch_statuses(0).await;
    assert!(matches!(result, Err(RelayError::Decode(_))));
}

#[tokio::test]
async fn test_practicum_connection_refused() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = practicum(addr, "/").fetch_statuses(0).await;
    assert!(matches!(result, Err(RelayError::Transport(_))));
}

fn bot(addr: SocketAddr) -> TelegramBot {
    let config = TelegramConfig {
        api_base: format!("http://{}/", addr),
        request_timeout_ms: 2_000,
    };
    TelegramBot::new(&config, "TEST_TOKEN".to_string(), "4242".to_string()).unwrap()
}

#[tokio::test]
async fn test_telegram_posts_chat_id_and_text() {
    let received: Arc<Mutex<Vec<Value>>> = Arc::default();
    let app = Router::new()
        .route(
            "/botTEST_TOKEN/sendMessage",
            post(|State(received): State<Arc<Mutex<Vec<Value>>>>, Json(body): Json<Value>| async move {
                received.lock().unwrap().push(body);
                Json(json!({"ok": true, "result": {"message_id": 1}}))
            }),
        )
        .with_state(received.clone());
    let addr = serve(app).await;

    bot(addr).send("Status changed").await.unwrap();

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["chat_id"], "4242");
    assert_eq!(received[0]["text"], "Status changed");
}

#[tokio::test]
async fn test_telegram_rejection_is_an_error() {
    let app = Router::new().route(
        "/botTEST_TOKEN/sendMessage",
        post(|| async {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"ok": false, "description": "Bad Request: chat not found"})),
            )
        }),
    );
    let addr = serve(app).await;

    let err = bot(addr).send("hello").await.unwrap_err();
    let text = format!("{:#}", err);
    assert!(text.contains("chat not found"));
    assert!(!text.contains("TEST_TOKEN"));
}

#[tokio::test]
async fn test_telegram_ok_false_is_an_error() {
    let app = Router::new().route(
        "/botTEST_TOKEN/sendMessage",
        post(|| async { Json(json!({"ok": false, "description": "Forbidden: bot was blocked"})) }),
    );
    let addr = serve(app).await;

    let err = bot(addr).send("hello").await.unwrap_err();
    assert!(err.to_string().contains("bot was blocked"));
}
