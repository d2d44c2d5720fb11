// Integration tests for the HTTP request client
//
// Each test serves a stand-in diagnosis service on an ephemeral port.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use ecg_assistant::client::{ChatRequest, ChatResponse, DiagnosisResponse, PredictRequest};
use ecg_assistant::{
    ArrhythmiaLabel, HttpRequestClient, RequestClient, RequestError, RequestPayload,
    ResponseBody, Signal, DEFAULT_SIGNAL_LENGTH,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

async fn spawn_service(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}", addr)
}

fn client(base_url: &str) -> HttpRequestClient {
    HttpRequestClient::new(base_url, Duration::from_secs(5)).unwrap()
}

fn heartbeat() -> Signal {
    Signal::new(vec![0.25; DEFAULT_SIGNAL_LENGTH]).unwrap()
}

async fn predict_ventricular(Json(req): Json<PredictRequest>) -> Json<DiagnosisResponse> {
    assert_eq!(req.signal.len(), DEFAULT_SIGNAL_LENGTH);
    Json(DiagnosisResponse {
        arrhythmia_type: "Ventricular Ectopic".to_string(),
        confidence: 0.92,
        class_id: 2,
    })
}

async fn chat_echo(Json(req): Json<ChatRequest>) -> Json<ChatResponse> {
    Json(ChatResponse {
        reply: format!("You said: {}", req.message),
    })
}

#[tokio::test]
async fn test_classify_success() {
    let base_url = spawn_service(Router::new().route("/predict", post(predict_ventricular))).await;

    let result = client(&base_url).classify(&heartbeat()).await.unwrap();

    assert_eq!(result.label, ArrhythmiaLabel::VentricularEctopic);
    assert_eq!(result.class_index, 2);
    assert!((result.confidence - 0.92).abs() < 1e-9);
}

#[tokio::test]
async fn test_chat_success_trims_message() {
    let base_url = spawn_service(Router::new().route("/chat", post(chat_echo))).await;

    let reply = client(&base_url).chat("  hello  ").await.unwrap();

    assert_eq!(reply, "You said: hello");
}

#[tokio::test]
async fn test_send_dispatches_by_kind() {
    let app = Router::new()
        .route("/predict", post(predict_ventricular))
        .route("/chat", post(chat_echo));
    let base_url = spawn_service(app).await;
    let client = client(&format!("{}/", base_url));

    let body = client.send(RequestPayload::Chat("hi".into())).await.unwrap();
    assert_eq!(body, ResponseBody::ChatReply("You said: hi".to_string()));

    let body = client.send(RequestPayload::Classify(heartbeat())).await.unwrap();
    assert!(matches!(body, ResponseBody::Classification(_)));
}

#[tokio::test]
async fn test_blank_chat_never_hits_network() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route(
            "/chat",
            post(|State(hits): State<Arc<AtomicUsize>>| async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(json!({ "reply": "unexpected" }))
            }),
        )
        .with_state(Arc::clone(&hits));
    let base_url = spawn_service(app).await;

    let err = client(&base_url).chat("   ").await.unwrap_err();

    assert_eq!(err, RequestError::EmptyInput);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_server_error_is_transport() {
    let app = Router::new().route(
        "/predict",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base_url = spawn_service(app).await;

    let err = client(&base_url).classify(&heartbeat()).await.unwrap_err();

    assert!(err.is_transport(), "{:?}", err);
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_malformed_body_is_decode() {
    let app = Router::new()
        .route("/predict", post(|| async { "definitely not json" }))
        .route("/chat", post(|| async { Json(json!({ "answer": "wrong field" })) }));
    let base_url = spawn_service(app).await;
    let client = client(&base_url);

    let err = client.classify(&heartbeat()).await.unwrap_err();
    assert!(err.is_decode(), "{:?}", err);

    let err = client.chat("hello").await.unwrap_err();
    assert!(err.is_decode(), "{:?}", err);
}

#[tokio::test]
async fn test_model_not_loaded_body_is_decode() {
    let app = Router::new().route(
        "/predict",
        post(|| async {
            Json(json!({ "error": "Model is not loaded. Cannot perform prediction." }))
        }),
    );
    let base_url = spawn_service(app).await;

    let err = client(&base_url).classify(&heartbeat()).await.unwrap_err();

    assert!(err.is_decode());
    assert!(err.to_string().contains("Model is not loaded"));
}

#[tokio::test]
async fn test_out_of_range_confidence_is_decode() {
    let app = Router::new().route(
        "/predict",
        post(|| async {
            Json(json!({ "arrhythmia_type": "Normal", "confidence": 1.7, "class_id": 0 }))
        }),
    );
    let base_url = spawn_service(app).await;

    let err = client(&base_url).classify(&heartbeat()).await.unwrap_err();

    assert!(err.is_decode());
}

#[tokio::test]
async fn test_empty_reply_is_decode() {
    let app = Router::new().route("/chat", post(|| async { Json(json!({ "reply": "  " })) }));
    let base_url = spawn_service(app).await;

    let err = client(&base_url).chat("hello").await.unwrap_err();

    assert!(err.is_decode());
}

#[tokio::test]
async fn test_slow_service_times_out_as_transport() {
    let app = Router::new().route(
        "/chat",
        post(|| async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Json(json!({ "reply": "too late" }))
        }),
    );
    let base_url = spawn_service(app).await;

    let mut client = client(&base_url);
    client.set_timeout(Duration::from_millis(50));
    assert_eq!(client.timeout(), Duration::from_millis(50));

    let err = client.chat("hello").await.unwrap_err();

    assert!(err.is_transport());
    assert!(err.to_string().contains("timed out"), "{}", err);
}

#[tokio::test]
async fn test_connection_refused_is_transport() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{}", addr))
        .classify(&heartbeat())
        .await
        .unwrap_err();

    assert!(err.is_transport(), "{:?}", err);
}

#[tokio::test]
async fn test_health_check() {
    let app = Router::new().route(
        "/",
        get(|| async { Json(json!({ "status": "ok", "model_loaded": false })) }),
    );
    let base_url = spawn_service(app).await;

    let health = client(&base_url).health().await.unwrap();

    assert_eq!(health.status, "ok");
    assert!(!health.model_loaded);
    assert!(!health.is_ready());
}
