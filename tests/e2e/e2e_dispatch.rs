use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use bytes::Bytes;
use tokio::net::TcpListener;
use workflow_dispatch::{DispatchConfig, DispatchError, Dispatcher, build_payload};

#[derive(Clone, Default)]
struct AppState {
    received: Arc<Mutex<Vec<(HeaderMap, Bytes)>>>,
}

impl AppState {
    fn record(&self, headers: HeaderMap, body: Bytes) {
        self.received
            .lock()
            .expect("received mutex poisoned")
            .push((headers, body));
    }

    fn count(&self) -> usize {
        self.received.lock().expect("received mutex poisoned").len()
    }
}

#[tokio::test]
async fn e2e_ok_dispatch_succeeds() {
    let server = TestServer::start().await;
    let dispatcher = Dispatcher::new(server.config("/ok"));

    dispatcher
        .dispatch(build_payload("mock-rock", "dHJpZ2dlcg=="), "ghp_example")
        .await
        .expect("stub 200 should be accepted");

    let received = server.state.received.lock().expect("received mutex poisoned");
    assert_eq!(received.len(), 1);
    let (headers, body) = &received[0];
    assert_eq!(headers["authorization"], "Bearer ghp_example");
    assert_eq!(headers["accept"], "application/vnd.github+json");
    assert_eq!(headers["x-github-api-version"], "2022-11-28");
    let body = std::str::from_utf8(body).expect("body should be utf-8");
    assert!(body.starts_with(r#"{"ref":"main","inputs":{"oci-image-name":"mock-rock""#));
    assert!(body.contains(r#""upload":true"#));
}

#[tokio::test]
async fn e2e_bad_credentials_is_fatal_with_diagnostic() {
    let server = TestServer::start().await;
    let dispatcher = Dispatcher::new(server.config("/unauthorized"));

    let err = dispatcher
        .dispatch(build_payload("mock-rock", ""), "wrong")
        .await
        .expect_err("401 should fail");

    let message = err.to_string();
    assert!(message.contains("401"), "{message}");
    assert!(message.contains("Bad credentials"), "{message}");
    assert_eq!(server.state.count(), 1);
}

#[tokio::test]
async fn e2e_no_content_is_rejected() {
    let server = TestServer::start().await;
    let dispatcher = Dispatcher::new(server.config("/no-content"));

    let err = dispatcher
        .dispatch(build_payload("mock-rock", ""), "ghp_example")
        .await
        .expect_err("204 should fail");

    assert_eq!(err.status(), Some(204));
}

#[tokio::test]
async fn e2e_connection_refused_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind probe listener");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);

    let config = DispatchConfig::default().with_endpoint(format!("http://{addr}/dispatches"));
    let err = Dispatcher::new(config)
        .dispatch(build_payload("mock-rock", ""), "ghp_example")
        .await
        .expect_err("closed port should fail");

    assert!(matches!(err, DispatchError::Transport(_)), "{err:?}");
}

struct TestServer {
    base_url: String,
    state: AppState,
    task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start() -> Self {
        let state = AppState::default();
        let app = Router::new()
            .route("/ok", post(ok_handler))
            .route("/unauthorized", post(unauthorized_handler))
            .route("/no-content", post(no_content_handler))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let base_url = format!("http://{}", addr);

        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url,
            state,
            task,
        }
    }

    fn config(&self, path: &str) -> DispatchConfig {
        DispatchConfig::default().with_endpoint(format!("{}{}", self.base_url, path))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn ok_handler(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> StatusCode {
    state.record(headers, body);
    StatusCode::OK
}

async fn unauthorized_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, &'static str) {
    state.record(headers, body);
    (StatusCode::UNAUTHORIZED, "Bad credentials")
}

async fn no_content_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    state.record(headers, body);
    StatusCode::NO_CONTENT
}
