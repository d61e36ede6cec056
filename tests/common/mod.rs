#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use home_inventory::{
    backend::MemoryBackend, config::AppConfig, events, AppState,
};

/// Helper harness driving the full router against an in-memory backend.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub backend: Arc<MemoryBackend>,
    token: String,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with a signed-in user.
    pub async fn new() -> Self {
        let cfg = AppConfig::new("127.0.0.1".to_string(), 18_080, "test".to_string());
        let backend = MemoryBackend::shared();
        let (event_sender, event_rx) = events::channel(cfg.event_channel_capacity);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::in_memory(cfg, backend.clone(), event_sender);
        let router = home_inventory::app(state.clone());

        let mut app = Self {
            router,
            state,
            backend,
            token: String::new(),
            _event_task: event_task,
        };
        app.token = app.sign_up("tester@example.com", "password1").await;
        app
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// Creates an account through the API and returns its bearer token.
    pub async fn sign_up(&self, email: &str, password: &str) -> String {
        let response = self
            .request(
                Method::POST,
                "/auth/sign-up",
                Some(json!({
                    "email": email,
                    "password": password,
                    "confirm_password": password
                })),
                None,
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response_json(response).await;
        body["data"]["token"]
            .as_str()
            .expect("token in sign-up response")
            .to_string()
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Convenience helper for authenticated JSON requests.
    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response {
        self.request(method, uri, body, Some(self.token())).await
    }

    /// Adds an item through the API and returns its JSON.
    pub async fn create_item(&self, payload: Value) -> Value {
        let response = self
            .request_authenticated(Method::POST, "/api/v1/items", Some(payload))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        response_json(response).await["data"].clone()
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

pub fn item_payload(name: &str, location: &str, quantity: u32) -> Value {
    json!({
        "name": name,
        "quantity": quantity,
        "category": "Divers",
        "location": location,
        "purchase_link": "",
        "stock_management_enabled": false
    })
}
