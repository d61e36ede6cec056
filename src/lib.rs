//! Home inventory library
//!
//! Items, stock levels and change history for a household or rental
//! property, served over HTTP on top of a managed backend.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod backend;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod health;
pub mod live;
pub mod models;
pub mod notifications;
pub mod services;
pub mod session;
pub mod stock;
pub mod subscription;
pub mod views;

use axum::{http::HeaderValue, response::Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::backend::{AuthBackend, DocumentStore, MemoryBackend};
use crate::notifications::Notification;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::AppConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub event_sender: events::EventSender,
    pub auth: services::AuthService,
    pub items: services::ItemService,
    pub history: services::HistoryService,
}

impl AppState {
    pub fn new(
        config: config::AppConfig,
        auth_backend: Arc<dyn AuthBackend>,
        store: Arc<dyn DocumentStore>,
        event_sender: events::EventSender,
    ) -> Self {
        let history = services::HistoryService::new(store.clone(), event_sender.clone());
        let items =
            services::ItemService::new(store.clone(), history.clone(), event_sender.clone());
        Self {
            config: Arc::new(config),
            auth: services::AuthService::new(auth_backend),
            store,
            event_sender,
            items,
            history,
        }
    }

    /// State backed by a single in-process backend.
    pub fn in_memory(
        config: config::AppConfig,
        backend: Arc<MemoryBackend>,
        event_sender: events::EventSender,
    ) -> Self {
        Self::new(config, backend.clone(), backend, event_sender)
    }
}

// Common response wrappers
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<Notification>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            notification: None,
        }
    }

    /// Success carrying the toast a client should show.
    pub fn notify(data: T, notification: Notification) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(notification.description.clone()),
            notification: Some(notification),
        }
    }
}

/// Standard API result type for JSON responses
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// Routes under `/api/v1`
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/items", handlers::items::item_routes())
        .nest("/stock", handlers::stock::stock_routes())
        .nest("/history", handlers::history::history_routes())
        .nest("/catalog", handlers::catalog::catalog_routes())
}

fn cors_layer(config: &config::AppConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.should_allow_permissive_cors() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins()
        .into_iter()
        .filter_map(|origin| match HeaderValue::from_str(&origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(%origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

/// Full application router
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    Router::new()
        .nest("/health", health::health_routes())
        .nest("/auth", handlers::auth::auth_routes())
        .nest("/api/v1", api_v1_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod response_tests {
    use super::*;

    #[test]
    fn success_omits_empty_fields() {
        let value = serde_json::to_value(ApiResponse::success(3)).unwrap();
        assert_eq!(value, serde_json::json!({ "success": true, "data": 3 }));
    }

    #[test]
    fn notify_copies_the_description() {
        let response = ApiResponse::notify((), Notification::success("Saved", "Item updated"));
        assert_eq!(response.message.as_deref(), Some("Item updated"));
        assert!(!response.notification.unwrap().is_destructive());
    }
}
