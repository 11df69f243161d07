//! HTTP server for the CI dispatcher.
//!
//! # Endpoints
//!
//! - `POST /event_handler` - Accepts GitHub webhook deliveries and runs builds
//! - `POST /webhook` - Same as `/event_handler`
//! - `GET /health` - Returns 200 if server is running

use std::sync::Arc;

use tower_http::trace::TraceLayer;

use crate::build::BuildExecutor;
use crate::policy::PolicyConfig;
use crate::router::EventRouter;
use crate::status::StatusReporter;

pub mod health;
pub mod webhook;

pub use health::health_handler;
pub use webhook::{WebhookError, webhook_handler};

/// Shared application state.
///
/// This is passed to all handlers via Axum's `State` extractor.
pub struct AppState<R, E> {
    inner: Arc<EventRouter<R, E>>,
}

impl<R, E> Clone for AppState<R, E> {
    fn clone(&self) -> Self {
        AppState {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R, E> AppState<R, E>
where
    R: StatusReporter + Sync,
    E: BuildExecutor + Sync,
{
    /// Creates the state from a loaded policy and both capabilities.
    pub fn new(policy: Arc<PolicyConfig>, reporter: R, executor: E) -> Self {
        AppState {
            inner: Arc::new(EventRouter::new(policy, reporter, executor)),
        }
    }

    /// Returns the event router.
    pub fn router(&self) -> &EventRouter<R, E> {
        &self.inner
    }
}

/// Builds the axum Router with all endpoints.
pub fn build_router<R, E>(app_state: AppState<R, E>) -> axum::Router
where
    R: StatusReporter + Send + Sync + 'static,
    E: BuildExecutor + Send + Sync + 'static,
{
    use axum::routing::{get, post};

    axum::Router::new()
        .route("/event_handler", post(webhook_handler::<R, E>))
        .route("/webhook", post(webhook_handler::<R, E>))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
