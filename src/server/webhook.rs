//! Webhook endpoint handler.
//!
//! Accepts a GitHub delivery, extracts the JSON payload and routes it on a
//! spawned task. The response waits for that task, but the task does not
//! depend on the request: if the client disconnects (GitHub stops waiting
//! after about ten seconds) the build still runs to its terminal status.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::AppState;
use crate::build::BuildExecutor;
use crate::status::StatusReporter;
use crate::types::DeliveryId;
use crate::webhooks::ParseError;

/// Header name for GitHub event type.
const HEADER_EVENT: &str = "x-github-event";
/// Header name for GitHub delivery ID.
const HEADER_DELIVERY: &str = "x-github-delivery";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Errors that can occur when processing a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Missing required header.
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    /// Form-encoded body without a usable `payload` field.
    #[error("invalid form body: {0}")]
    InvalidForm(#[from] serde_urlencoded::de::Error),

    /// The payload of a build-triggering event is malformed.
    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] ParseError),

    /// The routing task panicked.
    #[error("event processing failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MissingHeader(_)
            | WebhookError::InvalidForm(_)
            | WebhookError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            WebhookError::TaskFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

/// GitHub's form delivery mode wraps the JSON in a `payload` field.
#[derive(Debug, Deserialize)]
struct FormDelivery {
    payload: String,
}

/// Webhook handler.
///
/// # Request
///
/// - Method: POST
/// - Required header `X-GitHub-Event`; `X-GitHub-Delivery` is logged if present
/// - Body: JSON payload, or `application/x-www-form-urlencoded` with the JSON
///   in `payload`
///
/// # Response
///
/// - 200 OK: event handled; the body says what happened
/// - 400 Bad Request: missing header, undecodable body, malformed payload
/// - 500 Internal Server Error: the routing task panicked
pub async fn webhook_handler<R, E>(
    State(app_state): State<AppState<R, E>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), WebhookError>
where
    R: StatusReporter + Send + Sync + 'static,
    E: BuildExecutor + Send + Sync + 'static,
{
    let event_type = get_header(&headers, HEADER_EVENT)?;
    let delivery_id = get_header(&headers, HEADER_DELIVERY)
        .map(DeliveryId::new)
        .unwrap_or_else(|_| DeliveryId::new("-"));

    debug!(
        delivery_id = %delivery_id,
        event_type = %event_type,
        "Received webhook"
    );

    let payload = extract_payload(&headers, body)?;

    let event_type = event_type.to_string();
    let routed = tokio::spawn(async move {
        let result = app_state.router().route(&event_type, &payload).await;
        match &result {
            Ok(outcome) => info!(
                delivery_id = %delivery_id,
                event_type = %event_type,
                outcome = outcome.describe(),
                "Webhook handled"
            ),
            Err(e) => warn!(
                delivery_id = %delivery_id,
                event_type = %event_type,
                error = %e,
                "Malformed payload"
            ),
        }
        result
    });

    let outcome = routed.await??;
    Ok((StatusCode::OK, outcome.describe()))
}

/// Returns the JSON payload bytes, unwrapping form deliveries.
fn extract_payload(headers: &HeaderMap, body: Bytes) -> Result<Bytes, WebhookError> {
    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with(FORM_CONTENT_TYPE));

    if !is_form {
        return Ok(body);
    }

    let form: FormDelivery = serde_urlencoded::from_bytes(&body)?;
    Ok(Bytes::from(form.payload))
}

/// Extracts a header value as a string.
fn get_header<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, WebhookError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or(WebhookError::MissingHeader(name))
}
