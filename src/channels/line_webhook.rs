//! LINE webhook endpoint: signature check, event parsing and dispatch.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::future::join_all;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use tracing::{debug, info, warn};

use super::line_types::{WebhookBody, parse_event};
use crate::review::ReviewManager;

/// Header carrying the base64 HMAC-SHA256 of the request body.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone)]
pub struct WebhookState {
    pub manager: Arc<ReviewManager>,
    pub channel_secret: Arc<SecretString>,
}

impl WebhookState {
    pub fn new(manager: Arc<ReviewManager>, channel_secret: SecretString) -> Self {
        Self {
            manager,
            channel_secret: Arc::new(channel_secret),
        }
    }
}

/// Build the webhook router: `POST /webhook` and `GET /health`.
pub fn webhook_routes(state: WebhookState) -> Router {
    Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/health", get(health))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "review-bot"
    }))
}

async fn webhook_handler(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let Some(signature) = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok()) else {
        warn!("Webhook request without signature");
        return StatusCode::UNAUTHORIZED;
    };

    if !verify_signature(state.channel_secret.expose_secret(), &body, signature) {
        warn!("Webhook signature mismatch");
        return StatusCode::UNAUTHORIZED;
    }

    let payload: WebhookBody = match serde_json::from_slice(&body) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "Unparsable webhook body");
            return StatusCode::BAD_REQUEST;
        }
    };

    let events: Vec<_> = payload.events.into_iter().filter_map(parse_event).collect();
    if events.is_empty() {
        debug!("Webhook carried no actionable events");
        return StatusCode::OK;
    }

    info!(count = events.len(), "Dispatching webhook events");
    // Generation can outlast LINE's webhook timeout, so answer before handling.
    // One task per batch keeps same-user events in arrival order.
    let manager = Arc::clone(&state.manager);
    tokio::spawn(async move {
        join_all(events.into_iter().map(|event| manager.handle_event(event))).await;
    });

    StatusCode::OK
}

/// Base64 HMAC-SHA256 of `body` keyed with the channel secret.
pub fn compute_signature(secret: &str, body: &[u8]) -> String {
    // HMAC accepts keys of any length.
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(body);
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Constant-time check of a LINE signature header against `body`.
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = STANDARD.decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}
