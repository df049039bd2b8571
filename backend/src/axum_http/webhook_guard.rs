use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use crates::domain::errors::{AppError, AppResult};
use tracing::warn;

use super::error_responses::ApiError;

pub const WEBHOOK_TOKEN_HEADER: &str = "x-webhook-token";

/// Static shared-secret check for provider notifications.
#[derive(Debug, Clone)]
pub struct WebhookGuard {
    token: String,
}

impl WebhookGuard {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    pub fn verify(&self, headers: &HeaderMap) -> AppResult<()> {
        let provided = headers
            .get(WEBHOOK_TOKEN_HEADER)
            .map(|value| value.to_str().unwrap_or_default())
            .unwrap_or_default();

        if provided.is_empty() {
            return Err(AppError::unauthorized("Webhook token not provided"));
        }

        // An unset server token never matches.
        if self.token.is_empty() || provided != self.token {
            return Err(AppError::unauthorized("Invalid webhook token"));
        }

        Ok(())
    }
}

pub async fn require_webhook_token(
    State(guard): State<Arc<WebhookGuard>>,
    req: Request,
    next: Next,
) -> Response {
    if let Err(err) = guard.verify(req.headers()) {
        warn!(path = %req.uri().path(), reason = %err, "webhook_guard: request rejected");
        return ApiError(err).into_response();
    }

    next.run(req).await
}
