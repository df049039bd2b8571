use axum::{
    Json,
    body::{Body, to_bytes},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use crates::domain::errors::AppError;
use serde::Serialize;
use tracing::{error, warn};

const MAX_ERROR_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub status_code: u16,
    pub message: String,
    pub error: String,
    pub timestamp: String,
    pub path: String,
}

/// Handler-side wrapper so `AppError` can be returned from axum handlers.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

// The envelope middleware finalises the body; the error rides along in the extensions.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let mut response = (status, self.0.message().to_string()).into_response();
        response.extensions_mut().insert(self.0);
        response
    }
}

/// Rewrites every 4xx/5xx response into an [`ErrorResponse`] and logs it.
/// Error details are logged, never returned.
pub async fn error_envelope(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let (message, error_type, details) = match response.extensions().get::<AppError>().cloned() {
        Some(app_error) => (
            app_error.message().to_string(),
            app_error.error_type().to_string(),
            app_error.details().cloned(),
        ),
        None => (
            read_message(response.into_body(), status).await,
            error_type_for_status(status),
            None,
        ),
    };

    if status.is_server_error() {
        error!(details = ?details, "{method} {path} - {}: {message}", status.as_u16());
    } else {
        warn!(details = ?details, "{method} {path} - {}: {message}", status.as_u16());
    }

    let body = ErrorResponse {
        status_code: status.as_u16(),
        message,
        error: error_type,
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        path,
    };

    (status, Json(body)).into_response()
}

async fn read_message(body: Body, status: StatusCode) -> String {
    let fallback = || status.canonical_reason().unwrap_or("Error").to_string();

    match to_bytes(body, MAX_ERROR_BODY_BYTES).await {
        Ok(bytes) if !bytes.is_empty() => {
            let text = String::from_utf8_lossy(&bytes).trim().to_string();
            if text.is_empty() { fallback() } else { text }
        }
        _ => fallback(),
    }
}

/// `Not Found` -> `NotFoundError`, `Internal Server Error` -> `InternalServerError`.
pub fn error_type_for_status(status: StatusCode) -> String {
    let mut name: String = status
        .canonical_reason()
        .unwrap_or("Unknown")
        .split_whitespace()
        .collect();
    if !name.ends_with("Error") {
        name.push_str("Error");
    }
    name
}
