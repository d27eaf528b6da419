//! JSON error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::Error;

/// Error returned by API handlers
#[derive(Debug)]
pub enum ApiError {
    /// A required service is not configured
    NotConfigured(&'static str),
    /// Request body failed validation
    BadRequest(String),
    /// Error from the core library
    Katha(Error),
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self::Katha(e)
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl ApiError {
    fn parts(self) -> (StatusCode, &'static str, String) {
        match self {
            Self::NotConfigured(msg) => (StatusCode::SERVICE_UNAVAILABLE, "not_configured", msg.to_string()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::Katha(e) => {
                let message = e.to_string();
                let (status, code) = match e {
                    Error::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                    Error::MalformedPayload(_) => (StatusCode::UNPROCESSABLE_ENTITY, "malformed_payload"),
                    Error::EmptySynthesis => (StatusCode::UNPROCESSABLE_ENTITY, "empty_synthesis"),
                    Error::SinkUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "sink_unavailable"),
                    Error::ControllerClosed => (StatusCode::SERVICE_UNAVAILABLE, "playback_unavailable"),
                    Error::Config(_) => (StatusCode::SERVICE_UNAVAILABLE, "not_configured"),
                    Error::Analysis(_) => (StatusCode::BAD_GATEWAY, "analysis_failed"),
                    Error::Synthesis(_) | Error::Http(_) => (StatusCode::BAD_GATEWAY, "synthesis_failed"),
                    _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
                };
                (status, code, message)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        if status.is_server_error() {
            tracing::warn!(status = %status, code, error = %message, "request failed");
        }

        (status, Json(ErrorResponse { error: ErrorBody { code, message } })).into_response()
    }
}
