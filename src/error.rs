//! Per-request failures and the HTTP status each one maps to.

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use std::fmt;

/// Errors raised while handling one request. None of them escape the handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The path is outside every route the gate recognizes.
    NotMatched { path: String },
    /// No archive entry or candidate file serves the path.
    ResourceNotFound { path: String },
    /// The RPC path could not be parsed (missing or non-numeric timeout).
    MalformedRequest { reason: String },
    /// The function table returned an error.
    CallFailed { function: String, message: String },
    /// The directory listing could not be rendered.
    RenderFailure { message: String },
}

impl RequestError {
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::NotMatched { .. } | RequestError::ResourceNotFound { .. } => {
                StatusCode::NOT_FOUND
            }
            RequestError::MalformedRequest { .. } | RequestError::CallFailed { .. } => {
                StatusCode::BAD_REQUEST
            }
            RequestError::RenderFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::NotMatched { path } => write!(f, "No secret key for URL request \"{}\"", path),
            RequestError::ResourceNotFound { path } => write!(f, "Unable to read file {}", path),
            RequestError::MalformedRequest { reason } => write!(f, "Malformed call: {}", reason),
            RequestError::CallFailed { function, message } => {
                write!(f, "Call to {} failed: {}", function, message)
            }
            RequestError::RenderFailure { message } => {
                write!(f, "Error while generating directory listing: {}", message)
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Failure details stay in the operator log.
        let body = match status {
            StatusCode::NOT_FOUND => Body::from("404"),
            StatusCode::INTERNAL_SERVER_ERROR => {
                Body::from("500 Internal Error : Error while generating directory listing.")
            }
            _ => Body::empty(),
        };
        (status, body).into_response()
    }
}
