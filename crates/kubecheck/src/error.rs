use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use kubecheck_k8s_backend::KubecheckBackendError;

/// Errors that abort a whole upload. Each one maps to an HTTP status and a plain-text body.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("failed to parse multipart form: {message}")]
    Form { status: StatusCode, message: String },
    #[error("failed to retrieve file: {0}")]
    MissingFile(String),
    #[error("failed to read file: {message}")]
    Read { status: StatusCode, message: String },
    #[error("failed to load kubeconfig: {0}")]
    Kubeconfig(#[from] KubecheckBackendError),
}

impl RequestError {
    pub fn form_rejection(rejection: MultipartRejection) -> Self {
        Self::Form {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }

    pub fn form_error(err: MultipartError) -> Self {
        Self::Form {
            status: oversize_or(err.status(), StatusCode::BAD_REQUEST),
            message: err.body_text(),
        }
    }

    pub fn read_error(err: MultipartError) -> Self {
        Self::Read {
            status: oversize_or(err.status(), StatusCode::INTERNAL_SERVER_ERROR),
            message: err.body_text(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Form { status, .. } | Self::Read { status, .. } => *status,
            Self::MissingFile(_) | Self::Kubeconfig(_) => StatusCode::BAD_REQUEST,
        }
    }
}

// The body limit trips while the multipart stream is being consumed, so it shows up as an
// ordinary multipart error; keep its 413 rather than folding it into the stage's status.
fn oversize_or(status: StatusCode, fallback: StatusCode) -> StatusCode {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        status
    } else {
        fallback
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.to_string();

        tracing::warn!(status = %status, "Rejecting request: {}", body);

        match self {
            Self::MethodNotAllowed => (status, [(header::ALLOW, "POST")], body).into_response(),
            _ => (status, body).into_response(),
        }
    }
}
