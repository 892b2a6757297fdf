use hyper::StatusCode;
use serde_json::json;
use thiserror::Error;

/// Failures surfaced to gateway callers as `{"error": <message>}`.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The caller sent an unusable request.
    #[error("{0}")]
    InvalidRequest(String),
    /// The webhook answered but had nothing for the identifier.
    #[error("{0}")]
    NotFound(String),
    /// The webhook was unreachable, timed out or answered with an error
    /// status. `status` is the upstream status when one was received.
    #[error("{message}")]
    Upstream { status: Option<u16>, message: String },
}

impl GatewayError {
    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        GatewayError::Upstream {
            status,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Upstream { status, .. } => status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    pub fn to_json(&self) -> String {
        json!({ "error": self.to_string() }).to_string()
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
