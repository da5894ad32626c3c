use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::result_code::ApiResultCode;

/// Failure reported by the backend in a response envelope
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiFailurePayload {
    /// Result code
    pub r: ApiResultCode,
    /// Secondary code, typically the storage engine's own status
    #[serde(default)]
    pub r2: i64,
    /// Diagnostic message from the backend, if any
    #[serde(default)]
    pub err_msg: Option<String>,
}

impl ApiFailurePayload {
    pub fn new(r: impl Into<ApiResultCode>, r2: i64) -> Self {
        Self {
            r: r.into(),
            r2,
            err_msg: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, err_msg: impl Into<String>) -> Self {
        self.err_msg = Some(err_msg.into());
        self
    }

    /// Backend message, ignoring empty strings
    pub fn message(&self) -> Option<&str> {
        self.err_msg.as_deref().filter(|msg| !msg.is_empty())
    }
}

/// Failure at the HTTP layer, before the backend could report a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailure {
    /// A response arrived with a non-success status
    Response { status: u16, status_text: String },
    /// The request was sent but nothing came back
    NoResponse,
    /// The request could not be built or sent
    Request { message: String },
}

impl TransportFailure {
    /// Build a `Response` failure using the canonical reason phrase
    pub fn from_status(status: StatusCode) -> Self {
        Self::Response {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_owned(),
        }
    }

    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }
}
