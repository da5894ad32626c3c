use taskicle_core::{
    ApiFailurePayload, ErrorSink, TransportFailure, format_api_failure, format_transport_failure,
    present_api_failure, present_transport_failure,
};

use crate::frame::FrameError;

/// Client-specific result type
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors from the Taskicle client
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Backend answered with a non-zero result code
    #[error("{}", format_api_failure(.0))]
    Api(ApiFailurePayload),

    /// Request failed at the HTTP layer
    #[error("{}", format_transport_failure(.0))]
    Transport(TransportFailure),

    /// Response body was not a valid envelope
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// Page content frame was malformed
    #[error("invalid page frame: {0}")]
    Frame(#[from] FrameError),

    /// Invalid client configuration
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Hand this error to the presenter matching its shape
    ///
    /// Parse, frame and configuration errors are shown as request errors
    pub fn present<S: ErrorSink + ?Sized>(&self, sink: &S) {
        match self {
            Self::Api(payload) => present_api_failure(sink, payload),
            Self::Transport(failure) => present_transport_failure(sink, failure),
            Self::Parse(_) | Self::Frame(_) | Self::Config(_) => {
                present_transport_failure(sink, &TransportFailure::request(self.to_string()));
            }
        }
    }

    /// Backend payload, when the backend reported the failure
    pub const fn api_failure(&self) -> Option<&ApiFailurePayload> {
        match self {
            Self::Api(payload) => Some(payload),
            _ => None,
        }
    }

    /// Transport failure, when the request never got a usable response
    pub const fn transport_failure(&self) -> Option<&TransportFailure> {
        match self {
            Self::Transport(failure) => Some(failure),
            _ => None,
        }
    }
}

impl From<ApiFailurePayload> for ClientError {
    fn from(payload: ApiFailurePayload) -> Self {
        Self::Api(payload)
    }
}

impl From<TransportFailure> for ClientError {
    fn from(failure: TransportFailure) -> Self {
        Self::Transport(failure)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Parse(err.to_string());
        }

        if let Some(status) = err.status() {
            return Self::Transport(TransportFailure::from_status(status));
        }

        if err.is_builder() || err.is_redirect() {
            return Self::Transport(TransportFailure::request(err.to_string()));
        }

        // Sent (or attempted) but nothing usable came back.
        if err.is_connect() || err.is_timeout() || err.is_request() || err.is_body() {
            return Self::Transport(TransportFailure::NoResponse);
        }

        Self::Transport(TransportFailure::request(err.to_string()))
    }
}
