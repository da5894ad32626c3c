//! Composite error messages for failed requests
//!
//! Each `present_*` call formats one message and emits it exactly once to
//! the sink's notification channel and once to its diagnostic log

use crate::failure::{ApiFailurePayload, TransportFailure};

const MISSING_DETAIL: &str = "未知错误";

/// Destination for presented errors
pub trait ErrorSink {
    /// Show the message to the user
    fn notify_error(&self, message: &str);

    /// Record the message in the diagnostic log
    fn log_error(&self, message: &str) {
        tracing::error!(target: "taskicle::presenter", "{message}");
    }
}

impl<S: ErrorSink + ?Sized> ErrorSink for &S {
    fn notify_error(&self, message: &str) {
        (**self).notify_error(message);
    }

    fn log_error(&self, message: &str) {
        (**self).log_error(message);
    }
}

/// Format a backend-reported failure
pub fn format_api_failure(payload: &ApiFailurePayload) -> String {
    format!(
        "错误: {} ({}, {}, {})",
        payload.r.message(),
        payload.r,
        payload.r2,
        payload.message().unwrap_or(MISSING_DETAIL)
    )
}

/// Format an HTTP-level failure
pub fn format_transport_failure(failure: &TransportFailure) -> String {
    match failure {
        TransportFailure::Response { status, status_text } => format!("请求错误：{status}({status_text})"),
        TransportFailure::NoResponse => "请求错误：无响应".to_owned(),
        TransportFailure::Request { message } => format!("请求错误：{message}"),
    }
}

/// Present a backend-reported failure
pub fn present_api_failure<S: ErrorSink + ?Sized>(sink: &S, payload: &ApiFailurePayload) {
    emit(sink, &format_api_failure(payload));
}

/// Present an HTTP-level failure
pub fn present_transport_failure<S: ErrorSink + ?Sized>(sink: &S, failure: &TransportFailure) {
    emit(sink, &format_transport_failure(failure));
}

fn emit<S: ErrorSink + ?Sized>(sink: &S, message: &str) {
    sink.notify_error(message);
    sink.log_error(message);
}
