//! Hooks run around every request the client sends
//!
//! Request interceptors see the fully built request before it is executed;
//! response interceptors see each HTTP response before its status is checked,
//! and every error before it is returned to the caller

use std::fmt;

use http::header::{COOKIE, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::{ClientError, Result};

/// Name of the cookie carrying the backend session id
const SESSION_COOKIE: &str = "sid";

/// Hook applied to outgoing requests
pub trait RequestInterceptor: Send + Sync + fmt::Debug {
    /// Inspect or rewrite the request
    fn on_request(&self, request: reqwest::Request) -> Result<reqwest::Request>;
}

/// Hook applied to incoming responses and failures
pub trait ResponseInterceptor: Send + Sync + fmt::Debug {
    /// Inspect or rewrite a response
    fn on_response(&self, response: reqwest::Response) -> Result<reqwest::Response>;

    /// Inspect or rewrite a failure
    fn on_error(&self, error: ClientError) -> ClientError {
        error
    }
}

/// Interceptor that changes nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl RequestInterceptor for PassThrough {
    fn on_request(&self, request: reqwest::Request) -> Result<reqwest::Request> {
        Ok(request)
    }
}

impl ResponseInterceptor for PassThrough {
    fn on_response(&self, response: reqwest::Response) -> Result<reqwest::Response> {
        Ok(response)
    }
}

/// Attaches the backend session cookie to every request
#[derive(Debug, Clone)]
pub struct SessionCookie {
    session_id: SecretString,
}

impl SessionCookie {
    pub const fn new(session_id: SecretString) -> Self {
        Self { session_id }
    }

    /// Extract the session from a `Set-Cookie` header value
    ///
    /// Accepts values like `sid=0123ABCD; Max-Age=864000;`
    pub fn from_set_cookie(header: &str) -> Option<Self> {
        let pair = header.split(';').next()?.trim();
        let (name, value) = pair.split_once('=')?;

        if name.trim() != SESSION_COOKIE || value.trim().is_empty() {
            return None;
        }

        Some(Self::new(SecretString::from(value.trim().to_owned())))
    }

    pub const fn session_id(&self) -> &SecretString {
        &self.session_id
    }
}

impl RequestInterceptor for SessionCookie {
    fn on_request(&self, mut request: reqwest::Request) -> Result<reqwest::Request> {
        let cookie = format!("{SESSION_COOKIE}={}", self.session_id.expose_secret());
        let mut value = HeaderValue::from_str(&cookie)
            .map_err(|_| ClientError::Config("session id is not a valid header value".to_owned()))?;
        value.set_sensitive(true);

        request.headers_mut().insert(COOKIE, value);
        Ok(request)
    }
}
