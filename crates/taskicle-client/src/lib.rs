#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! Typed Rust HTTP client for the Taskicle backend
//!
//! Wraps the backend's `{ r, r2, err_msg, data }` envelope: successful
//! calls return `data`, failures come back as [`ClientError`] values ready
//! to hand to the error presenter. Page content travels in the binary
//! frames of [`frame`].

mod client;
pub mod error;
pub mod frame;
pub mod interceptor;
pub mod types;

pub use client::{ApiClient, REQUEST_TIMEOUT};
pub use error::{ClientError, Result};
pub use frame::{ContentFrame, FrameError, PageType, SaveFrame};
pub use interceptor::{PassThrough, RequestInterceptor, ResponseInterceptor, SessionCookie};
pub use types::*;
