#![allow(clippy::must_use_candidate)]

//! Response interpretation for the Taskicle client
//!
//! Turns backend responses into user-facing data: status badges for
//! priorities and task states, messages for API result codes, and the
//! composite error text shown when a request fails

pub mod failure;
pub mod presenter;
pub mod result_code;
pub mod route;
pub mod status;

pub use failure::{ApiFailurePayload, TransportFailure};
pub use presenter::{
    ErrorSink, format_api_failure, format_transport_failure, present_api_failure, present_transport_failure,
};
pub use result_code::{ApiResultCode, translate};
pub use route::{RouteName, resolve};
pub use status::{PriorityLevel, StatusDescriptor, StatusKind, TaskState, lookup, lookup_str};
