//! Cloud API interaction module
//!
//! This module provides the plumbing every resource request goes through:
//! the transport, the session that binds it to service endpoints, and
//! microversion handling.
//!
//! # Module Structure
//!
//! - [`http`] - The [`Transport`](http::Transport) trait and its reqwest implementation
//! - [`session`] - Service endpoints and request stamping
//! - [`microversion`] - `major.minor` API versions
//!
//! # Example
//!
//! ```ignore
//! use stacksdk::cloud::{Endpoint, HttpTransport, ServiceType, Session, TransportOptions};
//! use std::sync::Arc;
//!
//! let transport = HttpTransport::new(TransportOptions::default())?;
//! let session = Session::new(Arc::new(transport))
//!     .with_endpoint(ServiceType::Compute, Endpoint::new("https://cloud/compute/v2.1"));
//! ```

pub mod http;
pub mod microversion;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use http::{
    format_error, HttpRequest, HttpResponse, HttpTransport, RequestBody, Transport,
    TransportOptions,
};
pub use microversion::Microversion;
pub use session::{Endpoint, ServiceType, Session};
