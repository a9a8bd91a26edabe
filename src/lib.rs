//! stacksdk
//!
//! Typed resource models and service proxies for OpenStack-style REST
//! APIs. Resources are described by static schemas; one generic
//! [`resource::Resource`] type runs the create, fetch, commit, delete,
//! head and list operations for every model.

pub mod cloud;
pub mod config;
pub mod error;
pub mod models;
pub mod proxy;
pub mod resource;

pub use cloud::{Endpoint, HttpTransport, Microversion, ServiceType, Session, TransportOptions};
pub use config::Config;
pub use error::{Error, Result};
pub use proxy::Ref;
pub use resource::{ListQuery, Resource, ResourceState};
