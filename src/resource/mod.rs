//! Resource abstraction layer
//!
//! Every concrete resource type is described by a static [`ResourceSchema`]
//! and handled through the one generic [`Resource`] type.
//!
//! # Architecture
//!
//! - [`field`] - Attribute to wire bindings, defaults and coercion
//! - [`schema`] - Static resource descriptions: paths, envelopes, capabilities
//! - [`instance`] - Resource instances and their lifecycle operations
//! - [`fetcher`] - Marker/limit pagination
//! - [`registry`] - Lookup of every schema the SDK ships
//!
//! # Example
//!
//! ```ignore
//! use stacksdk::resource::{list_resources, ListQuery};
//! use stacksdk::models::CONTAINER;
//! use futures::TryStreamExt;
//!
//! async fn names(session: &Session) -> stacksdk::Result<Vec<String>> {
//!     let containers = list_resources(session, &CONTAINER, Default::default(), ListQuery::new())?;
//!     containers.try_filter_map(|c| async move { Ok(c.id()) }).try_collect().await
//! }
//! ```

pub mod fetcher;
pub mod field;
pub mod instance;
pub mod registry;
pub mod schema;

pub use fetcher::{fetch_resources, list_resources, ListQuery};
pub use field::{DefaultValue, Field, FieldKind, FieldType};
pub use instance::{Resource, ResourceState};
pub use registry::{get_all_schema_keys, get_schema};
pub use schema::{Capabilities, Operation, RequestFormat, ResourceSchema};
