//! Service proxies
//!
//! A proxy is a thin per-service facade borrowed from a [`Session`]. Each
//! method builds or resolves a model, runs one lifecycle operation on it
//! and hands the model back.
//!
//! ```ignore
//! let session = config.session()?;
//! let mapping = session
//!     .compute()
//!     .create_share_attachment("server-1", "share-1", Some("data"))
//!     .await?;
//! ```

mod compute;
mod object_store;
mod shared_file_system;

pub use compute::ComputeProxy;
pub use object_store::ObjectStoreProxy;
pub use shared_file_system::SharedFileSystemProxy;

use crate::cloud::Session;
use crate::error::{Error, Result};
use crate::models::TypedResource;
use crate::resource::{list_resources, ListQuery, Resource};
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use serde_json::{Map, Value};

/// A resource given either by identifier or as an instance
#[derive(Debug, Clone, PartialEq)]
pub enum Ref<T> {
    Identifier(String),
    Instance(T),
}

impl<T> From<&str> for Ref<T> {
    fn from(id: &str) -> Self {
        Ref::Identifier(id.to_string())
    }
}

impl<T> From<String> for Ref<T> {
    fn from(id: String) -> Self {
        Ref::Identifier(id)
    }
}

impl<T: TypedResource> Ref<T> {
    /// Turn the reference into an instance bound to the `uri` parameters
    ///
    /// An identifier becomes a fresh instance with nothing dirty; an
    /// instance keeps its state and has any differing URI parameter
    /// rebound, which leaves nothing new to commit.
    pub(crate) fn resolve(self, uri: &[(&str, &str)]) -> Result<T> {
        let schema = T::schema();

        let resource = match self {
            Ref::Identifier(id) => {
                let id_attribute = schema.id_attribute.ok_or_else(|| {
                    Error::invalid(format!("{} has no identifier attribute", schema.key))
                })?;
                let attrs = uri
                    .iter()
                    .map(|(name, value)| (name.to_string(), Value::from(*value)))
                    .chain(std::iter::once((id_attribute.to_string(), Value::String(id))));
                let mut resource = Resource::from_attrs(schema, attrs)?;
                resource.clear_dirty();
                resource
            }
            Ref::Instance(instance) => {
                let mut resource = instance.into_resource();
                for (name, value) in uri {
                    if resource.get_str(name) != Some(*value) {
                        resource.set(name, *value)?;
                    }
                }
                resource
            }
        };

        Ok(T::from_resource(resource))
    }
}

/// URI parameters as an attribute map
pub(crate) fn uri_attrs(uri: &[(&str, &str)]) -> Map<String, Value> {
    uri.iter()
        .map(|(name, value)| (name.to_string(), Value::from(*value)))
        .collect()
}

/// Build a typed instance from caller attributes plus URI parameters
pub(crate) fn build<T: TypedResource>(uri: &[(&str, &str)], attrs: Map<String, Value>) -> Result<T> {
    let attrs = uri_attrs(uri).into_iter().chain(attrs);
    Ok(T::from_resource(Resource::from_attrs(T::schema(), attrs)?))
}

/// Lazily list typed instances
pub(crate) fn list_typed<'a, T>(
    session: &'a Session,
    uri: &[(&str, &str)],
    query: ListQuery,
) -> Result<BoxStream<'a, Result<T>>>
where
    T: TypedResource + Send + 'a,
{
    Ok(list_resources(session, T::schema(), uri_attrs(uri), query)?
        .map_ok(T::from_resource)
        .boxed())
}
