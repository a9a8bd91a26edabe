//! Concrete resource models
//!
//! Each model is a static [`ResourceSchema`] plus a newtype over
//! [`Resource`] with typed accessors. The newtypes deref to [`Resource`],
//! so the generic lifecycle methods are available on all of them.

use crate::resource::{Resource, ResourceSchema};

/// A typed view over a [`Resource`] of one schema
pub trait TypedResource: Sized {
    fn schema() -> &'static ResourceSchema;
    fn from_resource(resource: Resource) -> Self;
    fn into_resource(self) -> Resource;
}

macro_rules! typed_resource {
    ($(#[$meta:meta])* $name:ident, $schema:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize)]
        #[serde(transparent)]
        pub struct $name(crate::resource::Resource);

        impl crate::models::TypedResource for $name {
            fn schema() -> &'static crate::resource::ResourceSchema {
                &$schema
            }

            fn from_resource(resource: crate::resource::Resource) -> Self {
                debug_assert_eq!(resource.schema().key, $schema.key);
                Self(resource)
            }

            fn into_resource(self) -> crate::resource::Resource {
                self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = crate::resource::Resource;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl std::ops::DerefMut for $name {
            fn deref_mut(&mut self) -> &mut Self::Target {
                &mut self.0
            }
        }

        impl From<$name> for crate::proxy::Ref<$name> {
            fn from(resource: $name) -> Self {
                crate::proxy::Ref::Instance(resource)
            }
        }
    };
}

mod account;
mod container;
mod object;
mod resource_lock;
mod share_mapping;

pub use account::{Account, ACCOUNT};
pub use container::{Container, CONTAINER};
pub use object::{Object, OBJECT};
pub use resource_lock::{ResourceLock, RESOURCE_LOCK};
pub use share_mapping::{ShareMapping, SHARE_MAPPING};
