//! Resource locks (shared file system)

use super::TypedResource;
use crate::cloud::{Microversion, ServiceType};
use crate::error::Result;
use crate::resource::{Capabilities, DefaultValue, Field, RequestFormat, Resource, ResourceSchema};
use reqwest::Method;

pub static RESOURCE_LOCK: ResourceSchema = ResourceSchema {
    key: "shared_file_system.resource_lock",
    service: ServiceType::SharedFileSystem,
    resource_key: Some("resource_lock"),
    resources_key: Some("resource_locks"),
    base_path: "/resource-locks",
    id_attribute: Some("id"),
    capabilities: Capabilities {
        create: true,
        fetch: true,
        commit: true,
        delete: true,
        list: true,
        head: false,
        download: false,
    },
    create_method: Method::POST,
    commit_method: Method::PUT,
    create_requires_id: false,
    request_format: RequestFormat::Enveloped,
    max_microversion: Some(Microversion::new(2, 81)),
    fields: &[
        Field::body("id").read_only(),
        Field::body("user_id").read_only(),
        Field::body("project_id").read_only(),
        Field::body("resource_type"),
        Field::body("resource_id"),
        Field::body("resource_action").default(DefaultValue::Str("delete")),
        Field::body("lock_reason"),
        Field::body("lock_context").read_only(),
        Field::body("created_at").read_only(),
        Field::body("updated_at").read_only(),
    ],
};

typed_resource!(
    /// A lock preventing an action on a resource
    ResourceLock,
    RESOURCE_LOCK
);

impl ResourceLock {
    /// A reference to an existing lock
    pub fn with_id(id: &str) -> Result<Self> {
        Ok(Self::from_resource(Resource::from_attrs(&RESOURCE_LOCK, [("id", id)])?))
    }

    pub fn id(&self) -> Option<&str> {
        self.get_str("id")
    }

    pub fn user_id(&self) -> Option<&str> {
        self.get_str("user_id")
    }

    pub fn project_id(&self) -> Option<&str> {
        self.get_str("project_id")
    }

    pub fn resource_type(&self) -> Option<&str> {
        self.get_str("resource_type")
    }

    pub fn resource_id(&self) -> Option<&str> {
        self.get_str("resource_id")
    }

    pub fn resource_action(&self) -> Option<&str> {
        self.get_str("resource_action")
    }

    pub fn lock_reason(&self) -> Option<&str> {
        self.get_str("lock_reason")
    }

    /// Who placed the lock: `user`, `admin` or `service`
    pub fn lock_context(&self) -> Option<&str> {
        self.get_str("lock_context")
    }

    pub fn created_at(&self) -> Option<&str> {
        self.get_str("created_at")
    }

    pub fn updated_at(&self) -> Option<&str> {
        self.get_str("updated_at")
    }
}
