//! Object store containers
//!
//! Container properties travel as headers; the JSON listing reports
//! `count` and `bytes`, which populate the same attributes.

use super::TypedResource;
use crate::cloud::ServiceType;
use crate::error::Result;
use crate::resource::{Capabilities, Field, FieldType, RequestFormat, Resource, ResourceSchema};
use reqwest::Method;
use serde_json::{Map, Value};

pub static CONTAINER: ResourceSchema = ResourceSchema {
    key: "object_store.container",
    service: ServiceType::ObjectStore,
    resource_key: None,
    resources_key: None,
    base_path: "/",
    id_attribute: Some("name"),
    capabilities: Capabilities {
        create: true,
        fetch: false,
        commit: true,
        delete: true,
        list: true,
        head: true,
        download: false,
    },
    create_method: Method::PUT,
    commit_method: Method::POST,
    create_requires_id: true,
    request_format: RequestFormat::HeadersOnly,
    max_microversion: None,
    fields: &[
        Field::body("name"),
        Field::header("object_count", "X-Container-Object-Count")
            .typed(FieldType::Integer)
            .aliases(&["count"])
            .read_only(),
        Field::header("bytes_used", "X-Container-Bytes-Used")
            .typed(FieldType::Integer)
            .aliases(&["bytes"])
            .read_only(),
        Field::header("timestamp", "X-Timestamp").read_only(),
        Field::header("read_acl", "X-Container-Read"),
        Field::header("write_acl", "X-Container-Write"),
        Field::header("sync_to", "X-Container-Sync-To"),
        Field::header("sync_key", "X-Container-Sync-Key"),
        Field::header("versions_location", "X-Versions-Location"),
        Field::header("content_type", "Content-Type"),
        Field::header("is_content_type_detected", "X-Detect-Content-Type").typed(FieldType::Boolean),
        Field::header_prefix("metadata", "X-Container-Meta-"),
    ],
};

typed_resource!(
    /// A container of objects
    Container,
    CONTAINER
);

impl Container {
    pub fn new(name: &str) -> Result<Self> {
        Ok(Self::from_resource(Resource::from_attrs(&CONTAINER, [("name", name)])?))
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    pub fn object_count(&self) -> Option<i64> {
        self.get_i64("object_count")
    }

    pub fn bytes_used(&self) -> Option<i64> {
        self.get_i64("bytes_used")
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.get_str("timestamp")
    }

    pub fn read_acl(&self) -> Option<&str> {
        self.get_str("read_acl")
    }

    pub fn write_acl(&self) -> Option<&str> {
        self.get_str("write_acl")
    }

    pub fn versions_location(&self) -> Option<&str> {
        self.get_str("versions_location")
    }

    /// `X-Container-Meta-*` values keyed by lowercased suffix
    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.get_map("metadata")
    }
}
