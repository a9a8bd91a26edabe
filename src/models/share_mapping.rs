//! Server share mappings (compute)
//!
//! Attaches a shared file system share to a server.

use super::TypedResource;
use crate::cloud::{Microversion, ServiceType};
use crate::error::Result;
use crate::resource::{Capabilities, DefaultValue, Field, RequestFormat, Resource, ResourceSchema};
use reqwest::Method;

pub static SHARE_MAPPING: ResourceSchema = ResourceSchema {
    key: "compute.share_mapping",
    service: ServiceType::Compute,
    resource_key: Some("share"),
    resources_key: Some("shares"),
    base_path: "/servers/{server_id}/shares",
    id_attribute: Some("share_id"),
    capabilities: Capabilities {
        create: true,
        fetch: true,
        commit: false,
        delete: true,
        list: true,
        head: false,
        download: false,
    },
    create_method: Method::POST,
    commit_method: Method::PUT,
    create_requires_id: false,
    request_format: RequestFormat::Bare,
    max_microversion: Some(Microversion::new(2, 97)),
    fields: &[
        Field::uri("server_id"),
        Field::body("uuid").read_only(),
        Field::body("share_id").default(DefaultValue::Str("")),
        Field::body("status").read_only(),
        Field::body("tag"),
        Field::body("export_location")
            .default(DefaultValue::Str(""))
            .read_only(),
    ],
};

typed_resource!(
    /// A share attached to a server
    ShareMapping,
    SHARE_MAPPING
);

impl ShareMapping {
    /// A mapping of `share_id` on `server_id`
    pub fn new(server_id: &str, share_id: &str) -> Result<Self> {
        let resource = Resource::from_attrs(
            &SHARE_MAPPING,
            [("server_id", server_id), ("share_id", share_id)],
        )?;
        Ok(Self::from_resource(resource))
    }

    pub fn server_id(&self) -> Option<&str> {
        self.get_str("server_id")
    }

    /// Id of the mapping itself
    pub fn uuid(&self) -> Option<&str> {
        self.get_str("uuid")
    }

    pub fn share_id(&self) -> Option<&str> {
        self.get_str("share_id")
    }

    pub fn status(&self) -> Option<&str> {
        self.get_str("status")
    }

    pub fn tag(&self) -> Option<&str> {
        self.get_str("tag")
    }

    pub fn export_location(&self) -> Option<&str> {
        self.get_str("export_location")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_basic() {
        let sot = &SHARE_MAPPING;
        assert_eq!(sot.resource_key, Some("share"));
        assert_eq!(sot.resources_key, Some("shares"));
        assert_eq!(sot.base_path, "/servers/{server_id}/shares");
        assert!(sot.capabilities.create);
        assert!(sot.capabilities.fetch);
        assert!(!sot.capabilities.commit);
        assert!(sot.capabilities.delete);
        assert!(sot.capabilities.list);
    }

    #[test]
    fn test_make_it() {
        let example = json!({
            "uuid": "715335c1-7a00-4dfe-82df-9dc2a67bd8bf",
            "share_id": "e8debdc0-447a-4376-a10a-4cd9122d7986",
            "status": "active",
            "tag": "bar",
            "export_location": "server.com/nfs_mount,foo=bar",
        });
        let uri = json!({"server_id": "s1"}).as_object().unwrap().clone();
        let sot = ShareMapping::from_resource(Resource::from_body(&SHARE_MAPPING, &uri, &example));

        assert_eq!(sot.uuid(), Some("715335c1-7a00-4dfe-82df-9dc2a67bd8bf"));
        assert_eq!(sot.share_id(), Some("e8debdc0-447a-4376-a10a-4cd9122d7986"));
        assert_eq!(sot.status(), Some("active"));
        assert_eq!(sot.tag(), Some("bar"));
        assert_eq!(sot.export_location(), Some("server.com/nfs_mount,foo=bar"));
        assert_eq!(sot.server_id(), Some("s1"));
    }

    #[test]
    fn test_defaults() {
        let sot = ShareMapping::new("s1", "sh1").unwrap();
        assert_eq!(sot.export_location(), Some(""));
        assert_eq!(sot.status(), None);
        assert_eq!(sot.tag(), None);
    }
}
