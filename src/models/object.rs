//! Object store objects

use super::TypedResource;
use crate::cloud::ServiceType;
use crate::error::Result;
use crate::resource::{Capabilities, Field, FieldType, RequestFormat, Resource, ResourceSchema};
use reqwest::Method;
use serde_json::{Map, Value};

pub static OBJECT: ResourceSchema = ResourceSchema {
    key: "object_store.object",
    service: ServiceType::ObjectStore,
    resource_key: None,
    resources_key: None,
    base_path: "/{container}",
    id_attribute: Some("name"),
    capabilities: Capabilities {
        create: true,
        fetch: false,
        commit: true,
        delete: true,
        list: true,
        head: true,
        download: true,
    },
    create_method: Method::PUT,
    commit_method: Method::POST,
    create_requires_id: true,
    request_format: RequestFormat::HeadersOnly,
    max_microversion: None,
    fields: &[
        Field::uri("container"),
        Field::body("name"),
        Field::header("content_type", "Content-Type").aliases(&["content_type"]),
        Field::header("etag", "Etag").aliases(&["hash"]).read_only(),
        Field::header("content_length", "Content-Length")
            .typed(FieldType::Integer)
            .aliases(&["bytes"])
            .read_only(),
        Field::header("last_modified", "Last-Modified")
            .aliases(&["last_modified"])
            .read_only(),
        Field::header("delete_after", "X-Delete-After").typed(FieldType::Integer),
        Field::header("delete_at", "X-Delete-At"),
        Field::header("object_manifest", "X-Object-Manifest"),
        Field::header("content_encoding", "Content-Encoding"),
        Field::header("content_disposition", "Content-Disposition"),
        Field::header("timestamp", "X-Timestamp").read_only(),
        Field::header_prefix("metadata", "X-Object-Meta-"),
    ],
};

typed_resource!(
    /// An object inside a container
    Object,
    OBJECT
);

impl Object {
    pub fn new(container: &str, name: &str) -> Result<Self> {
        let resource = Resource::from_attrs(&OBJECT, [("container", container), ("name", name)])?;
        Ok(Self::from_resource(resource))
    }

    pub fn container(&self) -> Option<&str> {
        self.get_str("container")
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str("name")
    }

    pub fn content_type(&self) -> Option<&str> {
        self.get_str("content_type")
    }

    pub fn etag(&self) -> Option<&str> {
        self.get_str("etag")
    }

    pub fn content_length(&self) -> Option<i64> {
        self.get_i64("content_length")
    }

    pub fn last_modified(&self) -> Option<&str> {
        self.get_str("last_modified")
    }

    pub fn delete_after(&self) -> Option<i64> {
        self.get_i64("delete_after")
    }

    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.get_map("metadata")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::testing::MockTransport;
    use crate::cloud::{Endpoint, Session};
    use reqwest::StatusCode;
    use serde_json::json;
    use std::sync::Arc;

    fn setup() -> (Arc<MockTransport>, Session) {
        let mock = Arc::new(MockTransport::new());
        let session = Session::new(mock.clone())
            .with_endpoint(ServiceType::ObjectStore, Endpoint::new("http://swift.test/v1/AUTH_p"));
        (mock, session)
    }

    #[test]
    fn test_listing_item() {
        let uri = json!({"container": "c1"}).as_object().unwrap().clone();
        let body = json!({
            "name": "o1",
            "hash": "d41d8cd98f00b204e9800998ecf8427e",
            "bytes": 0,
            "content_type": "text/plain",
            "last_modified": "2024-01-01T00:00:00.000000",
        });
        let o = Object::from_resource(Resource::from_body(&OBJECT, &uri, &body));

        assert_eq!(o.container(), Some("c1"));
        assert_eq!(o.etag(), Some("d41d8cd98f00b204e9800998ecf8427e"));
        assert_eq!(o.content_length(), Some(0));
        assert_eq!(o.content_type(), Some("text/plain"));
    }

    #[test]
    fn test_requires_container() {
        assert!(Resource::from_attrs(&OBJECT, [("name", "o1")]).is_err());
    }

    #[tokio::test]
    async fn test_upload_and_download() {
        let (mock, session) = setup();
        mock.push_with_headers(StatusCode::CREATED, &[("Etag", "abc")], None);
        mock.push_raw(StatusCode::OK, b"hello");

        let mut o = Object::new("c 1", "dir/o1").unwrap();
        o.set("content_type", "text/plain").unwrap();
        o.create_with_data(&session, b"hello".to_vec()).await.unwrap();
        assert_eq!(o.etag(), Some("abc"));

        let data = o.download(&session).await.unwrap();
        assert_eq!(data, b"hello");

        let sent = mock.requests();
        assert_eq!(sent[0].method, Method::PUT);
        assert_eq!(sent[0].url, "http://swift.test/v1/AUTH_p/c%201/dir%2Fo1");
        assert_eq!(sent[0].headers["Content-Type"], "text/plain");
        assert!(matches!(&sent[0].body, crate::cloud::RequestBody::Raw(b) if b == b"hello"));
        assert_eq!(sent[1].method, Method::GET);
    }
}
