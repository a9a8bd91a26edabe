//! Object store account

use super::TypedResource;
use crate::cloud::ServiceType;
use crate::error::Result;
use crate::resource::{Capabilities, Field, FieldType, RequestFormat, Resource, ResourceSchema};
use reqwest::Method;
use serde_json::{Map, Value};

pub static ACCOUNT: ResourceSchema = ResourceSchema {
    key: "object_store.account",
    service: ServiceType::ObjectStore,
    resource_key: None,
    resources_key: None,
    base_path: "/",
    id_attribute: None,
    capabilities: Capabilities {
        head: true,
        commit: true,
        ..Capabilities::NONE
    },
    create_method: Method::PUT,
    commit_method: Method::POST,
    create_requires_id: false,
    request_format: RequestFormat::HeadersOnly,
    max_microversion: None,
    fields: &[
        Field::header("container_count", "X-Account-Container-Count")
            .typed(FieldType::Integer)
            .read_only(),
        Field::header("object_count", "X-Account-Object-Count")
            .typed(FieldType::Integer)
            .read_only(),
        Field::header("bytes_used", "X-Account-Bytes-Used")
            .typed(FieldType::Integer)
            .read_only(),
        Field::header_prefix("metadata", "X-Account-Meta-"),
    ],
};

typed_resource!(
    /// The account owning every container of a project
    Account,
    ACCOUNT
);

impl Account {
    pub fn new() -> Result<Self> {
        let resource = Resource::from_attrs(&ACCOUNT, std::iter::empty::<(&str, Value)>())?;
        Ok(Self::from_resource(resource))
    }

    pub fn container_count(&self) -> Option<i64> {
        self.get_i64("container_count")
    }

    pub fn object_count(&self) -> Option<i64> {
        self.get_i64("object_count")
    }

    pub fn bytes_used(&self) -> Option<i64> {
        self.get_i64("bytes_used")
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

    #[tokio::test]
    async fn test_head_and_commit_target_account_root() {
        let mock = Arc::new(MockTransport::new());
        let session = Session::new(mock.clone())
            .with_endpoint(ServiceType::ObjectStore, Endpoint::new("http://swift.test/v1/AUTH_p"));
        mock.push_with_headers(
            StatusCode::NO_CONTENT,
            &[("X-Account-Container-Count", "4"), ("X-Account-Meta-Quota", "10")],
            None,
        );
        mock.push(StatusCode::NO_CONTENT, None);

        let mut account = Account::new().unwrap();
        account.head(&session).await.unwrap();
        assert_eq!(account.container_count(), Some(4));
        assert_eq!(account.metadata(), Some(json!({"quota": "10"}).as_object().unwrap()));

        account.set("metadata", json!({"team": "infra"})).unwrap();
        account.commit(&session).await.unwrap();

        let sent = mock.requests();
        assert_eq!(sent[0].url, "http://swift.test/v1/AUTH_p/");
        assert_eq!(sent[1].method, Method::POST);
        assert_eq!(sent[1].headers["X-Account-Meta-Team"], "infra");
    }
}
