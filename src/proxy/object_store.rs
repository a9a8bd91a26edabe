//! Object store proxy
//!
//! Containers and objects are addressed by name. Metadata lives in
//! headers, so the `*_metadata` getters issue HEAD requests.

use super::{build, list_typed, Ref};
use crate::cloud::Session;
use crate::error::Result;
use crate::models::{Account, Container, Object};
use crate::resource::ListQuery;
use futures::stream::BoxStream;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::info;

/// Object store service operations
pub struct ObjectStoreProxy<'a> {
    session: &'a Session,
}

impl<'a> ObjectStoreProxy<'a> {
    pub(crate) fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Create a container; `attrs` may carry ACLs and metadata
    pub async fn create_container(&self, name: &str, attrs: Map<String, Value>) -> Result<Container> {
        info!("Creating container {}", name);
        let mut container: Container = build(&[("name", name)], attrs)?;
        container.create(self.session).await?;
        Ok(container)
    }

    pub async fn delete_container(
        &self,
        container: impl Into<Ref<Container>>,
        ignore_missing: bool,
    ) -> Result<()> {
        let mut container = container.into().resolve(&[])?;
        info!("Deleting container {}", container.name().unwrap_or_default());
        container.delete(self.session, ignore_missing).await
    }

    /// List the containers of the account
    pub fn containers(&self, query: ListQuery) -> Result<BoxStream<'a, Result<Container>>> {
        list_typed(self.session, &[], query)
    }

    pub async fn get_container_metadata(&self, container: impl Into<Ref<Container>>) -> Result<Container> {
        let mut container = container.into().resolve(&[])?;
        container.head(self.session).await?;
        Ok(container)
    }

    /// Send the changed headers of a container
    pub async fn set_container_metadata(&self, container: &mut Container) -> Result<()> {
        info!("Updating container {}", container.name().unwrap_or_default());
        container.commit(self.session).await
    }

    /// Upload an object; without `data` the object is created empty
    pub async fn create_object(
        &self,
        container: &str,
        name: &str,
        data: Option<Vec<u8>>,
        attrs: Map<String, Value>,
    ) -> Result<Object> {
        info!("Uploading object {}/{}", container, name);
        let mut object: Object = build(&[("container", container), ("name", name)], attrs)?;
        object
            .create_with_data(self.session, data.unwrap_or_default())
            .await?;
        Ok(object)
    }

    pub async fn delete_object(
        &self,
        container: &str,
        object: impl Into<Ref<Object>>,
        ignore_missing: bool,
    ) -> Result<()> {
        let mut object = object.into().resolve(&[("container", container)])?;
        info!("Deleting object {}/{}", container, object.name().unwrap_or_default());
        object.delete(self.session, ignore_missing).await
    }

    /// List the objects of a container
    pub fn objects(&self, container: &str, query: ListQuery) -> Result<BoxStream<'a, Result<Object>>> {
        list_typed(self.session, &[("container", container)], query)
    }

    pub async fn get_object_metadata(
        &self,
        container: &str,
        object: impl Into<Ref<Object>>,
    ) -> Result<Object> {
        let mut object = object.into().resolve(&[("container", container)])?;
        object.head(self.session).await?;
        Ok(object)
    }

    pub async fn set_object_metadata(&self, object: &mut Object) -> Result<()> {
        info!(
            "Updating object {}/{}",
            object.container().unwrap_or_default(),
            object.name().unwrap_or_default()
        );
        object.commit(self.session).await
    }

    /// Download the content of an object
    pub async fn get_object_data(&self, container: &str, object: impl Into<Ref<Object>>) -> Result<Vec<u8>> {
        let mut object = object.into().resolve(&[("container", container)])?;
        object.download(self.session).await
    }

    /// Download an object into a local file
    pub async fn save_object(
        &self,
        container: &str,
        object: impl Into<Ref<Object>>,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let data = self.get_object_data(container, object).await?;
        tokio::fs::write(path.as_ref(), &data).await?;
        info!("Saved {} bytes to {}", data.len(), path.as_ref().display());
        Ok(())
    }

    pub async fn get_account_metadata(&self) -> Result<Account> {
        let mut account = Account::new()?;
        account.head(self.session).await?;
        Ok(account)
    }

    pub async fn set_account_metadata(&self, account: &mut Account) -> Result<()> {
        info!("Updating account metadata");
        account.commit(self.session).await
    }
}

#[cfg(test)]
mod tests {
    use crate::cloud::testing::MockTransport;
    use crate::cloud::{Endpoint, RequestBody, ServiceType, Session};
    use crate::error::Error;
    use crate::resource::{ListQuery, ResourceState};
    use futures::TryStreamExt;
    use reqwest::{Method, StatusCode};
    use serde_json::{json, Map};
    use std::sync::Arc;

    fn setup() -> (Arc<MockTransport>, Session) {
        let mock = Arc::new(MockTransport::new());
        let session = Session::new(mock.clone())
            .with_endpoint(ServiceType::ObjectStore, Endpoint::new("http://swift.test/v1/AUTH_p"));
        (mock, session)
    }

    fn names(body: &[&str]) -> serde_json::Value {
        json!(body.iter().map(|n| json!({"name": n})).collect::<Vec<_>>())
    }

    #[tokio::test]
    async fn test_all_containers_stop_on_empty_page() {
        let (mock, session) = setup();
        mock.push(StatusCode::OK, Some(names(&["container0", "container1", "container2"])));
        mock.push(StatusCode::OK, Some(json!([])));

        let containers: Vec<_> = session
            .object_store()
            .containers(ListQuery::new())
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(containers.len(), 3);
        assert_eq!(containers[2].name(), Some("container2"));
        assert_eq!(
            mock.requests()[1].url,
            "http://swift.test/v1/AUTH_p/?marker=container2"
        );
    }

    #[tokio::test]
    async fn test_objects_carry_container() {
        let (mock, session) = setup();
        mock.push(StatusCode::OK, Some(names(&["object0", "object1"])));
        mock.push(StatusCode::OK, Some(json!([])));

        let objects: Vec<_> = session
            .object_store()
            .objects("my_container", ListQuery::new())
            .unwrap()
            .try_collect()
            .await
            .unwrap();

        assert_eq!(objects.len(), 2);
        for object in &objects {
            assert_eq!(object.container(), Some("my_container"));
            assert_eq!(object.state(), ResourceState::Synced);
        }
        assert_eq!(mock.requests()[0].url, "http://swift.test/v1/AUTH_p/my_container");
    }

    #[tokio::test]
    async fn test_create_container_with_metadata() {
        let (mock, session) = setup();
        mock.push(StatusCode::CREATED, None);

        let attrs = json!({"metadata": {"owner": "ops"}, "write_acl": "p:u"});
        let container = session
            .object_store()
            .create_container("c1", attrs.as_object().unwrap().clone())
            .await
            .unwrap();

        let sent = &mock.requests()[0];
        assert_eq!(sent.method, Method::PUT);
        assert_eq!(sent.url, "http://swift.test/v1/AUTH_p/c1");
        assert_eq!(sent.headers["X-Container-Meta-Owner"], "ops");
        assert_eq!(sent.headers["X-Container-Write"], "p:u");
        assert!(matches!(sent.body, RequestBody::Empty));
        assert_eq!(container.name(), Some("c1"));
    }

    #[tokio::test]
    async fn test_container_metadata_round_trip() {
        let (mock, session) = setup();
        mock.push_with_headers(
            StatusCode::NO_CONTENT,
            &[("X-Container-Object-Count", "3"), ("X-Container-Meta-Owner", "ops")],
            None,
        );
        mock.push(StatusCode::NO_CONTENT, None);

        let store = session.object_store();
        let mut container = store.get_container_metadata("c1").await.unwrap();
        assert_eq!(container.object_count(), Some(3));

        container.set("read_acl", ".r:*").unwrap();
        store.set_container_metadata(&mut container).await.unwrap();

        let sent = mock.requests();
        assert_eq!(sent[0].method, Method::HEAD);
        assert_eq!(sent[1].method, Method::POST);
        assert_eq!(sent[1].url, "http://swift.test/v1/AUTH_p/c1");
        assert_eq!(sent[1].headers["X-Container-Read"], ".r:*");
        assert!(sent[1].headers.get("X-Container-Meta-Owner").is_none());
    }

    #[tokio::test]
    async fn test_unchanged_metadata_is_not_posted() {
        let (mock, session) = setup();
        mock.push_with_headers(StatusCode::NO_CONTENT, &[("X-Container-Meta-Owner", "ops")], None);
        mock.push_with_headers(StatusCode::OK, &[("X-Object-Meta-Kind", "raw")], None);

        let store = session.object_store();
        let mut container = store.get_container_metadata("c1").await.unwrap();
        assert_eq!(container.state(), ResourceState::Synced);
        store.set_container_metadata(&mut container).await.unwrap();

        let mut object = store.get_object_metadata("c1", "o1").await.unwrap();
        assert_eq!(object.state(), ResourceState::Synced);
        store.set_object_metadata(&mut object).await.unwrap();

        let sent = mock.requests();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|r| r.method == Method::HEAD));
    }

    #[tokio::test]
    async fn test_dot_names_never_reach_transport() {
        let (mock, session) = setup();
        let store = session.object_store();

        let err = store.delete_object("c1", "..", false).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        let err = store.delete_container("..", false).await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
        let err = store.get_object_metadata(".", "o1").await.unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));

        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_create_object_without_data_sends_empty_body() {
        let (mock, session) = setup();
        mock.push(StatusCode::CREATED, None);

        session
            .object_store()
            .create_object("c1", "empty", None, Map::new())
            .await
            .unwrap();

        let sent = &mock.requests()[0];
        assert_eq!(sent.url, "http://swift.test/v1/AUTH_p/c1/empty");
        assert!(matches!(&sent.body, RequestBody::Raw(b) if b.is_empty()));
    }

    #[tokio::test]
    async fn test_save_object_writes_file() {
        let (mock, session) = setup();
        mock.push_raw(StatusCode::OK, b"payload");

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("o1.bin");
        session
            .object_store()
            .save_object("c1", "o1", &path)
            .await
            .unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"payload");
        assert_eq!(mock.requests()[0].url, "http://swift.test/v1/AUTH_p/c1/o1");
    }

    #[tokio::test]
    async fn test_delete_object_ignore_missing() {
        let (mock, session) = setup();
        mock.push(StatusCode::NOT_FOUND, None);

        session
            .object_store()
            .delete_object("c1", "gone", true)
            .await
            .unwrap();
        assert_eq!(mock.requests()[0].method, Method::DELETE);
    }

    #[tokio::test]
    async fn test_account_metadata() {
        let (mock, session) = setup();
        mock.push_with_headers(
            StatusCode::NO_CONTENT,
            &[("X-Account-Bytes-Used", "2048"), ("X-Account-Object-Count", "7")],
            None,
        );

        let account = session.object_store().get_account_metadata().await.unwrap();
        assert_eq!(account.bytes_used(), Some(2048));
        assert_eq!(account.object_count(), Some(7));
        assert_eq!(mock.requests()[0].method, Method::HEAD);
    }
}
