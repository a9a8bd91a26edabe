//! Shared file system proxy

use super::{build, list_typed, Ref};
use crate::cloud::Session;
use crate::error::Result;
use crate::models::ResourceLock;
use crate::resource::ListQuery;
use futures::stream::BoxStream;
use serde_json::{Map, Value};
use tracing::info;

/// Shared file system service operations
pub struct SharedFileSystemProxy<'a> {
    session: &'a Session,
}

impl<'a> SharedFileSystemProxy<'a> {
    pub(crate) fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Lock an action on a resource
    pub async fn create_resource_lock(&self, attrs: Map<String, Value>) -> Result<ResourceLock> {
        let mut lock: ResourceLock = build(&[], attrs)?;
        info!(
            "Locking {} {}",
            lock.resource_type().unwrap_or("resource"),
            lock.resource_id().unwrap_or_default()
        );
        lock.create(self.session).await?;
        Ok(lock)
    }

    pub async fn get_resource_lock(&self, lock: impl Into<Ref<ResourceLock>>) -> Result<ResourceLock> {
        let mut lock = lock.into().resolve(&[])?;
        lock.fetch(self.session).await?;
        Ok(lock)
    }

    /// Change the reason or action of a lock
    pub async fn update_resource_lock(
        &self,
        lock: impl Into<Ref<ResourceLock>>,
        attrs: Map<String, Value>,
    ) -> Result<ResourceLock> {
        let mut lock = lock.into().resolve(&[])?;
        for (name, value) in attrs {
            lock.set(&name, value)?;
        }
        info!("Updating resource lock {}", lock.id().unwrap_or_default());
        lock.commit(self.session).await?;
        Ok(lock)
    }

    pub async fn delete_resource_lock(
        &self,
        lock: impl Into<Ref<ResourceLock>>,
        ignore_missing: bool,
    ) -> Result<()> {
        let mut lock = lock.into().resolve(&[])?;
        info!("Deleting resource lock {}", lock.id().unwrap_or_default());
        lock.delete(self.session, ignore_missing).await
    }

    /// List resource locks visible to the project
    pub fn resource_locks(&self, query: ListQuery) -> Result<BoxStream<'a, Result<ResourceLock>>> {
        list_typed(self.session, &[], query)
    }
}
