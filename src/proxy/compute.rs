//! Compute proxy

use super::{list_typed, Ref};
use crate::cloud::Session;
use crate::error::Result;
use crate::models::ShareMapping;
use crate::resource::ListQuery;
use futures::stream::BoxStream;
use tracing::info;

/// Compute service operations
pub struct ComputeProxy<'a> {
    session: &'a Session,
}

impl<'a> ComputeProxy<'a> {
    pub(crate) fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Attach a share to a server
    pub async fn create_share_attachment(
        &self,
        server_id: &str,
        share_id: &str,
        tag: Option<&str>,
    ) -> Result<ShareMapping> {
        info!("Attaching share {} to server {}", share_id, server_id);
        let mut mapping = ShareMapping::new(server_id, share_id)?;
        if let Some(tag) = tag {
            mapping.set("tag", tag)?;
        }
        mapping.create(self.session).await?;
        Ok(mapping)
    }

    /// Get one share attachment of a server
    pub async fn get_share_attachment(
        &self,
        server_id: &str,
        share: impl Into<Ref<ShareMapping>>,
    ) -> Result<ShareMapping> {
        let mut mapping = share.into().resolve(&[("server_id", server_id)])?;
        mapping.fetch(self.session).await?;
        Ok(mapping)
    }

    /// Detach a share from a server
    pub async fn delete_share_attachment(
        &self,
        server_id: &str,
        share: impl Into<Ref<ShareMapping>>,
        ignore_missing: bool,
    ) -> Result<()> {
        let mut mapping = share.into().resolve(&[("server_id", server_id)])?;
        info!(
            "Detaching share {} from server {}",
            mapping.share_id().unwrap_or_default(),
            server_id
        );
        mapping.delete(self.session, ignore_missing).await
    }

    /// List the shares attached to a server
    pub fn share_attachments(
        &self,
        server_id: &str,
        query: ListQuery,
    ) -> Result<BoxStream<'a, Result<ShareMapping>>> {
        list_typed(self.session, &[("server_id", server_id)], query)
    }
}
