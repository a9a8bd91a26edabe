//! Session
//!
//! Binds a [`Transport`] to the per-service endpoints of one cloud, and
//! stamps every outgoing request with the microversion and request-id
//! headers.

use super::http::{HttpRequest, HttpResponse, Transport};
use super::microversion::Microversion;
use crate::error::{Error, Result};
use crate::proxy::{ComputeProxy, ObjectStoreProxy, SharedFileSystemProxy};
use reqwest::header::{HeaderName, HeaderValue, ACCEPT};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Microversion header understood by every microversioned service
pub const API_VERSION_HEADER: &str = "openstack-api-version";

/// Request correlation header
pub const REQUEST_ID_HEADER: &str = "x-openstack-request-id";

/// Service types the SDK has resources for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceType {
    Compute,
    SharedFileSystem,
    ObjectStore,
}

impl ServiceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::Compute => "compute",
            ServiceType::SharedFileSystem => "shared-file-system",
            ServiceType::ObjectStore => "object-store",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Base URL and negotiated microversion of one service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub microversion: Option<Microversion>,
}

impl Endpoint {
    pub fn new(url: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            microversion: None,
        }
    }

    pub fn with_microversion(mut self, version: Microversion) -> Self {
        self.microversion = Some(version);
        self
    }
}

/// A transport plus the endpoints it talks to
#[derive(Clone)]
pub struct Session {
    transport: Arc<dyn Transport>,
    endpoints: HashMap<ServiceType, Endpoint>,
}

impl Session {
    /// Create a session with no endpoints
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            endpoints: HashMap::new(),
        }
    }

    /// Register the endpoint of a service
    pub fn with_endpoint(mut self, service: ServiceType, endpoint: Endpoint) -> Self {
        self.endpoints.insert(service, endpoint);
        self
    }

    /// Get the endpoint of a service
    pub fn endpoint(&self, service: ServiceType) -> Result<&Endpoint> {
        self.endpoints
            .get(&service)
            .ok_or_else(|| Error::Config(format!("no endpoint configured for {service}")))
    }

    /// Highest microversion the deployment offers for a service, if known
    pub fn negotiated_microversion(&self, service: ServiceType) -> Option<Microversion> {
        self.endpoints.get(&service).and_then(|e| e.microversion)
    }

    /// Build a full URL from a service, a resolved path and query pairs
    pub fn url_for(
        &self,
        service: ServiceType,
        path: &str,
        query: &[(String, String)],
    ) -> Result<String> {
        let endpoint = self.endpoint(service)?;
        let mut url = Url::parse(&format!("{}{}", endpoint.url, path))?;

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url.into())
    }

    /// Send a request to a service at the given microversion
    pub async fn send(
        &self,
        service: ServiceType,
        microversion: Option<Microversion>,
        mut request: HttpRequest,
    ) -> Result<HttpResponse> {
        let request_id = format!("req-{}", uuid::Uuid::new_v4());

        request
            .headers
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
        request.headers.insert(
            HeaderName::from_static(REQUEST_ID_HEADER),
            header_value(&request_id)?,
        );
        if let Some(version) = microversion {
            request.headers.insert(
                HeaderName::from_static(API_VERSION_HEADER),
                header_value(&format!("{} {}", service, version))?,
            );
        }

        tracing::debug!(
            request_id = %request_id,
            microversion = ?microversion.map(|v| v.to_string()),
            "{} {}",
            request.method,
            request.url
        );

        let response = self.transport.request(request).await?;

        tracing::debug!(request_id = %request_id, status = %response.status, "response");
        Ok(response)
    }

    /// Compute service proxy
    pub fn compute(&self) -> ComputeProxy<'_> {
        ComputeProxy::new(self)
    }

    /// Shared file system service proxy
    pub fn shared_file_system(&self) -> SharedFileSystemProxy<'_> {
        SharedFileSystemProxy::new(self)
    }

    /// Object store service proxy
    pub fn object_store(&self) -> ObjectStoreProxy<'_> {
        ObjectStoreProxy::new(self)
    }
}

pub(crate) fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| Error::invalid(format!("invalid header value: {value}")))
}
