//! Resource instances
//!
//! A [`Resource`] is one entity of some [`ResourceSchema`]: its current
//! attribute values, the attributes changed since the last sync, and its
//! lifecycle state. Lifecycle methods take the [`Session`] explicitly and
//! compute the microversion per call.

use super::field::{DefaultValue, FieldKind};
use super::schema::{path_segment, Operation, RequestFormat, ResourceSchema};
use crate::cloud::http::sanitize_for_log;
use crate::cloud::{HttpRequest, HttpResponse, Microversion, RequestBody, Session};
use crate::error::{Error, Result};
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Lifecycle state of an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    /// Constructed locally, no server identity yet
    New,
    /// In sync with the last server response
    Synced,
    /// Has local changes not yet committed
    Dirty,
    /// Deleted on the server; no further operations
    Deleted,
}

/// One entity of a resource type
#[derive(Debug, Clone)]
pub struct Resource {
    schema: &'static ResourceSchema,
    attrs: Map<String, Value>,
    dirty: BTreeSet<&'static str>,
    state: ResourceState,
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.schema.key == other.schema.key && self.attrs == other.attrs
    }
}

impl serde::Serialize for Resource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&self.attrs, serializer)
    }
}

impl Resource {
    /// Build a new instance from attribute values
    ///
    /// Every attribute must be declared by the schema, and the URI
    /// attributes must resolve the base path. Read-only attributes may be
    /// given here (to identify an existing entity) but are never sent.
    pub fn from_attrs<I, K, V>(schema: &'static ResourceSchema, attrs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut resource = Self {
            schema,
            attrs: Map::new(),
            dirty: BTreeSet::new(),
            state: ResourceState::New,
        };

        for (name, value) in attrs {
            resource.assign(name.as_ref(), value.into(), true)?;
        }

        schema.resolve_path(&resource.attrs)?;
        Ok(resource)
    }

    /// Build a synced instance from a decoded entity body
    ///
    /// `uri` carries the URI attributes of the request that produced the
    /// body. Undeclared body keys are ignored.
    pub fn from_body(schema: &'static ResourceSchema, uri: &Map<String, Value>, body: &Value) -> Self {
        let mut resource = Self {
            schema,
            attrs: uri.clone(),
            dirty: BTreeSet::new(),
            state: ResourceState::Synced,
        };
        resource.hydrate_body(body);
        resource
    }

    pub fn schema(&self) -> &'static ResourceSchema {
        self.schema
    }

    pub fn state(&self) -> ResourceState {
        self.state
    }

    /// Raw attribute values, without defaults
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attrs
    }

    /// Attribute value, falling back to the binding's default
    pub fn get(&self, name: &str) -> Option<Value> {
        match self.attrs.get(name) {
            Some(value) => Some(value.clone()),
            None => self.schema.field(name)?.default_value(),
        }
    }

    /// String attribute, falling back to a string default
    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.attrs.get(name) {
            Some(value) => value.as_str(),
            None => match self.schema.field(name)?.default? {
                DefaultValue::Str(s) => Some(s),
                _ => None,
            },
        }
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name)?.as_i64()
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name)?.as_bool()
    }

    pub fn get_map(&self, name: &str) -> Option<&Map<String, Value>> {
        self.attrs.get(name)?.as_object()
    }

    /// Identifier of this instance as used in paths and markers
    pub fn id(&self) -> Option<String> {
        self.attrs.get(self.schema.id_attribute?).and_then(path_segment)
    }

    /// Assign an attribute, marking it dirty
    ///
    /// URI attributes only rebind the path and are never dirty.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.ensure_live()?;
        self.assign(name, value.into(), false)?;
        if self.state == ResourceState::Synced && self.has_pending_changes() {
            self.state = ResourceState::Dirty;
        }
        Ok(())
    }

    /// Forget local changes; values stay, nothing is sent for them
    pub(crate) fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Attributes changed since the last sync
    pub fn dirty_attributes(&self) -> Vec<&'static str> {
        self.dirty.iter().copied().collect()
    }

    /// Every set body attribute under its wire name
    pub fn body(&self) -> Map<String, Value> {
        self.schema
            .fields_of(FieldKind::Body)
            .filter_map(|f| Some((f.wire_name.to_string(), self.attrs.get(f.name)?.clone())))
            .collect()
    }

    /// Dirty body attributes under their wire names
    pub fn dirty_body(&self) -> Map<String, Value> {
        self.schema
            .fields_of(FieldKind::Body)
            .filter(|f| self.dirty.contains(f.name))
            .filter_map(|f| Some((f.wire_name.to_string(), self.attrs.get(f.name)?.clone())))
            .collect()
    }

    /// Dirty header attributes as request headers
    pub fn dirty_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for field in self.schema.fields.iter().filter(|f| {
            matches!(f.kind, FieldKind::Header | FieldKind::HeaderPrefix) && self.dirty.contains(f.name)
        }) {
            if let Some(value) = self.attrs.get(field.name) {
                field.encode_headers(value, &mut headers)?;
            }
        }
        Ok(headers)
    }

    /// Create this resource on the server
    pub async fn create(&mut self, session: &Session) -> Result<()> {
        self.create_with_body(session, None).await
    }

    /// Create this resource with a raw request body (object data)
    pub async fn create_with_data(&mut self, session: &Session, data: Vec<u8>) -> Result<()> {
        self.create_with_body(session, Some(data)).await
    }

    async fn create_with_body(&mut self, session: &Session, data: Option<Vec<u8>>) -> Result<()> {
        self.guard(Operation::Create)?;
        let microversion = self.microversion(session)?;

        let path = if self.schema.create_requires_id {
            self.schema.item_path(&self.attrs)?
        } else {
            self.schema.resolve_path(&self.attrs)?
        };

        let body = match data {
            Some(data) => RequestBody::Raw(data),
            None => self.request_body(),
        };
        let headers = self.dirty_headers()?;

        let (url, response) = self
            .send(session, self.schema.create_method.clone(), &path, headers, body, microversion)
            .await?;

        if !matches!(
            response.status,
            StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED | StatusCode::NO_CONTENT
        ) {
            return Err(http_exception(&url, &response));
        }

        self.hydrate_response(&response)?;
        Ok(())
    }

    /// Refresh this resource from the server
    pub async fn fetch(&mut self, session: &Session) -> Result<()> {
        self.guard(Operation::Fetch)?;
        let microversion = self.microversion(session)?;
        let path = self.schema.item_path(&self.attrs)?;

        let (url, response) = self
            .send(session, Method::GET, &path, HeaderMap::new(), RequestBody::Empty, microversion)
            .await?;
        check_status(&url, &response)?;

        self.hydrate_response(&response)?;
        Ok(())
    }

    /// Send the dirty attributes to the server
    ///
    /// Committing with nothing a request would carry is a no-op. The
    /// identifier is in the path, so it alone never triggers a request.
    pub async fn commit(&mut self, session: &Session) -> Result<()> {
        self.guard(Operation::Commit)?;
        if !self.has_pending_changes() {
            tracing::debug!("{}: nothing to commit", self.schema.key);
            return Ok(());
        }

        let microversion = self.microversion(session)?;
        let path = self.schema.item_path(&self.attrs)?;
        let headers = self.dirty_headers()?;
        let body = self.request_body();

        let (url, response) = self
            .send(session, self.schema.commit_method.clone(), &path, headers, body, microversion)
            .await?;
        check_status(&url, &response)?;

        self.hydrate_response(&response)?;
        Ok(())
    }

    /// Delete this resource on the server
    ///
    /// With `ignore_missing`, a 404 counts as success.
    pub async fn delete(&mut self, session: &Session, ignore_missing: bool) -> Result<()> {
        self.guard(Operation::Delete)?;
        let microversion = self.microversion(session)?;
        let path = self.schema.item_path(&self.attrs)?;

        let (url, response) = self
            .send(session, Method::DELETE, &path, HeaderMap::new(), RequestBody::Empty, microversion)
            .await?;

        match check_status(&url, &response) {
            Ok(()) => {}
            Err(Error::ResourceNotFound { .. }) if ignore_missing => {
                tracing::debug!("{} already gone: {}", self.schema.key, url);
            }
            Err(e) => return Err(e),
        }

        self.dirty.clear();
        self.state = ResourceState::Deleted;
        Ok(())
    }

    /// Refresh header attributes with a HEAD request
    pub async fn head(&mut self, session: &Session) -> Result<()> {
        self.guard(Operation::Head)?;
        let microversion = self.microversion(session)?;
        let path = self.schema.item_path(&self.attrs)?;

        let (url, response) = self
            .send(session, Method::HEAD, &path, HeaderMap::new(), RequestBody::Empty, microversion)
            .await?;
        check_status(&url, &response)?;

        self.hydrate_headers(&response.headers);
        self.state = if self.has_pending_changes() {
            ResourceState::Dirty
        } else {
            self.dirty.clear();
            ResourceState::Synced
        };
        Ok(())
    }

    /// Fetch the raw content of this resource
    pub async fn download(&mut self, session: &Session) -> Result<Vec<u8>> {
        self.guard(Operation::Download)?;
        let microversion = self.microversion(session)?;
        let path = self.schema.item_path(&self.attrs)?;

        let (url, response) = self
            .send(session, Method::GET, &path, HeaderMap::new(), RequestBody::Empty, microversion)
            .await?;
        check_status(&url, &response)?;

        self.hydrate_headers(&response.headers);
        Ok(response.body)
    }

    fn ensure_live(&self) -> Result<()> {
        if self.state == ResourceState::Deleted {
            return Err(Error::invalid(format!("{}: resource deleted", self.schema.key)));
        }
        Ok(())
    }

    fn guard(&self, op: Operation) -> Result<()> {
        self.ensure_live()?;
        self.schema.require(op)
    }

    fn assign(&mut self, name: &str, value: Value, constructing: bool) -> Result<()> {
        let field = self.schema.field(name).ok_or_else(|| {
            Error::invalid(format!("{} has no attribute `{}`", self.schema.key, name))
        })?;

        if field.read_only && !constructing {
            return Err(Error::invalid(format!(
                "{}: attribute `{}` is read-only",
                self.schema.key, name
            )));
        }

        let value = field.coerce(value).map_err(|raw| {
            Error::invalid(format!(
                "{}: `{}` cannot hold {} (expected {:?})",
                self.schema.key, name, raw, field.ty
            ))
        })?;

        self.attrs.insert(field.name.to_string(), value);
        if !field.read_only && field.kind != FieldKind::Uri {
            self.dirty.insert(field.name);
        }
        Ok(())
    }

    /// Whether a commit would send anything
    fn has_pending_changes(&self) -> bool {
        self.schema.fields.iter().any(|f| {
            if !self.dirty.contains(f.name) || Some(f.name) == self.schema.id_attribute {
                return false;
            }
            match f.kind {
                FieldKind::Body => self.schema.request_format != RequestFormat::HeadersOnly,
                FieldKind::Header | FieldKind::HeaderPrefix => true,
                FieldKind::Uri => false,
            }
        })
    }

    /// Effective microversion, refusing dirty fields the version cannot carry
    fn microversion(&self, session: &Session) -> Result<Option<Microversion>> {
        let effective = self.schema.effective_microversion(session);

        for name in &self.dirty {
            let Some(required) = self.schema.field(name).and_then(|f| f.min_microversion) else {
                continue;
            };
            if effective.map_or(true, |v| v < required) {
                return Err(Error::invalid(format!(
                    "{}: `{}` requires microversion {}, request would use {}",
                    self.schema.key,
                    name,
                    required,
                    effective.map_or_else(|| "none".to_string(), |v| v.to_string())
                )));
            }
        }

        Ok(effective)
    }

    fn request_body(&self) -> RequestBody {
        let body = self.dirty_body();
        match self.schema.request_format {
            RequestFormat::HeadersOnly => RequestBody::Empty,
            RequestFormat::Bare => RequestBody::Json(Value::Object(body)),
            RequestFormat::Enveloped => match self.schema.resource_key {
                Some(key) => {
                    let mut envelope = Map::new();
                    envelope.insert(key.to_string(), Value::Object(body));
                    RequestBody::Json(Value::Object(envelope))
                }
                None => RequestBody::Json(Value::Object(body)),
            },
        }
    }

    async fn send(
        &self,
        session: &Session,
        method: Method,
        path: &str,
        headers: HeaderMap,
        body: RequestBody,
        microversion: Option<Microversion>,
    ) -> Result<(String, HttpResponse)> {
        let url = session.url_for(self.schema.service, path, &[])?;
        let mut request = HttpRequest::new(method, url.clone());
        request.headers = headers;
        request.body = body;

        let response = session.send(self.schema.service, microversion, request).await?;
        Ok((url, response))
    }

    fn hydrate_response(&mut self, response: &HttpResponse) -> Result<()> {
        self.hydrate_headers(&response.headers);
        // Header-only services answer writes with plain-text bodies
        if self.schema.request_format != RequestFormat::HeadersOnly {
            if let Some(body) = response.json()? {
                self.hydrate_body(&body);
            }
        }
        self.dirty.clear();
        self.state = ResourceState::Synced;
        Ok(())
    }

    fn hydrate_body(&mut self, body: &Value) {
        let entity = self
            .schema
            .resource_key
            .and_then(|key| body.get(key))
            .unwrap_or(body);

        let Some(entity) = entity.as_object() else {
            return;
        };

        for field in self.schema.fields {
            if let Some(value) = field.decode_body(entity) {
                self.attrs.insert(field.name.to_string(), value);
            }
        }
    }

    fn hydrate_headers(&mut self, headers: &HeaderMap) {
        for field in self.schema.fields {
            if let Some(value) = field.decode_headers(headers) {
                self.attrs.insert(field.name.to_string(), value);
            }
        }
    }
}

/// Map a non-success response to an error; 404 becomes `ResourceNotFound`
pub(crate) fn check_status(url: &str, response: &HttpResponse) -> Result<()> {
    if response.status.is_success() {
        return Ok(());
    }

    if response.status == StatusCode::NOT_FOUND {
        tracing::debug!("not found: {}", url);
        return Err(Error::ResourceNotFound {
            url: url.to_string(),
            body: response.text(),
        });
    }

    Err(http_exception(url, response))
}

fn http_exception(url: &str, response: &HttpResponse) -> Error {
    let body = response.text();
    // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
    tracing::warn!("API error: {} - {}", response.status, sanitize_for_log(&body));
    Error::HttpException {
        status: response.status.as_u16(),
        url: url.to_string(),
        body,
    }
}
