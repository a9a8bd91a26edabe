//! Resource Fetcher
//!
//! Lists resources page by page using the marker/limit convention.
//!
//! Without a `limit`, each page after the first is requested with `marker`
//! set to the id of the previous page's last item, until a page comes back
//! empty. With a `limit`, exactly one page is requested. Page size is never
//! compared with the limit.

use super::instance::{check_status, Resource};
use super::schema::{Operation, ResourceSchema};
use crate::cloud::{HttpRequest, Session};
use crate::error::Result;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};
use reqwest::Method;
use serde_json::{Map, Value};

/// Query of a listing call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    /// Page size; also stops the listing after one page
    pub limit: Option<u32>,
    /// Start after this id
    pub marker: Option<String>,
    /// Resource-specific filters, passed through verbatim
    pub filters: Vec<(String, String)>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = Some(marker.into());
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }

    fn pairs(&self, marker: Option<&str>) -> Vec<(String, String)> {
        let mut pairs = self.filters.clone();
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(marker) = marker {
            pairs.push(("marker".to_string(), marker.to_string()));
        }
        pairs
    }
}

enum Cursor {
    Start(Option<String>),
    After(String),
    Done,
}

/// Lazily list resources of `schema`
///
/// `uri` must resolve the base path; the capability and the path are checked
/// before anything is sent. Each yielded resource carries the `uri`
/// attributes.
pub fn list_resources<'a>(
    session: &'a Session,
    schema: &'static ResourceSchema,
    uri: Map<String, Value>,
    query: ListQuery,
) -> Result<BoxStream<'a, Result<Resource>>> {
    schema.require(Operation::List)?;
    let path = schema.resolve_path(&uri)?;

    let pages = stream::try_unfold(Cursor::Start(query.marker.clone()), move |cursor| {
        let path = path.clone();
        let uri = uri.clone();
        let query = query.clone();

        async move { next_page(session, schema, &path, &uri, &query, cursor).await }
    });

    Ok(pages
        .map_ok(|page| stream::iter(page.into_iter().map(Ok)))
        .try_flatten()
        .boxed())
}

/// Fetch all resources (auto-paginate)
pub async fn fetch_resources(
    session: &Session,
    schema: &'static ResourceSchema,
    uri: Map<String, Value>,
    query: ListQuery,
) -> Result<Vec<Resource>> {
    list_resources(session, schema, uri, query)?.try_collect().await
}

/// Advance the cursor by one page; `None` once the listing is exhausted
async fn next_page(
    session: &Session,
    schema: &'static ResourceSchema,
    path: &str,
    uri: &Map<String, Value>,
    query: &ListQuery,
    cursor: Cursor,
) -> Result<Option<(Vec<Resource>, Cursor)>> {
    let marker = match cursor {
        Cursor::Done => return Ok(None),
        Cursor::Start(marker) => marker,
        Cursor::After(marker) => Some(marker),
    };

    let page = fetch_page(session, schema, path, uri, query, marker.as_deref()).await?;
    if page.is_empty() {
        return Ok(None);
    }

    let next = if query.limit.is_some() {
        Cursor::Done
    } else {
        match page.last().and_then(Resource::id) {
            Some(marker) => Cursor::After(marker),
            None => {
                tracing::warn!(
                    "{}: last item has no `{}`, stopping pagination",
                    schema.key,
                    schema.id_attribute.unwrap_or("id")
                );
                Cursor::Done
            }
        }
    };

    Ok(Some((page, next)))
}

/// Fetch one page of resources
async fn fetch_page(
    session: &Session,
    schema: &'static ResourceSchema,
    path: &str,
    uri: &Map<String, Value>,
    query: &ListQuery,
    marker: Option<&str>,
) -> Result<Vec<Resource>> {
    let url = session.url_for(schema.service, path, &query.pairs(marker))?;
    let request = HttpRequest::new(Method::GET, url.clone());

    let response = session
        .send(schema.service, schema.effective_microversion(session), request)
        .await?;
    check_status(&url, &response)?;

    let body = response.json()?.unwrap_or(Value::Null);
    let items = extract_items(&body, schema.resources_key);
    tracing::debug!("{}: {} items from {}", schema.key, items.len(), url);

    Ok(items
        .iter()
        .map(|item| Resource::from_body(schema, uri, item))
        .collect())
}

/// Extract list items from a response: a top-level array, or the array
/// under `resources_key`
fn extract_items<'v>(response: &'v Value, resources_key: Option<&str>) -> &'v [Value] {
    let list = match (response, resources_key) {
        (Value::Array(items), _) => Some(items),
        (Value::Object(map), Some(key)) => map.get(key).and_then(Value::as_array),
        _ => None,
    };

    list.map(Vec::as_slice).unwrap_or_default()
}
