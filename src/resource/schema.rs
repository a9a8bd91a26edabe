//! Resource schemas
//!
//! A [`ResourceSchema`] is the static description of one resource type:
//! where it lives, how it is enveloped, which operations the service allows,
//! and which [`Field`]s it carries.

use super::field::{Field, FieldKind};
use crate::cloud::{Microversion, ServiceType, Session};
use crate::error::{Error, Result};
use reqwest::Method;
use serde_json::{Map, Value};
use std::fmt;

/// Operations a schema may allow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub create: bool,
    pub fetch: bool,
    pub commit: bool,
    pub delete: bool,
    pub list: bool,
    pub head: bool,
    pub download: bool,
}

impl Capabilities {
    pub const NONE: Self = Self {
        create: false,
        fetch: false,
        commit: false,
        delete: false,
        list: false,
        head: false,
        download: false,
    };

    pub fn allows(&self, op: Operation) -> bool {
        match op {
            Operation::Create => self.create,
            Operation::Fetch => self.fetch,
            Operation::Commit => self.commit,
            Operation::Delete => self.delete,
            Operation::List => self.list,
            Operation::Head => self.head,
            Operation::Download => self.download,
        }
    }
}

/// A lifecycle operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Fetch,
    Commit,
    Delete,
    List,
    Head,
    Download,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Create => "create",
            Operation::Fetch => "fetch",
            Operation::Commit => "commit",
            Operation::Delete => "delete",
            Operation::List => "list",
            Operation::Head => "head",
            Operation::Download => "download",
        };
        f.write_str(name)
    }
}

/// How request bodies are shaped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFormat {
    /// Dirty body fields as a bare JSON object
    Bare,
    /// Dirty body fields wrapped under `resource_key`
    Enveloped,
    /// No JSON body; only header fields are sent
    HeadersOnly,
}

/// Static description of a resource type
#[derive(Debug)]
pub struct ResourceSchema {
    /// Registry key, e.g. `compute.share_mapping`
    pub key: &'static str,
    pub service: ServiceType,
    /// Envelope of single-entity bodies
    pub resource_key: Option<&'static str>,
    /// Envelope of list bodies
    pub resources_key: Option<&'static str>,
    /// Path template with `{placeholder}`s bound by URI fields
    pub base_path: &'static str,
    /// Attribute identifying an item; appended to the path and used as the
    /// listing marker
    pub id_attribute: Option<&'static str>,
    pub capabilities: Capabilities,
    pub create_method: Method,
    pub commit_method: Method,
    /// Whether `create` targets `base_path/{id}` rather than `base_path`
    pub create_requires_id: bool,
    pub request_format: RequestFormat,
    pub max_microversion: Option<Microversion>,
    pub fields: &'static [Field],
}

impl ResourceSchema {
    /// Look up a binding by attribute name
    pub fn field(&self, name: &str) -> Option<&'static Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Bindings of one kind, in declaration order
    pub fn fields_of(&self, kind: FieldKind) -> impl Iterator<Item = &'static Field> {
        self.fields.iter().filter(move |f| f.kind == kind)
    }

    /// Fail unless the schema allows `op`
    pub fn require(&self, op: Operation) -> Result<()> {
        if self.capabilities.allows(op) {
            Ok(())
        } else {
            Err(Error::invalid(format!("{} does not allow {}", self.key, op)))
        }
    }

    /// Microversion to request with against `session`
    pub fn effective_microversion(&self, session: &Session) -> Option<Microversion> {
        Microversion::effective(
            session.negotiated_microversion(self.service),
            self.max_microversion,
        )
    }

    /// Names of the `{placeholders}` in the base path
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        let mut rest = self.base_path;

        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            names.push(&rest[start + 1..start + len]);
            rest = &rest[start + len + 1..];
        }

        names
    }

    /// Substitute URI attributes into the base path
    pub fn resolve_path(&self, attrs: &Map<String, Value>) -> Result<String> {
        let mut path = String::with_capacity(self.base_path.len());
        let mut rest = self.base_path;

        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            let name = &rest[start + 1..start + len];
            let value = attrs.get(name).and_then(path_segment).ok_or_else(|| {
                Error::invalid(format!(
                    "missing required URI parameter `{}` for {}",
                    name, self.key
                ))
            })?;

            path.push_str(&rest[..start]);
            path.push_str(&self.encode_segment(name, &value)?);
            rest = &rest[start + len + 1..];
        }
        path.push_str(rest);

        Ok(path)
    }

    /// Path of one item: the resolved base path plus its encoded id
    pub fn item_path(&self, attrs: &Map<String, Value>) -> Result<String> {
        let base = self.resolve_path(attrs)?;
        let Some(id_attribute) = self.id_attribute else {
            return Ok(base);
        };

        let id = attrs.get(id_attribute).and_then(path_segment).ok_or_else(|| {
            Error::invalid(format!("{} has no `{}` set", self.key, id_attribute))
        })?;

        Ok(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            self.encode_segment(id_attribute, &id)?
        ))
    }

    /// Percent-encode one segment; `.` and `..` would be collapsed by URL
    /// normalization and are refused
    fn encode_segment(&self, name: &str, value: &str) -> Result<String> {
        if value == "." || value == ".." {
            return Err(Error::invalid(format!(
                "{}: `{}` cannot be `{}`",
                self.key, name, value
            )));
        }
        Ok(urlencoding::encode(value).into_owned())
    }
}

/// Render a value as a path segment; empty strings and null do not count
pub(crate) fn path_segment(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static NESTED: ResourceSchema = ResourceSchema {
        key: "test.nested",
        service: ServiceType::Compute,
        resource_key: Some("thing"),
        resources_key: Some("things"),
        base_path: "/servers/{server_id}/things/{kind}",
        id_attribute: Some("id"),
        capabilities: Capabilities {
            list: true,
            ..Capabilities::NONE
        },
        create_method: Method::POST,
        commit_method: Method::PUT,
        create_requires_id: false,
        request_format: RequestFormat::Bare,
        max_microversion: None,
        fields: &[
            Field::uri("server_id"),
            Field::uri("kind"),
            Field::body("id"),
        ],
    };

    fn attrs(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(NESTED.placeholders(), vec!["server_id", "kind"]);
    }

    #[test]
    fn test_resolve_path_encodes_segments() {
        let path = NESTED
            .resolve_path(&attrs(json!({"server_id": "s 1", "kind": "a/b"})))
            .unwrap();
        assert_eq!(path, "/servers/s%201/things/a%2Fb");
    }

    #[test]
    fn test_resolve_path_requires_every_placeholder() {
        let err = NESTED
            .resolve_path(&attrs(json!({"server_id": "s1"})))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(msg) if msg.contains("`kind`")));
    }

    #[test]
    fn test_item_path_appends_id() {
        let path = NESTED
            .item_path(&attrs(json!({"server_id": "s1", "kind": "k", "id": 5})))
            .unwrap();
        assert_eq!(path, "/servers/s1/things/k/5");

        let err = NESTED
            .item_path(&attrs(json!({"server_id": "s1", "kind": "k"})))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn test_dot_segments_are_refused() {
        let err = NESTED
            .resolve_path(&attrs(json!({"server_id": "..", "kind": "k"})))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(msg) if msg.contains("`server_id`")));

        let err = NESTED
            .item_path(&attrs(json!({"server_id": "s1", "kind": "k", "id": "."})))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(msg) if msg.contains("`id`")));

        let err = NESTED
            .item_path(&attrs(json!({"server_id": "s1", "kind": "k", "id": ""})))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));

        // Dots inside a segment are ordinary characters
        let path = NESTED
            .item_path(&attrs(json!({"server_id": "s1", "kind": "...", "id": "a..b"})))
            .unwrap();
        assert_eq!(path, "/servers/s1/things/.../a..b");
    }

    #[test]
    fn test_require_checks_capabilities() {
        assert!(NESTED.require(Operation::List).is_ok());
        let err = NESTED.require(Operation::Create).unwrap_err();
        assert_eq!(err.to_string(), "invalid request: test.nested does not allow create");
    }
}
