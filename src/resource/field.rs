//! Field bindings
//!
//! A [`Field`] maps one attribute name to the place it lives on the wire:
//! a JSON body key, a URI placeholder, a header, or a family of headers
//! sharing a prefix. Bindings are declared as `const` data in each
//! resource schema.

use crate::cloud::Microversion;
use crate::cloud::session::header_value;
use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName};
use serde_json::{Map, Number, Value};

/// Where a field lives on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A key in the JSON body
    Body,
    /// A `{placeholder}` in the base path
    Uri,
    /// A single header
    Header,
    /// Every header starting with the wire name, collected into a map
    HeaderPrefix,
}

/// Programmatic type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Any,
    String,
    Integer,
    Boolean,
    Map,
    List,
}

/// Value used when an attribute was never set nor returned
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Str(&'static str),
    Int(i64),
    Bool(bool),
}

impl DefaultValue {
    pub fn to_value(self) -> Value {
        match self {
            DefaultValue::Str(s) => Value::String(s.to_string()),
            DefaultValue::Int(i) => Value::from(i),
            DefaultValue::Bool(b) => Value::Bool(b),
        }
    }
}

/// Binding between an attribute and its wire representation
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub wire_name: &'static str,
    pub kind: FieldKind,
    pub ty: FieldType,
    pub default: Option<DefaultValue>,
    /// Alternate body keys. For header bindings these let a JSON listing
    /// populate the same attribute the header does.
    pub aliases: &'static [&'static str],
    pub read_only: bool,
    pub min_microversion: Option<Microversion>,
}

impl Field {
    const fn new(name: &'static str, wire_name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            wire_name,
            kind,
            ty: FieldType::Any,
            default: None,
            aliases: &[],
            read_only: false,
            min_microversion: None,
        }
    }

    pub const fn body(name: &'static str) -> Self {
        Self::new(name, name, FieldKind::Body)
    }

    pub const fn uri(name: &'static str) -> Self {
        Self::new(name, name, FieldKind::Uri).typed(FieldType::String)
    }

    pub const fn header(name: &'static str, header: &'static str) -> Self {
        Self::new(name, header, FieldKind::Header).typed(FieldType::String)
    }

    pub const fn header_prefix(name: &'static str, prefix: &'static str) -> Self {
        Self::new(name, prefix, FieldKind::HeaderPrefix).typed(FieldType::Map)
    }

    pub const fn typed(self, ty: FieldType) -> Self {
        Self { ty, ..self }
    }

    pub const fn default(self, default: DefaultValue) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    pub const fn aliases(self, aliases: &'static [&'static str]) -> Self {
        Self { aliases, ..self }
    }

    pub const fn read_only(self) -> Self {
        Self {
            read_only: true,
            ..self
        }
    }

    pub const fn since(self, version: Microversion) -> Self {
        Self {
            min_microversion: Some(version),
            ..self
        }
    }

    pub fn default_value(&self) -> Option<Value> {
        self.default.map(DefaultValue::to_value)
    }

    /// Convert a value to this field's type; gives the value back on failure
    pub fn coerce(&self, value: Value) -> std::result::Result<Value, Value> {
        coerce(self.ty, value)
    }

    /// Read this field out of a decoded JSON body
    pub fn decode_body(&self, body: &Map<String, Value>) -> Option<Value> {
        let primary = match self.kind {
            FieldKind::Body | FieldKind::Uri => Some(self.wire_name),
            FieldKind::Header | FieldKind::HeaderPrefix => None,
        };

        let raw = primary
            .into_iter()
            .chain(self.aliases.iter().copied())
            .find_map(|key| body.get(key))?
            .clone();

        Some(self.coerce_or_keep(raw))
    }

    /// Read this field out of response headers
    pub fn decode_headers(&self, headers: &HeaderMap) -> Option<Value> {
        match self.kind {
            FieldKind::Header => {
                let raw = headers.get(self.wire_name)?.to_str().ok()?;
                Some(self.coerce_or_keep(Value::String(raw.to_string())))
            }
            FieldKind::HeaderPrefix => {
                let prefix = self.wire_name.to_ascii_lowercase();
                let map: Map<String, Value> = headers
                    .iter()
                    .filter_map(|(name, value)| {
                        let key = name.as_str().strip_prefix(&prefix)?;
                        let value = value.to_str().ok()?;
                        Some((key.to_string(), Value::String(value.to_string())))
                    })
                    .collect();

                if map.is_empty() {
                    None
                } else {
                    Some(Value::Object(map))
                }
            }
            FieldKind::Body | FieldKind::Uri => None,
        }
    }

    /// Write this field into request headers
    pub fn encode_headers(&self, value: &Value, headers: &mut HeaderMap) -> Result<()> {
        match self.kind {
            FieldKind::Header => {
                if let Some(text) = header_text(value) {
                    headers.insert(header_name(self.wire_name)?, header_value(&text)?);
                }
            }
            FieldKind::HeaderPrefix => {
                let Value::Object(map) = value else {
                    return Err(Error::invalid(format!("`{}` must be a map", self.name)));
                };
                for (key, value) in map {
                    if let Some(text) = header_text(value) {
                        let name = header_name(&format!("{}{}", self.wire_name, key))?;
                        headers.insert(name, header_value(&text)?);
                    }
                }
            }
            FieldKind::Body | FieldKind::Uri => {}
        }
        Ok(())
    }

    fn coerce_or_keep(&self, raw: Value) -> Value {
        match self.coerce(raw) {
            Ok(value) => value,
            Err(raw) => {
                tracing::debug!("keeping uncoerced value for `{}`: {}", self.name, raw);
                raw
            }
        }
    }
}

fn header_name(name: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| Error::invalid(format!("invalid header name: {name}")))
}

fn header_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Convert a value to a field type; null passes through every type
pub fn coerce(ty: FieldType, value: Value) -> std::result::Result<Value, Value> {
    match (ty, value) {
        (_, Value::Null) => Ok(Value::Null),
        (FieldType::Any, v) => Ok(v),

        (FieldType::String, Value::String(s)) => Ok(Value::String(s)),
        (FieldType::String, Value::Number(n)) => Ok(Value::String(n.to_string())),
        (FieldType::String, Value::Bool(b)) => Ok(Value::String(b.to_string())),

        (FieldType::Integer, Value::Number(n)) => {
            if n.is_i64() || n.is_u64() {
                Ok(Value::Number(n))
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                        Ok(Value::Number(Number::from(f as i64)))
                    }
                    _ => Err(Value::Number(n)),
                }
            }
        }
        (FieldType::Integer, Value::String(s)) => match s.trim().parse::<i64>() {
            Ok(i) => Ok(Value::from(i)),
            Err(_) => Err(Value::String(s)),
        },

        (FieldType::Boolean, Value::Bool(b)) => Ok(Value::Bool(b)),
        (FieldType::Boolean, Value::String(s)) => match s.to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(Value::String(s)),
        },

        (FieldType::Map, Value::Object(m)) => Ok(Value::Object(m)),
        (FieldType::List, Value::Array(a)) => Ok(Value::Array(a)),

        (_, other) => Err(other),
    }
}
