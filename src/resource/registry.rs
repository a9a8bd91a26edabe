//! Resource Registry
//!
//! Every schema the SDK ships, addressable by key. The CLI resolves its
//! resource arguments here.

use super::schema::ResourceSchema;
use crate::models::{ACCOUNT, CONTAINER, OBJECT, RESOURCE_LOCK, SHARE_MAPPING};

/// All shipped schemas
pub static SCHEMAS: &[&ResourceSchema] = &[
    &SHARE_MAPPING,
    &RESOURCE_LOCK,
    &CONTAINER,
    &OBJECT,
    &ACCOUNT,
];

/// Get a schema by key
pub fn get_schema(key: &str) -> Option<&'static ResourceSchema> {
    SCHEMAS.iter().copied().find(|s| s.key == key)
}

/// Get all schema keys (for CLI help)
pub fn get_all_schema_keys() -> Vec<&'static str> {
    SCHEMAS.iter().map(|s| s.key).collect()
}
