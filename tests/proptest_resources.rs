//! Property-based tests using proptest
//!
//! These tests verify attribute coercion, wire encoding and microversion
//! capping using randomized inputs.

use async_trait::async_trait;
use proptest::prelude::*;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde_json::{json, Map, Value};
use stacksdk::cloud::{Endpoint, HttpRequest, HttpResponse, Microversion, ServiceType, Session, Transport};
use stacksdk::models::{CONTAINER, SHARE_MAPPING};
use stacksdk::resource::field::coerce;
use stacksdk::resource::{fetch_resources, FieldType, ListQuery, Resource};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Generate identifiers including characters that need escaping in paths
fn arb_identifier() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z0-9-]{1,36}",
        "[a-zA-Z0-9 /?#%&=_.-]{1,24}",
    ]
    .prop_filter("dot segments are refused", |s| s != "." && s != "..")
}

/// Serves the queued pages in order, then empty pages
struct PagedTransport {
    pages: Mutex<VecDeque<Vec<String>>>,
    calls: AtomicUsize,
}

impl PagedTransport {
    fn new(sizes: &[usize]) -> Self {
        let mut next = 0;
        let pages = sizes
            .iter()
            .map(|size| {
                (0..*size)
                    .map(|_| {
                        next += 1;
                        format!("c{next:04}")
                    })
                    .collect::<Vec<_>>()
            })
            .collect::<VecDeque<_>>();

        Self {
            pages: Mutex::new(pages),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Transport for PagedTransport {
    async fn request(&self, _request: HttpRequest) -> stacksdk::Result<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let names = self.pages.lock().unwrap().pop_front().unwrap_or_default();
        let items: Vec<_> = names.iter().map(|n| json!({"name": n})).collect();

        let mut response = HttpResponse::new(StatusCode::OK);
        response.body = serde_json::to_vec(&items)?;
        Ok(response)
    }
}

fn list_containers(sizes: &[usize], query: ListQuery) -> (usize, usize) {
    let transport = Arc::new(PagedTransport::new(sizes));
    let session = Session::new(transport.clone())
        .with_endpoint(ServiceType::ObjectStore, Endpoint::new("http://swift.test/v1/AUTH_p"));

    let items = tokio_test::block_on(fetch_resources(&session, &CONTAINER, Map::new(), query))
        .expect("listing should succeed");
    (items.len(), transport.calls.load(Ordering::SeqCst))
}

fn arb_microversion() -> impl Strategy<Value = Microversion> {
    (2u16..4, 0u16..120).prop_map(|(major, minor)| Microversion::new(major, minor))
}

proptest! {
    /// Without a limit every page is fetched plus one empty page
    #[test]
    fn unlimited_listing_reads_until_empty_page(sizes in proptest::collection::vec(1usize..6, 0..5)) {
        let (items, calls) = list_containers(&sizes, ListQuery::new());
        prop_assert_eq!(items, sizes.iter().sum::<usize>());
        prop_assert_eq!(calls, sizes.len() + 1);
    }

    /// With a limit exactly one request is made, whatever the page holds
    #[test]
    fn limited_listing_makes_one_request(
        sizes in proptest::collection::vec(1usize..6, 0..5),
        limit in 1u32..10,
    ) {
        let (items, calls) = list_containers(&sizes, ListQuery::new().limit(limit));
        prop_assert_eq!(items, sizes.first().copied().unwrap_or(0));
        prop_assert_eq!(calls, 1);
    }

    /// Body of a constructed mapping decodes back to the same attributes
    #[test]
    fn body_decodes_to_same_attributes(
        server_id in arb_identifier(),
        share_id in arb_identifier(),
        tag in proptest::option::of("[a-z]{1,12}"),
    ) {
        let mut attrs = vec![
            ("server_id", Value::String(server_id.clone())),
            ("share_id", Value::String(share_id)),
        ];
        if let Some(tag) = tag {
            attrs.push(("tag", Value::String(tag)));
        }
        let built = Resource::from_attrs(&SHARE_MAPPING, attrs).unwrap();

        let mut uri = Map::new();
        uri.insert("server_id".to_string(), Value::String(server_id));
        let decoded = Resource::from_body(&SHARE_MAPPING, &uri, &Value::Object(built.body()));

        prop_assert_eq!(decoded, built);
    }

    /// URI parameters are percent-encoded as a single path segment
    #[test]
    fn uri_parameters_are_one_segment(server_id in arb_identifier()) {
        let mut attrs = Map::new();
        attrs.insert("server_id".to_string(), Value::String(server_id.clone()));

        let path = SHARE_MAPPING.resolve_path(&attrs).unwrap();
        let segment = path
            .strip_prefix("/servers/")
            .and_then(|rest| rest.strip_suffix("/shares"))
            .unwrap();

        prop_assert!(!segment.contains('/'));
        prop_assert_eq!(urlencoding::decode(segment).unwrap(), server_id);
    }

    /// Dot-only parameters never resolve to a path
    #[test]
    fn dot_segments_never_resolve(dots in "\\.{1,2}") {
        let mut attrs = Map::new();
        attrs.insert("server_id".to_string(), Value::String(dots));

        prop_assert!(matches!(
            SHARE_MAPPING.resolve_path(&attrs),
            Err(stacksdk::Error::InvalidRequest(_))
        ));
    }

    /// Integers survive coercion from their string form
    #[test]
    fn integer_strings_coerce(n in any::<i64>()) {
        prop_assert_eq!(coerce(FieldType::Integer, json!(n.to_string())), Ok(json!(n)));
        prop_assert_eq!(coerce(FieldType::Integer, json!(n)), Ok(json!(n)));
    }

    /// Non-numeric strings are refused and handed back unchanged
    #[test]
    fn non_numeric_strings_refused(s in "[a-zA-Z][a-zA-Z ]{0,16}") {
        prop_assert_eq!(coerce(FieldType::Integer, json!(s.clone())), Err(json!(s)));
    }

    /// Booleans coerce from any letter case
    #[test]
    fn boolean_strings_coerce(flag in any::<bool>(), upper in proptest::collection::vec(any::<bool>(), 5)) {
        let text: String = flag
            .to_string()
            .chars()
            .zip(upper.iter().cycle())
            .map(|(c, up)| if *up { c.to_ascii_uppercase() } else { c })
            .collect();
        prop_assert_eq!(coerce(FieldType::Boolean, json!(text)), Ok(json!(flag)));
    }

    /// Null passes through every field type
    #[test]
    fn null_passes_every_type(ty in prop_oneof![
        Just(FieldType::Any),
        Just(FieldType::String),
        Just(FieldType::Integer),
        Just(FieldType::Boolean),
        Just(FieldType::Map),
        Just(FieldType::List),
    ]) {
        prop_assert_eq!(coerce(ty, Value::Null), Ok(Value::Null));
    }

    /// Container metadata written as headers reads back the same
    #[test]
    fn metadata_headers_read_back(
        metadata in proptest::collection::btree_map("[a-z][a-z0-9-]{0,10}", "[a-zA-Z0-9]{1,20}", 0..8),
    ) {
        let field = CONTAINER.field("metadata").unwrap();
        let value = json!(metadata);

        let mut headers = HeaderMap::new();
        field.encode_headers(&value, &mut headers).unwrap();
        prop_assert_eq!(headers.len(), metadata.len());

        let decoded = field.decode_headers(&headers);
        if metadata.is_empty() {
            prop_assert_eq!(decoded, None);
        } else {
            prop_assert_eq!(decoded, Some(value));
        }
    }

    /// The effective microversion never exceeds either side
    #[test]
    fn effective_microversion_is_capped(
        negotiated in proptest::option::of(arb_microversion()),
        ceiling in proptest::option::of(arb_microversion()),
    ) {
        let effective = Microversion::effective(negotiated, ceiling);
        match (negotiated, ceiling) {
            (Some(n), Some(c)) => prop_assert_eq!(effective, Some(n.min(c))),
            (None, c) => prop_assert_eq!(effective, c),
            (Some(n), None) => prop_assert_eq!(effective, Some(n)),
        }
    }
}
