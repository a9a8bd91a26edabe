//! Recording transport for unit tests

use super::http::{HttpRequest, HttpResponse, Transport};
use crate::error::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::StatusCode;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays canned responses in order and records every request
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with an optional JSON body
    pub fn push(&self, status: StatusCode, body: Option<Value>) {
        self.push_with_headers(status, &[], body);
    }

    /// Queue a response with headers and an optional JSON body
    pub fn push_with_headers(&self, status: StatusCode, headers: &[(&str, &str)], body: Option<Value>) {
        let mut response = HttpResponse::new(status);
        for (name, value) in headers {
            response.headers.insert(
                HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        if let Some(body) = body {
            response.body = serde_json::to_vec(&body).unwrap();
        }
        self.responses.lock().unwrap().push_back(response);
    }

    /// Queue a response with a raw body
    pub fn push_raw(&self, status: StatusCode, body: &[u8]) {
        let mut response = HttpResponse::new(status);
        response.body = body.to_vec();
        self.responses.lock().unwrap().push_back(response);
    }

    /// Every request seen so far
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url.clone();
        self.requests.lock().unwrap().push(request);
        let response = self.responses.lock().unwrap().pop_front();
        Ok(response.unwrap_or_else(|| panic!("no canned response for {url}")))
    }
}
