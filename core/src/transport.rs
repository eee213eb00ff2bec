//! Executes `HttpRequest` values against the network.
//!
//! The facade only ever talks to the `Transport` trait, so any HTTP library
//! can sit underneath and tests can substitute canned responses.
//! `UreqTransport` is the blocking default.

use std::sync::Arc;

use ureq::http::Response;
use ureq::typestate::WithBody;
use ureq::{Body, RequestBuilder};

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Payload};

pub trait Transport: Send + Sync {
    /// Perform one round-trip. Any HTTP status, 4xx and 5xx included, is a
    /// successful execution; only failures to get a response are errors.
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// Blocking transport over a `ureq` agent.
///
/// The agent is configured with `http_status_as_error(false)` so 4xx/5xx
/// responses come back as data and the facade decides what they mean.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut headers = request.headers;
        let body = match request.body {
            None => None,
            Some(Payload::Text(text)) => Some(text.into_bytes()),
            Some(Payload::Form(form)) => {
                let encoded = form.encode();
                headers.push(("Content-Type".to_string(), encoded.content_type));
                Some(encoded.body)
            }
        };

        let url = request.url.as_str();
        let result = match (request.method, body) {
            (HttpMethod::Get, None) => with_headers(self.agent.get(url), &headers).call(),
            (HttpMethod::Get, Some(bytes)) => with_headers(self.agent.get(url), &headers)
                .force_send_body()
                .send(&bytes[..]),
            (HttpMethod::Delete, None) => with_headers(self.agent.delete(url), &headers).call(),
            (HttpMethod::Delete, Some(bytes)) => with_headers(self.agent.delete(url), &headers)
                .force_send_body()
                .send(&bytes[..]),
            (HttpMethod::Post, body) => send(with_headers(self.agent.post(url), &headers), body),
            (HttpMethod::Put, body) => send(with_headers(self.agent.put(url), &headers), body),
            (HttpMethod::Patch, body) => send(with_headers(self.agent.patch(url), &headers), body),
        };
        let mut response = result.map_err(|e| TransportError::Connection(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::Body(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send(builder: RequestBuilder<WithBody>, body: Option<Vec<u8>>) -> Result<Response<Body>, ureq::Error> {
    match body {
        Some(bytes) => builder.send(&bytes[..]),
        None => builder.send_empty(),
    }
}
