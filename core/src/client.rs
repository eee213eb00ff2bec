//! The single chokepoint for calls to the campus API.
//!
//! # Design
//! `ApiClient` splits every call into three steps:
//! - `build_request` merges a `RequestConfig` over the defaults, resolves
//!   the URL, injects the bearer token and serializes the body;
//! - the `Transport` executes the resulting `HttpRequest`;
//! - `parse_response` turns the `HttpResponse` into an `ApiResponse`.
//!
//! Build and parse are pure, so they can be tested without a network.
//! `request` chains all three and never fails: every error ends up in the
//! envelope's `error` field.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::{ClientConfig, UnauthorizedPolicy};
use crate::envelope::ApiResponse;
use crate::error::ApiError;
use crate::form::FormData;
use crate::http::{remove_header, set_header, HttpMethod, HttpRequest, HttpResponse, Payload};
use crate::request::{RequestBody, RequestConfig};
use crate::session::Session;
use crate::transport::{Transport, UreqTransport};

const CONTENT_TYPE: &str = "Content-Type";
const AUTHORIZATION: &str = "Authorization";

pub struct ApiClient<T = UreqTransport> {
    config: ClientConfig,
    session: Arc<dyn Session>,
    transport: T,
}

impl ApiClient<UreqTransport> {
    pub fn new(config: ClientConfig, session: Arc<dyn Session>) -> Self {
        Self::with_transport(config, session, UreqTransport::new())
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn with_transport(config: ClientConfig, session: Arc<dyn Session>, transport: T) -> Self {
        Self {
            config,
            session,
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &dyn Session {
        self.session.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Join `endpoint` onto the base URL, adding the leading `/` if missing.
    pub fn resolve_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{endpoint}", self.config.base_url)
        } else {
            format!("{}/{endpoint}", self.config.base_url)
        }
    }

    pub fn build_request(&self, endpoint: &str, config: RequestConfig) -> Result<HttpRequest, ApiError> {
        let mut headers = vec![(CONTENT_TYPE.to_string(), "application/json".to_string())];
        for (name, value) in &config.headers {
            set_header(&mut headers, name, value);
        }

        let body = match config.body {
            None => None,
            Some(RequestBody::Json(value)) => {
                let text = serde_json::to_string(&value).map_err(|e| ApiError::Serialization(e.to_string()))?;
                Some(Payload::Text(text))
            }
            Some(RequestBody::Raw(text)) => Some(Payload::Text(text)),
            Some(RequestBody::Form(form)) => {
                remove_header(&mut headers, CONTENT_TYPE);
                Some(Payload::Form(form))
            }
        };

        if config.use_auth {
            if let Some(token) = self.session.token() {
                set_header(&mut headers, AUTHORIZATION, &format!("Bearer {token}"));
            }
        }

        Ok(HttpRequest {
            method: config.method,
            url: self.resolve_url(endpoint),
            headers,
            body,
        })
    }

    pub fn parse_response<D: DeserializeOwned>(&self, response: &HttpResponse) -> ApiResponse<D> {
        parse_envelope(response)
    }

    pub fn request<D: DeserializeOwned>(&self, endpoint: &str, config: RequestConfig) -> ApiResponse<D> {
        let request = match self.build_request(endpoint, config) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(endpoint, error = %e, "failed to build request");
                return e.into();
            }
        };

        let method = request.method.as_str();
        let url = request.url.clone();
        tracing::debug!(method, %url, "sending request");

        let response = match self.transport.execute(request) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(method, %url, error = %e, "transport failure");
                return ApiError::from(e).into();
            }
        };

        if response.status == 401 {
            self.on_unauthorized();
        }

        let envelope = self.parse_response(&response);
        if let Some(error) = &envelope.error {
            tracing::warn!(method, %url, status = response.status, error = %error, "request failed");
        }
        envelope
    }

    pub fn get<D: DeserializeOwned>(&self, endpoint: &str) -> ApiResponse<D> {
        self.get_with(endpoint, RequestConfig::default())
    }

    /// GET with caller headers or `without_auth`. The method is forced to GET.
    pub fn get_with<D: DeserializeOwned>(&self, endpoint: &str, config: RequestConfig) -> ApiResponse<D> {
        self.request(endpoint, RequestConfig { method: HttpMethod::Get, ..config })
    }

    pub fn delete<D: DeserializeOwned>(&self, endpoint: &str) -> ApiResponse<D> {
        self.delete_with(endpoint, RequestConfig::default())
    }

    pub fn delete_with<D: DeserializeOwned>(&self, endpoint: &str, config: RequestConfig) -> ApiResponse<D> {
        self.request(endpoint, RequestConfig { method: HttpMethod::Delete, ..config })
    }

    /// POST `body` as given: a `&str`/`String` goes out verbatim, a
    /// `serde_json::Value` is serialized. Use `post_json` for typed payloads.
    pub fn post<D: DeserializeOwned>(&self, endpoint: &str, body: impl Into<RequestBody>) -> ApiResponse<D> {
        self.post_with(endpoint, body, RequestConfig::default())
    }

    pub fn post_with<D: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: impl Into<RequestBody>,
        config: RequestConfig,
    ) -> ApiResponse<D> {
        self.send_body(HttpMethod::Post, endpoint, body.into(), config)
    }

    pub fn post_json<D: DeserializeOwned, B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> ApiResponse<D> {
        self.send_json(HttpMethod::Post, endpoint, body)
    }

    pub fn put<D: DeserializeOwned>(&self, endpoint: &str, body: impl Into<RequestBody>) -> ApiResponse<D> {
        self.put_with(endpoint, body, RequestConfig::default())
    }

    pub fn put_with<D: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: impl Into<RequestBody>,
        config: RequestConfig,
    ) -> ApiResponse<D> {
        self.send_body(HttpMethod::Put, endpoint, body.into(), config)
    }

    pub fn put_json<D: DeserializeOwned, B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> ApiResponse<D> {
        self.send_json(HttpMethod::Put, endpoint, body)
    }

    pub fn patch<D: DeserializeOwned>(&self, endpoint: &str, body: impl Into<RequestBody>) -> ApiResponse<D> {
        self.patch_with(endpoint, body, RequestConfig::default())
    }

    pub fn patch_with<D: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: impl Into<RequestBody>,
        config: RequestConfig,
    ) -> ApiResponse<D> {
        self.send_body(HttpMethod::Patch, endpoint, body.into(), config)
    }

    pub fn patch_json<D: DeserializeOwned, B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> ApiResponse<D> {
        self.send_json(HttpMethod::Patch, endpoint, body)
    }

    /// POST a multipart form.
    pub fn upload<D: DeserializeOwned>(&self, endpoint: &str, form: FormData) -> ApiResponse<D> {
        self.post(endpoint, form)
    }

    fn send_body<D: DeserializeOwned>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: RequestBody,
        config: RequestConfig,
    ) -> ApiResponse<D> {
        let config = RequestConfig {
            method,
            body: Some(body),
            ..config
        };
        self.request(endpoint, config)
    }

    fn send_json<D: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: &B,
    ) -> ApiResponse<D> {
        match RequestBody::json(body) {
            Ok(body) => self.send_body(method, endpoint, body, RequestConfig::default()),
            Err(e) => e.into(),
        }
    }

    fn on_unauthorized(&self) {
        match self.config.unauthorized {
            UnauthorizedPolicy::Ignore => {}
            UnauthorizedPolicy::ClearSession => {
                tracing::info!("server rejected credentials, clearing session");
                if let Err(e) = self.session.clear() {
                    tracing::warn!(error = %e, "failed to clear session");
                }
            }
        }
    }
}

/// Normalize a response into the envelope shape.
///
/// On 2xx the payload is the body's `data` field, or the whole body when
/// `data` is absent or null, validated against `D`. On any other status the
/// error is the body's `message`, or a synthesized status message when the
/// body has none or is not JSON.
fn parse_envelope<D: DeserializeOwned>(response: &HttpResponse) -> ApiResponse<D> {
    let decoded: Result<Value, _> = if response.body.trim().is_empty() {
        Ok(Value::Null)
    } else {
        serde_json::from_str(&response.body)
    };

    if !response.is_success() {
        let message = decoded
            .ok()
            .as_ref()
            .and_then(|body| body.get("message"))
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed with status {}", response.status));
        return ApiResponse::fail(message);
    }

    let mut body = match decoded {
        Ok(body) => body,
        Err(e) => return ApiError::Deserialization(format!("invalid JSON response: {e}")).into(),
    };
    let message = body.get("message").and_then(Value::as_str).map(str::to_string);
    let has_data = body.get("data").is_some_and(|data| !data.is_null());
    let payload = if has_data { body["data"].take() } else { body };

    match serde_json::from_value::<D>(payload) {
        Ok(data) => ApiResponse::ok(data, message),
        Err(e) => ApiError::Deserialization(format!("unexpected response shape: {e}")).into(),
    }
}
