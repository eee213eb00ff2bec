//! Per-call request configuration.
//!
//! A `RequestConfig` holds only what the caller wants to override. The
//! facade merges it over its defaults (`GET`, JSON content type,
//! authenticated) when it builds the `HttpRequest`.

use serde::Serialize;

use crate::error::ApiError;
use crate::form::FormData;
use crate::http::HttpMethod;

/// Request payload as supplied by a call site.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Structured data, serialized to JSON by the facade.
    Json(serde_json::Value),
    /// An already-serialized body, sent verbatim.
    Raw(String),
    /// A multipart form. Any explicit `Content-Type` is dropped.
    Form(FormData),
}

impl RequestBody {
    pub fn json<B: Serialize + ?Sized>(body: &B) -> Result<Self, ApiError> {
        serde_json::to_value(body)
            .map(RequestBody::Json)
            .map_err(|e| ApiError::Serialization(e.to_string()))
    }
}

impl From<serde_json::Value> for RequestBody {
    fn from(value: serde_json::Value) -> Self {
        RequestBody::Json(value)
    }
}

impl From<String> for RequestBody {
    fn from(raw: String) -> Self {
        RequestBody::Raw(raw)
    }
}

impl From<&str> for RequestBody {
    fn from(raw: &str) -> Self {
        RequestBody::Raw(raw.to_string())
    }
}

impl From<FormData> for RequestBody {
    fn from(form: FormData) -> Self {
        RequestBody::Form(form)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestConfig {
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub use_auth: bool,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            method: HttpMethod::Get,
            headers: Vec::new(),
            body: None,
            use_auth: true,
        }
    }
}

impl RequestConfig {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Option<RequestBody>>) -> Self {
        self.body = body.into();
        self
    }

    /// Skip the `Authorization` header even when a token is stored.
    pub fn without_auth(mut self) -> Self {
        self.use_auth = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_authenticated_get() {
        let config = RequestConfig::default();
        assert_eq!(config.method, HttpMethod::Get);
        assert!(config.use_auth);
        assert!(config.headers.is_empty());
        assert!(config.body.is_none());
    }

    #[test]
    fn builder_chains() {
        let config = RequestConfig::new(HttpMethod::Patch)
            .header("X-Club", "chess")
            .body(RequestBody::Raw("{}".to_string()))
            .without_auth();
        assert_eq!(config.method, HttpMethod::Patch);
        assert_eq!(config.headers, vec![("X-Club".to_string(), "chess".to_string())]);
        assert_eq!(config.body, Some(RequestBody::Raw("{}".to_string())));
        assert!(!config.use_auth);
    }

    #[test]
    fn json_body_captures_serialized_value() {
        #[derive(Serialize)]
        struct NewPost<'a> {
            content: &'a str,
            tags: Vec<&'a str>,
        }
        let body = RequestBody::json(&NewPost {
            content: "Hello",
            tags: vec!["intro"],
        })
        .unwrap();
        assert_eq!(
            body,
            RequestBody::Json(serde_json::json!({"content": "Hello", "tags": ["intro"]}))
        );
    }

    #[test]
    fn strings_convert_to_raw_and_values_to_json() {
        assert_eq!(RequestBody::from("{\"a\":1}"), RequestBody::Raw("{\"a\":1}".to_string()));
        assert_eq!(RequestBody::from("x".to_string()), RequestBody::Raw("x".to_string()));
        assert_eq!(
            RequestBody::from(serde_json::json!({"a": 1})),
            RequestBody::Json(serde_json::json!({"a": 1}))
        );
    }
}
