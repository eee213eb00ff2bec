//! Verify request building and response parsing against the JSON vectors in
//! `test-vectors/`.
//!
//! Bodies are compared as parsed JSON, not raw strings, so field ordering in
//! the vector files does not matter.

use std::sync::Arc;

use campus_core::{
    ApiClient, ApiResponse, ClientConfig, HttpMethod, HttpRequest, HttpResponse, MemorySession, Payload,
    RequestBody, RequestConfig, Transport, TransportError,
};

const BASE_URL: &str = "http://localhost:5000/api";

/// Vectors only exercise build/parse; nothing is ever sent.
struct Offline;

impl Transport for Offline {
    fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        Err(TransportError::Connection("offline".to_string()))
    }
}

fn client(token: Option<&str>) -> ApiClient<Offline> {
    let session = match token {
        Some(token) => MemorySession::with_token(token),
        None => MemorySession::new(),
    };
    ApiClient::with_transport(ClientConfig::new(BASE_URL), Arc::new(session), Offline)
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "PATCH" => HttpMethod::Patch,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn string_pairs(value: &serde_json::Value) -> Vec<(String, String)> {
    value
        .as_array()
        .map(|pairs| {
            pairs
                .iter()
                .map(|h| {
                    let arr = h.as_array().unwrap();
                    (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
                })
                .collect()
        })
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[test]
fn request_test_vectors() {
    let raw = include_str!("../../test-vectors/requests.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let c = client(case["token"].as_str());

        let input = &case["config"];
        let mut config = RequestConfig::new(parse_method(input["method"].as_str().unwrap()));
        config.headers = string_pairs(&input["headers"]);
        if let Some(json) = input.get("json") {
            config.body = Some(RequestBody::Json(json.clone()));
        }
        if input["use_auth"] == false {
            config.use_auth = false;
        }

        let req = c.build_request(case["endpoint"].as_str().unwrap(), config).unwrap();
        let expected = &case["expected_request"];

        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");
        assert_eq!(req.headers, string_pairs(&expected["headers"]), "{name}: headers");

        match (&req.body, &expected["body"]) {
            (None, serde_json::Value::Null) => {}
            (Some(Payload::Text(text)), expected_body) => {
                let sent: serde_json::Value = serde_json::from_str(text).unwrap();
                assert_eq!(&sent, expected_body, "{name}: body");
            }
            (other, expected_body) => panic!("{name}: body {other:?} does not match {expected_body}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let c = client(None);
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let response = HttpResponse {
            status: case["status"].as_u64().unwrap() as u16,
            headers: Vec::new(),
            body: case["body"].as_str().unwrap().to_string(),
        };

        let envelope: ApiResponse<serde_json::Value> = c.parse_response(&response);
        let expected: ApiResponse<serde_json::Value> =
            serde_json::from_value(case["expected"].clone()).unwrap();
        assert_eq!(envelope, expected, "{name}: envelope");
    }
}

#[test]
fn offline_transport_still_yields_an_envelope() {
    let envelope: ApiResponse<serde_json::Value> = client(Some("tok")).get("clubs");
    assert!(!envelope.success);
    assert_eq!(envelope.error.as_deref(), Some("connection failed: offline"));
}
