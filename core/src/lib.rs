//! Client facade for the campus engagement API.
//!
//! # Overview
//! Every call to the campus REST API (clubs, posts, projects, auth) goes
//! through `ApiClient`, which resolves the endpoint against the configured
//! base URL, attaches the stored bearer token, serializes the body and
//! normalizes whatever comes back into an `ApiResponse` envelope.
//!
//! # Design
//! - Request building and response parsing are pure; a `Transport` does the
//!   actual I/O (`UreqTransport` by default), so tests can swap in fakes.
//! - Credentials live in an injected `Session` (`MemorySession`,
//!   `FileSession`), never in ambient global state.
//! - `request` does not return `Result`. Transport errors, undecodable
//!   bodies and non-2xx statuses all surface as `success == false`.
//! - Response payloads are validated against the caller's type at the decode
//!   boundary with serde.

pub mod auth;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod form;
pub mod http;
pub mod request;
pub mod session;
pub mod transport;

pub use auth::{Credentials, LoginPayload};
pub use client::ApiClient;
pub use config::{ClientConfig, UnauthorizedPolicy, DEFAULT_BASE_URL};
pub use envelope::ApiResponse;
pub use error::{ApiError, SessionError, TransportError};
pub use form::{FormData, FormPart};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Payload};
pub use request::{RequestBody, RequestConfig};
pub use session::{FileSession, MemorySession, Role, Session, User};
pub use transport::{Transport, UreqTransport};
