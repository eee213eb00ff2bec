//! Error types for the campus API client.
//!
//! # Design
//! These errors never reach callers of `ApiClient::request`; the facade folds
//! every one of them into a failure `ApiResponse`. They exist so the build,
//! transport and session layers can propagate with `?` and so
//! `ApiResponse::into_result` has something typed to hand back.

use thiserror::Error;

/// Errors raised while building, executing or decoding an API call.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body was not JSON or did not match the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The server answered with a non-2xx status. `message` is already
    /// resolved to either the server's message or the synthesized fallback.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// A failure envelope turned back into an error. Only the text survives;
    /// the envelope does not record which layer produced it.
    #[error("{0}")]
    Failed(String),

    /// The request never produced an HTTP response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Reading or writing the stored credentials failed.
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Failures below the HTTP layer: DNS, refused connections, unreadable bodies.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Failures of the persistent credential store.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session file is corrupt: {0}")]
    Corrupt(String),
}
