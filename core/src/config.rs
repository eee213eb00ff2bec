//! Client configuration.
//!
//! The base URL comes from `CAMPUS_API_URL`, falling back to a local
//! development server.

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
pub const BASE_URL_ENV: &str = "CAMPUS_API_URL";

/// What to do when the server answers 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnauthorizedPolicy {
    /// Report the failure and leave stored credentials alone.
    #[default]
    Ignore,
    /// Also wipe the stored token and user, forcing a fresh login.
    ClearSession,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub unauthorized: UnauthorizedPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            unauthorized: UnauthorizedPolicy::default(),
        }
    }

    pub fn from_env() -> Self {
        Self::from_value(std::env::var(BASE_URL_ENV).ok())
    }

    fn from_value(value: Option<String>) -> Self {
        match value {
            Some(url) if !url.trim().is_empty() => Self::new(url.trim()),
            _ => Self::default(),
        }
    }

    pub fn with_unauthorized(mut self, policy: UnauthorizedPolicy) -> Self {
        self.unauthorized = policy;
        self
    }
}
