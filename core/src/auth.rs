//! Sign-in and sign-out.
//!
//! `login` is the only writer of the session; `logout` the only
//! deliberate eraser. Everything else just reads the token.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::envelope::ApiResponse;
use crate::error::{ApiError, SessionError};
use crate::http::HttpMethod;
use crate::request::{RequestBody, RequestConfig};
use crate::session::User;
use crate::transport::Transport;

pub const LOGIN_ENDPOINT: &str = "auth/login";

#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The `data` of a successful login response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginPayload {
    pub token: String,
    pub user: User,
}

impl<T: Transport> ApiClient<T> {
    /// Exchange credentials for a token and remember both token and user.
    ///
    /// The login call itself is sent without any stored token.
    pub fn login(&self, credentials: &Credentials) -> ApiResponse<User> {
        let body = match RequestBody::json(credentials) {
            Ok(body) => body,
            Err(e) => return e.into(),
        };
        let config = RequestConfig::new(HttpMethod::Post).body(body).without_auth();

        let envelope: ApiResponse<LoginPayload> = self.request(LOGIN_ENDPOINT, config);
        let message = envelope.message;
        match envelope.data {
            Some(payload) if envelope.success => {
                if let Err(e) = self.session().store(&payload.token, &payload.user) {
                    return ApiError::from(e).into();
                }
                tracing::info!(user = %payload.user.id, role = ?payload.user.role, "signed in");
                ApiResponse::ok(payload.user, message)
            }
            _ => ApiResponse::fail(envelope.error.unwrap_or_default()),
        }
    }

    pub fn logout(&self) -> Result<(), SessionError> {
        self.session().clear()?;
        tracing::info!("signed out");
        Ok(())
    }

    /// The user cached at the last login, if any.
    pub fn current_user(&self) -> Option<User> {
        self.session().user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().token().is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::config::ClientConfig;
    use crate::error::TransportError;
    use crate::http::{HttpRequest, HttpResponse};
    use crate::session::{MemorySession, Role, Session};

    struct Scripted {
        status: u16,
        body: &'static str,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl Transport for Scripted {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            self.seen.lock().unwrap().push(request);
            Ok(HttpResponse {
                status: self.status,
                headers: Vec::new(),
                body: self.body.to_string(),
            })
        }
    }

    fn client(session: Arc<MemorySession>, status: u16, body: &'static str) -> ApiClient<Scripted> {
        ApiClient::with_transport(
            ClientConfig::new("http://localhost:5000/api"),
            session,
            Scripted {
                status,
                body,
                seen: Mutex::new(Vec::new()),
            },
        )
    }

    const LOGIN_OK: &str = r#"{
        "data": {
            "token": "fresh",
            "user": {"id": "u7", "name": "Mina", "email": "mina@campus.edu", "role": "admin"}
        },
        "message": "Login successful"
    }"#;

    #[test]
    fn login_stores_token_and_user() {
        let session = Arc::new(MemorySession::new());
        let c = client(session.clone(), 200, LOGIN_OK);

        let envelope = c.login(&Credentials::new("mina@campus.edu", "hunter2"));
        assert!(envelope.success);
        assert_eq!(envelope.message.as_deref(), Some("Login successful"));
        let user = envelope.data.unwrap();
        assert_eq!(user.role, Role::Admin);

        assert_eq!(session.token().as_deref(), Some("fresh"));
        assert_eq!(c.current_user(), Some(user));
        assert!(c.is_authenticated());
    }

    #[test]
    fn login_does_not_send_stale_token() {
        let session = Arc::new(MemorySession::with_token("stale"));
        let c = client(session, 200, LOGIN_OK);
        c.login(&Credentials::new("mina@campus.edu", "hunter2"));

        let sent = c.transport_requests();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].header("Authorization").is_none());
        assert!(sent[0].url.ends_with("/auth/login"));
    }

    #[test]
    fn failed_login_leaves_session_untouched() {
        let session = Arc::new(MemorySession::new());
        let c = client(session.clone(), 401, r#"{"message": "Invalid credentials"}"#);

        let envelope = c.login(&Credentials::new("mina@campus.edu", "wrong"));
        assert_eq!(envelope.error.as_deref(), Some("Invalid credentials"));
        assert!(session.token().is_none());
        assert!(!c.is_authenticated());
    }

    #[test]
    fn logout_clears_everything() {
        let session = Arc::new(MemorySession::new());
        let c = client(session.clone(), 200, LOGIN_OK);
        c.login(&Credentials::new("mina@campus.edu", "hunter2"));

        c.logout().unwrap();
        assert!(session.token().is_none());
        assert!(c.current_user().is_none());
    }

    #[test]
    fn debug_hides_password() {
        let shown = format!("{:?}", Credentials::new("a@b.c", "secret"));
        assert!(!shown.contains("secret"));
    }

    impl ApiClient<Scripted> {
        fn transport_requests(&self) -> Vec<HttpRequest> {
            self.transport().seen.lock().unwrap().clone()
        }
    }
}
