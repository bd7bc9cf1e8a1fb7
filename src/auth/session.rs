use crate::SharedData;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use rand::RngCore;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Name of the cookie carrying the opaque session token
pub const SESSION_COOKIE: &str = "session";

/// Identity attached to a logged-in session. Handlers for guarded routes take this as
/// an explicit parameter so the acting user is always visible in the signature; it is
/// never read from ambient state inside an operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthSession {
    pub user_id: i32,
    pub username: String,
}

/// Server-side session storage. The browser only ever sees the random token; the
/// identity lives in this map. Logging out removes the entry, which invalidates the
/// token no matter what the client still has cached.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, AuthSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session for the given identity and returns the opaque token to hand
    /// to the client.
    pub fn issue(&self, identity: AuthSession) -> String {
        let token = generate_token();
        let mut sessions = self.sessions.write().expect("session store lock poisoned");
        sessions.insert(token.clone(), identity);
        token
    }

    /// Looks up the identity behind a token. Unknown tokens resolve to None, which the
    /// gate treats the same as no token at all.
    pub fn lookup(&self, token: &str) -> Option<AuthSession> {
        let sessions = self.sessions.read().expect("session store lock poisoned");
        sessions.get(token).cloned()
    }

    /// Drops the session behind a token. Unconditional: revoking a token that was
    /// never issued is not an error.
    pub fn revoke(&self, token: &str) {
        let mut sessions = self.sessions.write().expect("session store lock poisoned");
        sessions.remove(token);
    }
}

/// 32 random bytes, hex encoded. Unguessable and free of characters needing cookie
/// escaping.
fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Pulls the session token out of the request's Cookie header, if present.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix("session="))
        .filter(|token| !token.is_empty())
}

/// Set-Cookie value establishing a session on the client.
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// Set-Cookie value clearing the session cookie on the client.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}

/// Rejection for guarded routes hit without a live session: straight to the login
/// page, before any store access. The JSON routes get the same redirect as the HTML
/// ones, matching how the original gate behaved.
pub struct AuthRedirect;

impl IntoResponse for AuthRedirect {
    fn into_response(self) -> Response {
        Redirect::to("/login").into_response()
    }
}

#[async_trait]
impl FromRequestParts<Arc<SharedData>> for AuthSession {
    type Rejection = AuthRedirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<SharedData>,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers).ok_or(AuthRedirect)?;
        state.sessions.lookup(token).ok_or(AuthRedirect)
    }
}
