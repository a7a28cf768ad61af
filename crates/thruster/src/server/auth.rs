//! HTTP Basic Authentication for the registered route group.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Request, State},
    http::{
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        HeaderMap, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Credential;

/// Value of the `WWW-Authenticate` header sent with every 401.
pub const CHALLENGE: &str = "Basic realm=\"Authorization Required\"";

/// Why a request was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthRejection {
    #[error("missing Authorization header")]
    MissingHeader,

    #[error("malformed Basic credentials")]
    Malformed,

    #[error("unknown user")]
    UnknownUser,

    #[error("password mismatch")]
    WrongPassword,
}

/// Username → password lookup built once from the configured credentials.
#[derive(Clone, Debug)]
pub struct AuthGate {
    accounts: Arc<HashMap<String, String>>,
}

impl AuthGate {
    /// `None` when no credentials are configured: the route group is open.
    ///
    /// Duplicate usernames keep the last password.
    pub fn from_credentials(credentials: &[Credential]) -> Option<Self> {
        if credentials.is_empty() {
            return None;
        }
        let accounts = credentials
            .iter()
            .map(|c| (c.username.clone(), c.password.clone()))
            .collect();
        Some(Self {
            accounts: Arc::new(accounts),
        })
    }

    /// Check the request headers, returning the authenticated username.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<String, AuthRejection> {
        let (username, password) = extract_basic(headers)?;
        match self.accounts.get(&username) {
            None => Err(AuthRejection::UnknownUser),
            Some(expected) if *expected != password => Err(AuthRejection::WrongPassword),
            Some(_) => Ok(username),
        }
    }
}

/// Middleware: pass authorised requests through untouched, answer the rest
/// with `401` before the handler runs.
pub async fn require_basic_auth(State(gate): State<AuthGate>, req: Request, next: Next) -> Response {
    match gate.authorize(req.headers()) {
        Ok(username) => {
            debug!(%username, path = %req.uri().path(), "basic auth accepted");
            next.run(req).await
        }
        Err(reason) => {
            warn!(%reason, path = %req.uri().path(), "basic auth rejected");
            unauthorized()
        }
    }
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, [(WWW_AUTHENTICATE, CHALLENGE)]).into_response()
}

fn extract_basic(headers: &HeaderMap) -> Result<(String, String), AuthRejection> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthRejection::MissingHeader)?;

    let header = header.to_str().map_err(|_| AuthRejection::Malformed)?;

    let (scheme, encoded) = header
        .trim()
        .split_once(' ')
        .ok_or(AuthRejection::Malformed)?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(AuthRejection::Malformed);
    }

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| AuthRejection::Malformed)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthRejection::Malformed)?;

    // Passwords may contain ':'; usernames may not.
    let (username, password) = decoded.split_once(':').ok_or(AuthRejection::Malformed)?;
    Ok((username.to_owned(), password.to_owned()))
}
