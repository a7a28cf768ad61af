//! Request context handed to JSON-convention handlers.

use std::collections::HashMap;

use async_trait::async_trait;
use axum::{
    extract::{rejection::PathRejection, FromRequest, FromRequestParts, Path, Query, Request},
    http::{HeaderMap, Method as HttpMethod, StatusCode, Uri},
    response::Response,
};
use bytes::Bytes;
use common::HandlerError;
use serde::de::DeserializeOwned;

use super::respond::json_error;

/// Largest request body read into a [`Context`].
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Everything a JSON handler can see about the request: method, URI, headers,
/// path parameters and the fully buffered body.
#[derive(Debug, Clone)]
pub struct Context {
    method: HttpMethod,
    uri: Uri,
    headers: HeaderMap,
    params: HashMap<String, String>,
    body: Bytes,
}

impl Context {
    pub fn method(&self) -> &HttpMethod {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Value of the named path parameter, e.g. `param("id")` on `/users/:id`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// The `:id` parameter of per-item resource routes.
    pub fn id(&self) -> Option<&str> {
        self.param("id")
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Generic`] if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Decode the query string.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Generic`] if the query string does not match `T`.
    pub fn query<T: DeserializeOwned>(&self) -> Result<T, HandlerError> {
        Query::try_from_uri(&self.uri)
            .map(|Query(q)| q)
            .map_err(|e| HandlerError::generic(e.body_text()))
    }
}

#[async_trait]
impl<S> FromRequest<S> for Context
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();

        let params = match Path::<HashMap<String, String>>::from_request_parts(&mut parts, state)
            .await
        {
            Ok(Path(params)) => params,
            Err(PathRejection::MissingPathParams(_)) => HashMap::new(),
            Err(rejection) => return Err(json_error(StatusCode::BAD_REQUEST, rejection.body_text())),
        };

        let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|e| json_error(StatusCode::BAD_REQUEST, format!("failed to read request body: {e}")))?;

        Ok(Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            params,
            body,
        })
    }
}
