//! Response translation for JSON-convention handlers.
//!
//! This is the only place where a [`HandlerError`] becomes a status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use common::{ErrorResponse, HandlerError};
use serde::Serialize;
use tracing::warn;

use super::method::Method;

/// Turn a handler result into a response.
///
/// `Ok` payloads are serialised as-is with [`Method::ok_status`]. Errors go
/// through [`error_response`].
pub fn translate<T: Serialize>(method: Method, result: Result<T, HandlerError>) -> Response {
    match result {
        Ok(payload) => (method.ok_status(), Json(payload)).into_response(),
        Err(err) => error_response(&err),
    }
}

/// `404` for [`HandlerError::NotFound`], `500` for anything else, with body
/// `{"error": "<message>"}`.
pub fn error_response(err: &HandlerError) -> Response {
    let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        warn!(error = %err, "handler failed");
    }
    json_error(status, err.to_string())
}

pub(crate) fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    async fn body_json(resp: Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn get_success_is_200_with_payload() {
        let resp = translate(Method::Get, Ok(json!({"key": "value"})));
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({"key": "value"}));
    }

    #[tokio::test]
    async fn post_success_is_201() {
        let resp = translate(Method::Post, Ok("created"));
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(body_json(resp).await, json!("created"));
    }

    #[tokio::test]
    async fn put_and_delete_success_are_200() {
        assert_eq!(translate(Method::Put, Ok(1)).status(), StatusCode::OK);
        assert_eq!(translate(Method::Delete, Ok(())).status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn not_found_is_404_even_for_post() {
        let resp = translate::<Value>(Method::Post, Err(HandlerError::NotFound));
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(resp).await, json!({"error": "not found"}));
    }

    #[tokio::test]
    async fn other_errors_are_500_with_handler_message() {
        let resp = translate::<Value>(Method::Get, Err(HandlerError::generic("failed")));
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(resp).await, json!({"error": "failed"}));
    }
}
