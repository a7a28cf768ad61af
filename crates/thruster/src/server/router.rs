//! Final router assembly.

use std::any::Any;

use axum::{http::StatusCode, middleware, response::Response, Router};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::error;

use super::{
    auth::{require_basic_auth, AuthGate},
    respond::json_error,
};

/// Assemble the router served by [`super::Server`].
///
/// `routes` is the registered group. When a gate is present it is applied
/// with `route_layer`, so only matched routes answer 401 and unknown paths
/// keep the engine's own 404. `base` routes are merged in ungated.
///
/// A panicking handler is answered with `500 {"error": "internal server error"}`
/// instead of dropping the connection.
pub(crate) fn build(base: Router, routes: Router, gate: Option<AuthGate>, route_count: usize) -> Router {
    let group = match gate {
        // `route_layer` on an empty router panics.
        Some(gate) if route_count > 0 => {
            routes.route_layer(middleware::from_fn_with_state(gate, require_basic_auth))
        }
        _ => routes,
    };

    base.merge(group)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    error!(panic = %detail, "handler panicked");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credential;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::get,
    };
    use tower::ServiceExt;

    fn gate() -> Option<AuthGate> {
        AuthGate::from_credentials(&[Credential::new("admin", "12345")])
    }

    #[tokio::test]
    async fn unknown_route_returns_404_even_when_gated() {
        let routes = Router::new().route("/test", get(|| async { "OK" }));
        let app = build(Router::new(), routes, gate(), 1);
        let req = Request::builder()
            .uri("/unknown")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn base_routes_stay_open() {
        let base = Router::new().route("/health", get(|| async { "up" }));
        let routes = Router::new().route("/test", get(|| async { "OK" }));
        let app = build(base, routes, gate(), 1);

        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        assert_eq!(app.clone().oneshot(req).await.unwrap().status(), StatusCode::OK);

        let req = Request::builder().uri("/test").body(Body::empty()).unwrap();
        assert_eq!(app.oneshot(req).await.unwrap().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn panicking_handler_is_answered_with_500() {
        let routes = Router::new().route("/boom", get(|| async {
            #[allow(unreachable_code)]
            {
                panic!("boom");
                ()
            }
        }));
        let app = build(Router::new(), routes, None, 1);

        let req = Request::builder().uri("/boom").body(Body::empty()).unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], br#"{"error":"internal server error"}"#);

        // The router keeps serving afterwards.
        let req = Request::builder().uri("/boom").body(Body::empty()).unwrap();
        assert_eq!(
            app.oneshot(req).await.unwrap().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn empty_gated_group_does_not_panic() {
        let app = build(Router::new(), Router::new(), gate(), 0);
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        assert_eq!(app.oneshot(req).await.unwrap().status(), StatusCode::NOT_FOUND);
    }
}
