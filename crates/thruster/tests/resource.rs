//! End-to-end routing of a JSON resource backed by an in-memory store.

use std::{
    collections::BTreeMap,
    sync::atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
use axum_test::TestServer;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thruster::{Config, Context, Credential, HandlerError, JsonController, Server};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct User {
    #[serde(default)]
    id: u64,
    name: String,
}

#[derive(Default)]
struct Users {
    next_id: AtomicU64,
    rows: RwLock<BTreeMap<u64, User>>,
}

fn parse_id(ctx: &Context) -> Result<u64, HandlerError> {
    ctx.id()
        .and_then(|id| id.parse().ok())
        .ok_or(HandlerError::NotFound)
}

#[async_trait]
impl JsonController for Users {
    type Output = Value;

    async fn index(&self, _ctx: Context) -> Result<Value, HandlerError> {
        let rows = self.rows.read().await;
        Ok(serde_json::to_value(rows.values().collect::<Vec<_>>())?)
    }

    async fn show(&self, ctx: Context) -> Result<Value, HandlerError> {
        let id = parse_id(&ctx)?;
        let rows = self.rows.read().await;
        let user = rows.get(&id).ok_or(HandlerError::NotFound)?;
        Ok(serde_json::to_value(user)?)
    }

    async fn create(&self, ctx: Context) -> Result<Value, HandlerError> {
        let mut user: User = ctx.json()?;
        user.id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.rows.write().await.insert(user.id, user.clone());
        Ok(serde_json::to_value(user)?)
    }

    async fn update(&self, ctx: Context) -> Result<Value, HandlerError> {
        let id = parse_id(&ctx)?;
        let mut user: User = ctx.json()?;
        user.id = id;
        let mut rows = self.rows.write().await;
        let slot = rows.get_mut(&id).ok_or(HandlerError::NotFound)?;
        *slot = user.clone();
        Ok(serde_json::to_value(user)?)
    }

    async fn destroy(&self, ctx: Context) -> Result<Value, HandlerError> {
        let id = parse_id(&ctx)?;
        let user = self
            .rows
            .write()
            .await
            .remove(&id)
            .ok_or(HandlerError::NotFound)?;
        Ok(serde_json::to_value(user)?)
    }
}

fn test_server(config: Config) -> TestServer {
    let mut server = Server::new(config);
    server.add_json_resource("/users", Users::default());
    TestServer::new(server.router()).unwrap()
}

#[tokio::test]
async fn crud_lifecycle() {
    let server = test_server(Config::default());

    let created = server.post("/users").json(&json!({"name": "ada"})).await;
    assert_eq!(created.status_code(), StatusCode::CREATED);
    assert_eq!(created.json::<Value>(), json!({"id": 1, "name": "ada"}));

    let listed = server.get("/users").await;
    assert_eq!(listed.status_code(), StatusCode::OK);
    assert_eq!(listed.json::<Value>(), json!([{"id": 1, "name": "ada"}]));

    let shown = server.get("/users/1").await;
    assert_eq!(shown.status_code(), StatusCode::OK);
    assert_eq!(shown.json::<Value>()["name"], "ada");

    let updated = server.put("/users/1").json(&json!({"name": "grace"})).await;
    assert_eq!(updated.status_code(), StatusCode::OK);
    assert_eq!(updated.json::<Value>(), json!({"id": 1, "name": "grace"}));

    let destroyed = server.delete("/users/1").await;
    assert_eq!(destroyed.status_code(), StatusCode::OK);

    let gone = server.get("/users/1").await;
    assert_eq!(gone.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(gone.json::<Value>(), json!({"error": "not found"}));
}

#[tokio::test]
async fn missing_members_are_404_for_every_member_route() {
    let server = test_server(Config::default());

    assert_eq!(server.get("/users/42").await.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(
        server
            .put("/users/42")
            .json(&json!({"name": "x"}))
            .await
            .status_code(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(server.delete("/users/42").await.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn undecodable_body_is_a_500_with_message() {
    let server = test_server(Config::default());

    let resp = server.post("/users").text("not json").await;
    assert_eq!(resp.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = resp.json::<Value>();
    assert!(body["error"].as_str().is_some_and(|m| !m.is_empty()), "{body}");
}

#[tokio::test]
async fn resource_routes_are_gated() {
    let server = test_server(Config {
        http_auth: vec![Credential::new("admin", "12345")],
        ..Config::default()
    });

    assert_eq!(server.get("/users").await.status_code(), StatusCode::UNAUTHORIZED);

    let wrong = HeaderValue::from_str(&format!("Basic {}", STANDARD.encode("admin:wrong"))).unwrap();
    let resp = server.get("/users").add_header(AUTHORIZATION, wrong).await;
    assert_eq!(resp.status_code(), StatusCode::UNAUTHORIZED);

    let right = HeaderValue::from_str(&format!("Basic {}", STANDARD.encode("admin:12345"))).unwrap();
    let resp = server.get("/users").add_header(AUTHORIZATION, right).await;
    assert_eq!(resp.status_code(), StatusCode::OK);
    assert_eq!(resp.json::<Value>(), json!([]));
}
