//! CRUD controllers and their five conventional routes.
//!
//! | Operation | Method | Path        |
//! |-----------|--------|-------------|
//! | Index     | GET    | `path`      |
//! | Show      | GET    | `path/:id`  |
//! | Create    | POST   | `path`      |
//! | Update    | PUT    | `path/:id`  |
//! | Destroy   | DELETE | `path/:id`  |
//!
//! Pick the convention by the binder you call: [`Server::add_json_resource`]
//! for [`JsonController`]s, [`Server::add_resource`] for [`Controller`]s.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{extract::Request, response::Response};
use common::HandlerError;
use serde::Serialize;

use super::{context::Context, method::Method, Server};

/// A resource whose operations return data; responses are built by the JSON
/// translator.
///
/// Every operation shares one payload type. Controllers that return
/// different shapes per operation can use `serde_json::Value` or an
/// untagged enum.
#[cfg_attr(test, mockall::automock(type Output = serde_json::Value;))]
#[async_trait]
pub trait JsonController: Send + Sync + 'static {
    type Output: Serialize + Send + 'static;

    async fn index(&self, ctx: Context) -> Result<Self::Output, HandlerError>;
    async fn show(&self, ctx: Context) -> Result<Self::Output, HandlerError>;
    async fn create(&self, ctx: Context) -> Result<Self::Output, HandlerError>;
    async fn update(&self, ctx: Context) -> Result<Self::Output, HandlerError>;
    async fn destroy(&self, ctx: Context) -> Result<Self::Output, HandlerError>;
}

/// A resource whose operations write the whole response themselves.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Controller: Send + Sync + 'static {
    async fn index(&self, req: Request) -> Response;
    async fn show(&self, req: Request) -> Response;
    async fn create(&self, req: Request) -> Response;
    async fn update(&self, req: Request) -> Response;
    async fn destroy(&self, req: Request) -> Response;
}

/// `(collection, member)` paths for a resource mounted at `path`.
fn resource_paths(path: &str) -> (String, String) {
    let collection = match path.trim_end_matches('/') {
        "" => "/".to_owned(),
        trimmed => trimmed.to_owned(),
    };
    let member = format!("{}/:id", collection.trim_end_matches('/'));
    (collection, member)
}

impl Server {
    /// Register all five routes of `controller` under `path`, translating
    /// results with the JSON convention.
    pub fn add_json_resource<C: JsonController>(&mut self, path: &str, controller: C) -> &mut Self {
        let (collection, member) = resource_paths(path);
        let controller = Arc::new(controller);

        let c = controller.clone();
        self.json_route(Method::Get, &collection, move |ctx| {
            let c = c.clone();
            async move { c.index(ctx).await }
        });
        let c = controller.clone();
        self.json_route(Method::Get, &member, move |ctx| {
            let c = c.clone();
            async move { c.show(ctx).await }
        });
        let c = controller.clone();
        self.json_route(Method::Post, &collection, move |ctx| {
            let c = c.clone();
            async move { c.create(ctx).await }
        });
        let c = controller.clone();
        self.json_route(Method::Put, &member, move |ctx| {
            let c = c.clone();
            async move { c.update(ctx).await }
        });
        let c = controller;
        self.json_route(Method::Delete, &member, move |ctx| {
            let c = c.clone();
            async move { c.destroy(ctx).await }
        })
    }

    /// Register all five routes of `controller` under `path`; the controller
    /// builds each response itself.
    pub fn add_resource<C: Controller>(&mut self, path: &str, controller: C) -> &mut Self {
        let (collection, member) = resource_paths(path);
        let controller = Arc::new(controller);

        let c = controller.clone();
        self.route(Method::Get, &collection, move |req: Request| async move { c.index(req).await });
        let c = controller.clone();
        self.route(Method::Get, &member, move |req: Request| async move { c.show(req).await });
        let c = controller.clone();
        self.route(Method::Post, &collection, move |req: Request| async move { c.create(req).await });
        let c = controller.clone();
        self.route(Method::Put, &member, move |req: Request| async move { c.update(req).await });
        let c = controller;
        self.route(Method::Delete, &member, move |req: Request| async move { c.destroy(req).await })
    }
}
