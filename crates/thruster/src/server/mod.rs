//! The [`Server`]: route registration during setup, then [`Server::run`].
//!
//! # Responsibilities
//! - Register handlers on the route group, gated by Basic Auth when
//!   credentials are configured.
//! - Translate JSON-convention handler results into responses.
//! - Bind CRUD controllers to their five conventional routes.
//! - Resolve TLS material and serve plaintext or TLS.
//!
//! Setup happens through `&mut self`; [`Server::run`] consumes the server, so
//! nothing can be registered once serving has begun.

pub mod auth;
pub mod certificate;
pub mod context;
pub mod method;
pub mod resource;
pub mod respond;
pub mod router;
pub mod tls;

use std::future::Future;

use axum::{
    handler::Handler,
    routing::on,
    Router,
};
use common::HandlerError;
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::{config::Config, error::ServerError};

use self::{auth::AuthGate, certificate::TlsMaterial, context::Context, method::Method};

/// Route table plus configuration.
#[derive(Debug)]
pub struct Server {
    config: Config,
    base: Router,
    routes: Router,
    route_count: usize,
    gate: Option<AuthGate>,
}

impl Server {
    /// Create a server with a fresh, empty router.
    pub fn new(config: Config) -> Self {
        Self::with_router(config, Router::new())
    }

    /// Create a server on top of an existing router.
    ///
    /// Routes already on `router` are served as they are, without the Basic
    /// Auth gate. Only routes registered through this server are gated.
    pub fn with_router(config: Config, router: Router) -> Self {
        let gate = AuthGate::from_credentials(&config.http_auth);
        debug!(gated = gate.is_some(), "server created");
        Self {
            config,
            base: router,
            routes: Router::new(),
            route_count: 0,
            gate,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Register a framework-native handler: it builds the whole response itself.
    ///
    /// # Panics
    ///
    /// Panics if the same method is registered twice for `path`.
    pub fn route<H, T>(&mut self, method: Method, path: &str, handler: H) -> &mut Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        debug!(%method, path, "registering route");
        let routes = std::mem::take(&mut self.routes);
        self.routes = routes.route(path, on(method.filter(), handler));
        self.route_count += 1;
        self
    }

    /// Register a framework-native handler for a verb given as a string.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::UnsupportedMethod`] for anything other than
    /// GET, POST, PUT or DELETE (case-insensitive). Nothing is registered.
    pub fn add_handler<H, T>(&mut self, method: &str, path: &str, handler: H) -> Result<&mut Self, ServerError>
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        let method: Method = method.parse()?;
        Ok(self.route(method, path, handler))
    }

    /// Register a JSON-convention handler.
    ///
    /// `Ok(payload)` is sent as JSON with `201` for POST and `200` otherwise;
    /// errors become `404`/`500` with `{"error": "<message>"}`.
    pub fn json_route<F, Fut, P>(&mut self, method: Method, path: &str, handler: F) -> &mut Self
    where
        F: Fn(Context) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<P, HandlerError>> + Send + 'static,
        P: Serialize + 'static,
    {
        self.route(method, path, move |ctx: Context| async move {
            respond::translate(method, handler(ctx).await)
        })
    }

    /// [`Server::json_route`] for a verb given as a string.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::UnsupportedMethod`] for unsupported verbs.
    pub fn add_json_handler<F, Fut, P>(
        &mut self,
        method: &str,
        path: &str,
        handler: F,
    ) -> Result<&mut Self, ServerError>
    where
        F: Fn(Context) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<P, HandlerError>> + Send + 'static,
        P: Serialize + 'static,
    {
        let method: Method = method.parse()?;
        Ok(self.json_route(method, path, handler))
    }

    /// The router as it would be served: registered group (gated when
    /// credentials exist) merged with the base router, with request tracing.
    pub fn router(&self) -> Router {
        router::build(
            self.base.clone(),
            self.routes.clone(),
            self.gate.clone(),
            self.route_count,
        )
    }

    /// Bind `hostname:port` and serve until the listener fails.
    ///
    /// TLS material is resolved before the socket is bound.
    ///
    /// # Errors
    ///
    /// [`ServerError::Config`] for unusable TLS configuration,
    /// [`ServerError::Bind`] if the address cannot be bound,
    /// [`ServerError::Tls`] if certificate or key cannot be loaded,
    /// [`ServerError::Io`] if serving stops.
    pub async fn run(self) -> Result<(), ServerError> {
        let material = self.tls_material()?;
        let addr = self.config.address();
        let listener = match TcpListener::bind(&addr).await {
            Ok(listener) => listener,
            Err(source) => return Err(ServerError::Bind { addr, source }),
        };
        self.serve(listener, material).await
    }

    /// Serve on an already bound listener. `hostname` and `port` are ignored.
    ///
    /// # Errors
    ///
    /// Same as [`Server::run`], minus [`ServerError::Bind`].
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), ServerError> {
        let material = self.tls_material()?;
        self.serve(listener, material).await
    }

    fn tls_material(&self) -> Result<Option<TlsMaterial>, ServerError> {
        if !self.config.tls {
            return Ok(None);
        }
        TlsMaterial::resolve(self.config.certificate.as_ref(), self.config.public_key.as_ref()).map(Some)
    }

    async fn serve(self, listener: TcpListener, material: Option<TlsMaterial>) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        let router = self.router();

        match material {
            None => {
                info!(%addr, tls = false, routes = self.route_count, "listening");
                axum::serve(listener, router).await?;
                Ok(())
            }
            // `material` stays alive for as long as we serve so that inline
            // PEM files are only removed on shutdown.
            Some(material) => {
                let tls_config = tls::load_server_config(material.certificate.path(), material.key.path())?;
                info!(%addr, tls = true, routes = self.route_count, "listening");
                tls::serve(listener, tls_config, router).await
            }
        }
    }
}
