//! `thruster`: REST conventions on top of axum.
//!
//! - [`Server::add_json_resource`] / [`Server::add_resource`] map a CRUD
//!   controller onto five routes.
//! - JSON handlers return `Result<payload, HandlerError>`; the payload is sent
//!   with `200`/`201`, errors with `404`/`500` and `{"error": "<message>"}`.
//! - Configured Basic-Auth credentials gate every registered route.
//! - [`Server::run`] serves plaintext or TLS, with certificate and key given
//!   as file paths or inline PEM.
//!
//! ```no_run
//! use thruster::{Config, Credential, HandlerError, Method, Server};
//!
//! # async fn demo() -> Result<(), thruster::ServerError> {
//! let config = Config {
//!     http_auth: vec![Credential::new("admin", "12345")],
//!     ..Config::default()
//! };
//! let mut server = Server::new(config);
//! server.route(Method::Get, "/test", || async { "OK" });
//! server.json_route(Method::Get, "/answer", |_ctx| async { Ok::<_, HandlerError>(42) });
//! server.run().await
//! # }
//! ```

pub mod config;
pub mod error;
pub mod server;
pub mod telemetry;

pub use common::{ErrorResponse, HandlerError};
pub use config::{CertSource, Config, Credential};
pub use error::ServerError;
pub use server::{
    context::Context,
    method::Method,
    resource::{Controller, JsonController},
    Server,
};
