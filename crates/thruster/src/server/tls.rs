//! TLS listener setup using rustls.
//!
//! The certificate and key are read from the files produced by
//! [`super::certificate`], turned into a `rustls::ServerConfig`, and each
//! accepted TCP connection is handshaken and served on its own task.

use std::{io::BufReader, path::Path, sync::Arc};

use axum::{extract::Request, Router};
use hyper::body::Incoming;
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto,
};
use rustls::ServerConfig;
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::TlsAcceptor;
use tower::ServiceExt;
use tracing::{debug, error, info, warn};

use crate::error::ServerError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Build a [`rustls::ServerConfig`] from PEM-encoded certificate and private key bytes.
///
/// # Errors
///
/// Returns [`ServerError::Tls`] if the certificate or key cannot be parsed, or
/// if rustls rejects the configuration.
pub fn build_server_config(cert_pem: &[u8], key_pem: &[u8]) -> Result<Arc<ServerConfig>, ServerError> {
    let certs = rustls_pemfile::certs(&mut BufReader::new(cert_pem))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ServerError::Tls(format!("failed to parse TLS certificate chain: {e}")))?;
    if certs.is_empty() {
        return Err(ServerError::Tls("no certificate found in PEM data".into()));
    }

    let key = rustls_pemfile::private_key(&mut BufReader::new(key_pem))
        .map_err(|e| ServerError::Tls(format!("failed to read TLS private key: {e}")))?
        .ok_or_else(|| ServerError::Tls("no private key found in PEM data".into()))?;

    let mut config = ServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
        .with_safe_default_protocol_versions()
        .map_err(|e| ServerError::Tls(format!("unsupported protocol versions: {e}")))?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .map_err(|e| ServerError::Tls(format!("failed to build rustls ServerConfig: {e}")))?;
    config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(Arc::new(config))
}

/// Read the certificate and key files and build the server config.
///
/// A missing or unreadable file is a listener-start error.
pub fn load_server_config(cert_path: &Path, key_path: &Path) -> Result<Arc<ServerConfig>, ServerError> {
    let cert_pem = std::fs::read(cert_path).map_err(|e| {
        ServerError::Tls(format!("failed to read certificate {}: {e}", cert_path.display()))
    })?;
    let key_pem = std::fs::read(key_path).map_err(|e| {
        ServerError::Tls(format!("failed to read private key {}: {e}", key_path.display()))
    })?;
    build_server_config(&cert_pem, &key_pem)
}

/// Accept loop: handshake each TCP connection and serve `router` over it.
///
/// Runs until the process is killed. Failed handshakes and broken connections
/// are logged and dropped; they never stop the loop.
pub async fn serve(listener: TcpListener, config: Arc<ServerConfig>, router: Router) -> Result<(), ServerError> {
    let acceptor = TlsAcceptor::from(config);
    info!(addr = %listener.local_addr()?, "TLS listener ready");

    loop {
        match listener.accept().await {
            Ok((tcp_stream, peer_addr)) => {
                debug!(%peer_addr, "accepted TCP connection");
                let acceptor = acceptor.clone();
                let router = router.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(tcp_stream, acceptor, router).await {
                        warn!(%peer_addr, error = %e, "connection error");
                    }
                });
            }
            Err(e) => {
                error!(error = %e, "accept error");
            }
        }
    }
}

/// Handle a single TLS connection.
async fn handle_connection(tcp: TcpStream, acceptor: TlsAcceptor, router: Router) -> Result<(), BoxError> {
    let stream = acceptor.accept(tcp).await?;
    debug!("TLS handshake complete");

    let service = hyper::service::service_fn(move |req: Request<Incoming>| router.clone().oneshot(req));

    auto::Builder::new(TokioExecutor::new())
        .serve_connection_with_upgrades(TokioIo::new(stream), service)
        .await
}
