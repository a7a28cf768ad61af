//! Setup and listener errors.
//!
//! Handler failures never show up here: they are translated into HTTP
//! responses (see [`common::HandlerError`]). Everything in [`ServerError`]
//! stops the server from starting or keeps it from serving.

use thiserror::Error;

/// Errors returned by configuration loading, route registration and
/// [`crate::Server::run`].
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration could not be loaded, failed validation, or TLS material
    /// could not be materialised.
    #[error("configuration error: {0}")]
    Config(String),

    /// The listener could not bind the configured address.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Certificate or key could not be read or parsed, or rustls rejected them.
    #[error("TLS setup failed: {0}")]
    Tls(String),

    /// A route was registered with a verb other than GET, POST, PUT or DELETE.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// The serve loop stopped with an I/O error.
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_error_names_the_address() {
        let e = ServerError::Bind {
            addr: "localhost:80".into(),
            source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
        };
        assert!(e.to_string().contains("localhost:80"));
        assert!(std::error::Error::source(&e).is_some());
    }

    #[test]
    fn unsupported_method_keeps_the_verb() {
        let e = ServerError::UnsupportedMethod("PATCH".into());
        assert_eq!(e.to_string(), "unsupported HTTP method: PATCH");
    }
}
