//! Tracing subscriber setup.
//!
//! Structured JSON logs on stdout. `RUST_LOG` wins over the configured level.

use tracing_subscriber::EnvFilter;

use crate::error::ServerError;

/// Install the global JSON tracing subscriber at `log_level`.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been set.
pub fn init(log_level: &str) -> Result<(), ServerError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| ServerError::Config(format!("failed to initialise tracing subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_a_config_error() {
        // Only the first call in the process can install the subscriber.
        let _ = init("warn");
        let err = init("info").unwrap_err();
        assert!(matches!(err, ServerError::Config(_)), "{err}");
    }
}
