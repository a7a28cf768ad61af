//! Bodies written on the wire by the response translator.

use serde::{Deserialize, Serialize};

use crate::error::HandlerError;

/// Error body returned on any translated handler failure.
///
/// Serialises to exactly `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error message, taken verbatim from the handler error.
    pub error: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl From<&HandlerError> for ErrorResponse {
    fn from(err: &HandlerError) -> Self {
        Self::new(err.to_string())
    }
}
