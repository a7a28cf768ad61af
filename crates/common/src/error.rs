//! Error type returned by JSON-convention handlers.

use thiserror::Error;

/// Application error produced by a handler.
///
/// The set is closed on purpose: the response translator only needs to know
/// whether a failure means "not found" or anything else.
/// - [`HandlerError::NotFound`] → 404
/// - [`HandlerError::Generic`] → 500
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// The addressed entity does not exist.
    #[error("not found")]
    NotFound,

    /// Any other application failure. The message is sent to the caller.
    #[error("{0}")]
    Generic(String),
}

impl HandlerError {
    /// Build a [`HandlerError::Generic`] from anything printable.
    pub fn generic(message: impl std::fmt::Display) -> Self {
        HandlerError::Generic(message.to_string())
    }

    /// Returns `true` for [`HandlerError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, HandlerError::NotFound)
    }

    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            HandlerError::NotFound => 404,
            HandlerError::Generic(_) => 500,
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::generic(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_codes() {
        assert_eq!(HandlerError::NotFound.http_status(), 404);
        assert_eq!(HandlerError::generic("failed").http_status(), 500);
    }

    #[test]
    fn not_found_is_matched_by_kind() {
        let a = HandlerError::NotFound;
        let b = HandlerError::NotFound;
        assert!(a.is_not_found());
        assert_eq!(a, b);
        assert!(!HandlerError::generic("not found").is_not_found());
    }

    #[test]
    fn generic_display_is_the_bare_message() {
        let e = HandlerError::generic("database unreachable");
        assert_eq!(e.to_string(), "database unreachable");
    }

    #[test]
    fn json_errors_become_generic() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e: HandlerError = err.into();
        assert_eq!(e.http_status(), 500);
    }
}
