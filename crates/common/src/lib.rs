//! Common types shared across `thruster` crates: the handler error taxonomy and
//! the JSON bodies written on the wire.

pub mod error;
pub mod protocol;

pub use error::HandlerError;
pub use protocol::ErrorResponse;
