use alloc::string::String;

use thiserror::Error;

// -----------------------------------------------------------------------------
// HandlerError

/// Failures of handler registration and resolution.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum HandlerError {
    #[error("No handler can act on `{0}`")]
    Unsupported(String),

    #[error("Handler `{handler}` failed to construct: {message}")]
    Construction { handler: String, message: String },

    #[error("Handler `{handler}` targets unknown type `{ty}`")]
    UnknownType { handler: String, ty: String },

    #[error("Handler `{handler}` has an invalid target: {reason}")]
    InvalidTarget {
        handler: String,
        reason: &'static str,
    },

    #[error("Handler `{0}` is mapped as a decorator but is not one")]
    NotADecorator(String),

    #[error("Attribute `{0}` is already mapped to a decorator")]
    DuplicateDecorator(String),
}
