use alloc::string::String;

use thiserror::Error;
use vc_handler::HandlerError;
use vc_meta::{AccessError, MetaError};

// -----------------------------------------------------------------------------
// SerializeError

/// Failures of turning one member value into a token or back.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum SerializeError {
    #[error("Malformed token: {0}")]
    Json(String),

    #[error("Expected {expected} for `{ty}`")]
    UnexpectedToken { ty: String, expected: &'static str },

    #[error("Stored type `{found}` is not assignable to `{expected}`")]
    NotAssignable { expected: String, found: String },

    #[error("External reference #{0} is missing from the reference store")]
    MissingReference(usize),

    #[error("Object of type `{0}` is reachable from itself")]
    Cycle(String),

    #[error(transparent)]
    Meta(#[from] MetaError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Handler(#[from] HandlerError),
}

#[cfg(feature = "json")]
impl From<serde_json::Error> for SerializeError {
    #[inline]
    fn from(e: serde_json::Error) -> Self {
        use alloc::string::ToString;
        Self::Json(e.to_string())
    }
}
