use alloc::string::String;

use thiserror::Error;

// -----------------------------------------------------------------------------
// MetaError

/// Failures of type definition, resolution and instance creation.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum MetaError {
    #[error("Type `{0}` is not defined in the universe")]
    UnknownType(String),

    #[error("Type `{0}` has already been defined")]
    DuplicateType(String),

    #[error("Type `{0}` is not a generic definition")]
    NotGeneric(String),

    #[error("Generic `{name}` expects {expected} type arguments, found {found}")]
    GenericArity {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Generic parameter {0} used outside of a generic definition")]
    UnboundParameter(usize),

    #[error("Unable to create an instance of `{name}`: {reason}")]
    NotCreatable { name: String, reason: &'static str },

    #[error("Unable to create an instance of `{0}`; there is no default constructor")]
    NoDefaultConstructor(String),

    #[error("Constructor of `{name}` failed when creating an instance: {message}")]
    ConstructorFailed { name: String, message: String },
}

// -----------------------------------------------------------------------------
// AccessError

/// Failures of reading or writing one member of one instance.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum AccessError {
    #[error("Member `{0}` cannot be read")]
    NotReadable(String),

    #[error("Member `{0}` cannot be written")]
    NotWritable(String),

    #[error("Member `{member}` of type `{expected}` cannot hold the given value")]
    TypeMismatch { member: String, expected: String },

    #[error("Member `{member}` cannot be accessed on a non-object value")]
    NotAnObject { member: String },

    #[error("Getter of `{member}` failed: {message}")]
    Getter { member: String, message: String },

    #[error("Setter of `{member}` failed: {message}")]
    Setter { member: String, message: String },
}

// -----------------------------------------------------------------------------
// InvokeError

/// Failures of invoking an inspected method.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum InvokeError {
    #[error("Method `{method}` expects {expected} arguments, found {found}")]
    ArgumentCount {
        method: String,
        expected: usize,
        found: usize,
    },

    #[error("Argument {index} of method `{method}` has the wrong type")]
    ArgumentType { method: String, index: usize },

    #[error("Method `{method}` cannot be invoked on a non-object value")]
    NotAnObject { method: String },

    #[error("Method `{method}` failed: {message}")]
    Body { method: String, message: String },
}
