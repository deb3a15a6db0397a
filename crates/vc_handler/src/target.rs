use alloc::string::String;

use vc_meta::{TypeKey, TypeUniverse};

use crate::HandlerError;

// -----------------------------------------------------------------------------
// HandlerTarget

/// The types a handler registration applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerTarget {
    /// Exactly this type.
    Exact(TypeKey),
    /// Every closed instance of this generic definition.
    Generic(TypeKey),
    /// Every array type.
    Array,
    /// This type and every type deriving from or implementing it.
    ///
    /// A generic definition matches bases that are instances of it.
    Inherited(TypeKey),
}

impl HandlerTarget {
    /// Checks that the target makes sense in `universe`.
    pub(crate) fn validate(
        self,
        universe: &TypeUniverse,
        handler: &str,
    ) -> Result<(), HandlerError> {
        let invalid = |reason| HandlerError::InvalidTarget {
            handler: String::from(handler),
            reason,
        };
        match self {
            Self::Generic(ty) if !universe.is_generic_definition(ty) => {
                Err(invalid("generic target is not a generic definition"))
            }
            Self::Exact(ty) if universe.is_generic_definition(ty) => {
                Err(invalid("exact target is an open generic definition"))
            }
            _ => Ok(()),
        }
    }
}

// -----------------------------------------------------------------------------
// NamedTarget

/// A [`HandlerTarget`] naming its type, for static registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedTarget {
    Exact(&'static str),
    Generic(&'static str),
    Array,
    Inherited(&'static str),
}

impl NamedTarget {
    /// Looks the named type up in `universe`.
    pub fn resolve(
        self,
        universe: &TypeUniverse,
        handler: &str,
    ) -> Result<HandlerTarget, HandlerError> {
        let lookup = |name: &str| {
            universe.lookup(name).ok_or_else(|| HandlerError::UnknownType {
                handler: String::from(handler),
                ty: String::from(name),
            })
        };
        Ok(match self {
            Self::Exact(name) => HandlerTarget::Exact(lookup(name)?),
            Self::Generic(name) => HandlerTarget::Generic(lookup(name)?),
            Self::Array => HandlerTarget::Array,
            Self::Inherited(name) => HandlerTarget::Inherited(lookup(name)?),
        })
    }
}
