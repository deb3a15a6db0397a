use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use crate::universe::TypeKey;

// -----------------------------------------------------------------------------
// TypeRef

/// An unresolved reference to a type, used inside definitions.
///
/// References by name are resolved when the universe is queried, so a
/// type may refer to itself or to types defined after it.
///
/// # Examples
///
/// ```
/// use vc_meta::TypeRef;
///
/// let list_of_t = TypeRef::generic("List", [TypeRef::param(0)]);
/// let list_of_i32 = list_of_t.substitute(&[TypeRef::from("i32")]);
///
/// assert_eq!(list_of_i32, TypeRef::generic("List", [TypeRef::from("i32")]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// An already interned type.
    Key(TypeKey),
    /// A type looked up by name.
    Named(String),
    /// The n-th parameter of the enclosing generic definition.
    Param(usize),
    /// An instance of a generic definition.
    Generic {
        definition: Box<TypeRef>,
        arguments: Vec<TypeRef>,
    },
    /// A single-dimension array.
    Array(Box<TypeRef>),
}

impl TypeRef {
    #[inline]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    #[inline]
    pub const fn param(index: usize) -> Self {
        Self::Param(index)
    }

    pub fn generic(
        definition: impl Into<TypeRef>,
        arguments: impl IntoIterator<Item = TypeRef>,
    ) -> Self {
        Self::Generic {
            definition: Box::new(definition.into()),
            arguments: arguments.into_iter().collect(),
        }
    }

    #[inline]
    pub fn array(element: impl Into<TypeRef>) -> Self {
        Self::Array(Box::new(element.into()))
    }

    /// Returns `true` if a generic parameter appears anywhere in the reference.
    pub fn is_open(&self) -> bool {
        match self {
            Self::Key(_) | Self::Named(_) => false,
            Self::Param(_) => true,
            Self::Generic {
                definition,
                arguments,
            } => definition.is_open() || arguments.iter().any(Self::is_open),
            Self::Array(element) => element.is_open(),
        }
    }

    /// Replaces generic parameters with `arguments`.
    ///
    /// Parameters without a matching argument are left in place.
    pub fn substitute(&self, arguments: &[TypeRef]) -> TypeRef {
        match self {
            Self::Param(index) => arguments.get(*index).cloned().unwrap_or(Self::Param(*index)),
            Self::Key(_) | Self::Named(_) => self.clone(),
            Self::Generic {
                definition,
                arguments: inner,
            } => Self::Generic {
                definition: Box::new(definition.substitute(arguments)),
                arguments: inner.iter().map(|arg| arg.substitute(arguments)).collect(),
            },
            Self::Array(element) => Self::Array(Box::new(element.substitute(arguments))),
        }
    }
}

impl From<TypeKey> for TypeRef {
    #[inline]
    fn from(value: TypeKey) -> Self {
        Self::Key(value)
    }
}

impl From<&str> for TypeRef {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Named(String::from(value))
    }
}

impl From<String> for TypeRef {
    #[inline]
    fn from(value: String) -> Self {
        Self::Named(value)
    }
}

#[cfg(test)]
mod tests {
    use super::TypeRef;

    #[test]
    fn substitute_nested() {
        let open = TypeRef::array(TypeRef::generic("Nullable", [TypeRef::param(1)]));
        assert!(open.is_open());

        let closed = open.substitute(&[TypeRef::from("bool"), TypeRef::from("i64")]);
        assert!(!closed.is_open());
        assert_eq!(
            closed,
            TypeRef::array(TypeRef::generic("Nullable", [TypeRef::from("i64")]))
        );
    }

    #[test]
    fn missing_argument_keeps_param() {
        let open = TypeRef::param(2);
        assert_eq!(open.substitute(&[]), TypeRef::Param(2));
    }
}
