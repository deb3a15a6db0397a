use core::any::{TypeId, type_name};
use core::fmt;

use vc_meta::{TypeKey, TypeMetadataCache};

// -----------------------------------------------------------------------------
// HandlerKind

/// Identity of a concrete handler type.
///
/// Chains are navigated by kind, see
/// [`HandlerChain::skip_until_not`](crate::HandlerChain::skip_until_not).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerKind {
    id: TypeId,
    name: &'static str,
}

impl HandlerKind {
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    #[inline]
    pub fn name(self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// -----------------------------------------------------------------------------
// Handler

/// The capability shared by every handler family.
///
/// Families extend it with their own operations, e.g. an editor trait
/// `trait PropertyEditor: Handler`, and resolve `dyn PropertyEditor`
/// through a [`HandlerRegistry`](crate::HandlerRegistry).
pub trait Handler: 'static {
    /// The concrete handler type.
    fn kind(&self) -> HandlerKind {
        HandlerKind::of::<Self>()
    }

    /// Returns `false` to opt out of a type reached through inheritance.
    fn can_handle(&self, ty: TypeKey, cache: &TypeMetadataCache) -> bool {
        let _ = (ty, cache);
        true
    }

    /// Returns `true` for handlers layered in front of a primary handler.
    fn is_decorator(&self) -> bool {
        false
    }
}
