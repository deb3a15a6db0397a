use alloc::rc::Rc;
use alloc::string::String;
use core::fmt;

use bitflags::bitflags;

use crate::attribute::{Attribute, Attributes};
use crate::info::TypeRef;
use crate::value::{ObjectRef, Value};

// -----------------------------------------------------------------------------
// MemberFlags

bitflags! {
    /// Properties of a declared field or property.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemberFlags: u16 {
        const FIELD = 1 << 0;
        const PROPERTY = 1 << 1;
        const PUBLIC = 1 << 2;
        const READABLE = 1 << 3;
        const WRITABLE = 1 << 4;
        const INDEXER = 1 << 5;
        const COMPILER_GENERATED = 1 << 6;
        const STATIC = 1 << 7;
    }
}

// -----------------------------------------------------------------------------
// Accessor

/// Reads a computed member.
pub type Getter = Rc<dyn Fn(&ObjectRef) -> Result<Value, String>>;

/// Writes a computed member.
pub type Setter = Rc<dyn Fn(&ObjectRef, Value) -> Result<(), String>>;

/// How the value of a member is stored.
#[derive(Clone)]
pub enum Accessor {
    /// Stored in the instance slot named after the member.
    Slot,
    /// Computed by host code.
    Computed {
        get: Option<Getter>,
        set: Option<Setter>,
    },
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slot => f.write_str("Slot"),
            Self::Computed { get, set } => f
                .debug_struct("Computed")
                .field("get", &get.is_some())
                .field("set", &set.is_some())
                .finish(),
        }
    }
}

// -----------------------------------------------------------------------------
// MemberDef

/// A declared field or property.
///
/// # Examples
///
/// ```
/// use vc_meta::{MemberDef, MemberFlags};
/// use vc_meta::attribute::SerializeField;
///
/// let member = MemberDef::field("_health", "i32")
///     .private()
///     .with_attribute(SerializeField);
///
/// assert!(member.flags().contains(MemberFlags::FIELD));
/// assert!(!member.is_public());
/// ```
#[derive(Debug, Clone)]
pub struct MemberDef {
    name: String,
    ty: TypeRef,
    flags: MemberFlags,
    accessor: Accessor,
    attributes: Attributes,
}

impl MemberDef {
    fn new(name: String, ty: TypeRef, flags: MemberFlags, accessor: Accessor) -> Self {
        Self {
            name,
            ty,
            flags,
            accessor,
            attributes: Attributes::new(),
        }
    }

    /// A public field stored in an instance slot.
    pub fn field(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self::new(
            name.into(),
            ty.into(),
            MemberFlags::FIELD
                | MemberFlags::PUBLIC
                | MemberFlags::READABLE
                | MemberFlags::WRITABLE,
            Accessor::Slot,
        )
    }

    /// A public auto-property stored in an instance slot.
    pub fn property(name: impl Into<String>, ty: impl Into<TypeRef>) -> Self {
        Self::new(
            name.into(),
            ty.into(),
            MemberFlags::PROPERTY
                | MemberFlags::PUBLIC
                | MemberFlags::READABLE
                | MemberFlags::WRITABLE,
            Accessor::Slot,
        )
    }

    /// A public property backed by host code.
    ///
    /// The property is readable if `get` is given, writable if `set` is.
    pub fn computed(
        name: impl Into<String>,
        ty: impl Into<TypeRef>,
        get: Option<Getter>,
        set: Option<Setter>,
    ) -> Self {
        let mut flags = MemberFlags::PROPERTY | MemberFlags::PUBLIC;
        flags.set(MemberFlags::READABLE, get.is_some());
        flags.set(MemberFlags::WRITABLE, set.is_some());
        Self::new(name.into(), ty.into(), flags, Accessor::Computed { get, set })
    }

    #[inline]
    pub fn private(mut self) -> Self {
        self.flags.remove(MemberFlags::PUBLIC);
        self
    }

    #[inline]
    pub fn read_only(mut self) -> Self {
        self.flags.remove(MemberFlags::WRITABLE);
        self
    }

    #[inline]
    pub fn write_only(mut self) -> Self {
        self.flags.remove(MemberFlags::READABLE);
        self
    }

    #[inline]
    pub fn indexer(mut self) -> Self {
        self.flags.insert(MemberFlags::INDEXER);
        self
    }

    #[inline]
    pub fn compiler_generated(mut self) -> Self {
        self.flags.insert(MemberFlags::COMPILER_GENERATED);
        self
    }

    #[inline]
    pub fn static_member(mut self) -> Self {
        self.flags.insert(MemberFlags::STATIC);
        self
    }

    #[inline]
    pub fn with_attribute<T: Attribute>(mut self, attribute: T) -> Self {
        self.attributes = self.attributes.with(attribute);
        self
    }

    /// Returns a copy with generic parameters of the storage type replaced.
    pub(crate) fn substituted(&self, arguments: &[TypeRef]) -> Self {
        let mut member = self.clone();
        member.ty = self.ty.substitute(arguments);
        member
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared storage type.
    #[inline]
    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    #[inline]
    pub fn flags(&self) -> MemberFlags {
        self.flags
    }

    #[inline]
    pub fn accessor(&self) -> &Accessor {
        &self.accessor
    }

    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.flags.contains(MemberFlags::PUBLIC)
    }
}

#[cfg(test)]
mod tests {
    use super::{Getter, MemberDef, MemberFlags};
    use crate::value::{ObjectRef, Value};
    use alloc::rc::Rc;
    use alloc::string::String;

    fn zero(_: &ObjectRef) -> Result<Value, String> {
        Ok(Value::Int(0))
    }

    #[test]
    fn computed_flags_follow_accessors() {
        let get: Getter = Rc::new(zero);
        let get_only = MemberDef::computed("Len", "i32", Some(get), None);
        assert!(get_only.flags().contains(MemberFlags::READABLE));
        assert!(!get_only.flags().contains(MemberFlags::WRITABLE));

        let field = MemberDef::field("x", "i32").read_only().static_member();
        assert!(!field.flags().contains(MemberFlags::WRITABLE));
        assert!(field.flags().contains(MemberFlags::STATIC));
    }
}
