use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::descriptor::{MemberDescriptor, MethodDescriptor};
use crate::hash::HashMap;
use crate::universe::TypeKey;

// -----------------------------------------------------------------------------
// TypeShape

/// How a type is inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeShape {
    /// Inspected member by member.
    Object,
    /// A single-dimension array.
    Array { element: TypeKey },
    /// A type implementing `Collection<T>`.
    Collection { element: TypeKey },
}

impl TypeShape {
    /// Returns the element type of arrays and collections.
    #[inline]
    pub const fn element(self) -> Option<TypeKey> {
        match self {
            Self::Object => None,
            Self::Array { element } | Self::Collection { element } => Some(element),
        }
    }

    #[inline]
    pub const fn is_container(self) -> bool {
        !matches!(self, Self::Object)
    }
}

// -----------------------------------------------------------------------------
// TypeDescriptor

/// The cached, inspectable view of one type.
///
/// Created by [`TypeMetadataCache::get`](crate::TypeMetadataCache::get).
#[derive(Debug)]
pub struct TypeDescriptor {
    pub(crate) ty: TypeKey,
    pub(crate) name: String,
    pub(crate) shape: TypeShape,
    pub(crate) parent: Option<TypeKey>,
    pub(crate) local_members: Vec<Rc<MemberDescriptor>>,
    pub(crate) members: Vec<Rc<MemberDescriptor>>,
    pub(crate) serialized_members: Vec<Rc<MemberDescriptor>>,
    pub(crate) name_index: HashMap<String, Rc<MemberDescriptor>>,
    pub(crate) methods: Vec<Rc<MethodDescriptor>>,
    pub(crate) buttons: Vec<Rc<MethodDescriptor>>,
    pub(crate) local_buttons: Vec<Rc<MethodDescriptor>>,
    pub(crate) has_default_constructor: bool,
}

impl TypeDescriptor {
    #[inline]
    pub fn ty(&self) -> TypeKey {
        self.ty
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn shape(&self) -> TypeShape {
        self.shape
    }

    #[inline]
    pub fn is_collection(&self) -> bool {
        self.shape.is_container()
    }

    #[inline]
    pub fn element_type(&self) -> Option<TypeKey> {
        self.shape.element()
    }

    /// The direct base type, if any.
    #[inline]
    pub fn parent(&self) -> Option<TypeKey> {
        self.parent
    }

    /// Members declared on this type, ordered.
    #[inline]
    pub fn local_members(&self) -> &[Rc<MemberDescriptor>] {
        &self.local_members
    }

    /// Local and inherited members, ordered.
    #[inline]
    pub fn members(&self) -> &[Rc<MemberDescriptor>] {
        &self.members
    }

    /// The subset of [`members`](Self::members) persisted by this layer.
    #[inline]
    pub fn serialized_members(&self) -> &[Rc<MemberDescriptor>] {
        &self.serialized_members
    }

    /// Finds a member by name.
    ///
    /// When a derived type redeclares an inherited name, the member later
    /// in [`members`](Self::members) wins.
    #[inline]
    pub fn member(&self, name: &str) -> Option<&Rc<MemberDescriptor>> {
        self.name_index.get(name)
    }

    /// Local and inherited methods not hidden from the inspector.
    #[inline]
    pub fn methods(&self) -> &[Rc<MethodDescriptor>] {
        &self.methods
    }

    /// Methods exposed as buttons, ordered.
    #[inline]
    pub fn buttons(&self) -> &[Rc<MethodDescriptor>] {
        &self.buttons
    }

    /// Buttons declared on this type, ordered.
    #[inline]
    pub fn local_buttons(&self) -> &[Rc<MethodDescriptor>] {
        &self.local_buttons
    }

    #[inline]
    pub fn has_default_constructor(&self) -> bool {
        self.has_default_constructor
    }
}
