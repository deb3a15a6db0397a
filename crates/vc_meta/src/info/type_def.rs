use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::attribute::{Attribute, Attributes};
use crate::info::{MemberDef, MethodDef, TypeRef};
use crate::universe::TypeKey;
use crate::value::ObjectRef;

// -----------------------------------------------------------------------------
// TypeKind

/// Built-in scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Char,
    I32,
    I64,
    F32,
    F64,
    String,
}

/// The category of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    /// A reference type with identity.
    Class,
    /// A value type; always default-constructible.
    Struct,
    Interface,
    /// A host-managed object, persisted through external references.
    External,
    /// A single-dimension array.
    Array { element: TypeKey },
}

// -----------------------------------------------------------------------------
// DefaultCtor

/// Runs after the slots of a new instance have been zeroed.
pub type InitFn = Rc<dyn Fn(&ObjectRef) -> Result<(), String>>;

/// A zero-argument constructor.
#[derive(Clone)]
pub struct DefaultCtor {
    pub public: bool,
    pub init: Option<InitFn>,
}

impl fmt::Debug for DefaultCtor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultCtor")
            .field("public", &self.public)
            .field("init", &self.init.is_some())
            .finish()
    }
}

/// Identifies a closed generic type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericInstance {
    pub definition: TypeKey,
    pub arguments: Vec<TypeKey>,
}

// -----------------------------------------------------------------------------
// TypeDef

/// The raw description of a type, as declared by the host.
///
/// A class without an explicit base derives from `object`. Classes and
/// structs get a public default constructor unless told otherwise.
///
/// # Examples
///
/// ```
/// use vc_meta::{MemberDef, TypeDef, TypeUniverse};
///
/// let universe = TypeUniverse::new();
/// let point = universe
///     .define(
///         TypeDef::class("Point")
///             .member(MemberDef::field("X", "i32"))
///             .member(MemberDef::field("Y", "i32")),
///     )
///     .unwrap();
///
/// assert_eq!(universe.name(point), "Point");
/// assert_eq!(universe.base_of(point), Some(universe.builtins().object));
/// ```
#[derive(Debug, Clone)]
pub struct TypeDef {
    name: String,
    kind: TypeKind,
    generic_params: usize,
    is_abstract: bool,
    base: Option<TypeRef>,
    interfaces: Vec<TypeRef>,
    members: Vec<MemberDef>,
    methods: Vec<MethodDef>,
    default_ctor: Option<DefaultCtor>,
    attributes: Attributes,
    generic: Option<GenericInstance>,
}

impl TypeDef {
    pub fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        let default_ctor = match kind {
            TypeKind::Class | TypeKind::Struct | TypeKind::Primitive(_) => Some(DefaultCtor {
                public: true,
                init: None,
            }),
            _ => None,
        };
        Self {
            name: name.into(),
            kind,
            generic_params: 0,
            is_abstract: false,
            base: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            methods: Vec::new(),
            default_ctor,
            attributes: Attributes::new(),
            generic: None,
        }
    }

    #[inline]
    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Class)
    }

    #[inline]
    pub fn structure(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Struct)
    }

    #[inline]
    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::Interface)
    }

    #[inline]
    pub fn external(name: impl Into<String>) -> Self {
        Self::new(name, TypeKind::External)
    }

    /// Makes this a generic definition with `count` type parameters,
    /// referred to as [`TypeRef::Param`] inside the definition.
    #[inline]
    pub fn generic_params(mut self, count: usize) -> Self {
        self.generic_params = count;
        self
    }

    #[inline]
    pub fn abstract_type(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    #[inline]
    pub fn extends(mut self, base: impl Into<TypeRef>) -> Self {
        self.base = Some(base.into());
        self
    }

    #[inline]
    pub fn implements(mut self, interface: impl Into<TypeRef>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    #[inline]
    pub fn member(mut self, member: MemberDef) -> Self {
        self.members.push(member);
        self
    }

    #[inline]
    pub fn method(mut self, method: MethodDef) -> Self {
        self.methods.push(method);
        self
    }

    /// Sets a public default constructor running `init`.
    pub fn constructor(
        mut self,
        init: impl Fn(&ObjectRef) -> Result<(), String> + 'static,
    ) -> Self {
        self.default_ctor = Some(DefaultCtor {
            public: true,
            init: Some(Rc::new(init)),
        });
        self
    }

    /// Marks the default constructor as non-public.
    #[inline]
    pub fn private_constructor(mut self) -> Self {
        if let Some(ctor) = &mut self.default_ctor {
            ctor.public = false;
        }
        self
    }

    /// Removes the default constructor.
    #[inline]
    pub fn no_default_constructor(mut self) -> Self {
        self.default_ctor = None;
        self
    }

    #[inline]
    pub fn with_attribute<T: Attribute>(mut self, attribute: T) -> Self {
        self.attributes = self.attributes.with(attribute);
        self
    }

    pub(crate) fn set_base(&mut self, base: Option<TypeRef>) {
        self.base = base;
    }

    /// Closes a generic definition over `arguments`.
    pub(crate) fn instantiate(
        &self,
        name: String,
        definition: TypeKey,
        arguments: &[TypeKey],
    ) -> TypeDef {
        let refs: Vec<TypeRef> = arguments.iter().map(|&key| TypeRef::Key(key)).collect();
        TypeDef {
            name,
            kind: self.kind,
            generic_params: 0,
            is_abstract: self.is_abstract,
            base: self.base.as_ref().map(|base| base.substitute(&refs)),
            interfaces: self.interfaces.iter().map(|i| i.substitute(&refs)).collect(),
            members: self.members.iter().map(|m| m.substituted(&refs)).collect(),
            methods: self.methods.iter().map(|m| m.substituted(&refs)).collect(),
            default_ctor: self.default_ctor.clone(),
            attributes: self.attributes.clone(),
            generic: Some(GenericInstance {
                definition,
                arguments: arguments.to_vec(),
            }),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Number of type parameters; non-zero for generic definitions.
    #[inline]
    pub fn generic_param_count(&self) -> usize {
        self.generic_params
    }

    #[inline]
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    #[inline]
    pub fn base(&self) -> Option<&TypeRef> {
        self.base.as_ref()
    }

    #[inline]
    pub fn interfaces(&self) -> &[TypeRef] {
        &self.interfaces
    }

    /// Members declared directly on this type.
    #[inline]
    pub fn members(&self) -> &[MemberDef] {
        &self.members
    }

    /// Methods declared directly on this type.
    #[inline]
    pub fn methods(&self) -> &[MethodDef] {
        &self.methods
    }

    #[inline]
    pub fn default_ctor(&self) -> Option<&DefaultCtor> {
        self.default_ctor.as_ref()
    }

    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// The definition and arguments of a closed generic type.
    #[inline]
    pub fn generic_instance(&self) -> Option<&GenericInstance> {
        self.generic.as_ref()
    }
}
