//! The set of types known at runtime.
//!
//! ## Menu
//!
//! - [`TypeKey`]: interned identity of a type.
//! - [`TypeUniverse`]: defines, interns and queries types.
//! - [`Builtins`]: keys of the types every universe starts with.
//! - `TypeRegistration`: static submission of type definitions,
//!   collected by [`TypeUniverse::auto_register`].

mod key;

pub use key::TypeKey;

use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::MetaError;
use crate::hash::HashMap;
use crate::info::{PrimitiveKind, TypeDef, TypeKind, TypeRef};
use crate::value::Value;

// -----------------------------------------------------------------------------
// Builtins

/// Keys of the types registered by [`TypeUniverse::new`].
#[derive(Debug, Clone, Copy)]
pub struct Builtins {
    /// Root of all classes.
    pub object: TypeKey,
    pub bool: TypeKey,
    pub char: TypeKey,
    pub i32: TypeKey,
    pub i64: TypeKey,
    pub f32: TypeKey,
    pub f64: TypeKey,
    pub string: TypeKey,
    /// `Nullable<T>`, a struct wrapping an optional value type.
    pub nullable: TypeKey,
    /// `Collection<T>`, the single-argument collection interface.
    pub collection: TypeKey,
    /// `List<T>`, a growable collection class.
    pub list: TypeKey,
    /// Root of host-managed object types.
    pub external_object: TypeKey,
    /// Root of delegate types; never inspected.
    pub delegate: TypeKey,
}

// -----------------------------------------------------------------------------
// TypeUniverse

#[derive(Default)]
struct Inner {
    types: Vec<Rc<TypeDef>>,
    by_name: HashMap<String, TypeKey>,
    arrays: HashMap<TypeKey, TypeKey>,
    instances: HashMap<(TypeKey, Vec<TypeKey>), TypeKey>,
}

/// The set of types known at runtime.
///
/// Types are defined once and never removed. Arrays and generic instances
/// are interned the first time they are requested, so two requests for
/// `List<i32>` yield the same [`TypeKey`].
///
/// Interior mutability lets definitions and queries share `&self`; the
/// universe is single-threaded.
///
/// # Examples
///
/// ```
/// use vc_meta::{TypeDef, TypeRef, TypeUniverse};
///
/// let universe = TypeUniverse::new();
/// let b = universe.builtins();
///
/// let list = universe.resolve(&TypeRef::generic("List", [TypeRef::from("i32")])).unwrap();
/// assert_eq!(universe.name(list), "List<i32>");
/// assert_eq!(universe.collection_element(list), Some(b.i32));
///
/// let array = universe.array_of(b.string);
/// assert_eq!(universe.collection_element(array), Some(b.string));
/// ```
pub struct TypeUniverse {
    inner: RefCell<Inner>,
    builtins: Builtins,
}

impl Default for TypeUniverse {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for TypeUniverse {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let inner = self.inner.borrow();
        f.debug_list()
            .entries(inner.types.iter().map(|def| def.name()))
            .finish()
    }
}

impl TypeUniverse {
    /// Creates a universe containing the [`Builtins`].
    pub fn new() -> Self {
        fn push(inner: &mut Inner, def: TypeDef) -> TypeKey {
            let key = TypeKey::new(inner.types.len());
            inner.by_name.insert(String::from(def.name()), key);
            inner.types.push(Rc::new(def));
            key
        }

        let mut inner = Inner::default();
        let object = push(&mut inner, TypeDef::class("object"));
        let primitive = |inner: &mut Inner, name: &str, kind| {
            push(inner, TypeDef::new(name, TypeKind::Primitive(kind)))
        };
        let bool = primitive(&mut inner, "bool", PrimitiveKind::Bool);
        let char = primitive(&mut inner, "char", PrimitiveKind::Char);
        let i32 = primitive(&mut inner, "i32", PrimitiveKind::I32);
        let i64 = primitive(&mut inner, "i64", PrimitiveKind::I64);
        let f32 = primitive(&mut inner, "f32", PrimitiveKind::F32);
        let f64 = primitive(&mut inner, "f64", PrimitiveKind::F64);
        let string = primitive(&mut inner, "string", PrimitiveKind::String);

        let nullable = push(&mut inner, TypeDef::structure("Nullable").generic_params(1));
        let collection = push(&mut inner, TypeDef::interface("Collection").generic_params(1));
        let list = push(
            &mut inner,
            TypeDef::class("List")
                .generic_params(1)
                .extends(object)
                .implements(TypeRef::generic(collection, [TypeRef::param(0)])),
        );
        let external_object = push(
            &mut inner,
            TypeDef::external("ExternalObject").abstract_type(),
        );
        let delegate = push(
            &mut inner,
            TypeDef::class("Delegate")
                .extends(object)
                .abstract_type()
                .no_default_constructor(),
        );

        Self {
            inner: RefCell::new(inner),
            builtins: Builtins {
                object,
                bool,
                char,
                i32,
                i64,
                f32,
                f64,
                string,
                nullable,
                collection,
                list,
                external_object,
                delegate,
            },
        }
    }

    #[inline]
    pub fn builtins(&self) -> &Builtins {
        &self.builtins
    }

    /// Number of types, including interned arrays and generic instances.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.borrow().types.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns all keys in definition order.
    pub fn keys(&self) -> impl Iterator<Item = TypeKey> {
        (0..self.len()).map(TypeKey::new)
    }

    /// Defines a new type.
    ///
    /// A class without a base derives from `object`, an external type
    /// without a base derives from `ExternalObject`.
    ///
    /// # Errors
    ///
    /// - [`MetaError::DuplicateType`] if the name is taken.
    pub fn define(&self, mut def: TypeDef) -> Result<TypeKey, MetaError> {
        let mut inner = self.inner.borrow_mut();
        if inner.by_name.contains_key(def.name()) {
            return Err(MetaError::DuplicateType(String::from(def.name())));
        }
        if def.base().is_none() {
            match def.kind() {
                TypeKind::Class => def.set_base(Some(TypeRef::Key(self.builtins.object))),
                TypeKind::External => {
                    def.set_base(Some(TypeRef::Key(self.builtins.external_object)));
                }
                _ => {}
            }
        }
        let key = TypeKey::new(inner.types.len());
        inner.by_name.insert(String::from(def.name()), key);
        inner.types.push(Rc::new(def));
        Ok(key)
    }

    /// Returns the definition of `ty`.
    ///
    /// # Panics
    ///
    /// Panics if `ty` was produced by another universe.
    #[inline]
    pub fn def(&self, ty: TypeKey) -> Rc<TypeDef> {
        Rc::clone(&self.inner.borrow().types[ty.index()])
    }

    /// Returns the definition of `ty`, `None` for foreign keys.
    #[inline]
    pub fn get(&self, ty: TypeKey) -> Option<Rc<TypeDef>> {
        self.inner.borrow().types.get(ty.index()).cloned()
    }

    #[inline]
    pub fn name(&self, ty: TypeKey) -> String {
        String::from(self.def(ty).name())
    }

    #[inline]
    pub fn lookup(&self, name: &str) -> Option<TypeKey> {
        self.inner.borrow().by_name.get(name).copied()
    }

    /// Returns the array type with the given element type.
    pub fn array_of(&self, element: TypeKey) -> TypeKey {
        if let Some(&key) = self.inner.borrow().arrays.get(&element) {
            return key;
        }
        let def = TypeDef::new(
            format!("{}[]", self.name(element)),
            TypeKind::Array { element },
        )
        .extends(self.builtins.object)
        .implements(TypeRef::generic(self.builtins.collection, [TypeRef::Key(element)]));

        let mut inner = self.inner.borrow_mut();
        let key = TypeKey::new(inner.types.len());
        inner.by_name.insert(String::from(def.name()), key);
        inner.types.push(Rc::new(def));
        inner.arrays.insert(element, key);
        key
    }

    /// Closes the generic definition `definition` over `arguments`.
    ///
    /// # Errors
    ///
    /// - [`MetaError::NotGeneric`] if `definition` has no type parameters.
    /// - [`MetaError::GenericArity`] if the argument count does not match.
    pub fn instantiate(
        &self,
        definition: TypeKey,
        arguments: &[TypeKey],
    ) -> Result<TypeKey, MetaError> {
        let def = self.def(definition);
        let expected = def.generic_param_count();
        if expected == 0 {
            return Err(MetaError::NotGeneric(String::from(def.name())));
        }
        if expected != arguments.len() {
            return Err(MetaError::GenericArity {
                name: String::from(def.name()),
                expected,
                found: arguments.len(),
            });
        }

        let id = (definition, arguments.to_vec());
        if let Some(&key) = self.inner.borrow().instances.get(&id) {
            return Ok(key);
        }

        let names: Vec<String> = arguments.iter().map(|&arg| self.name(arg)).collect();
        let name = format!("{}<{}>", def.name(), names.join(", "));
        let closed = def.instantiate(name, definition, arguments);

        let mut inner = self.inner.borrow_mut();
        let key = TypeKey::new(inner.types.len());
        inner.by_name.insert(String::from(closed.name()), key);
        inner.types.push(Rc::new(closed));
        inner.instances.insert(id, key);
        Ok(key)
    }

    /// Resolves a reference to an interned type.
    ///
    /// # Errors
    ///
    /// - [`MetaError::UnknownType`] if a named type is not defined.
    /// - [`MetaError::UnboundParameter`] for generic parameters.
    /// - Errors of [`TypeUniverse::instantiate`].
    pub fn resolve(&self, ty: &TypeRef) -> Result<TypeKey, MetaError> {
        match ty {
            TypeRef::Key(key) => Ok(*key),
            TypeRef::Named(name) => self
                .lookup(name)
                .ok_or_else(|| MetaError::UnknownType(name.clone())),
            TypeRef::Param(index) => Err(MetaError::UnboundParameter(*index)),
            TypeRef::Generic {
                definition,
                arguments,
            } => {
                let definition = self.resolve(definition)?;
                let arguments = arguments
                    .iter()
                    .map(|arg| self.resolve(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                self.instantiate(definition, &arguments)
            }
            TypeRef::Array(element) => Ok(self.array_of(self.resolve(element)?)),
        }
    }

    // -------------------------------------------------------------------------
    // Hierarchy

    /// Returns the direct base type.
    ///
    /// An unresolvable base is logged and treated as absent.
    pub fn base_of(&self, ty: TypeKey) -> Option<TypeKey> {
        let def = self.def(ty);
        let base = def.base()?;
        match self.resolve(base) {
            Ok(key) if key != ty => Some(key),
            Ok(_) => None,
            Err(e) => {
                log::error!("Base type of `{}` cannot be resolved: {e}", def.name());
                None
            }
        }
    }

    /// Returns the base types of `ty`, nearest first.
    pub fn ancestors(&self, ty: TypeKey) -> Vec<TypeKey> {
        let mut result = Vec::new();
        let mut current = ty;
        while let Some(base) = self.base_of(current) {
            if base == ty || result.contains(&base) {
                log::error!("Inheritance cycle detected at `{}`", self.name(base));
                break;
            }
            result.push(base);
            current = base;
        }
        result
    }

    /// Returns the interfaces implemented by `ty`, its bases and the
    /// interfaces themselves, in discovery order.
    pub fn all_interfaces(&self, ty: TypeKey) -> Vec<TypeKey> {
        let mut result: Vec<TypeKey> = Vec::new();
        let mut pending: Vec<TypeKey> = Vec::new();

        let mut chain = Vec::with_capacity(4);
        chain.push(ty);
        chain.extend(self.ancestors(ty));

        for level in chain {
            pending.push(level);
            while let Some(current) = pending.pop() {
                let def = self.def(current);
                for interface in def.interfaces() {
                    match self.resolve(interface) {
                        Ok(key) if !result.contains(&key) => {
                            result.push(key);
                            pending.push(key);
                        }
                        Ok(_) => {}
                        Err(e) => log::error!(
                            "Interface of `{}` cannot be resolved: {e}",
                            def.name()
                        ),
                    }
                }
            }
        }
        result
    }

    /// Returns `true` if a value of type `source` can be stored as `target`.
    pub fn is_assignable(&self, target: TypeKey, source: TypeKey) -> bool {
        target == source
            || target == self.builtins.object
            || self.ancestors(source).contains(&target)
            || self.all_interfaces(source).contains(&target)
    }

    /// Returns the definition of a closed generic type.
    pub fn generic_definition(&self, ty: TypeKey) -> Option<TypeKey> {
        self.def(ty).generic_instance().map(|g| g.definition)
    }

    /// Returns the arguments of a closed generic type.
    pub fn generic_arguments(&self, ty: TypeKey) -> Vec<TypeKey> {
        self.def(ty)
            .generic_instance()
            .map(|g| g.arguments.clone())
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Classification

    #[inline]
    pub fn kind(&self, ty: TypeKey) -> TypeKind {
        self.def(ty).kind()
    }

    pub fn primitive_kind(&self, ty: TypeKey) -> Option<PrimitiveKind> {
        match self.kind(ty) {
            TypeKind::Primitive(kind) => Some(kind),
            _ => None,
        }
    }

    /// Returns the element type of arrays and of types implementing
    /// exactly one `Collection<T>`.
    pub fn collection_element(&self, ty: TypeKey) -> Option<TypeKey> {
        if let TypeKind::Array { element } = self.kind(ty) {
            return Some(element);
        }
        let collection = self.builtins.collection;
        let mut found = None;
        let mut candidates = Vec::with_capacity(1);
        candidates.push(ty);
        candidates.extend(self.all_interfaces(ty));
        for candidate in candidates {
            let def = self.def(candidate);
            if let Some(instance) = def.generic_instance()
                && instance.definition == collection
            {
                let element = instance.arguments[0];
                match found {
                    None => found = Some(element),
                    Some(previous) if previous == element => {}
                    Some(_) => return None,
                }
            }
        }
        found
    }

    /// Returns `T` for `Nullable<T>`.
    pub fn nullable_element(&self, ty: TypeKey) -> Option<TypeKey> {
        let def = self.def(ty);
        let instance = def.generic_instance()?;
        (instance.definition == self.builtins.nullable).then(|| instance.arguments[0])
    }

    /// Structs and non-string primitives.
    pub fn is_value_type(&self, ty: TypeKey) -> bool {
        match self.kind(ty) {
            TypeKind::Struct => true,
            TypeKind::Primitive(kind) => kind != PrimitiveKind::String,
            _ => false,
        }
    }

    #[inline]
    pub fn is_interface(&self, ty: TypeKey) -> bool {
        self.kind(ty) == TypeKind::Interface
    }

    /// Abstract types and interfaces.
    pub fn is_abstract(&self, ty: TypeKey) -> bool {
        let def = self.def(ty);
        def.is_abstract() || def.kind() == TypeKind::Interface
    }

    #[inline]
    pub fn is_generic_definition(&self, ty: TypeKey) -> bool {
        self.def(ty).generic_param_count() > 0
    }

    #[inline]
    pub fn is_external(&self, ty: TypeKey) -> bool {
        self.kind(ty) == TypeKind::External
    }

    pub fn is_delegate(&self, ty: TypeKey) -> bool {
        let delegate = self.builtins.delegate;
        ty == delegate || self.ancestors(ty).contains(&delegate)
    }

    /// Returns every creatable class or struct assignable to `target`, in
    /// definition order.
    ///
    /// Arrays and generic definitions are never listed.
    pub fn creatable_types_deriving(&self, target: TypeKey) -> Vec<TypeKey> {
        self.keys()
            .filter(|&ty| {
                let def = self.def(ty);
                matches!(def.kind(), TypeKind::Class | TypeKind::Struct)
                    && !def.is_abstract()
                    && def.generic_param_count() == 0
                    && self.is_assignable(target, ty)
            })
            .collect()
    }

    /// Returns `true` if `value` can be stored in a member of type `storage`.
    pub fn value_fits(&self, storage: TypeKey, value: &Value) -> bool {
        if storage == self.builtins.object {
            return true;
        }
        if let Some(inner) = self.nullable_element(storage) {
            return value.is_null() || self.value_fits(inner, value);
        }
        match (value, self.kind(storage)) {
            (Value::Null, TypeKind::Primitive(kind)) => kind == PrimitiveKind::String,
            (Value::Null, TypeKind::Struct) => false,
            (Value::Null, _) => true,
            (Value::Bool(_), TypeKind::Primitive(PrimitiveKind::Bool)) => true,
            (Value::Char(_), TypeKind::Primitive(PrimitiveKind::Char)) => true,
            (Value::Int(v), TypeKind::Primitive(PrimitiveKind::I32)) => i32::try_from(*v).is_ok(),
            (Value::Int(_), TypeKind::Primitive(PrimitiveKind::I64)) => true,
            (Value::Float(_), TypeKind::Primitive(PrimitiveKind::F32 | PrimitiveKind::F64)) => {
                true
            }
            (Value::Str(_), TypeKind::Primitive(PrimitiveKind::String)) => true,
            (Value::Object(obj), _) => self.is_assignable(storage, obj.ty()),
            (Value::Seq(seq), _) => self.is_assignable(storage, seq.ty()),
            (Value::External(ext), _) => self.is_assignable(storage, ext.ty()),
            _ => false,
        }
    }

    // -------------------------------------------------------------------------
    // auto_register

    /// Defines every type submitted through `TypeRegistration`.
    ///
    /// Failed definitions are logged and skipped. Returns the number of
    /// types defined; always `0` without the `auto_register` feature.
    #[cfg_attr(not(feature = "auto_register"), inline(always))]
    pub fn auto_register(&self) -> usize {
        #[cfg(feature = "auto_register")]
        {
            let mut count = 0;
            for registration in inventory::iter::<TypeRegistration> {
                match (registration.define)(self) {
                    Ok(_) => count += 1,
                    Err(e) => log::error!(
                        "Auto registration of `{}` failed: {e}",
                        registration.name
                    ),
                }
            }
            log::debug!("Auto registered {count} types");
            count
        }
        #[cfg(not(feature = "auto_register"))]
        {
            0
        }
    }
}

// -----------------------------------------------------------------------------
// TypeRegistration

/// A statically submitted type definition.
///
/// # Examples
///
/// ```ignore
/// use vc_meta::{MemberDef, TypeDef, TypeRegistration, TypeUniverse};
///
/// vc_meta::inventory::submit! {
///     TypeRegistration {
///         name: "Point",
///         define: |universe: &TypeUniverse| universe.define(
///             TypeDef::class("Point").member(MemberDef::field("X", "i32")),
///         ),
///     }
/// }
/// ```
#[cfg(feature = "auto_register")]
pub struct TypeRegistration {
    pub name: &'static str,
    pub define: fn(&TypeUniverse) -> Result<TypeKey, MetaError>,
}

#[cfg(feature = "auto_register")]
inventory::collect!(TypeRegistration);
