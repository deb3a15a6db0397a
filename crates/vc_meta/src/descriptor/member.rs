use alloc::string::String;
use core::hash::{Hash, Hasher};

use crate::attribute::{Attributes, InspectorOrder};
use crate::cache::TypeMetadataCache;
use crate::descriptor::display_name;
use crate::info::{Accessor, MemberDef, MemberFlags};
use crate::universe::{TypeKey, TypeUniverse};
use crate::value::{ObjectRef, Value};
use crate::AccessError;

// -----------------------------------------------------------------------------
// MemberDescriptor

/// An inspectable field or property.
///
/// Identity is the pair of storage type and name: two descriptors for the
/// same member reached through different derived types compare equal.
///
/// Accessors come in two flavors. [`try_read`](Self::try_read) and
/// [`try_write`](Self::try_write) report failures; [`read`](Self::read)
/// and [`write`](Self::write) log them (when warnings are enabled) and
/// degrade to `Null` or a no-op.
#[derive(Debug, Clone)]
pub struct MemberDescriptor {
    declaring: TypeKey,
    name: String,
    display_name: String,
    storage: TypeKey,
    flags: MemberFlags,
    order: f64,
    attributes: Attributes,
    accessor: Accessor,
}

impl MemberDescriptor {
    pub(crate) fn new(declaring: TypeKey, def: &MemberDef, storage: TypeKey) -> Self {
        Self {
            declaring,
            name: String::from(def.name()),
            display_name: display_name(def.name()),
            storage,
            flags: def.flags(),
            order: InspectorOrder::of(def.attributes()),
            attributes: def.attributes().clone(),
            accessor: def.accessor().clone(),
        }
    }

    /// The type that declares the member.
    #[inline]
    pub fn declaring(&self) -> TypeKey {
        self.declaring
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The label shown by editors.
    #[inline]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[inline]
    pub fn storage(&self) -> TypeKey {
        self.storage
    }

    #[inline]
    pub fn flags(&self) -> MemberFlags {
        self.flags
    }

    #[inline]
    pub fn is_public(&self) -> bool {
        self.flags.contains(MemberFlags::PUBLIC)
    }

    #[inline]
    pub fn is_field(&self) -> bool {
        self.flags.contains(MemberFlags::FIELD)
    }

    #[inline]
    pub fn is_property(&self) -> bool {
        self.flags.contains(MemberFlags::PROPERTY)
    }

    /// The [`InspectorOrder`] of the member, [`InspectorOrder::LAST`] if unset.
    #[inline]
    pub fn order(&self) -> f64 {
        self.order
    }

    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    #[inline]
    pub fn accessor(&self) -> &Accessor {
        &self.accessor
    }

    /// Reads the member of `target`.
    pub fn try_read(&self, target: &Value) -> Result<Value, AccessError> {
        if !self.flags.contains(MemberFlags::READABLE) {
            return Err(AccessError::NotReadable(self.name.clone()));
        }
        let object = self.target_object(target)?;
        match &self.accessor {
            Accessor::Slot => Ok(object.get(&self.name).unwrap_or_default()),
            Accessor::Computed { get: Some(get), .. } => {
                get(object).map_err(|message| AccessError::Getter {
                    member: self.name.clone(),
                    message,
                })
            }
            Accessor::Computed { get: None, .. } => {
                Err(AccessError::NotReadable(self.name.clone()))
            }
        }
    }

    /// Writes the member of `target`, checking `value` against the storage type.
    pub fn try_write(
        &self,
        universe: &TypeUniverse,
        target: &Value,
        value: Value,
    ) -> Result<(), AccessError> {
        if !self.flags.contains(MemberFlags::WRITABLE) {
            return Err(AccessError::NotWritable(self.name.clone()));
        }
        if !universe.value_fits(self.storage, &value) {
            return Err(AccessError::TypeMismatch {
                member: self.name.clone(),
                expected: universe.name(self.storage),
            });
        }
        let object = self.target_object(target)?;
        match &self.accessor {
            Accessor::Slot => {
                object.set(self.name.as_str(), value);
                Ok(())
            }
            Accessor::Computed { set: Some(set), .. } => {
                set(object, value).map_err(|message| AccessError::Setter {
                    member: self.name.clone(),
                    message,
                })
            }
            Accessor::Computed { set: None, .. } => {
                Err(AccessError::NotWritable(self.name.clone()))
            }
        }
    }

    /// Reads the member, returning `Null` on failure.
    pub fn read(&self, cache: &TypeMetadataCache, target: &Value) -> Value {
        match self.try_read(target) {
            Ok(value) => value,
            Err(e) => {
                if cache.settings().emit_warnings {
                    log::warn!("Failed to read `{}`: {e}", self.name);
                }
                Value::Null
            }
        }
    }

    /// Writes the member, returning `false` on failure.
    pub fn write(&self, cache: &TypeMetadataCache, target: &Value, value: Value) -> bool {
        match self.try_write(cache.universe(), target, value) {
            Ok(()) => true,
            Err(e) => {
                if cache.settings().emit_warnings {
                    log::warn!("Failed to write `{}`: {e}", self.name);
                }
                false
            }
        }
    }

    fn target_object<'a>(&self, target: &'a Value) -> Result<&'a ObjectRef, AccessError> {
        target.as_object().ok_or_else(|| AccessError::NotAnObject {
            member: self.name.clone(),
        })
    }
}

impl PartialEq for MemberDescriptor {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.storage == other.storage && self.name == other.name
    }
}

impl Eq for MemberDescriptor {}

impl Hash for MemberDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.storage.hash(state);
        self.name.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::MemberDescriptor;
    use crate::info::{Getter, MemberDef, Setter, TypeDef};
    use crate::universe::TypeUniverse;
    use crate::value::{ObjectRef, Value};
    use crate::AccessError;
    use alloc::rc::Rc;
    use alloc::string::String;

    #[test]
    fn slot_access() {
        let universe = TypeUniverse::new();
        let b = *universe.builtins();
        let ty = universe.define(TypeDef::class("Stats")).unwrap();
        let member = MemberDescriptor::new(ty, &MemberDef::field("hp", "i32"), b.i32);

        let target = Value::Object(ObjectRef::new(ty));
        assert_eq!(member.try_read(&target), Ok(Value::Null));
        member.try_write(&universe, &target, Value::Int(7)).unwrap();
        assert_eq!(member.try_read(&target), Ok(Value::Int(7)));

        assert!(matches!(
            member.try_write(&universe, &target, Value::Str(String::from("x"))),
            Err(AccessError::TypeMismatch { .. })
        ));
        assert!(matches!(
            member.try_read(&Value::Int(1)),
            Err(AccessError::NotAnObject { .. })
        ));
    }

    #[test]
    fn computed_failures_are_reported() {
        let universe = TypeUniverse::new();
        let b = *universe.builtins();
        let ty = universe.define(TypeDef::class("Broken")).unwrap();

        let get: Getter = Rc::new(|_: &ObjectRef| Err(String::from("boom")));
        let set: Setter = Rc::new(|_: &ObjectRef, _: Value| Ok(()));
        let def = MemberDef::computed("value", "i32", Some(get), Some(set));
        let member = MemberDescriptor::new(ty, &def, b.i32);

        let target = Value::Object(ObjectRef::new(ty));
        assert!(matches!(
            member.try_read(&target),
            Err(AccessError::Getter { .. })
        ));
        assert_eq!(member.try_write(&universe, &target, Value::Int(1)), Ok(()));
    }

    #[test]
    fn identity_is_storage_and_name() {
        let universe = TypeUniverse::new();
        let b = *universe.builtins();
        let a = universe.define(TypeDef::class("A")).unwrap();
        let c = universe.define(TypeDef::class("C")).unwrap();

        let x = MemberDescriptor::new(a, &MemberDef::field("x", "i32"), b.i32);
        let y = MemberDescriptor::new(c, &MemberDef::field("x", "i32").private(), b.i32);
        let z = MemberDescriptor::new(a, &MemberDef::field("x", "i64"), b.i64);
        assert_eq!(x, y);
        assert_ne!(x, z);
        assert_eq!(x.display_name(), "X");
    }
}
