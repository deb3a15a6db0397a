use alloc::string::String;

use crate::MetaError;
use crate::cache::TypeMetadataCache;
use crate::info::{Accessor, PrimitiveKind, TypeKind};
use crate::universe::TypeKey;
use crate::value::{ObjectRef, SeqRef, Value};

/// Nested structs deeper than this are zeroed as `Null`.
const MAX_ZERO_DEPTH: usize = 8;

impl TypeMetadataCache {
    /// Creates an instance of `ty`.
    ///
    /// - Arrays and collections start empty.
    /// - Primitives are zero, `Nullable<T>` is `Null`.
    /// - Classes without a default constructor are allocated with zeroed
    ///   slots and no constructor is run.
    /// - Otherwise the slots are zeroed and the constructor runs.
    ///
    /// # Errors
    ///
    /// - [`MetaError::NotCreatable`] for interfaces, abstract types, generic
    ///   definitions and external objects.
    /// - [`MetaError::NoDefaultConstructor`] for collection classes without one.
    /// - [`MetaError::ConstructorFailed`] if the constructor fails.
    pub fn create_instance(&self, ty: TypeKey) -> Result<Value, MetaError> {
        let universe = self.universe();
        let def = universe.def(ty);
        let not_creatable = |reason| MetaError::NotCreatable {
            name: String::from(def.name()),
            reason,
        };

        if def.generic_param_count() > 0 {
            return Err(not_creatable("generic type definition"));
        }
        match def.kind() {
            TypeKind::Interface => return Err(not_creatable("interface")),
            TypeKind::External => return Err(not_creatable("external object")),
            TypeKind::Primitive(kind) => return Ok(zero_primitive(kind)),
            TypeKind::Array { .. } => return Ok(Value::Seq(SeqRef::new(ty))),
            TypeKind::Class | TypeKind::Struct => {}
        }
        if def.is_abstract() {
            return Err(not_creatable("abstract type"));
        }
        if universe.nullable_element(ty).is_some() {
            return Ok(Value::Null);
        }
        if universe.collection_element(ty).is_some() {
            return match def.default_ctor() {
                Some(_) => Ok(Value::Seq(SeqRef::new(ty))),
                None => Err(MetaError::NoDefaultConstructor(String::from(def.name()))),
            };
        }

        let object = ObjectRef::new(ty);
        self.zero_slots(&object, ty, 0);

        if let Some(init) = def.default_ctor().and_then(|ctor| ctor.init.as_ref()) {
            init(&object).map_err(|message| MetaError::ConstructorFailed {
                name: String::from(def.name()),
                message,
            })?;
        }
        Ok(Value::Object(object))
    }

    /// Returns the value a member of type `ty` holds before any write.
    pub fn zero_value(&self, ty: TypeKey) -> Value {
        self.zero_value_at(ty, 0)
    }

    fn zero_value_at(&self, ty: TypeKey, depth: usize) -> Value {
        let universe = self.universe();
        match universe.kind(ty) {
            TypeKind::Primitive(PrimitiveKind::String) => Value::Null,
            TypeKind::Primitive(kind) => zero_primitive(kind),
            TypeKind::Struct
                if depth < MAX_ZERO_DEPTH
                    && universe.nullable_element(ty).is_none()
                    && universe.collection_element(ty).is_none()
                    && !universe.is_generic_definition(ty) =>
            {
                let object = ObjectRef::new(ty);
                self.zero_slots(&object, ty, depth + 1);
                Value::Object(object)
            }
            _ => Value::Null,
        }
    }

    fn zero_slots(&self, object: &ObjectRef, ty: TypeKey, depth: usize) {
        for member in self.get(ty).members() {
            if matches!(member.accessor(), Accessor::Slot) {
                object.set(member.name(), self.zero_value_at(member.storage(), depth));
            }
        }
    }
}

fn zero_primitive(kind: PrimitiveKind) -> Value {
    match kind {
        PrimitiveKind::Bool => Value::Bool(false),
        PrimitiveKind::Char => Value::Char('\0'),
        PrimitiveKind::I32 | PrimitiveKind::I64 => Value::Int(0),
        PrimitiveKind::F32 | PrimitiveKind::F64 => Value::Float(0.0),
        PrimitiveKind::String => Value::Str(String::new()),
    }
}

#[cfg(test)]
mod tests {
    use crate::MetaError;
    use crate::cache::TypeMetadataCache;
    use crate::info::{MemberDef, TypeDef};
    use crate::settings::InspectorSettings;
    use crate::universe::TypeUniverse;
    use crate::value::Value;
    use alloc::string::String;

    fn cache() -> TypeMetadataCache {
        TypeMetadataCache::new(TypeUniverse::new(), InspectorSettings::default())
    }

    #[test]
    fn containers_start_empty() {
        let cache = cache();
        let b = *cache.universe().builtins();
        let list = cache.universe().instantiate(b.list, &[b.i32]).unwrap();
        let array = cache.universe().array_of(b.i32);

        let value = cache.create_instance(list).unwrap();
        assert!(value.as_seq().is_some_and(|seq| seq.is_empty() && seq.ty() == list));
        let value = cache.create_instance(array).unwrap();
        assert!(value.as_seq().is_some_and(|seq| seq.is_empty()));
    }

    #[test]
    fn primitives_and_nullable() {
        let cache = cache();
        let b = *cache.universe().builtins();
        let nullable = cache.universe().instantiate(b.nullable, &[b.f64]).unwrap();

        assert_eq!(cache.create_instance(b.i32), Ok(Value::Int(0)));
        assert_eq!(cache.create_instance(b.string), Ok(Value::Str(String::new())));
        assert_eq!(cache.create_instance(nullable), Ok(Value::Null));
    }

    #[test]
    fn not_creatable() {
        let cache = cache();
        let universe = cache.universe();
        let b = *universe.builtins();
        let interface = universe.define(TypeDef::interface("IThing")).unwrap();
        let base = universe.define(TypeDef::class("Base").abstract_type()).unwrap();
        let texture = universe.define(TypeDef::external("Texture")).unwrap();

        for ty in [interface, base, texture, b.list] {
            assert!(matches!(
                cache.create_instance(ty),
                Err(MetaError::NotCreatable { .. })
            ));
        }
    }

    #[test]
    fn constructor_runs_after_zeroing() {
        let cache = cache();
        let universe = cache.universe();
        universe
            .define(
                TypeDef::structure("Vec2")
                    .member(MemberDef::field("x", "f32"))
                    .member(MemberDef::field("y", "f32")),
            )
            .unwrap();
        let ty = universe
            .define(
                TypeDef::class("Player")
                    .member(MemberDef::field("hp", "i32"))
                    .member(MemberDef::field("name", "string"))
                    .member(MemberDef::field("pos", "Vec2"))
                    .constructor(|this| {
                        this.set("hp", Value::Int(100));
                        Ok(())
                    }),
            )
            .unwrap();

        let value = cache.create_instance(ty).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.get("hp"), Some(Value::Int(100)));
        assert_eq!(object.get("name"), Some(Value::Null));
        let pos = object.get("pos").unwrap();
        assert_eq!(pos.as_object().unwrap().get("x"), Some(Value::Float(0.0)));
    }

    #[test]
    fn uninitialized_without_constructor() {
        let cache = cache();
        let ty = cache
            .universe()
            .define(
                TypeDef::class("Handle")
                    .member(MemberDef::field("id", "i64"))
                    .no_default_constructor(),
            )
            .unwrap();

        let value = cache.create_instance(ty).unwrap();
        assert_eq!(value.as_object().unwrap().get("id"), Some(Value::Int(0)));
    }

    #[test]
    fn constructor_failure_is_surfaced() {
        let cache = cache();
        let ty = cache
            .universe()
            .define(TypeDef::class("Fragile").constructor(|_| Err(String::from("no"))))
            .unwrap();

        assert_eq!(
            cache.create_instance(ty),
            Err(MetaError::ConstructorFailed {
                name: String::from("Fragile"),
                message: String::from("no"),
            })
        );
    }
}
