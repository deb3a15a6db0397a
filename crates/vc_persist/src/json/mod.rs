//! The JSON token serializer.
//!
//! Values are converted by a [`TokenConverter`] handler family, resolved
//! per declared type through a [`ConverterRegistry`] exactly like editors
//! are. Each member becomes one JSON document.
//!
//! ## Token layout
//!
//! - Primitives map to JSON scalars, characters to one-character strings.
//! - Objects map to JSON objects keyed by serialized member names.
//! - Arrays and collections map to JSON arrays.
//! - External objects map to `{"$ref": id}`, `id` coming from the
//!   [`ReferenceStore`].
//! - A value whose runtime type differs from the declared one carries
//!   `"$type"`. Objects carry it next to their members, other values are
//!   wrapped as `{"$type": .., "$value": ..}`.
//!
//! Object graphs must be trees: an object reachable from itself fails
//! with [`SerializeError::Cycle`]. Shared objects are written once per
//! path and come back as separate instances.

mod converters;

pub use converters::{ExternalConverter, NullableConverter, ObjectConverter};
pub use converters::{PrimitiveConverter, SequenceConverter};

use alloc::rc::Rc;
use alloc::string::String;
use core::fmt;

use vc_handler::{Handler, HandlerError, HandlerRegistry, HandlerRequest, HandlerTarget};
use vc_meta::hash::HashSet;
use vc_meta::{MemberDescriptor, TypeKey, TypeMetadataCache, TypeUniverse, Value};

use crate::{ReferenceStore, SerializeError, TokenSerializer};

/// A parsed token.
pub type Json = serde_json::Value;

/// Key of the runtime type name in polymorphic tokens.
pub const TYPE_KEY: &str = "$type";
/// Key of the wrapped value in polymorphic tokens of non-objects.
pub const VALUE_KEY: &str = "$value";
/// Key of the reference id in external object tokens.
pub const REF_KEY: &str = "$ref";

// -----------------------------------------------------------------------------
// TokenConverter

/// Converts values of one type pattern to [`Json`] and back.
pub trait TokenConverter: Handler {
    fn to_json(&self, cx: &mut ConvertContext<'_>, value: &Value) -> Result<Json, SerializeError>;

    fn from_json(&self, cx: &mut ConvertContext<'_>, json: &Json) -> Result<Value, SerializeError>;
}

pub type ConverterRegistry = HandlerRegistry<dyn TokenConverter>;

pub type CreateConverter =
    fn(&HandlerRequest<'_>) -> Result<Rc<dyn TokenConverter>, HandlerError>;

// -----------------------------------------------------------------------------
// ConvertContext

/// State shared by the converters of one token.
pub struct ConvertContext<'a> {
    cache: &'a TypeMetadataCache,
    converters: &'a ConverterRegistry,
    refs: &'a mut dyn ReferenceStore,
    active: HashSet<usize>,
}

impl<'a> ConvertContext<'a> {
    pub fn new(
        cache: &'a TypeMetadataCache,
        converters: &'a ConverterRegistry,
        refs: &'a mut dyn ReferenceStore,
    ) -> Self {
        Self {
            cache,
            converters,
            refs,
            active: HashSet::default(),
        }
    }

    #[inline]
    pub fn cache(&self) -> &'a TypeMetadataCache {
        self.cache
    }

    #[inline]
    pub fn converters(&self) -> &'a ConverterRegistry {
        self.converters
    }

    #[inline]
    pub fn refs(&mut self) -> &mut (dyn ReferenceStore + 'a) {
        &mut *self.refs
    }

    /// Converts `value` with the first converter of `ty`.
    pub fn to_json(&mut self, ty: TypeKey, value: &Value) -> Result<Json, SerializeError> {
        let converter = self.converters.resolve(self.cache, ty)?.first().clone();
        converter.to_json(self, value)
    }

    /// Converts `json` with the first converter of `ty`.
    pub fn from_json(&mut self, ty: TypeKey, json: &Json) -> Result<Value, SerializeError> {
        let converter = self.converters.resolve(self.cache, ty)?.first().clone();
        converter.from_json(self, json)
    }

    /// Marks a shared instance as being written.
    ///
    /// Fails if it already is, which means the graph has a cycle.
    pub fn enter(&mut self, identity: usize, ty: TypeKey) -> Result<(), SerializeError> {
        if self.active.insert(identity) {
            Ok(())
        } else {
            Err(SerializeError::Cycle(self.cache.universe().name(ty)))
        }
    }

    #[inline]
    pub fn exit(&mut self, identity: usize) {
        self.active.remove(&identity);
    }
}

impl fmt::Debug for ConvertContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertContext")
            .field("active", &self.active.len())
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// JsonTokenSerializer

/// A [`TokenSerializer`] writing one JSON document per member.
#[derive(Debug)]
pub struct JsonTokenSerializer {
    converters: ConverterRegistry,
}

impl JsonTokenSerializer {
    /// Uses [`default_converters`].
    pub fn new(universe: &TypeUniverse) -> Self {
        Self::with_converters(default_converters(universe))
    }

    #[inline]
    pub fn with_converters(converters: ConverterRegistry) -> Self {
        Self { converters }
    }

    #[inline]
    pub fn converters(&self) -> &ConverterRegistry {
        &self.converters
    }

    #[inline]
    pub fn converters_mut(&mut self) -> &mut ConverterRegistry {
        &mut self.converters
    }
}

impl TokenSerializer for JsonTokenSerializer {
    fn serialize(
        &self,
        cache: &TypeMetadataCache,
        member: &MemberDescriptor,
        value: &Value,
        refs: &mut dyn ReferenceStore,
    ) -> Result<String, SerializeError> {
        let mut cx = ConvertContext::new(cache, &self.converters, refs);
        let json = cx.to_json(member.storage(), value)?;
        Ok(serde_json::to_string(&json)?)
    }

    fn deserialize(
        &self,
        cache: &TypeMetadataCache,
        member: &MemberDescriptor,
        token: &str,
        refs: &mut dyn ReferenceStore,
    ) -> Result<Value, SerializeError> {
        let json: Json = serde_json::from_str(token)?;
        let mut cx = ConvertContext::new(cache, &self.converters, refs);
        cx.from_json(member.storage(), &json)
    }
}

// -----------------------------------------------------------------------------
// Registration

/// Builds the converter registry with every built-in converter, followed
/// by the statically submitted ones.
pub fn default_converters(universe: &TypeUniverse) -> ConverterRegistry {
    let b = *universe.builtins();
    let mut converters = ConverterRegistry::new();

    for ty in [b.bool, b.char, b.i32, b.i64, b.f32, b.f64, b.string] {
        converters.register(
            universe,
            "PrimitiveConverter",
            HandlerTarget::Exact(ty),
            Rc::new(PrimitiveConverter::create),
        );
    }
    converters.register(
        universe,
        "NullableConverter",
        HandlerTarget::Generic(b.nullable),
        Rc::new(NullableConverter::create),
    );
    converters.register(
        universe,
        "ExternalConverter",
        HandlerTarget::Inherited(b.external_object),
        Rc::new(ExternalConverter::create),
    );
    converters.set_reflected(Rc::new(ObjectConverter::create));
    converters.set_container(Rc::new(SequenceConverter::create));

    auto_register(universe, &mut converters);
    converters
}

/// Adds every converter submitted through [`ConverterRegistration`].
///
/// Returns the number of accepted registrations; always `0` without the
/// `auto_register` feature.
#[cfg_attr(not(feature = "auto_register"), inline(always))]
pub fn auto_register(universe: &TypeUniverse, converters: &mut ConverterRegistry) -> usize {
    #[cfg(feature = "auto_register")]
    {
        let mut count = 0;
        for registration in inventory::iter::<ConverterRegistration> {
            if converters.register_named(
                universe,
                registration.name,
                registration.target,
                Rc::new(registration.create),
            ) {
                count += 1;
            }
        }
        log::debug!("Auto registered {count} converters");
        count
    }
    #[cfg(not(feature = "auto_register"))]
    {
        let _ = (universe, converters);
        0
    }
}

/// A statically submitted converter.
///
/// # Examples
///
/// ```ignore
/// vc_persist::inventory::submit! {
///     vc_persist::json::ConverterRegistration {
///         name: "ColorConverter",
///         target: vc_handler::NamedTarget::Exact("Color"),
///         create: ColorConverter::create,
///     }
/// }
/// ```
#[cfg(feature = "auto_register")]
pub struct ConverterRegistration {
    pub name: &'static str,
    pub target: vc_handler::NamedTarget,
    pub create: CreateConverter,
}

#[cfg(feature = "auto_register")]
inventory::collect!(ConverterRegistration);

#[cfg(test)]
mod tests {
    use super::JsonTokenSerializer;
    use crate::{ListReferenceStore, SerializeError, TokenSerializer};
    use alloc::string::String;
    use alloc::vec::Vec;
    use vc_meta::{ExternalRef, InspectorSettings, MemberDef, MetaError, TypeDef};
    use vc_meta::{TypeMetadataCache, TypeUniverse, Value};

    fn setup() -> (TypeMetadataCache, JsonTokenSerializer) {
        let universe = TypeUniverse::new();
        let b = *universe.builtins();
        let grid = universe.array_of(universe.array_of(b.i32));
        universe.define(TypeDef::class("Shape").abstract_type()).unwrap();
        universe
            .define(
                TypeDef::class("Circle")
                    .extends("Shape")
                    .member(MemberDef::field("r", "f64")),
            )
            .unwrap();
        universe.define(TypeDef::class("Weapon")).unwrap();
        universe.define(TypeDef::external("Texture")).unwrap();
        universe
            .define(
                TypeDef::class("Holder")
                    .member(MemberDef::field("shape", "Shape"))
                    .member(MemberDef::field("grid", grid))
                    .member(MemberDef::field("skin", "Texture"))
                    .member(MemberDef::field("letter", "char"))
                    .member(MemberDef::field("small", "i32")),
            )
            .unwrap();
        let serializer = JsonTokenSerializer::new(&universe);
        (TypeMetadataCache::new(universe, InspectorSettings::default()), serializer)
    }

    fn read(
        cache: &TypeMetadataCache,
        serializer: &JsonTokenSerializer,
        member: &str,
        token: &str,
    ) -> Result<Value, SerializeError> {
        let holder = cache.universe().lookup("Holder").unwrap();
        let descriptor = cache.get(holder);
        let member = descriptor.member(member).unwrap();
        let mut list = Vec::new();
        serializer.deserialize(cache, member, token, &mut ListReferenceStore::new(&mut list))
    }

    #[test]
    fn nested_arrays() {
        let (cache, serializer) = setup();
        let value = read(&cache, &serializer, "grid", "[[1,2],[],[3]]").unwrap();
        let rows = value.as_seq().unwrap().items();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].as_seq().unwrap().items(), [Value::Int(1), Value::Int(2)]);
        assert!(rows[1].as_seq().unwrap().is_empty());

        let holder = cache.universe().lookup("Holder").unwrap();
        let descriptor = cache.get(holder);
        let member = descriptor.member("grid").unwrap();
        let mut list = Vec::new();
        let mut refs = ListReferenceStore::new(&mut list);
        let token = serializer.serialize(&cache, member, &value, &mut refs).unwrap();
        assert_eq!(token, "[[1,2],[],[3]]");
    }

    #[test]
    fn polymorphic_objects_need_a_known_assignable_type() {
        let (cache, serializer) = setup();
        let circle = read(&cache, &serializer, "shape", r#"{"$type":"Circle","r":2.0}"#).unwrap();
        assert_eq!(circle.as_object().unwrap().get("r"), Some(Value::Float(2.0)));

        assert_eq!(
            read(&cache, &serializer, "shape", r#"{"$type":"Weapon"}"#),
            Err(SerializeError::NotAssignable {
                expected: String::from("Shape"),
                found: String::from("Weapon"),
            })
        );
        assert_eq!(
            read(&cache, &serializer, "shape", r#"{"$type":"Square"}"#),
            Err(SerializeError::Meta(MetaError::UnknownType(String::from("Square"))))
        );
        // Without `$type` the declared abstract type would be created.
        assert!(matches!(
            read(&cache, &serializer, "shape", r#"{"r":2.0}"#),
            Err(SerializeError::Meta(MetaError::NotCreatable { .. }))
        ));
    }

    #[test]
    fn malformed_and_mistyped_tokens() {
        let (cache, serializer) = setup();
        assert!(matches!(read(&cache, &serializer, "small", "{"), Err(SerializeError::Json(_))));
        assert!(matches!(
            read(&cache, &serializer, "small", "4294967296"),
            Err(SerializeError::UnexpectedToken { .. })
        ));
        assert!(matches!(
            read(&cache, &serializer, "letter", "\"ab\""),
            Err(SerializeError::UnexpectedToken { .. })
        ));
        assert_eq!(read(&cache, &serializer, "letter", "\"b\""), Ok(Value::Char('b')));
    }

    #[test]
    fn external_objects_go_through_the_store() {
        let (cache, serializer) = setup();
        let holder = cache.universe().lookup("Holder").unwrap();
        let texture = cache.universe().lookup("Texture").unwrap();
        let descriptor = cache.get(holder);
        let skin = descriptor.member("skin").unwrap();
        let grass = ExternalRef::new(texture, "grass");

        let mut list = Vec::new();
        let mut store = ListReferenceStore::new(&mut list);
        let token = serializer.serialize(&cache, skin, &grass.clone().into(), &mut store).unwrap();
        assert_eq!(token, r#"{"$ref":0}"#);
        let back = serializer.deserialize(&cache, skin, &token, &mut store).unwrap();
        assert!(back.as_external().unwrap().ptr_eq(&grass));

        assert_eq!(
            read(&cache, &serializer, "skin", r#"{"$ref":3}"#),
            Err(SerializeError::MissingReference(3))
        );
    }
}
