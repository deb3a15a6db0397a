use alloc::borrow::ToOwned;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use vc_meta::hash::HashSet;
use vc_meta::{TypeKey, TypeKind, TypeMetadataCache, Value};

use crate::{ListReferenceStore, ModificationDetector, SerializedObject, TokenSerializer};

// -----------------------------------------------------------------------------
// SerializationStateManager

/// Moves member values between objects and their [`SerializedState`].
///
/// Member failures never abort a save or a restore: they are logged and
/// the member is skipped.
///
/// [`SerializedState`]: crate::SerializedState
pub struct SerializationStateManager {
    serializer: Box<dyn TokenSerializer>,
    detector: ModificationDetector,
}

impl SerializationStateManager {
    pub fn new(serializer: impl TokenSerializer + 'static) -> Self {
        Self {
            serializer: Box::new(serializer),
            detector: ModificationDetector::new(),
        }
    }

    /// A manager using [`JsonTokenSerializer`](crate::json::JsonTokenSerializer)
    /// with the default converters.
    #[cfg(feature = "json")]
    pub fn json(universe: &vc_meta::TypeUniverse) -> Self {
        Self::new(crate::json::JsonTokenSerializer::new(universe))
    }

    #[inline]
    pub fn serializer(&self) -> &dyn TokenSerializer {
        &*self.serializer
    }

    #[inline]
    pub fn detector(&self) -> &ModificationDetector {
        &self.detector
    }

    #[inline]
    pub fn detector_mut(&mut self) -> &mut ModificationDetector {
        &mut self.detector
    }

    // -------------------------------------------------------------------------
    // Save

    /// Writes every serialized member of the object into its state.
    ///
    /// Objects that were never restored are left alone, so the state a host
    /// loaded is not overwritten by defaults. Returns `true` if the state
    /// was written.
    pub fn save(&self, cache: &TypeMetadataCache, object: &mut dyn SerializedObject) -> bool {
        if !object.state().restored {
            log::debug!("Skipping save of an object whose state was never restored");
            return false;
        }
        let target = object.target();
        let Some(ty) = target.runtime_type() else {
            log::error!("Cannot save a value without a runtime type");
            return false;
        };

        let descriptor = cache.get(ty);
        let members = descriptor.serialized_members();
        let mut references = Vec::new();
        let mut keys = Vec::with_capacity(members.len());
        let mut values = Vec::with_capacity(members.len());
        let mut refs = ListReferenceStore::new(&mut references);

        for member in members {
            let value = member.read(cache, &target);
            if value.is_null() {
                keys.push(member.name().to_owned());
                values.push(None);
                continue;
            }
            match self.serializer.serialize(cache, member, &value, &mut refs) {
                Ok(token) => {
                    keys.push(member.name().to_owned());
                    values.push(Some(token));
                }
                Err(e) => {
                    log::error!("Failed to save `{}.{}`: {e}", descriptor.name(), member.name());
                }
            }
        }

        let state = object.state_mut();
        state.keys = keys;
        state.values = values;
        state.external_references = references;
        true
    }

    // -------------------------------------------------------------------------
    // Restore

    /// Writes every stored token back into the object's members.
    ///
    /// - Keys naming no member are skipped, with a warning if
    ///   `emit_warnings` is set.
    /// - A token that fails to convert leaves its member untouched.
    /// - An empty state instantiates null references instead, when
    ///   `auto_instantiate_references` is set.
    ///
    /// The state is marked as restored in every case.
    pub fn restore(&self, cache: &TypeMetadataCache, object: &mut dyn SerializedObject) {
        let target = object.target();
        let settings = *cache.settings();
        let state = object.state_mut();

        if settings.emit_warnings && state.keys.len() != state.values.len() {
            log::warn!(
                "Stored state has {} keys but {} values; extra entries are ignored",
                state.keys.len(),
                state.values.len(),
            );
        }

        let Some(ty) = target.runtime_type() else {
            log::error!("Cannot restore a value without a runtime type");
            state.restored = true;
            return;
        };

        if state.keys.is_empty() {
            if settings.auto_instantiate_references {
                self.instantiate_references(cache, &target);
            }
            state.restored = true;
            return;
        }

        let descriptor = cache.get(ty);
        let mut refs = ListReferenceStore::new(&mut state.external_references);
        for (key, token) in state.keys.iter().zip(&state.values) {
            let Some(member) = descriptor.member(key) else {
                if settings.emit_warnings {
                    log::warn!(
                        "`{}` has no member `{key}`; its stored value is discarded",
                        descriptor.name(),
                    );
                }
                continue;
            };

            let value = match token.as_deref() {
                None | Some("") => Value::Null,
                Some(token) => match self.serializer.deserialize(cache, member, token, &mut refs) {
                    Ok(value) => value,
                    Err(e) => {
                        log::error!("Failed to restore `{}.{key}`: {e}", descriptor.name());
                        continue;
                    }
                },
            };
            member.write(cache, &target, value);
        }
        state.restored = true;
    }

    // -------------------------------------------------------------------------
    // Auto instantiation

    /// Fills null class-typed members of `target` with new instances,
    /// recursively.
    ///
    /// Recursion stops at `max_instantiation_depth` and never visits an
    /// instance twice. Collections are created empty and not descended
    /// into. Returns the number of instances created.
    pub fn instantiate_references(&self, cache: &TypeMetadataCache, target: &Value) -> usize {
        let mut visited = HashSet::default();
        Self::instantiate_at(cache, target, 0, &mut visited)
    }

    fn instantiate_at(
        cache: &TypeMetadataCache,
        target: &Value,
        depth: usize,
        visited: &mut HashSet<usize>,
    ) -> usize {
        let Some(object) = target.as_object() else {
            return 0;
        };
        if depth >= cache.settings().max_instantiation_depth || !visited.insert(object.identity()) {
            return 0;
        }
        let descriptor = cache.get(object.ty());
        if descriptor.is_collection() {
            return 0;
        }

        let mut created = 0;
        for member in descriptor.members() {
            let storage = member.storage();
            if !Self::is_instantiable(cache, storage) || !member.read(cache, target).is_null() {
                continue;
            }
            match cache.create_instance(storage) {
                Ok(instance) => {
                    if member.write(cache, target, instance.clone()) {
                        created += 1 + Self::instantiate_at(cache, &instance, depth + 1, visited);
                    }
                }
                Err(e) => log::warn!("Failed to instantiate `{}`: {e}", member.name()),
            }
        }
        created
    }

    fn is_instantiable(cache: &TypeMetadataCache, ty: TypeKey) -> bool {
        let universe = cache.universe();
        matches!(universe.kind(ty), TypeKind::Class | TypeKind::Array { .. })
            && !universe.is_abstract(ty)
            && !universe.is_generic_definition(ty)
            && !universe.is_delegate(ty)
            && cache.get(ty).has_default_constructor()
    }

    // -------------------------------------------------------------------------
    // Modification detection

    /// See [`ModificationDetector::is_modified`].
    #[inline]
    pub fn is_modified(&mut self, object: &dyn SerializedObject) -> bool {
        self.detector.is_modified(object)
    }

    /// See [`ModificationDetector::mark_seen`].
    #[inline]
    pub fn mark_seen(&mut self, object: &dyn SerializedObject) {
        self.detector.mark_seen(object);
    }
}

impl fmt::Debug for SerializationStateManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerializationStateManager")
            .field("detector", &self.detector)
            .finish_non_exhaustive()
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::SerializationStateManager;
    use crate::{Persisted, SerializedObject, SerializedState};
    use alloc::string::String;
    use alloc::vec;
    use vc_meta::{ExternalRef, InspectorSettings, MemberDef, ObjectRef, SeqRef, TypeDef};
    use vc_meta::{TypeKey, TypeMetadataCache, TypeUniverse, Value};

    struct World {
        cache: TypeMetadataCache,
        manager: SerializationStateManager,
        hero: TypeKey,
        node: TypeKey,
    }

    fn world(settings: InspectorSettings) -> World {
        let universe = TypeUniverse::new();
        let b = *universe.builtins();
        let tags = universe.instantiate(b.list, &[b.string]).unwrap();
        let shield = universe.instantiate(b.nullable, &[b.i32]).unwrap();
        let items = universe.instantiate(b.list, &[b.i32]).unwrap();

        universe
            .define(TypeDef::class("Weapon").member(MemberDef::field("damage", "i32")))
            .unwrap();
        universe
            .define(
                TypeDef::class("Animal")
                    .abstract_type()
                    .member(MemberDef::field("name", "string")),
            )
            .unwrap();
        universe
            .define(
                TypeDef::class("Cat")
                    .extends("Animal")
                    .member(MemberDef::field("lives", "i32")),
            )
            .unwrap();
        universe.define(TypeDef::external("Texture")).unwrap();
        let hero = universe
            .define(
                TypeDef::class("Hero")
                    .member(MemberDef::field("name", "string"))
                    .member(MemberDef::field("hp", "i32"))
                    .member(MemberDef::field("speed", "f32"))
                    .member(MemberDef::field("initial", "char"))
                    .member(MemberDef::field("tags", tags))
                    .member(MemberDef::field("weapon", "Weapon"))
                    .member(MemberDef::field("pet", "Animal"))
                    .member(MemberDef::field("skin", "Texture"))
                    .member(MemberDef::field("shield", shield))
                    .member(MemberDef::field("extra", "object"))
                    .member(MemberDef::field("secret", "i32").private()),
            )
            .unwrap();
        let node = universe
            .define(
                TypeDef::class("Node")
                    .member(MemberDef::field("next", "Node"))
                    .member(MemberDef::field("label", "string"))
                    .member(MemberDef::field("items", items))
                    .member(MemberDef::field("pet", "Animal")),
            )
            .unwrap();

        let manager = SerializationStateManager::json(&universe);
        World {
            cache: TypeMetadataCache::new(universe, settings),
            manager,
            hero,
            node,
        }
    }

    fn instance(cache: &TypeMetadataCache, name: &str) -> ObjectRef {
        let ty = cache.universe().lookup(name).unwrap();
        cache.create_instance(ty).unwrap().as_object().unwrap().clone()
    }

    fn restored(object: ObjectRef) -> Persisted {
        let mut persisted = Persisted::new(object);
        persisted.state_mut().restored = true;
        persisted
    }

    #[test]
    fn save_then_restore_reproduces_the_object() {
        let World { cache, manager, hero, .. } = world(InspectorSettings::default());
        let universe = cache.universe();
        let b = *universe.builtins();
        let texture = universe.lookup("Texture").unwrap();
        let grass = ExternalRef::new(texture, "grass");

        let weapon = instance(&cache, "Weapon");
        weapon.set("damage", Value::Int(12));
        let cat = instance(&cache, "Cat");
        cat.set("name", "Tom".into());
        cat.set("lives", Value::Int(9));

        let original = instance(&cache, "Hero");
        original.set("name", "Ada".into());
        original.set("hp", Value::Int(7));
        original.set("speed", Value::Float(1.5));
        original.set("initial", Value::Char('A'));
        let tags = universe.instantiate(b.list, &[b.string]).unwrap();
        original.set("tags", SeqRef::from_items(tags, vec!["a".into(), "b".into()]).into());
        original.set("weapon", weapon.into());
        original.set("pet", cat.into());
        original.set("skin", grass.clone().into());
        original.set("shield", Value::Int(3));
        original.set("extra", Value::Int(5));
        original.set("secret", Value::Int(42));

        let mut persisted = restored(original.clone());
        assert!(manager.save(&cache, &mut persisted));
        let state = persisted.into_state();

        assert_eq!(state.keys.len(), 10);
        assert_eq!(state.token("hp"), Some(Some("7")));
        assert_eq!(state.token("initial"), Some(Some("\"A\"")));
        assert_eq!(state.token("pet"), Some(Some(r#"{"$type":"Cat","lives":9,"name":"Tom"}"#)));
        assert_eq!(state.token("skin"), Some(Some(r#"{"$ref":0}"#)));
        assert_eq!(state.token("extra"), Some(Some(r#"{"$type":"i64","$value":5}"#)));
        assert_eq!(state.token("secret"), None);
        assert!(state.external_references[0].as_ref().unwrap().ptr_eq(&grass));

        let fresh = instance(&cache, "Hero");
        fresh.set("secret", Value::Int(42));
        let mut target = Persisted::with_state(fresh.clone(), state);
        manager.restore(&cache, &mut target);

        assert!(target.state().restored);
        assert_eq!(cache.get(hero).name(), "Hero");
        assert!(Value::Object(fresh).deep_eq(&Value::Object(original)));
    }

    #[test]
    fn unknown_keys_are_skipped() {
        let World { cache, manager, .. } = world(InspectorSettings {
            emit_warnings: true,
            ..InspectorSettings::default()
        });
        let state = SerializedState {
            keys: vec![String::from("title"), String::from("hp")],
            values: vec![Some(String::from("\"Ada\"")), Some(String::from("5"))],
            ..SerializedState::default()
        };
        let hero = instance(&cache, "Hero");
        let mut persisted = Persisted::with_state(hero.clone(), state);
        manager.restore(&cache, &mut persisted);

        assert!(persisted.state().restored);
        assert_eq!(hero.get("hp"), Some(Value::Int(5)));
        assert_eq!(hero.get("name"), Some(Value::Null));
    }

    #[test]
    fn extra_keys_are_ignored() {
        let World { cache, manager, .. } = world(InspectorSettings {
            emit_warnings: true,
            ..InspectorSettings::default()
        });
        let hero = instance(&cache, "Hero");
        hero.set("speed", Value::Float(1.5));

        let state = SerializedState {
            keys: vec![String::from("name"), String::from("hp"), String::from("speed")],
            values: vec![Some(String::from("\"Ada\"")), Some(String::from("5"))],
            ..SerializedState::default()
        };
        let mut persisted = Persisted::with_state(hero.clone(), state);
        manager.restore(&cache, &mut persisted);

        assert!(persisted.state().restored);
        assert_eq!(hero.get("name"), Some(Value::from("Ada")));
        assert_eq!(hero.get("hp"), Some(Value::Int(5)));
        assert_eq!(hero.get("speed"), Some(Value::Float(1.5)));
    }

    #[test]
    fn extra_values_are_ignored() {
        let World { cache, manager, .. } = world(InspectorSettings {
            emit_warnings: true,
            ..InspectorSettings::default()
        });
        let hero = instance(&cache, "Hero");

        let state = SerializedState {
            keys: vec![String::from("hp")],
            values: vec![Some(String::from("5")), Some(String::from("\"Ada\"")), None],
            ..SerializedState::default()
        };
        let mut persisted = Persisted::with_state(hero.clone(), state);
        manager.restore(&cache, &mut persisted);

        assert!(persisted.state().restored);
        assert_eq!(hero.get("hp"), Some(Value::Int(5)));
        assert_eq!(hero.get("name"), Some(Value::Null));
    }

    #[test]
    fn failed_tokens_keep_the_current_value() {
        let World { cache, manager, .. } = world(InspectorSettings::default());
        let hero = instance(&cache, "Hero");
        hero.set("hp", Value::Int(3));
        hero.set("weapon", instance(&cache, "Weapon").into());

        let state = SerializedState {
            keys: vec![String::from("hp"), String::from("weapon"), String::from("skin")],
            values: vec![Some(String::from("\"oops\"")), None, Some(String::from(r#"{"$ref":4}"#))],
            ..SerializedState::default()
        };
        let mut persisted = Persisted::with_state(hero.clone(), state);
        manager.restore(&cache, &mut persisted);

        assert_eq!(hero.get("hp"), Some(Value::Int(3)));
        assert_eq!(hero.get("weapon"), Some(Value::Null));
        assert_eq!(hero.get("skin"), Some(Value::Null));
    }

    #[test]
    fn unrestored_objects_are_not_saved() {
        let World { cache, manager, .. } = world(InspectorSettings::default());
        let mut persisted = Persisted::new(instance(&cache, "Hero"));
        assert!(!manager.save(&cache, &mut persisted));
        assert!(persisted.state().is_empty());
    }

    #[test]
    fn cyclic_members_are_skipped() {
        let World { cache, manager, .. } = world(InspectorSettings::default());
        let a = instance(&cache, "Node");
        let b = instance(&cache, "Node");
        a.set("next", b.clone().into());
        b.set("next", a.clone().into());
        a.set("label", "a".into());

        let mut persisted = restored(a);
        assert!(manager.save(&cache, &mut persisted));
        let state = persisted.state();
        assert_eq!(state.token("next"), None);
        assert_eq!(state.token("label"), Some(Some("\"a\"")));
        assert_eq!(state.token("pet"), Some(None));
    }

    #[test]
    fn modification_follows_saves() {
        let World { cache, mut manager, .. } = world(InspectorSettings::default());
        let hero = instance(&cache, "Hero");
        let mut persisted = restored(hero.clone());

        manager.save(&cache, &mut persisted);
        assert!(manager.is_modified(&persisted));
        manager.mark_seen(&persisted);
        assert!(!manager.is_modified(&persisted));

        manager.save(&cache, &mut persisted);
        assert!(!manager.is_modified(&persisted));

        hero.set("hp", Value::Int(99));
        manager.save(&cache, &mut persisted);
        assert!(manager.is_modified(&persisted));
    }

    #[test]
    fn empty_state_instantiates_references_up_to_the_depth_limit() {
        let settings = InspectorSettings {
            auto_instantiate_references: true,
            ..InspectorSettings::default()
        };
        let World { cache, manager, node, .. } = world(settings);
        let root = instance(&cache, "Node");
        let mut persisted = Persisted::new(root.clone());
        manager.restore(&cache, &mut persisted);
        assert!(persisted.state().restored);

        let mut chain = 0;
        let mut current = root;
        while let Some(Value::Object(next)) = current.get("next") {
            assert_eq!(next.ty(), node);
            assert!(matches!(current.get("items"), Some(Value::Seq(ref seq)) if seq.is_empty()));
            assert_eq!(current.get("pet"), Some(Value::Null));
            chain += 1;
            current = next;
        }
        assert_eq!(chain, settings.max_instantiation_depth);
        assert_eq!(current.get("items"), Some(Value::Null));
    }

    #[test]
    fn empty_state_without_auto_instantiation() {
        let World { cache, manager, .. } = world(InspectorSettings::default());
        let root = instance(&cache, "Node");
        let mut persisted = Persisted::new(root.clone());
        manager.restore(&cache, &mut persisted);

        assert!(persisted.state().restored);
        assert_eq!(root.get("next"), Some(Value::Null));
        assert_eq!(manager.instantiate_references(&cache, &Value::Object(root)), 30);
    }
}
