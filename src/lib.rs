#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

extern crate alloc;

mod config;
mod inspector;

pub use config::{InspectorConfig, MemberRemoval};
pub use inspector::Inspector;

pub use vc_edit as edit;
pub use vc_handler as handler;
pub use vc_meta as meta;
pub use vc_persist as persist;

#[cfg(all(test, feature = "json"))]
mod tests {
    use crate::{Inspector, InspectorConfig, MemberRemoval};
    use alloc::borrow::ToOwned;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;
    use vc_edit::HeadlessSurface;
    use vc_meta::{InspectorSettings, MemberDef, ObjectRef, TypeDef, TypeUniverse, Value};
    use vc_persist::{Persisted, SerializedObject};

    fn universe() -> TypeUniverse {
        let universe = TypeUniverse::new();
        universe
            .define(
                TypeDef::class("Actor")
                    .member(MemberDef::field("handle", "i64"))
                    .member(MemberDef::field("name", "string")),
            )
            .unwrap();
        universe
            .define(
                TypeDef::class("Player")
                    .extends("Actor")
                    .member(MemberDef::field("score", "i32")),
            )
            .unwrap();
        universe
    }

    fn names(inspector: &Inspector, ty: &str) -> Vec<String> {
        let ty = inspector.universe().lookup(ty).unwrap();
        inspector
            .cache()
            .get(ty)
            .members()
            .iter()
            .map(|m| m.name().to_owned())
            .collect()
    }

    #[cfg(feature = "auto_register")]
    vc_meta::inventory::submit! {
        vc_meta::TypeRegistration {
            name: "Badge",
            define: |universe: &TypeUniverse| {
                universe.define(TypeDef::class("Badge").member(MemberDef::field("level", "i32")))
            },
        }
    }

    #[cfg(feature = "auto_register")]
    #[test]
    fn submitted_types_are_defined() {
        let inspector = Inspector::initialize(TypeUniverse::new(), &InspectorConfig::default());
        assert_eq!(names(&inspector, "Badge"), ["level"]);
    }

    #[test]
    fn removals_survive_reset() {
        let config = InspectorConfig {
            // Derived first on purpose, and one unknown type.
            removals: vec![
                MemberRemoval::new("Player", "score"),
                MemberRemoval::new("Missing", "x"),
                MemberRemoval::new("Actor", "handle"),
            ],
            ..InspectorConfig::default()
        };
        let mut inspector = Inspector::initialize(universe(), &config);

        assert_eq!(names(&inspector, "Actor"), ["name"]);
        assert_eq!(names(&inspector, "Player"), ["name"]);

        inspector.reset();
        assert_eq!(names(&inspector, "Player"), ["name"]);
    }

    #[test]
    fn config_from_ron() {
        let config: InspectorConfig =
            ron::from_str(r#"(removals: [(ty: "Actor", member: "handle")])"#).unwrap();
        assert_eq!(config.settings, InspectorSettings::default());

        let inspector = Inspector::initialize(universe(), &config);
        assert_eq!(names(&inspector, "Player"), ["name", "score"]);
    }

    #[test]
    fn edit_save_and_restore() {
        let mut inspector = Inspector::initialize(universe(), &InspectorConfig::default());
        let player = inspector.universe().lookup("Player").unwrap();
        let object = inspector.cache().create_instance(player).unwrap();

        let mut surface = HeadlessSurface::new();
        surface.set_field("Score", 12).set_field("Name", "Ada");
        let edited = inspector.edit(&mut surface, player, "", object.clone());
        assert_eq!(edited, object);
        assert_eq!(surface.labels(), ["Handle", "Name", "Score"]);
        assert_eq!(inspector.measure(&mut surface, player, "", &object), 3.0 * 19.0);

        let mut persisted = Persisted::new(object.as_object().unwrap().clone());
        inspector.restore(&mut persisted);
        assert!(inspector.save(&mut persisted));
        assert!(inspector.is_modified(&persisted));
        inspector.mark_seen(&persisted);
        assert!(!inspector.is_modified(&persisted));

        let copy = ObjectRef::new(player);
        let mut target = Persisted::with_state(copy.clone(), persisted.state().clone());
        inspector.restore(&mut target);
        assert_eq!(copy.get("score"), Some(Value::Int(12)));
        assert_eq!(copy.get("name"), Some(Value::from("Ada")));
    }
}
