use alloc::rc::Rc;

use vc_handler::HandlerTarget;
use vc_meta::TypeUniverse;

use crate::decorators::{compose, register_builtin_decorators};
use crate::editors::{AbstractTypeEditor, ContainerEditor, ExternalObjectEditor};
use crate::editors::{NullableEditor, PrimitiveEditor, ReflectedEditor};
use crate::EditorRegistry;

/// Builds the editor registry with every built-in editor and decorator,
/// followed by the statically submitted ones.
pub fn default_editors(universe: &TypeUniverse) -> EditorRegistry {
    let b = *universe.builtins();
    let mut editors = EditorRegistry::new();

    for ty in [b.bool, b.char, b.i32, b.i64, b.f32, b.f64, b.string] {
        editors.register(
            universe,
            "PrimitiveEditor",
            HandlerTarget::Exact(ty),
            Rc::new(PrimitiveEditor::create),
        );
    }
    editors.register(
        universe,
        "NullableEditor",
        HandlerTarget::Generic(b.nullable),
        Rc::new(NullableEditor::create),
    );
    editors.register(
        universe,
        "ExternalObjectEditor",
        HandlerTarget::Inherited(b.external_object),
        Rc::new(ExternalObjectEditor::create),
    );
    editors.set_reflected(Rc::new(ReflectedEditor::create));
    editors.set_container(Rc::new(ContainerEditor::create));
    editors.set_chooser(Rc::new(AbstractTypeEditor::create));
    editors.set_composer(Rc::new(compose));
    register_builtin_decorators(&mut editors);

    auto_register(universe, &mut editors);
    editors
}

// -----------------------------------------------------------------------------
// auto_register

/// Adds every editor and decorator submitted through [`EditorRegistration`]
/// and [`DecoratorRegistration`].
///
/// Returns the number of accepted registrations; always `0` without the
/// `auto_register` feature.
#[cfg_attr(not(feature = "auto_register"), inline(always))]
pub fn auto_register(universe: &TypeUniverse, editors: &mut EditorRegistry) -> usize {
    #[cfg(feature = "auto_register")]
    {
        let mut count = 0;
        for registration in inventory::iter::<EditorRegistration> {
            if editors.register_named(
                universe,
                registration.name,
                registration.target,
                Rc::new(registration.create),
            ) {
                count += 1;
            }
        }
        for registration in inventory::iter::<DecoratorRegistration> {
            let create = registration.create;
            if editors.decorators_mut().register(
                registration.name,
                (registration.attribute)(),
                registration.replace,
                Rc::new(create),
            ) {
                count += 1;
            }
        }
        log::debug!("Auto registered {count} editors");
        count
    }
    #[cfg(not(feature = "auto_register"))]
    {
        let _ = (universe, editors);
        0
    }
}

#[cfg(feature = "auto_register")]
pub use registration::{DecoratorRegistration, EditorRegistration};

#[cfg(feature = "auto_register")]
mod registration {
    use alloc::rc::Rc;
    use core::any::TypeId;

    use vc_handler::{HandlerError, NamedTarget};
    use vc_meta::Attribute;

    use crate::{CreateEditor, PropertyEditor};

    /// A statically submitted editor.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// vc_edit::inventory::submit! {
    ///     vc_edit::EditorRegistration {
    ///         name: "ColorEditor",
    ///         target: vc_handler::NamedTarget::Exact("Color"),
    ///         create: ColorEditor::create,
    ///     }
    /// }
    /// ```
    pub struct EditorRegistration {
        pub name: &'static str,
        pub target: NamedTarget,
        pub create: CreateEditor,
    }

    /// A statically submitted decorator for an attribute type.
    pub struct DecoratorRegistration {
        pub name: &'static str,
        pub attribute: fn() -> TypeId,
        /// Hides the primary editor of decorated members.
        pub replace: bool,
        pub create: fn(&Rc<dyn Attribute>) -> Result<Rc<dyn PropertyEditor>, HandlerError>,
    }

    inventory::collect!(EditorRegistration);
    inventory::collect!(DecoratorRegistration);
}

#[cfg(test)]
mod tests {
    use super::default_editors;
    use crate::decorators::AttributeEditor;
    use crate::editors::{AbstractTypeEditor, ContainerEditor, ExternalObjectEditor};
    use crate::editors::{NullableEditor, PrimitiveEditor, ReflectedEditor};
    use vc_handler::HandlerKind;
    use vc_meta::{InspectorSettings, MemberDef, TypeDef, TypeMetadataCache, TypeUniverse};

    #[test]
    fn builtin_chains() {
        let cache = TypeMetadataCache::new(TypeUniverse::new(), InspectorSettings::default());
        let universe = cache.universe();
        let b = *universe.builtins();
        let editors = default_editors(universe);

        let texture = universe.define(TypeDef::external("Texture")).unwrap();
        let nullable = universe.instantiate(b.nullable, &[b.f32]).unwrap();
        let list = universe.instantiate(b.list, &[b.string]).unwrap();
        let shape = universe.define(TypeDef::class("Shape").abstract_type()).unwrap();

        let first = |ty| editors.resolve(&cache, ty).unwrap().first().kind();
        assert_eq!(first(b.i64), HandlerKind::of::<PrimitiveEditor>());
        assert_eq!(first(nullable), HandlerKind::of::<NullableEditor>());
        assert_eq!(first(list), HandlerKind::of::<ContainerEditor>());
        assert_eq!(first(shape), HandlerKind::of::<AbstractTypeEditor>());

        // Reached through `ExternalObject`.
        let chain = editors.resolve(&cache, texture).unwrap();
        assert_eq!(chain.first().kind(), HandlerKind::of::<ExternalObjectEditor>());
        assert_eq!(chain.last().kind(), HandlerKind::of::<ReflectedEditor>());

        let ty = universe
            .define(TypeDef::class("Tagged").member(
                MemberDef::field("tag", "string").with_attribute(crate::decorators::Margin(1.0)),
            ))
            .unwrap();
        let member = cache.get(ty).member("tag").unwrap().clone();
        let chain = editors.resolve_member(&cache, &member).unwrap();
        assert_eq!(chain.first().kind(), HandlerKind::of::<AttributeEditor>());
    }
}
