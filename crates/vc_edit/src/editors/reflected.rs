use alloc::borrow::ToOwned;
use alloc::format;
use alloc::rc::Rc;

use vc_handler::{Handler, HandlerError, HandlerRequest};
use vc_meta::attribute::{HideInInspector, ShowInInspector};
use vc_meta::{InspectorSettings, MemberDescriptor, MethodDescriptor, TypeDescriptor};
use vc_meta::{TypeKey, Value};

use crate::context::CallKind;
use crate::metrics::{BUTTON_HEIGHT, DIVIDER_HEIGHT, LINE_HEIGHT};
use crate::{EditContext, PropertyEditor};

/// Text shown in place of an object already being edited further up.
pub const CYCLE_LABEL: &str = "<cycle>";

/// The fallback editor: edits every visible member of an object and shows
/// its buttons, interleaved by inspector order.
///
/// A null reference is replaced by a new instance when inspector
/// auto-instantiation is enabled and the nesting depth allows it;
/// otherwise a button offers to create one.
#[derive(Debug)]
pub struct ReflectedEditor {
    ty: TypeKey,
}

impl ReflectedEditor {
    pub fn create(request: &HandlerRequest<'_>) -> Result<Rc<dyn PropertyEditor>, HandlerError> {
        Ok(Rc::new(Self { ty: request.ty }))
    }

    /// Returns `true` if `member` is drawn.
    pub fn is_visible(member: &MemberDescriptor, settings: &InspectorSettings) -> bool {
        let attributes = member.attributes();
        if attributes.contains::<HideInInspector>() {
            return false;
        }
        if attributes.contains::<ShowInInspector>() {
            return true;
        }
        settings.show_public_members && member.is_public()
    }

    fn identity(&self, cx: &EditContext<'_>, value: &Value) -> Option<usize> {
        if cx.cache().universe().is_value_type(self.ty) {
            None
        } else {
            value.identity()
        }
    }

    fn can_auto_instantiate(cx: &EditContext<'_>, descriptor: &TypeDescriptor) -> bool {
        cx.cache().settings().inspector_auto_instantiate
            && descriptor.has_default_constructor()
            && cx.should_auto_instantiate()
    }

    fn instantiate(&self, cx: &EditContext<'_>) -> Option<Value> {
        match cx.cache().create_instance(self.ty) {
            Ok(value) => Some(value),
            Err(e) => {
                log::error!("{e}");
                None
            }
        }
    }

    fn edit_object(&self, cx: &mut EditContext<'_>, label: &str, value: Value) -> Value {
        if !label.is_empty() {
            cx.surface().label(label);
        }

        let descriptor = cx.cache().get(self.ty);
        let value = if value.is_null() {
            if Self::can_auto_instantiate(cx, &descriptor) {
                match self.instantiate(cx) {
                    Some(created) => created,
                    None => return value,
                }
            } else {
                let prompt = if descriptor.has_default_constructor() {
                    format!(
                        "{} reference is null; create instance with default constructor?",
                        descriptor.name()
                    )
                } else {
                    format!(
                        "{} reference is null and there is no default constructor; \
                         create unformatted instance?",
                        descriptor.name()
                    )
                };
                if cx.surface().button(&prompt) {
                    return self.instantiate(cx).unwrap_or(value);
                }
                return value;
            }
        } else {
            value
        };

        let settings = *cx.cache().settings();
        let members = descriptor.members();
        let buttons = descriptor.buttons();
        let (mut m, mut b) = (0, 0);
        while m < members.len() || b < buttons.len() {
            let button_first = match (members.get(m), buttons.get(b)) {
                (Some(member), Some(button)) => button.order() < member.order(),
                (None, Some(_)) => true,
                _ => false,
            };
            if button_first {
                Self::edit_button(cx, &value, &buttons[b]);
                b += 1;
            } else {
                if Self::is_visible(&members[m], &settings) {
                    cx.edit_member(&value, &members[m]);
                }
                m += 1;
            }
        }
        value
    }

    fn edit_button(cx: &mut EditContext<'_>, target: &Value, method: &MethodDescriptor) {
        let mut label = method.display_name().to_owned();
        if method.has_parameters() {
            label.push_str(" (Remove method parameters to enable this button)");
        }
        if cx.surface().button(&label) && !method.has_parameters() {
            method.invoke(cx.cache(), target);
        }
    }

    fn measure_object(&self, cx: &mut EditContext<'_>, label: &str, value: &Value) -> f32 {
        let mut height = if label.is_empty() { 0.0 } else { LINE_HEIGHT };

        let descriptor = cx.cache().get(self.ty);
        let created;
        let value = if value.is_null() {
            if !Self::can_auto_instantiate(cx, &descriptor) {
                return height + LINE_HEIGHT;
            }
            match self.instantiate(cx) {
                Some(value) => {
                    created = value;
                    &created
                }
                None => return height + LINE_HEIGHT,
            }
        } else {
            value
        };

        let settings = *cx.cache().settings();
        height += (BUTTON_HEIGHT + DIVIDER_HEIGHT) * descriptor.buttons().len() as f32;
        for member in descriptor.members() {
            if Self::is_visible(member, &settings) {
                height += cx.measure_member(value, member) + DIVIDER_HEIGHT;
            }
        }
        height
    }
}

impl Handler for ReflectedEditor {}

impl PropertyEditor for ReflectedEditor {
    fn edit(&self, cx: &mut EditContext<'_>, label: &str, value: Value) -> Value {
        let identity = self.identity(cx, &value);
        let result = if cx.enter(CallKind::Edit, identity) {
            self.edit_object(cx, label, value)
        } else {
            if !label.is_empty() {
                cx.surface().label(label);
            }
            cx.surface().label(CYCLE_LABEL);
            value
        };
        cx.exit(CallKind::Edit);
        result
    }

    fn measure(&self, cx: &mut EditContext<'_>, label: &str, value: &Value) -> f32 {
        let identity = self.identity(cx, value);
        let height = if cx.enter(CallKind::Measure, identity) {
            self.measure_object(cx, label, value)
        } else {
            LINE_HEIGHT
        };
        cx.exit(CallKind::Measure);
        height
    }
}

#[cfg(test)]
mod tests {
    use super::{CYCLE_LABEL, ReflectedEditor};
    use crate::editors::PrimitiveEditor;
    use crate::{EditContext, EditorRegistry, HeadlessSurface, SurfaceEvent};
    use alloc::rc::Rc;
    use alloc::string::String;
    use vc_handler::HandlerTarget;
    use vc_meta::attribute::{HideInInspector, InspectorButton, InspectorOrder, ShowInInspector};
    use vc_meta::{InspectorSettings, MemberDef, MethodDef, TypeDef, TypeKey};
    use vc_meta::{ObjectRef, TypeMetadataCache, TypeUniverse, Value};

    fn editors(cache: &TypeMetadataCache) -> EditorRegistry {
        let b = *cache.universe().builtins();
        let mut editors = EditorRegistry::new();
        for ty in [b.i32, b.string] {
            editors.register(
                cache.universe(),
                "primitive",
                HandlerTarget::Exact(ty),
                Rc::new(PrimitiveEditor::create),
            );
        }
        editors.set_reflected(Rc::new(ReflectedEditor::create));
        editors
    }

    fn player(cache: &TypeMetadataCache) -> TypeKey {
        cache
            .universe()
            .define(
                TypeDef::class("Player")
                    .member(MemberDef::field("hp", "i32"))
                    .member(MemberDef::field("secret", "i32").private())
                    .member(
                        MemberDef::field("shown", "i32")
                            .private()
                            .with_attribute(ShowInInspector),
                    )
                    .member(MemberDef::field("hidden", "i32").with_attribute(HideInInspector))
                    .member(MemberDef::field("name", "string").with_attribute(InspectorOrder(1.0)))
                    .method(
                        MethodDef::new("heal", |this, _| {
                            this.set("hp", Value::Int(100));
                            Ok(Value::Null)
                        })
                        .with_attribute(InspectorButton::default())
                        .with_attribute(InspectorOrder(0.0)),
                    ),
            )
            .unwrap()
    }

    #[test]
    fn members_and_buttons_follow_order_and_visibility() {
        let cache = TypeMetadataCache::new(TypeUniverse::new(), InspectorSettings::default());
        let ty = player(&cache);
        let editors = editors(&cache);

        let object = ObjectRef::new(ty);
        let value = Value::Object(object.clone());
        let mut surface = HeadlessSurface::new();
        surface.press("Heal").set_field("Hp", 7);
        let mut cx = EditContext::new(&cache, &editors, &mut surface);

        cx.edit(ty, "", value.clone());
        // The button ran before `hp` was edited.
        assert_eq!(object.get("hp"), Some(Value::Int(7)));

        // A label is not drawn, three members and one button are.
        let height = cx.measure(ty, "", &value);
        assert_eq!(height, (18.0 + 2.0) + 3.0 * (17.0 + 2.0));
        drop(cx);

        assert_eq!(surface.labels(), ["Heal", "Name", "Hp", "Shown"]);
    }

    #[test]
    fn cycles_are_shown_once() {
        let cache = TypeMetadataCache::new(TypeUniverse::new(), InspectorSettings::default());
        let ty = cache
            .universe()
            .define(TypeDef::class("Node").member(MemberDef::field("next", "Node")))
            .unwrap();
        let editors = editors(&cache);

        let node = ObjectRef::new(ty);
        node.set("next", Value::Object(node.clone()));
        let mut surface = HeadlessSurface::new();
        let mut cx = EditContext::new(&cache, &editors, &mut surface);

        let edited = cx.edit(ty, "Root", Value::Object(node.clone()));
        assert_eq!(edited, Value::Object(node));
        assert_eq!(cx.measure(ty, "", &edited), 17.0 + 2.0);
        drop(cx);

        assert_eq!(
            surface.events(),
            [
                SurfaceEvent::Label(String::from("Root")),
                SurfaceEvent::Label(String::from("Next")),
                SurfaceEvent::Label(String::from(CYCLE_LABEL)),
            ]
        );
    }

    #[test]
    fn null_self_reference_stops_at_max_depth() {
        let cache = TypeMetadataCache::new(TypeUniverse::new(), InspectorSettings::default());
        let ty = cache
            .universe()
            .define(TypeDef::class("Chain").member(MemberDef::field("next", "Chain")))
            .unwrap();
        let editors = editors(&cache);
        let mut surface = HeadlessSurface::new();
        let mut cx = EditContext::new(&cache, &editors, &mut surface);

        let mut current = cx.edit(ty, "", Value::Null);
        let mut depth = 0;
        while let Some(object) = current.as_object().cloned() {
            depth += 1;
            current = object.get("next").unwrap_or_default();
        }
        assert_eq!(depth, crate::metrics::MAX_NESTING_DEPTH - 1);
        drop(cx);

        let prompts = surface
            .labels()
            .into_iter()
            .filter(|label| label.starts_with("Chain reference is null"))
            .count();
        assert_eq!(prompts, 1);
    }

    #[test]
    fn disabled_auto_instantiation_offers_a_button() {
        let settings = InspectorSettings {
            inspector_auto_instantiate: false,
            ..InspectorSettings::default()
        };
        let cache = TypeMetadataCache::new(TypeUniverse::new(), settings);
        let ty = player(&cache);
        let editors = editors(&cache);
        let mut surface = HeadlessSurface::new();
        surface.press("Player reference is null; create instance with default constructor?");
        let mut cx = EditContext::new(&cache, &editors, &mut surface);

        let created = cx.edit(ty, "", Value::Null);
        assert!(created.as_object().is_some_and(|object| object.ty() == ty));
        assert_eq!(cx.edit(ty, "", Value::Null), Value::Null);
    }
}
