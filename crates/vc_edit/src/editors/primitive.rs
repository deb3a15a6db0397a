use alloc::rc::Rc;
use alloc::string::String;

use vc_handler::{Handler, HandlerError, HandlerRequest};
use vc_meta::info::PrimitiveKind;
use vc_meta::{TypeKey, Value};

use crate::metrics::LINE_HEIGHT;
use crate::{EditContext, PropertyEditor};

/// Edits `bool` with a toggle and the other primitives with a field.
///
/// Field input that does not fit the type is discarded.
#[derive(Debug)]
pub struct PrimitiveEditor {
    ty: TypeKey,
    kind: PrimitiveKind,
}

impl PrimitiveEditor {
    pub fn create(request: &HandlerRequest<'_>) -> Result<Rc<dyn PropertyEditor>, HandlerError> {
        let kind = request
            .cache
            .universe()
            .primitive_kind(request.ty)
            .ok_or_else(|| HandlerError::Construction {
                handler: String::from("PrimitiveEditor"),
                message: request.cache.universe().name(request.ty),
            })?;
        Ok(Rc::new(Self {
            ty: request.ty,
            kind,
        }))
    }
}

impl Handler for PrimitiveEditor {}

impl PropertyEditor for PrimitiveEditor {
    fn edit(&self, cx: &mut EditContext<'_>, label: &str, value: Value) -> Value {
        if self.kind == PrimitiveKind::Bool {
            let current = value.as_bool().unwrap_or_default();
            return Value::Bool(cx.surface().toggle(label, current));
        }

        let edited = cx.surface().field(label, value.clone());
        if cx.cache().universe().value_fits(self.ty, &edited) {
            return edited;
        }
        if cx.cache().settings().emit_warnings {
            log::warn!(
                "Rejected input for `{label}`: not a `{}`",
                cx.cache().universe().name(self.ty)
            );
        }
        value
    }

    fn measure(&self, _cx: &mut EditContext<'_>, _label: &str, _value: &Value) -> f32 {
        LINE_HEIGHT
    }
}

#[cfg(test)]
mod tests {
    use crate::{EditContext, EditorRegistry, HeadlessSurface, SurfaceEvent};
    use vc_handler::HandlerTarget;
    use vc_meta::{InspectorSettings, TypeMetadataCache, TypeUniverse, Value};

    use super::PrimitiveEditor;
    use alloc::rc::Rc;

    fn registry(cache: &TypeMetadataCache) -> EditorRegistry {
        let b = *cache.universe().builtins();
        let mut editors = EditorRegistry::new();
        for ty in [b.bool, b.i32, b.string] {
            editors.register(
                cache.universe(),
                "primitive",
                HandlerTarget::Exact(ty),
                Rc::new(PrimitiveEditor::create),
            );
        }
        editors
    }

    #[test]
    fn fields_are_type_checked() {
        let cache = TypeMetadataCache::new(TypeUniverse::new(), InspectorSettings::default());
        let b = *cache.universe().builtins();
        let editors = registry(&cache);
        let mut surface = HeadlessSurface::new();
        surface
            .set_field("Count", "many")
            .set_field("Count", i64::MAX)
            .set_field("Count", 4)
            .set_toggle("Flag", true);
        let mut cx = EditContext::new(&cache, &editors, &mut surface);

        assert_eq!(cx.edit(b.i32, "Count", Value::Int(1)), Value::Int(1));
        assert_eq!(cx.edit(b.i32, "Count", Value::Int(1)), Value::Int(1));
        assert_eq!(cx.edit(b.i32, "Count", Value::Int(1)), Value::Int(4));
        assert_eq!(cx.edit(b.bool, "Flag", Value::Null), Value::Bool(true));
        assert_eq!(cx.measure(b.string, "Name", &Value::Null), crate::metrics::LINE_HEIGHT);
        drop(cx);

        assert_eq!(
            surface.events().last(),
            Some(&SurfaceEvent::Toggle {
                label: "Flag".into(),
                value: false
            })
        );
    }
}
