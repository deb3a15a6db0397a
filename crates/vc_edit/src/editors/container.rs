use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;

use vc_handler::{Handler, HandlerError, HandlerRequest};
use vc_meta::{TypeKey, Value};

use crate::metrics::{BUTTON_HEIGHT, DIVIDER_HEIGHT, LINE_HEIGHT};
use crate::{EditContext, PropertyEditor};

/// Edits arrays and collections element by element.
///
/// An "Add" button appends a default element: a new instance when the
/// element type can be created, its zero value otherwise.
#[derive(Debug)]
pub struct ContainerEditor {
    ty: TypeKey,
    element: TypeKey,
}

impl ContainerEditor {
    pub fn create(request: &HandlerRequest<'_>) -> Result<Rc<dyn PropertyEditor>, HandlerError> {
        let element = request
            .cache
            .get(request.ty)
            .element_type()
            .ok_or_else(|| HandlerError::Construction {
                handler: String::from("ContainerEditor"),
                message: format!(
                    "`{}` is not a container",
                    request.cache.universe().name(request.ty)
                ),
            })?;
        Ok(Rc::new(Self {
            ty: request.ty,
            element,
        }))
    }

    fn new_element(&self, cx: &EditContext<'_>) -> Value {
        let cache = cx.cache();
        cache
            .create_instance(self.element)
            .unwrap_or_else(|_| cache.zero_value(self.element))
    }
}

impl Handler for ContainerEditor {}

impl PropertyEditor for ContainerEditor {
    fn edit(&self, cx: &mut EditContext<'_>, label: &str, value: Value) -> Value {
        if !label.is_empty() {
            cx.surface().label(label);
        }

        let value = if value.is_null() {
            let name = cx.cache().universe().name(self.ty);
            let auto =
                cx.cache().settings().inspector_auto_instantiate && cx.should_auto_instantiate();
            if !auto && !cx.surface().button(&format!("Create {name}")) {
                return value;
            }
            match cx.cache().create_instance(self.ty) {
                Ok(created) => created,
                Err(e) => {
                    log::error!("{e}");
                    return value;
                }
            }
        } else {
            value
        };
        let Some(seq) = value.as_seq() else {
            return value;
        };

        for index in 0..seq.len() {
            let Some(item) = seq.get(index) else {
                break;
            };
            let updated = cx.edit(self.element, &format!("Element {index}"), item.clone());
            if updated != item {
                seq.set(index, updated);
            }
        }
        if cx.surface().button("Add") {
            seq.push(self.new_element(cx));
        }
        value
    }

    fn measure(&self, cx: &mut EditContext<'_>, label: &str, value: &Value) -> f32 {
        let mut height = if label.is_empty() { 0.0 } else { LINE_HEIGHT };
        match value.as_seq() {
            Some(seq) => {
                for (index, item) in seq.items().iter().enumerate() {
                    height += cx.measure(self.element, &format!("Element {index}"), item);
                    height += DIVIDER_HEIGHT;
                }
                height + BUTTON_HEIGHT
            }
            None => height + BUTTON_HEIGHT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ContainerEditor;
    use crate::editors::PrimitiveEditor;
    use crate::{EditContext, EditorRegistry, HeadlessSurface};
    use alloc::rc::Rc;
    use alloc::vec;
    use vc_handler::HandlerTarget;
    use vc_meta::{InspectorSettings, SeqRef, TypeMetadataCache, TypeUniverse, Value};

    fn setup(cache: &TypeMetadataCache) -> EditorRegistry {
        let b = *cache.universe().builtins();
        let mut editors = EditorRegistry::new();
        editors.register(
            cache.universe(),
            "int",
            HandlerTarget::Exact(b.i32),
            Rc::new(PrimitiveEditor::create),
        );
        editors.set_container(Rc::new(ContainerEditor::create));
        editors
    }

    #[test]
    fn edits_elements_and_adds() {
        let cache = TypeMetadataCache::new(TypeUniverse::new(), InspectorSettings::default());
        let b = *cache.universe().builtins();
        let list = cache.universe().instantiate(b.list, &[b.i32]).unwrap();
        let editors = setup(&cache);

        let seq = SeqRef::from_items(list, vec![Value::Int(1), Value::Int(2)]);
        let mut surface = HeadlessSurface::new();
        surface.set_field("Element 1", 20).press("Add");
        let mut cx = EditContext::new(&cache, &editors, &mut surface);

        let edited = cx.edit(list, "Scores", Value::Seq(seq.clone()));
        assert_eq!(edited, Value::Seq(seq.clone()));
        assert_eq!(seq.items(), [Value::Int(1), Value::Int(20), Value::Int(0)]);

        // Three elements, a divider each, a label and the add button.
        let height = cx.measure(list, "Scores", &edited);
        assert_eq!(height, 17.0 + 3.0 * (17.0 + 2.0) + 18.0);
        drop(cx);

        assert_eq!(
            surface.labels(),
            ["Scores", "Element 0", "Element 1", "Add"]
        );
    }

    #[test]
    fn null_containers_are_instantiated() {
        let cache = TypeMetadataCache::new(TypeUniverse::new(), InspectorSettings::default());
        let b = *cache.universe().builtins();
        let array = cache.universe().array_of(b.i32);
        let editors = setup(&cache);
        let mut surface = HeadlessSurface::new();
        let mut cx = EditContext::new(&cache, &editors, &mut surface);

        let created = cx.edit(array, "", Value::Null);
        assert!(created.as_seq().is_some_and(|seq| seq.ty() == array && seq.is_empty()));
    }
}
