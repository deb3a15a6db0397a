use alloc::rc::Rc;

use vc_handler::{Handler, HandlerError, HandlerRequest};
use vc_meta::{TypeKey, Value};

use crate::metrics::LINE_HEIGHT;
use crate::{EditContext, PropertyEditor};

/// Edits a reference to a host-managed object as a single field.
///
/// Objects of an unrelated type are refused.
#[derive(Debug)]
pub struct ExternalObjectEditor {
    ty: TypeKey,
}

impl ExternalObjectEditor {
    pub fn create(request: &HandlerRequest<'_>) -> Result<Rc<dyn PropertyEditor>, HandlerError> {
        Ok(Rc::new(Self { ty: request.ty }))
    }
}

impl Handler for ExternalObjectEditor {}

impl PropertyEditor for ExternalObjectEditor {
    fn edit(&self, cx: &mut EditContext<'_>, label: &str, value: Value) -> Value {
        let edited = cx.surface().field(label, value.clone());
        let universe = cx.cache().universe();
        match &edited {
            Value::Null => edited,
            Value::External(object) if universe.is_assignable(self.ty, object.ty()) => edited,
            _ => {
                if cx.cache().settings().emit_warnings {
                    log::warn!("`{label}` only accepts `{}` objects", universe.name(self.ty));
                }
                value
            }
        }
    }

    fn measure(&self, _cx: &mut EditContext<'_>, _label: &str, _value: &Value) -> f32 {
        LINE_HEIGHT
    }
}
