use alloc::rc::Rc;
use alloc::string::String;

use vc_handler::{Handler, HandlerError, HandlerKind, HandlerRequest};
use vc_meta::{TypeKey, Value};

use crate::metrics::LINE_HEIGHT;
use crate::{EditContext, PropertyEditor};

/// Edits `Nullable<T>`: a toggle for presence, then the editor of `T`.
#[derive(Debug)]
pub struct NullableEditor {
    ty: TypeKey,
    inner: TypeKey,
}

impl NullableEditor {
    pub fn create(request: &HandlerRequest<'_>) -> Result<Rc<dyn PropertyEditor>, HandlerError> {
        let universe = request.cache.universe();
        let inner = universe
            .nullable_element(request.ty)
            .ok_or_else(|| HandlerError::Construction {
                handler: String::from("NullableEditor"),
                message: universe.name(request.ty),
            })?;
        Ok(Rc::new(Self {
            ty: request.ty,
            inner,
        }))
    }

    /// The editor this one wraps, from the chain of the nullable type.
    fn next(&self, cx: &EditContext<'_>) -> Option<Rc<dyn PropertyEditor>> {
        match cx.editors().resolve(cx.cache(), self.ty) {
            Ok(chain) => Some(chain.skip_until_not(&[HandlerKind::of::<Self>()]).clone()),
            Err(e) => {
                log::error!("{e}");
                None
            }
        }
    }
}

impl Handler for NullableEditor {}

impl PropertyEditor for NullableEditor {
    fn edit(&self, cx: &mut EditContext<'_>, label: &str, value: Value) -> Value {
        let present = !value.is_null();
        if !cx.surface().toggle(label, present) {
            return Value::Null;
        }

        let value = if present {
            value
        } else {
            cx.cache().create_instance(self.inner).unwrap_or_else(|e| {
                log::error!("{e}");
                Value::Null
            })
        };
        match self.next(cx) {
            Some(next) if !value.is_null() => next.edit(cx, "", value),
            _ => value,
        }
    }

    fn measure(&self, cx: &mut EditContext<'_>, _label: &str, value: &Value) -> f32 {
        let inner = match self.next(cx) {
            Some(next) if !value.is_null() => next.measure(cx, "", value),
            _ => 0.0,
        };
        LINE_HEIGHT + inner
    }
}
