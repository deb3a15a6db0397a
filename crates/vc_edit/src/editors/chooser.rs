use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use vc_handler::{Handler, HandlerError, HandlerKind, HandlerRequest};
use vc_meta::{TypeKey, Value};

use crate::metrics::LINE_HEIGHT;
use crate::{EditContext, PropertyEditor};

/// Lets the user pick the concrete type of an abstract, interface or
/// polymorphic member, then edits the instance with the editor of its
/// runtime type.
#[derive(Debug)]
pub struct AbstractTypeEditor {
    options: Vec<TypeKey>,
    names: Vec<String>,
}

impl AbstractTypeEditor {
    pub fn create(request: &HandlerRequest<'_>) -> Result<Rc<dyn PropertyEditor>, HandlerError> {
        let universe = request.cache.universe();
        let options = universe.creatable_types_deriving(request.ty);
        let names = options.iter().map(|&ty| universe.name(ty)).collect();
        Ok(Rc::new(Self { options, names }))
    }

    /// The types offered, in display order.
    #[inline]
    pub fn options(&self) -> &[TypeKey] {
        &self.options
    }

    fn selected(&self, value: &Value) -> Option<usize> {
        let ty = value.runtime_type()?;
        self.options.iter().position(|&option| option == ty)
    }

    /// The editor of the runtime type that is not a chooser.
    fn next(cx: &EditContext<'_>, value: &Value) -> Option<Rc<dyn PropertyEditor>> {
        let ty = value.runtime_type()?;
        match cx.editors().resolve(cx.cache(), ty) {
            Ok(chain) => Some(chain.skip_until_not(&[HandlerKind::of::<Self>()]).clone()),
            Err(e) => {
                log::error!("{e}");
                None
            }
        }
    }
}

impl Handler for AbstractTypeEditor {}

impl PropertyEditor for AbstractTypeEditor {
    fn edit(&self, cx: &mut EditContext<'_>, label: &str, value: Value) -> Value {
        let selected = self.selected(&value);
        let chosen = cx.surface().choose(label, &self.names, selected);

        let value = match chosen {
            _ if chosen == selected => value,
            None => Value::Null,
            Some(index) => match self.options.get(index) {
                Some(&ty) => match cx.cache().create_instance(ty) {
                    Ok(created) => created,
                    Err(e) => {
                        log::error!("{e}");
                        value
                    }
                },
                None => {
                    log::error!("Choice {index} of `{label}` is out of range");
                    value
                }
            },
        };

        match Self::next(cx, &value) {
            Some(next) => next.edit(cx, "", value),
            None => value,
        }
    }

    fn measure(&self, cx: &mut EditContext<'_>, _label: &str, value: &Value) -> f32 {
        let inner = match Self::next(cx, value) {
            Some(next) => next.measure(cx, "", value),
            None => 0.0,
        };
        LINE_HEIGHT + inner
    }
}
