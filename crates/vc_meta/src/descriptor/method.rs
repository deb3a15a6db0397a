use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::attribute::{Attributes, InspectorButton, InspectorOrder};
use crate::cache::TypeMetadataCache;
use crate::descriptor::display_name;
use crate::info::{MethodBody, MethodDef};
use crate::universe::{TypeKey, TypeUniverse};
use crate::value::Value;
use crate::InvokeError;

// -----------------------------------------------------------------------------
// MethodDescriptor

/// An inspectable method.
///
/// Methods carrying [`InspectorButton`] are exposed as buttons. Methods
/// with parameters are listed but never invoked by [`invoke`](Self::invoke).
#[derive(Clone)]
pub struct MethodDescriptor {
    declaring: TypeKey,
    name: String,
    display_name: String,
    params: Vec<TypeKey>,
    order: f64,
    attributes: Attributes,
    body: MethodBody,
}

impl MethodDescriptor {
    pub(crate) fn new(declaring: TypeKey, def: &MethodDef, params: Vec<TypeKey>) -> Self {
        let display = match def.attributes().get::<InspectorButton>() {
            Some(button) if !button.display_name.is_empty() => button.display_name.clone(),
            _ => display_name(def.name()),
        };
        Self {
            declaring,
            name: String::from(def.name()),
            display_name: display,
            params,
            order: InspectorOrder::of(def.attributes()),
            attributes: def.attributes().clone(),
            body: def.body().clone(),
        }
    }

    #[inline]
    pub fn declaring(&self) -> TypeKey {
        self.declaring
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[inline]
    pub fn params(&self) -> &[TypeKey] {
        &self.params
    }

    #[inline]
    pub fn has_parameters(&self) -> bool {
        !self.params.is_empty()
    }

    #[inline]
    pub fn order(&self) -> f64 {
        self.order
    }

    #[inline]
    pub fn is_button(&self) -> bool {
        self.attributes.contains::<InspectorButton>()
    }

    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Invokes the method after checking the arguments.
    pub fn try_invoke(
        &self,
        universe: &TypeUniverse,
        target: &Value,
        args: &[Value],
    ) -> Result<Value, InvokeError> {
        if args.len() != self.params.len() {
            return Err(InvokeError::ArgumentCount {
                method: self.name.clone(),
                expected: self.params.len(),
                found: args.len(),
            });
        }
        if let Some(index) = self
            .params
            .iter()
            .zip(args)
            .position(|(&param, arg)| !universe.value_fits(param, arg))
        {
            return Err(InvokeError::ArgumentType {
                method: self.name.clone(),
                index,
            });
        }
        let object = target.as_object().ok_or_else(|| InvokeError::NotAnObject {
            method: self.name.clone(),
        })?;
        (self.body)(object, args).map_err(|message| InvokeError::Body {
            method: self.name.clone(),
            message,
        })
    }

    /// Invokes a parameterless method, as a button does.
    ///
    /// Methods with parameters are refused; failures are logged.
    pub fn invoke(&self, cache: &TypeMetadataCache, target: &Value) -> Option<Value> {
        if self.has_parameters() {
            if cache.settings().emit_warnings {
                log::warn!("Method `{}` takes parameters and cannot be invoked", self.name);
            }
            return None;
        }
        match self.try_invoke(cache.universe(), target, &[]) {
            Ok(value) => Some(value),
            Err(e) => {
                log::error!("{e}");
                None
            }
        }
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("declaring", &self.declaring)
            .field("name", &self.name)
            .field("params", &self.params)
            .field("order", &self.order)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::MethodDescriptor;
    use crate::attribute::InspectorButton;
    use crate::info::{MethodDef, TypeDef};
    use crate::universe::TypeUniverse;
    use crate::value::{ObjectRef, Value};
    use crate::InvokeError;
    use alloc::vec;

    #[test]
    fn invoke_checks_arguments() {
        let universe = TypeUniverse::new();
        let b = *universe.builtins();
        let ty = universe.define(TypeDef::class("Counter")).unwrap();

        let def = MethodDef::new("add", |this, args| {
            let current = this.get("n").and_then(|v| v.as_int()).unwrap_or(0);
            let delta = args[0].as_int().unwrap_or(0);
            this.set("n", Value::Int(current + delta));
            Ok(Value::Null)
        })
        .param("i32");
        let method = MethodDescriptor::new(ty, &def, vec![b.i32]);
        let target = Value::Object(ObjectRef::new(ty));

        assert!(method.has_parameters());
        assert!(matches!(
            method.try_invoke(&universe, &target, &[]),
            Err(InvokeError::ArgumentCount { expected: 1, found: 0, .. })
        ));
        assert!(matches!(
            method.try_invoke(&universe, &target, &[Value::Bool(true)]),
            Err(InvokeError::ArgumentType { index: 0, .. })
        ));
        method.try_invoke(&universe, &target, &[Value::Int(4)]).unwrap();
        assert_eq!(target.as_object().unwrap().get("n"), Some(Value::Int(4)));
    }

    #[test]
    fn button_display_name() {
        let ty = TypeUniverse::new().define(TypeDef::class("T")).unwrap();
        let named = MethodDef::new("resetAll", |_, _| Ok(Value::Null))
            .with_attribute(InspectorButton::named("Reset!"));
        let plain = MethodDef::new("resetAll", |_, _| Ok(Value::Null))
            .with_attribute(InspectorButton::default());

        assert_eq!(MethodDescriptor::new(ty, &named, vec![]).display_name(), "Reset!");
        assert_eq!(MethodDescriptor::new(ty, &plain, vec![]).display_name(), "Reset All");
        assert!(MethodDescriptor::new(ty, &plain, vec![]).is_button());
    }
}
