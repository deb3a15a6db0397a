use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::attribute::{Attribute, Attributes};
use crate::info::TypeRef;
use crate::value::{ObjectRef, Value};

/// The body of a declared method.
pub type MethodBody = Rc<dyn Fn(&ObjectRef, &[Value]) -> Result<Value, String>>;

// -----------------------------------------------------------------------------
// MethodDef

/// A declared instance method.
#[derive(Clone)]
pub struct MethodDef {
    name: String,
    params: Vec<TypeRef>,
    is_static: bool,
    body: MethodBody,
    attributes: Attributes,
}

impl MethodDef {
    pub fn new(
        name: impl Into<String>,
        body: impl Fn(&ObjectRef, &[Value]) -> Result<Value, String> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            is_static: false,
            body: Rc::new(body),
            attributes: Attributes::new(),
        }
    }

    /// Appends a parameter.
    #[inline]
    pub fn param(mut self, ty: impl Into<TypeRef>) -> Self {
        self.params.push(ty.into());
        self
    }

    #[inline]
    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    #[inline]
    pub fn with_attribute<T: Attribute>(mut self, attribute: T) -> Self {
        self.attributes = self.attributes.with(attribute);
        self
    }

    pub(crate) fn substituted(&self, arguments: &[TypeRef]) -> Self {
        let mut method = self.clone();
        method.params = self.params.iter().map(|p| p.substitute(arguments)).collect();
        method
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn params(&self) -> &[TypeRef] {
        &self.params
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    #[inline]
    pub fn body(&self) -> &MethodBody {
        &self.body
    }

    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

impl fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDef")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("is_static", &self.is_static)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}
