use alloc::borrow::ToOwned;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::{Any, TypeId, type_name};
use core::cell::Cell;
use core::fmt;

use vc_meta::attribute::attribute_type_id;
use vc_meta::{Attribute, Attributes};

use crate::{Handler, HandlerError};

/// Builds a decorator bound to one attribute instance.
pub type DecoratorFactory<H> = Rc<dyn Fn(&Rc<dyn Attribute>) -> Result<Rc<H>, HandlerError>>;

struct DecoratorEntry<H: ?Sized> {
    name: String,
    attribute: TypeId,
    replace: bool,
    factory: DecoratorFactory<H>,
    disabled: Cell<bool>,
}

// -----------------------------------------------------------------------------
// DecoratorSet

/// The decorators selected for one member, in application order.
pub struct DecoratorSet<H: ?Sized> {
    pub decorators: Vec<Rc<H>>,
    /// `false` if any selected decorator replaces the primary handler.
    pub show_primary: bool,
}

impl<H: ?Sized> Clone for DecoratorSet<H> {
    fn clone(&self) -> Self {
        Self {
            decorators: self.decorators.clone(),
            show_primary: self.show_primary,
        }
    }
}

// -----------------------------------------------------------------------------
// DecoratorRegistry

/// Maps attribute types to decorator factories.
///
/// Misconfigured mappings are logged and ignored: a second mapping for
/// the same attribute type is rejected, and a mapping whose factory yields
/// a handler that is not a decorator is disabled on first use.
pub struct DecoratorRegistry<H: ?Sized> {
    entries: Vec<DecoratorEntry<H>>,
}

impl<H: ?Sized> Default for DecoratorRegistry<H> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ?Sized> DecoratorRegistry<H> {
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn contains(&self, attribute: TypeId) -> bool {
        self.entries.iter().any(|e| e.attribute == attribute)
    }
}

impl<H: ?Sized + Handler> DecoratorRegistry<H> {
    /// Maps the attribute type `attribute` to a decorator factory.
    ///
    /// With `replace`, the primary handler of a member carrying the
    /// attribute is not shown.
    pub fn register(
        &mut self,
        name: &str,
        attribute: TypeId,
        replace: bool,
        factory: DecoratorFactory<H>,
    ) -> bool {
        if self.contains(attribute) {
            log::error!("{}", HandlerError::DuplicateDecorator(name.to_owned()));
            return false;
        }
        self.entries.push(DecoratorEntry {
            name: name.to_owned(),
            attribute,
            replace,
            factory,
            disabled: Cell::new(false),
        });
        true
    }

    /// Typed form of [`register`](Self::register).
    pub fn register_attribute<A: Attribute>(
        &mut self,
        replace: bool,
        factory: impl Fn(&A) -> Rc<H> + 'static,
    ) -> bool {
        let name = type_name::<A>();
        self.register(
            name,
            TypeId::of::<A>(),
            replace,
            Rc::new(move |attribute: &Rc<dyn Attribute>| {
                let any: &dyn Any = &**attribute;
                any.downcast_ref::<A>()
                    .map(&factory)
                    .ok_or_else(|| HandlerError::Construction {
                        handler: String::from(name),
                        message: String::from("attribute type mismatch"),
                    })
            }),
        )
    }

    /// Builds the decorators for a member's attributes.
    ///
    /// Decorators are ordered by [`Attribute::order`] (unordered last);
    /// ties keep the declaration order of the attributes. Returns `None`
    /// if no attribute has a decorator.
    pub fn select(&self, attributes: &Attributes) -> Option<DecoratorSet<H>> {
        let mut selected: Vec<(f64, Rc<H>)> = Vec::new();
        let mut show_primary = true;

        for attribute in attributes.iter() {
            let id = attribute_type_id(&**attribute);
            let Some(entry) = self
                .entries
                .iter()
                .find(|e| e.attribute == id && !e.disabled.get())
            else {
                continue;
            };

            let handler = match (entry.factory)(attribute) {
                Ok(handler) => handler,
                Err(e) => {
                    log::error!("Decorator `{}` dropped: {e}", entry.name);
                    continue;
                }
            };
            if !handler.is_decorator() {
                log::error!("{}", HandlerError::NotADecorator(entry.name.clone()));
                entry.disabled.set(true);
                continue;
            }

            show_primary &= !entry.replace;
            selected.push((attribute.order().unwrap_or(f64::MAX), handler));
        }

        if selected.is_empty() {
            return None;
        }
        selected.sort_by(|a, b| a.0.total_cmp(&b.0));
        Some(DecoratorSet {
            decorators: selected.into_iter().map(|(_, handler)| handler).collect(),
            show_primary,
        })
    }
}

impl<H: ?Sized> fmt::Debug for DecoratorRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| (&e.name, e.replace, e.disabled.get())))
            .finish()
    }
}
