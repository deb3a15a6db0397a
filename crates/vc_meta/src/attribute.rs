//! Declarative annotations attached to types, members and methods.
//!
//! Attributes are plain Rust values implementing [`Attribute`]. They are
//! looked up by concrete type and keep their declaration order, so that
//! scans are stable.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;

// -----------------------------------------------------------------------------
// Attribute

/// A value that can be attached to a type, member or method.
pub trait Attribute: Any + fmt::Debug {
    /// Ordering hint used when several attribute-driven handlers apply to
    /// the same member. `None` sorts last.
    fn order(&self) -> Option<f64> {
        None
    }
}

/// Returns the concrete type of an attribute object.
#[inline]
pub fn attribute_type_id(attribute: &dyn Attribute) -> TypeId {
    let any: &dyn Any = attribute;
    any.type_id()
}

// -----------------------------------------------------------------------------
// Attributes

/// An ordered collection of attributes.
///
/// # Examples
///
/// ```
/// use vc_meta::Attributes;
/// use vc_meta::attribute::{InspectorOrder, SerializeField};
///
/// let attrs = Attributes::new()
///     .with(SerializeField)
///     .with(InspectorOrder(2.0));
///
/// assert!(attrs.contains::<SerializeField>());
/// assert_eq!(attrs.get::<InspectorOrder>().unwrap().0, 2.0);
/// ```
#[derive(Clone, Default)]
pub struct Attributes {
    items: Vec<Rc<dyn Attribute>>,
}

impl Attributes {
    /// Creates an empty [`Attributes`].
    #[inline]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Adds an attribute.
    ///
    /// An existing attribute of the same type is overwritten in place.
    #[inline]
    pub fn with<T: Attribute>(mut self, value: T) -> Self {
        self.insert(Rc::new(value));
        self
    }

    /// Adds a shared attribute, see [`Attributes::with`].
    pub fn insert(&mut self, value: Rc<dyn Attribute>) {
        let id = attribute_type_id(&*value);
        match self
            .items
            .iter_mut()
            .find(|item| attribute_type_id(&***item) == id)
        {
            Some(slot) => *slot = value,
            None => self.items.push(value),
        }
    }

    /// Returns the attribute of type `T`, if present.
    pub fn get<T: Attribute>(&self) -> Option<&T> {
        self.items.iter().find_map(|item| {
            let any: &dyn Any = &**item;
            any.downcast_ref::<T>()
        })
    }

    /// Returns the attribute with the given `TypeId`, if present.
    pub fn get_by_id(&self, id: TypeId) -> Option<&Rc<dyn Attribute>> {
        self.items
            .iter()
            .find(|item| attribute_type_id(&***item) == id)
    }

    /// Returns `true` if an attribute of type `T` is present.
    #[inline]
    pub fn contains<T: Attribute>(&self) -> bool {
        self.get_by_id(TypeId::of::<T>()).is_some()
    }

    /// Returns an iterator over the attributes in declaration order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Rc<dyn Attribute>> {
        self.items.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}

// -----------------------------------------------------------------------------
// Built-in attributes

/// Explicit ordering of members and methods. Members without it sort last.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InspectorOrder(pub f64);

impl InspectorOrder {
    /// The order of members declared without [`InspectorOrder`].
    pub const LAST: f64 = f64::MAX;

    /// Reads the order from a set of attributes.
    #[inline]
    pub fn of(attributes: &Attributes) -> f64 {
        attributes.get::<Self>().map_or(Self::LAST, |order| order.0)
    }
}

impl Attribute for InspectorOrder {}

/// Excludes a member from serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NonSerialized;
impl Attribute for NonSerialized {}

/// Excludes a member from serialization; an alias of [`NonSerialized`]
/// for members that host serializers must also skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotSerialized;
impl Attribute for NotSerialized {}

/// Includes a non-public member in serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializeField;
impl Attribute for SerializeField {}

/// Includes a member in serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Serializable;
impl Attribute for Serializable {}

/// Hides a member or method from editors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HideInInspector;
impl Attribute for HideInInspector {}

/// Shows a non-public member in editors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowInInspector;
impl Attribute for ShowInInspector {}

/// Exposes a method as an invokable button.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InspectorButton {
    /// Overrides the mapped method name when not empty.
    pub display_name: String,
}

impl InspectorButton {
    pub fn named(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
        }
    }
}

impl Attribute for InspectorButton {}

/// A tooltip shown next to a member label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tooltip(pub String);
impl Attribute for Tooltip {}

#[cfg(test)]
mod tests {
    use super::{Attribute, Attributes, InspectorOrder, NonSerialized, Tooltip};
    use alloc::string::String;

    #[derive(Debug)]
    struct Ordered(f64);

    impl Attribute for Ordered {
        fn order(&self) -> Option<f64> {
            Some(self.0)
        }
    }

    #[test]
    fn insert_overwrites_same_type() {
        let attrs = Attributes::new()
            .with(Tooltip(String::from("a")))
            .with(NonSerialized)
            .with(Tooltip(String::from("b")));

        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs.get::<Tooltip>().unwrap().0, "b");
        // Overwriting keeps the original position.
        assert!(attrs.iter().next().unwrap().order().is_none());
    }

    #[test]
    fn order_defaults_to_last() {
        let attrs = Attributes::new().with(Ordered(3.0));
        assert_eq!(InspectorOrder::of(&attrs), InspectorOrder::LAST);
        assert_eq!(attrs.iter().next().unwrap().order(), Some(3.0));

        let attrs = attrs.with(InspectorOrder(-1.0));
        assert_eq!(InspectorOrder::of(&attrs), -1.0);
    }
}
