//! Dynamic values.
//!
//! Primitive values are stored inline. Objects, sequences and external
//! objects are shared handles: cloning a [`Value`] clones the handle, and
//! [`Value::identity`] tells two handles to the same instance apart from
//! two equal instances.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use crate::hash::HashMap;
use crate::universe::TypeKey;

// -----------------------------------------------------------------------------
// Value

/// A dynamically typed value.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    Str(String),
    Object(ObjectRef),
    Seq(SeqRef),
    External(ExternalRef),
}

impl Value {
    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[inline]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Object(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_seq(&self) -> Option<&SeqRef> {
        match self {
            Self::Seq(v) => Some(v),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_external(&self) -> Option<&ExternalRef> {
        match self {
            Self::External(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the identity of a shared instance, `None` for inline values.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Self::Object(v) => Some(v.identity()),
            Self::Seq(v) => Some(v.identity()),
            Self::External(v) => Some(v.identity()),
            _ => None,
        }
    }

    /// Returns the runtime type of a shared instance.
    ///
    /// Inline values do not carry a type; their type is the declared one.
    pub fn runtime_type(&self) -> Option<TypeKey> {
        match self {
            Self::Object(v) => Some(v.ty()),
            Self::Seq(v) => Some(v.ty()),
            Self::External(v) => Some(v.ty()),
            _ => None,
        }
    }

    /// Structural comparison, following objects and sequences.
    ///
    /// External objects compare by identity. Graphs deeper than an internal
    /// limit compare unequal, which also stops at cycles.
    pub fn deep_eq(&self, other: &Value) -> bool {
        const MAX_DEPTH: usize = 64;

        fn eq(a: &Value, b: &Value, depth: usize) -> bool {
            if depth > MAX_DEPTH {
                return false;
            }
            match (a, b) {
                (Value::Object(x), Value::Object(y)) => {
                    if x.ptr_eq(y) {
                        return true;
                    }
                    if x.ty() != y.ty() {
                        return false;
                    }
                    let xs = x.slots();
                    let ys = y.slots();
                    xs.len() == ys.len()
                        && xs.iter().all(|(name, value)| {
                            ys.iter()
                                .find(|(other, _)| other == name)
                                .is_some_and(|(_, v)| eq(value, v, depth + 1))
                        })
                }
                (Value::Seq(x), Value::Seq(y)) => {
                    if x.ptr_eq(y) {
                        return true;
                    }
                    let xs = x.items();
                    let ys = y.items();
                    x.ty() == y.ty()
                        && xs.len() == ys.len()
                        && xs.iter().zip(ys.iter()).all(|(a, b)| eq(a, b, depth + 1))
                }
                _ => a == b,
            }
        }

        eq(self, other, 0)
    }
}

/// Inline values compare by value, shared instances by identity.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.ptr_eq(b),
            (Self::Seq(a), Self::Seq(b)) => a.ptr_eq(b),
            (Self::External(a), Self::External(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(v) => write!(f, "Bool({v})"),
            Self::Int(v) => write!(f, "Int({v})"),
            Self::Float(v) => write!(f, "Float({v})"),
            Self::Char(v) => write!(f, "Char({v:?})"),
            Self::Str(v) => write!(f, "Str({v:?})"),
            Self::Object(v) => v.fmt(f),
            Self::Seq(v) => v.fmt(f),
            Self::External(v) => v.fmt(f),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(value as i64)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(String::from(value))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<ObjectRef> for Value {
    fn from(value: ObjectRef) -> Self {
        Self::Object(value)
    }
}

impl From<SeqRef> for Value {
    fn from(value: SeqRef) -> Self {
        Self::Seq(value)
    }
}

impl From<ExternalRef> for Value {
    fn from(value: ExternalRef) -> Self {
        Self::External(value)
    }
}

// -----------------------------------------------------------------------------
// ObjectRef

struct Object {
    ty: TypeKey,
    slots: HashMap<String, Value>,
}

/// A shared instance of a class or struct type.
///
/// Slots hold the values of slot-backed members, keyed by member name.
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<Object>>);

impl ObjectRef {
    /// Allocates an instance with no slots filled.
    pub fn new(ty: TypeKey) -> Self {
        Self(Rc::new(RefCell::new(Object {
            ty,
            slots: HashMap::default(),
        })))
    }

    #[inline]
    pub fn ty(&self) -> TypeKey {
        self.0.borrow().ty
    }

    /// Address-based identity, stable while the instance is alive.
    #[inline]
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Returns a clone of the slot value.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.borrow().slots.get(name).cloned()
    }

    /// Stores a slot value, returning the previous one.
    pub fn set(&self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.0.borrow_mut().slots.insert(name.into(), value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.borrow().slots.contains_key(name)
    }

    /// Returns a snapshot of all slots.
    pub fn slots(&self) -> Vec<(String, Value)> {
        self.0
            .borrow()
            .slots
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl fmt::Debug for ObjectRef {
    // Slots may point back to this object, so only the header is printed.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({:?} @ {:#x})", self.ty(), self.identity())
    }
}

// -----------------------------------------------------------------------------
// SeqRef

struct Seq {
    ty: TypeKey,
    items: Vec<Value>,
}

/// A shared instance of an array or collection type.
#[derive(Clone)]
pub struct SeqRef(Rc<RefCell<Seq>>);

impl SeqRef {
    /// Allocates an empty sequence.
    pub fn new(ty: TypeKey) -> Self {
        Self::from_items(ty, Vec::new())
    }

    pub fn from_items(ty: TypeKey, items: Vec<Value>) -> Self {
        Self(Rc::new(RefCell::new(Seq { ty, items })))
    }

    #[inline]
    pub fn ty(&self) -> TypeKey {
        self.0.borrow().ty
    }

    #[inline]
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.borrow().items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().items.get(index).cloned()
    }

    /// Replaces the item at `index`; out of range indices are ignored.
    pub fn set(&self, index: usize, value: Value) -> bool {
        match self.0.borrow_mut().items.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn push(&self, value: Value) {
        self.0.borrow_mut().items.push(value);
    }

    pub fn remove(&self, index: usize) -> Option<Value> {
        let mut seq = self.0.borrow_mut();
        (index < seq.items.len()).then(|| seq.items.remove(index))
    }

    /// Returns a snapshot of the items.
    pub fn items(&self) -> Vec<Value> {
        self.0.borrow().items.clone()
    }
}

impl fmt::Debug for SeqRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seq({:?}, len = {} @ {:#x})", self.ty(), self.len(), self.identity())
    }
}

// -----------------------------------------------------------------------------
// ExternalRef

struct ExternalObject {
    ty: TypeKey,
    name: String,
}

/// A host-managed object.
///
/// The lifetime and identity of external objects are owned by the host;
/// persistence refers to them through a reference store instead of
/// writing them into tokens.
#[derive(Clone)]
pub struct ExternalRef(Rc<ExternalObject>);

impl ExternalRef {
    pub fn new(ty: TypeKey, name: impl Into<String>) -> Self {
        Self(Rc::new(ExternalObject {
            ty,
            name: name.into(),
        }))
    }

    #[inline]
    pub fn ty(&self) -> TypeKey {
        self.0.ty
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    #[inline]
    pub fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ExternalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "External({:?}, {:?})", self.ty(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::{ObjectRef, SeqRef, Value};
    use crate::universe::TypeKey;
    use alloc::vec;

    #[test]
    fn shared_handles_compare_by_identity() {
        let a = ObjectRef::new(TypeKey::new(1));
        let b = ObjectRef::new(TypeKey::new(1));

        assert_eq!(Value::Object(a.clone()), Value::Object(a.clone()));
        assert_ne!(Value::Object(a.clone()), Value::Object(b.clone()));
        assert!(Value::Object(a).deep_eq(&Value::Object(b)));
    }

    #[test]
    fn deep_eq_follows_slots_and_stops_at_cycles() {
        let a = ObjectRef::new(TypeKey::new(1));
        let b = ObjectRef::new(TypeKey::new(1));
        a.set("x", Value::Int(1));
        b.set("x", Value::Int(1));
        assert!(Value::Object(a.clone()).deep_eq(&Value::Object(b.clone())));

        b.set("x", Value::Int(2));
        assert!(!Value::Object(a.clone()).deep_eq(&Value::Object(b.clone())));

        // a -> a, b -> b: structurally infinite, never equal, never overflows.
        a.set("x", Value::Object(a.clone()));
        b.set("x", Value::Object(b.clone()));
        assert!(!Value::Object(a).deep_eq(&Value::Object(b)));
    }

    #[test]
    fn seq_basic() {
        let seq = SeqRef::from_items(TypeKey::new(2), vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(seq.len(), 2);
        assert!(seq.set(1, Value::Int(5)));
        assert!(!seq.set(9, Value::Null));
        assert_eq!(seq.remove(0), Some(Value::Int(1)));
        assert_eq!(seq.items(), vec![Value::Int(5)]);
        assert_eq!(seq.remove(3), None);
    }
}
