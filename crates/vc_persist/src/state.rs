use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};
use vc_meta::{ExternalRef, ObjectRef, Value};

// -----------------------------------------------------------------------------
// SerializedState

/// The persisted form of one object: parallel lists of member names and
/// tokens, plus the external objects the tokens refer to.
///
/// `values[i]` is `None` when member `keys[i]` held null. The reference
/// list and the `restored` flag belong to the host and are skipped by
/// serde.
///
/// # Examples
///
/// ```
/// use vc_persist::SerializedState;
///
/// let state: SerializedState =
///     serde_json::from_str(r#"{"keys":["hp"],"values":["10"]}"#).unwrap();
/// assert_eq!(state.keys, ["hp"]);
/// assert!(!state.restored);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializedState {
    pub keys: Vec<String>,
    pub values: Vec<Option<String>>,
    #[serde(skip)]
    pub external_references: Vec<Option<ExternalRef>>,
    #[serde(skip)]
    pub restored: bool,
}

impl SerializedState {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the token stored for `key`.
    ///
    /// The outer `None` means the key is absent, the inner one a stored null.
    pub fn token(&self, key: &str) -> Option<Option<&str>> {
        let index = self.keys.iter().position(|k| k == key)?;
        Some(self.values.get(index)?.as_deref())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

// -----------------------------------------------------------------------------
// SerializedObject

/// An object that owns its persisted state.
pub trait SerializedObject {
    /// The instance whose members are persisted.
    fn target(&self) -> Value;

    fn state(&self) -> &SerializedState;

    fn state_mut(&mut self) -> &mut SerializedState;
}

/// Pairs an object with its [`SerializedState`].
#[derive(Debug, Clone)]
pub struct Persisted {
    object: ObjectRef,
    state: SerializedState,
}

impl Persisted {
    /// Wraps an object whose state has not been restored yet.
    #[inline]
    pub fn new(object: ObjectRef) -> Self {
        Self::with_state(object, SerializedState::new())
    }

    #[inline]
    pub fn with_state(object: ObjectRef, state: SerializedState) -> Self {
        Self { object, state }
    }

    #[inline]
    pub fn object(&self) -> &ObjectRef {
        &self.object
    }

    #[inline]
    pub fn into_state(self) -> SerializedState {
        self.state
    }
}

impl SerializedObject for Persisted {
    #[inline]
    fn target(&self) -> Value {
        Value::Object(self.object.clone())
    }

    #[inline]
    fn state(&self) -> &SerializedState {
        &self.state
    }

    #[inline]
    fn state_mut(&mut self) -> &mut SerializedState {
        &mut self.state
    }
}
