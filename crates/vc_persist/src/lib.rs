//! Persistence of inspected objects as lists of member tokens.
//!
//! ## Menu
//!
//! - [`SerializedState`]: parallel key and token lists plus the external
//!   objects they refer to, owned by a [`SerializedObject`].
//! - [`TokenSerializer`]: converts one member value to a string token and
//!   back. [`json::JsonTokenSerializer`] is the built-in one.
//! - [`ReferenceStore`]: side table for host-managed objects.
//! - [`SerializationStateManager`]: saves and restores whole objects,
//!   and instantiates null references of objects without stored state.
//! - [`ModificationDetector`]: tells whether a state changed since it was
//!   last seen.
//!
//! ## Failures
//!
//! A member that cannot be saved or restored is logged and skipped; the
//! rest of the object is still processed. Unknown keys are expected after
//! members are renamed, they only warn when `emit_warnings` is set.
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod detector;
mod error;
mod manager;
mod references;
mod serializer;
mod state;

#[cfg(feature = "json")]
pub mod json;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use detector::ModificationDetector;
pub use error::SerializeError;
pub use manager::SerializationStateManager;
pub use references::{ListReferenceStore, ReferenceStore};
pub use serializer::TokenSerializer;
pub use state::{Persisted, SerializedObject, SerializedState};

#[cfg(feature = "auto_register")]
pub use inventory;
