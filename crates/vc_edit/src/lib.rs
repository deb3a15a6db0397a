//! Editors for inspected values, resolved per type through `vc_handler`.
//!
//! ## Menu
//!
//! - [`PropertyEditor`]: the editor handler family, `edit` and `measure`.
//! - [`EditContext`]: what editors share during one call: the metadata
//!   cache, the [`EditorRegistry`], the [`EditSurface`] and the recursion
//!   guards.
//! - [`editors`]: the built-in editors. [`ReflectedEditor`] is the fallback
//!   for objects, [`ContainerEditor`] for arrays and collections,
//!   [`AbstractTypeEditor`] picks a concrete type for polymorphic members.
//! - [`decorators`]: attribute-driven editors and their composition.
//! - [`default_editors`]: a registry with everything above.
//!
//! ## Recursion
//!
//! Editing an object edits its members, which may lead back to the same
//! object. Each [`CallKind`] keeps its own nesting depth and visited set;
//! an object met twice is drawn as [`CYCLE_LABEL`], and null references are
//! no longer instantiated past [`MAX_NESTING_DEPTH`](metrics::MAX_NESTING_DEPTH).
//!
//! [`ReflectedEditor`]: editors::ReflectedEditor
//! [`ContainerEditor`]: editors::ContainerEditor
//! [`AbstractTypeEditor`]: editors::AbstractTypeEditor
//! [`CYCLE_LABEL`]: editors::CYCLE_LABEL
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod context;
mod editor;
mod registry;
mod surface;

pub mod decorators;
pub mod editors;
pub mod metrics;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use context::{CallKind, EditContext};
pub use editor::{CreateEditor, EditorChain, EditorRegistry, PropertyEditor};
pub use registry::{auto_register, default_editors};
pub use surface::{EditSurface, HeadlessSurface, NoteKind, SurfaceEvent};

#[cfg(feature = "auto_register")]
pub use registry::{DecoratorRegistration, EditorRegistration};

#[cfg(feature = "auto_register")]
pub use inventory;
