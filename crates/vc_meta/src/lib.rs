//! Runtime type metadata for inspection and persistence.
//!
//! ## Menu
//!
//! - [`TypeUniverse`]: the set of types known at runtime, including arrays and
//!   generic instances that are interned on demand.
//! - [`TypeDef`], [`MemberDef`], [`MethodDef`]: raw descriptions of types.
//! - [`Value`]: a dynamic value, objects are shared and identity-bearing.
//! - [`TypeMetadataCache`]: builds and memoizes a [`TypeDescriptor`] for every type,
//!   the ordered view of its inspectable and serializable members.
//! - [`InspectorSettings`]: runtime switches consumed by every layer.
//!
//! ## auto_register
//!
//! With the `auto_register` feature, types submitted through
//! [`TypeRegistration`] are defined by [`TypeUniverse::auto_register`].
//! Submissions are collected with the [`inventory`] crate.
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod settings;

pub mod attribute;
pub mod cache;
pub mod descriptor;
pub mod hash;
pub mod info;
pub mod universe;
pub mod value;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use attribute::{Attribute, Attributes};
pub use cache::{HostSerialization, TypeMetadataCache};
pub use descriptor::{MemberDescriptor, MethodDescriptor, TypeDescriptor, TypeShape};
pub use error::{AccessError, InvokeError, MetaError};
pub use info::{MemberDef, MemberFlags, MethodDef, TypeDef, TypeKind, TypeRef};
pub use settings::InspectorSettings;
pub use universe::{TypeKey, TypeUniverse};
pub use value::{ExternalRef, ObjectRef, SeqRef, Value};

#[cfg(feature = "auto_register")]
pub use universe::TypeRegistration;

#[cfg(feature = "auto_register")]
pub use inventory;
