//! Raw descriptions of types, members and methods.
//!
//! These are what the host declares. The inspectable view derived from
//! them lives in [`descriptor`](crate::descriptor).

// -----------------------------------------------------------------------------
// Modules

mod member_def;
mod method_def;
mod type_def;
mod type_ref;

// -----------------------------------------------------------------------------
// Exports

pub use member_def::{Accessor, Getter, MemberDef, MemberFlags, Setter};
pub use method_def::{MethodBody, MethodDef};
pub use type_def::{DefaultCtor, GenericInstance, InitFn, PrimitiveKind, TypeDef, TypeKind};
pub use type_ref::TypeRef;
