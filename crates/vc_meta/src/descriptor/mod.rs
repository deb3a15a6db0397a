//! Cached, inspectable views of types, members and methods.

// -----------------------------------------------------------------------------
// Modules

mod display_name;
mod member;
mod method;
mod type_descriptor;

// -----------------------------------------------------------------------------
// Exports

pub use display_name::display_name;
pub use member::MemberDescriptor;
pub use method::MethodDescriptor;
pub use type_descriptor::{TypeDescriptor, TypeShape};
