//! Resolution of pluggable handlers for types and members.
//!
//! A handler is anything that acts on values of a type pattern: editors
//! and token converters are both handler families built on this crate.
//!
//! ## Menu
//!
//! - [`Handler`]: the capability every handler family shares.
//! - [`HandlerRegistry`]: maps [`HandlerTarget`]s to factories and resolves
//!   a [`HandlerChain`] per type, most specific first.
//! - [`DecoratorRegistry`]: maps attribute types to decorator factories and
//!   selects the [`DecoratorSet`] layered in front of a member's chain.
//!
//! ## Resolution order
//!
//! 1. The chooser, for abstract types, interfaces and types with more than
//!    one creatable implementation.
//! 2. Handlers registered for the exact type.
//! 3. Handlers registered for the generic definition (or any array).
//! 4. Inheritable handlers registered for a base type or interface.
//! 5. The container or reflected fallback. For `Nullable<T>` the chain of
//!    `T` follows instead.
#![no_std]

// -----------------------------------------------------------------------------
// no_std support

#[cfg(feature = "std")]
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod chain;
mod decorator;
mod error;
mod handler;
mod registry;
mod target;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use chain::HandlerChain;
pub use decorator::{DecoratorFactory, DecoratorRegistry, DecoratorSet};
pub use error::HandlerError;
pub use handler::{Handler, HandlerKind};
pub use registry::{Composer, HandlerFactory, HandlerRegistry, HandlerRequest};
pub use target::{HandlerTarget, NamedTarget};
