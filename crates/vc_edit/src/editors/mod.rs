//! Built-in editors.

mod chooser;
mod container;
mod external;
mod nullable;
mod primitive;
mod reflected;

pub use chooser::AbstractTypeEditor;
pub use container::ContainerEditor;
pub use external::ExternalObjectEditor;
pub use nullable::NullableEditor;
pub use primitive::PrimitiveEditor;
pub use reflected::{CYCLE_LABEL, ReflectedEditor};
