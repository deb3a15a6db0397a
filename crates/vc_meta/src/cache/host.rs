use crate::descriptor::MemberDescriptor;
use crate::info::TypeKind;
use crate::universe::{TypeKey, TypeUniverse};

// -----------------------------------------------------------------------------
// HostSerialization

/// Probe for members that the host already persists on its own.
///
/// Such members are left out of
/// [`TypeDescriptor::serialized_members`](crate::TypeDescriptor::serialized_members)
/// so that their data is not stored twice. The probe must be conservative:
/// returning `true` for a member the host cannot persist loses data.
pub trait HostSerialization {
    fn handles(&self, universe: &TypeUniverse, member: &MemberDescriptor) -> bool;
}

/// A host that persists nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHostSerialization;

impl HostSerialization for NoHostSerialization {
    #[inline]
    fn handles(&self, _: &TypeUniverse, _: &MemberDescriptor) -> bool {
        false
    }
}

/// A host that persists fields of simple types.
///
/// Handled are fields (never properties) whose storage type is a
/// primitive, a string, an external object, an array of a simple type or
/// a `List` of a simple type.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldHostSerialization;

impl FieldHostSerialization {
    // Strings are primitives in the universe.
    fn is_simple(universe: &TypeUniverse, ty: TypeKey) -> bool {
        matches!(universe.kind(ty), TypeKind::Primitive(_))
    }
}

impl HostSerialization for FieldHostSerialization {
    fn handles(&self, universe: &TypeUniverse, member: &MemberDescriptor) -> bool {
        if !member.is_field() {
            return false;
        }
        let ty = member.storage();
        if Self::is_simple(universe, ty) {
            return true;
        }
        if universe.is_assignable(universe.builtins().external_object, ty) {
            return true;
        }
        match universe.kind(ty) {
            TypeKind::Array { element } => Self::is_simple(universe, element),
            _ => {
                universe.generic_definition(ty) == Some(universe.builtins().list)
                    && universe
                        .generic_arguments(ty)
                        .first()
                        .is_some_and(|&arg| Self::is_simple(universe, arg))
            }
        }
    }
}
