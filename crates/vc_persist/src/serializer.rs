use alloc::string::String;

use vc_meta::{MemberDescriptor, TypeMetadataCache, Value};

use crate::{ReferenceStore, SerializeError};

/// Turns member values into string tokens and back.
///
/// The member gives the declared type; the value's runtime type may be
/// any type assignable to it. External objects go through `refs` rather
/// than into the token.
pub trait TokenSerializer {
    fn serialize(
        &self,
        cache: &TypeMetadataCache,
        member: &MemberDescriptor,
        value: &Value,
        refs: &mut dyn ReferenceStore,
    ) -> Result<String, SerializeError>;

    fn deserialize(
        &self,
        cache: &TypeMetadataCache,
        member: &MemberDescriptor,
        token: &str,
        refs: &mut dyn ReferenceStore,
    ) -> Result<Value, SerializeError>;
}
