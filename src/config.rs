use alloc::string::String;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};
use vc_meta::InspectorSettings;

// -----------------------------------------------------------------------------
// InspectorConfig

/// Startup configuration of an [`Inspector`](crate::Inspector).
///
/// Every field has a default, so hosts can load partial documents.
///
/// # Examples
///
/// ```
/// use vc_inspect::InspectorConfig;
///
/// let config: InspectorConfig = ron::from_str(
///     r#"(
///         settings: (emit_warnings: true),
///         removals: [(ty: "Actor", member: "handle")],
///     )"#,
/// ).unwrap();
///
/// assert!(config.settings.emit_warnings);
/// assert_eq!(config.removals[0].member, "handle");
/// assert!(!config.host_serializes_fields);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectorConfig {
    pub settings: InspectorSettings,
    /// Members removed from every layer at startup.
    pub removals: Vec<MemberRemoval>,
    /// The host persists simple fields itself, see
    /// [`FieldHostSerialization`](vc_meta::cache::FieldHostSerialization).
    pub host_serializes_fields: bool,
}

/// One member to remove from a type and the types deriving from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRemoval {
    pub ty: String,
    pub member: String,
}

impl MemberRemoval {
    pub fn new(ty: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            member: member.into(),
        }
    }
}
