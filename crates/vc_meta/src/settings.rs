use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------------
// InspectorSettings

/// Runtime switches consumed by the metadata, editing and persistence layers.
///
/// Hosts usually load this from a config file; every field has a default,
/// so partial documents are accepted.
///
/// # Examples
///
/// ```
/// use vc_meta::InspectorSettings;
///
/// let settings = InspectorSettings::default();
/// assert!(!settings.emit_warnings);
/// assert_eq!(settings.max_instantiation_depth, 15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectorSettings {
    /// Emit warnings for possible data loss, such as a renamed or removed
    /// member, or a failed member access.
    pub emit_warnings: bool,
    /// Instantiate null class-typed members after restoring an object
    /// that had no stored state.
    pub auto_instantiate_references: bool,
    /// Instantiate null class-typed members when the reflected editor
    /// encounters them.
    pub inspector_auto_instantiate: bool,
    /// Show public members that carry no explicit visibility attribute.
    pub show_public_members: bool,
    /// Maximum recursion depth of automatic instantiation.
    pub max_instantiation_depth: usize,
}

impl Default for InspectorSettings {
    fn default() -> Self {
        Self {
            emit_warnings: false,
            auto_instantiate_references: false,
            inspector_auto_instantiate: true,
            show_public_members: true,
            max_instantiation_depth: 15,
        }
    }
}
