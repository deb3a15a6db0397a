use alloc::vec::Vec;
use core::fmt;

use vc_edit::{EditContext, EditSurface, EditorRegistry, default_editors};
use vc_meta::cache::FieldHostSerialization;
use vc_meta::{InspectorSettings, TypeKey, TypeMetadataCache, TypeUniverse, Value};
use vc_persist::{SerializationStateManager, SerializedObject, TokenSerializer};

use crate::{InspectorConfig, MemberRemoval};

// -----------------------------------------------------------------------------
// Inspector

/// The process-wide inspection state: type metadata, editors and
/// persistence.
///
/// Built once by [`initialize`](Self::initialize) and read-only afterwards;
/// [`reset`](Self::reset) drops everything memoized, for test isolation.
pub struct Inspector {
    cache: TypeMetadataCache,
    editors: EditorRegistry,
    persistence: SerializationStateManager,
    removals: Vec<MemberRemoval>,
}

impl Inspector {
    /// Initializes with the JSON token serializer.
    #[cfg(feature = "json")]
    pub fn initialize(universe: TypeUniverse, config: &InspectorConfig) -> Self {
        Self::initialize_with(universe, config, vc_persist::json::JsonTokenSerializer::new)
    }

    /// Runs the startup scan, builds the editor registry and applies the
    /// configured removals.
    ///
    /// `serializer` is built after the scan, so it sees every registered type.
    pub fn initialize_with<S, F>(
        universe: TypeUniverse,
        config: &InspectorConfig,
        serializer: F,
    ) -> Self
    where
        S: TokenSerializer + 'static,
        F: FnOnce(&TypeUniverse) -> S,
    {
        let types = universe.auto_register();
        let editors = default_editors(&universe);
        let persistence = SerializationStateManager::new(serializer(&universe));

        let mut cache = TypeMetadataCache::new(universe, config.settings);
        if config.host_serializes_fields {
            cache = cache.with_host(FieldHostSerialization);
        }

        let inspector = Self {
            cache,
            editors,
            persistence,
            removals: config.removals.clone(),
        };
        let removed = inspector.apply_removals();
        log::debug!(
            "Inspector initialized: {types} registered types, {} editors, {removed} removals",
            inspector.editors.len(),
        );
        inspector
    }

    /// Drops memoized descriptors, chains and modification records, then
    /// applies the configured removals again.
    pub fn reset(&mut self) {
        self.cache.reset();
        self.editors.clear_cache();
        *self.persistence.detector_mut() = Default::default();
        let removed = self.apply_removals();
        log::debug!("Inspector reset, {removed} removals applied");
    }

    /// Removes the configured members, base types first.
    fn apply_removals(&self) -> usize {
        let universe = self.cache.universe();
        let mut resolved = Vec::with_capacity(self.removals.len());
        for removal in &self.removals {
            match universe.lookup(&removal.ty) {
                Some(ty) => resolved.push((ty, removal.member.as_str())),
                None => log::error!(
                    "Cannot remove `{}` from unknown type `{}`",
                    removal.member,
                    removal.ty
                ),
            }
        }
        resolved.sort_by_key(|&(ty, _)| universe.ancestors(ty).len());

        let mut count = 0;
        for (ty, member) in resolved {
            if self.cache.remove_member(ty, member) {
                count += 1;
            } else if self.settings().emit_warnings {
                log::warn!("`{}` has no member `{member}` to remove", universe.name(ty));
            }
        }
        count
    }

    // -------------------------------------------------------------------------
    // Accessors

    #[inline]
    pub fn cache(&self) -> &TypeMetadataCache {
        &self.cache
    }

    #[inline]
    pub fn universe(&self) -> &TypeUniverse {
        self.cache.universe()
    }

    #[inline]
    pub fn settings(&self) -> &InspectorSettings {
        self.cache.settings()
    }

    #[inline]
    pub fn editors(&self) -> &EditorRegistry {
        &self.editors
    }

    #[inline]
    pub fn editors_mut(&mut self) -> &mut EditorRegistry {
        &mut self.editors
    }

    #[inline]
    pub fn persistence(&self) -> &SerializationStateManager {
        &self.persistence
    }

    #[inline]
    pub fn persistence_mut(&mut self) -> &mut SerializationStateManager {
        &mut self.persistence
    }

    // -------------------------------------------------------------------------
    // Editing

    /// A context for several edits on one surface.
    #[inline]
    pub fn context<'a>(&'a self, surface: &'a mut dyn EditSurface) -> EditContext<'a> {
        EditContext::new(&self.cache, &self.editors, surface)
    }

    /// Edits `value` as a `ty`, returning the edited value.
    pub fn edit(
        &self,
        surface: &mut dyn EditSurface,
        ty: TypeKey,
        label: &str,
        value: Value,
    ) -> Value {
        self.context(surface).edit(ty, label, value)
    }

    pub fn measure(
        &self,
        surface: &mut dyn EditSurface,
        ty: TypeKey,
        label: &str,
        value: &Value,
    ) -> f32 {
        self.context(surface).measure(ty, label, value)
    }

    // -------------------------------------------------------------------------
    // Persistence

    #[inline]
    pub fn save(&self, object: &mut dyn SerializedObject) -> bool {
        self.persistence.save(&self.cache, object)
    }

    #[inline]
    pub fn restore(&self, object: &mut dyn SerializedObject) {
        self.persistence.restore(&self.cache, object);
    }

    #[inline]
    pub fn is_modified(&mut self, object: &dyn SerializedObject) -> bool {
        self.persistence.is_modified(object)
    }

    #[inline]
    pub fn mark_seen(&mut self, object: &dyn SerializedObject) {
        self.persistence.mark_seen(object);
    }
}

impl fmt::Debug for Inspector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inspector")
            .field("cache", &self.cache)
            .field("editors", &self.editors)
            .field("removals", &self.removals)
            .finish_non_exhaustive()
    }
}
