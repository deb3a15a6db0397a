use core::fmt;

use vc_meta::attribute::Tooltip;
use vc_meta::hash::HashSet;
use vc_meta::{MemberDescriptor, TypeKey, TypeMetadataCache, Value};

use crate::metrics::MAX_NESTING_DEPTH;
use crate::{EditSurface, EditorRegistry};

// -----------------------------------------------------------------------------
// CallKind

/// The kinds of recursive calls that are guarded independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    Edit,
    Measure,
}

impl CallKind {
    #[inline]
    const fn index(self) -> usize {
        match self {
            Self::Edit => 0,
            Self::Measure => 1,
        }
    }
}

#[derive(Default)]
struct Guard {
    depth: usize,
    visited: HashSet<usize>,
}

// -----------------------------------------------------------------------------
// EditContext

/// State shared by the editors of one top-level edit or measure call.
///
/// Each [`CallKind`] keeps a nesting depth and the identities of the
/// objects entered so far. Both are reset when the depth returns to zero,
/// so a context can be reused across frames.
pub struct EditContext<'a> {
    cache: &'a TypeMetadataCache,
    editors: &'a EditorRegistry,
    surface: &'a mut dyn EditSurface,
    guards: [Guard; 2],
}

impl<'a> EditContext<'a> {
    pub fn new(
        cache: &'a TypeMetadataCache,
        editors: &'a EditorRegistry,
        surface: &'a mut dyn EditSurface,
    ) -> Self {
        Self {
            cache,
            editors,
            surface,
            guards: Default::default(),
        }
    }

    #[inline]
    pub fn cache(&self) -> &'a TypeMetadataCache {
        self.cache
    }

    #[inline]
    pub fn editors(&self) -> &'a EditorRegistry {
        self.editors
    }

    #[inline]
    pub fn surface(&mut self) -> &mut (dyn EditSurface + 'a) {
        &mut *self.surface
    }

    /// Enters one nesting level of `kind`.
    ///
    /// Returns `false` if `identity` was already entered at an outer level,
    /// i.e. the object graph has a cycle. The level must be left with
    /// [`exit`](Self::exit) either way.
    pub fn enter(&mut self, kind: CallKind, identity: Option<usize>) -> bool {
        let guard = &mut self.guards[kind.index()];
        guard.depth += 1;
        identity.is_none_or(|id| guard.visited.insert(id))
    }

    pub fn exit(&mut self, kind: CallKind) {
        let guard = &mut self.guards[kind.index()];
        guard.depth = guard.depth.saturating_sub(1);
        if guard.depth == 0 {
            guard.visited.clear();
        }
    }

    #[inline]
    pub fn depth(&self, kind: CallKind) -> usize {
        self.guards[kind.index()].depth
    }

    /// Returns `false` once any call kind is nested too deep for null
    /// references to be instantiated automatically.
    pub fn should_auto_instantiate(&self) -> bool {
        self.guards.iter().all(|g| g.depth < MAX_NESTING_DEPTH)
    }

    /// Edits `value` with the most specific editor of `ty`.
    ///
    /// Without an editor the value is returned unchanged.
    pub fn edit(&mut self, ty: TypeKey, label: &str, value: Value) -> Value {
        match self.editors.resolve(self.cache, ty) {
            Ok(chain) => chain.first().clone().edit(self, label, value),
            Err(e) => {
                log::error!("{e}");
                value
            }
        }
    }

    /// Measures `value` with the most specific editor of `ty`.
    pub fn measure(&mut self, ty: TypeKey, label: &str, value: &Value) -> f32 {
        match self.editors.resolve(self.cache, ty) {
            Ok(chain) => chain.first().clone().measure(self, label, value),
            Err(e) => {
                log::error!("{e}");
                0.0
            }
        }
    }

    /// Edits one member of `target` and writes the result back if it changed.
    pub fn edit_member(&mut self, target: &Value, member: &MemberDescriptor) {
        let chain = match self.editors.resolve_member(self.cache, member) {
            Ok(chain) => chain,
            Err(e) => {
                log::error!("{e}");
                return;
            }
        };
        if let Some(tooltip) = member.attributes().get::<Tooltip>() {
            self.surface.tooltip(&tooltip.0);
        }

        let current = member.read(self.cache, target);
        let updated = chain
            .first()
            .clone()
            .edit(self, member.display_name(), current.clone());
        if updated != current {
            member.write(self.cache, target, updated);
        }
    }

    /// Measures one member of `target`.
    pub fn measure_member(&mut self, target: &Value, member: &MemberDescriptor) -> f32 {
        match self.editors.resolve_member(self.cache, member) {
            Ok(chain) => {
                let current = member.read(self.cache, target);
                chain
                    .first()
                    .clone()
                    .measure(self, member.display_name(), &current)
            }
            Err(e) => {
                log::error!("{e}");
                0.0
            }
        }
    }
}

impl fmt::Debug for EditContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditContext")
            .field("edit_depth", &self.depth(CallKind::Edit))
            .field("measure_depth", &self.depth(CallKind::Measure))
            .finish_non_exhaustive()
    }
}
