use vc_meta::hash::{HashMap, stable_hash};
use vc_meta::{ExternalRef, Value};

use crate::{SerializedObject, SerializedState};

const SEED: i32 = 27;
const FACTOR: i32 = 13;

// -----------------------------------------------------------------------------
// ModificationDetector

/// Tells whether an object's persisted state changed since it was last
/// marked as seen.
///
/// The state is reduced to a hash over its reference ids, keys and non-null
/// values. External objects get sequential ids, starting at `1`, the first
/// time they are hashed.
///
/// Records are keyed by the identity of the persisted object. The detector
/// holds the marked objects and the hashed external objects, so no identity
/// it knows can be reused; [`forget`](Self::forget) releases a record.
#[derive(Debug, Default)]
pub struct ModificationDetector {
    records: HashMap<usize, (Value, i32)>,
    ids: HashMap<usize, (ExternalRef, i32)>,
}

impl ModificationDetector {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `object` was never marked, or its state hashes
    /// differently than when it was.
    ///
    /// Objects without identity are always modified.
    pub fn is_modified(&mut self, object: &dyn SerializedObject) -> bool {
        let Some(identity) = object.target().identity() else {
            return true;
        };
        let hash = self.hash(object.state());
        self.records.get(&identity).map(|(_, seen)| *seen) != Some(hash)
    }

    /// Records the current state of `object`.
    pub fn mark_seen(&mut self, object: &dyn SerializedObject) {
        if let Some(identity) = object.target().identity() {
            let hash = self.hash(object.state());
            self.records.insert(identity, (object.target(), hash));
        }
    }

    /// Drops the record of `object`.
    pub fn forget(&mut self, object: &dyn SerializedObject) -> bool {
        object
            .target()
            .identity()
            .is_some_and(|identity| self.records.remove(&identity).is_some())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Hashes a state, assigning ids to unseen external objects.
    pub fn hash(&mut self, state: &SerializedState) -> i32 {
        let mut hash = SEED;
        for object in state.external_references.iter().flatten() {
            hash = combine(hash, self.id_of(object));
        }
        for key in &state.keys {
            hash = combine(hash, stable_hash(key.as_str()) as i32);
        }
        for value in state.values.iter().flatten() {
            hash = combine(hash, stable_hash(value.as_str()) as i32);
        }
        hash
    }

    fn id_of(&mut self, object: &ExternalRef) -> i32 {
        let next = self.ids.len() as i32 + 1;
        self.ids
            .entry(object.identity())
            .or_insert_with(|| (object.clone(), next))
            .1
    }
}

#[inline]
fn combine(hash: i32, value: i32) -> i32 {
    hash.wrapping_mul(FACTOR).wrapping_add(value)
}
