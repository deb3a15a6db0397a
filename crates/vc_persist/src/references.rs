use alloc::vec::Vec;

use vc_meta::ExternalRef;

// -----------------------------------------------------------------------------
// ReferenceStore

/// Side table for host-managed objects met while serializing.
///
/// Tokens only hold the id returned by [`store`](Self::store); the object
/// itself stays with the host.
pub trait ReferenceStore {
    /// Adds `object` and returns its id.
    fn store(&mut self, object: &ExternalRef) -> usize;

    /// Returns the object stored under `id`.
    ///
    /// `None` if the id was never handed out or the host dropped the object.
    fn retrieve(&self, id: usize) -> Option<ExternalRef>;
}

// -----------------------------------------------------------------------------
// ListReferenceStore

/// A [`ReferenceStore`] over a list, ids are indices.
///
/// Every [`store`](ReferenceStore::store) appends, so an object referenced
/// twice is stored twice.
#[derive(Debug)]
pub struct ListReferenceStore<'a> {
    references: &'a mut Vec<Option<ExternalRef>>,
}

impl<'a> ListReferenceStore<'a> {
    #[inline]
    pub fn new(references: &'a mut Vec<Option<ExternalRef>>) -> Self {
        Self { references }
    }
}

impl ReferenceStore for ListReferenceStore<'_> {
    fn store(&mut self, object: &ExternalRef) -> usize {
        self.references.push(Some(object.clone()));
        self.references.len() - 1
    }

    fn retrieve(&self, id: usize) -> Option<ExternalRef> {
        self.references.get(id).cloned().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::{ListReferenceStore, ReferenceStore};
    use alloc::vec::Vec;
    use vc_meta::{ExternalRef, TypeDef, TypeUniverse};

    #[test]
    fn ids_are_indices() {
        let universe = TypeUniverse::new();
        let texture = universe.define(TypeDef::external("Texture")).unwrap();
        let grass = ExternalRef::new(texture, "grass");

        let mut list = Vec::new();
        let mut store = ListReferenceStore::new(&mut list);
        assert_eq!(store.store(&grass), 0);
        assert_eq!(store.store(&grass), 1);
        assert!(store.retrieve(1).unwrap().ptr_eq(&grass));
        assert!(store.retrieve(2).is_none());

        list[0] = None;
        let store = ListReferenceStore::new(&mut list);
        assert!(store.retrieve(0).is_none());
    }
}
