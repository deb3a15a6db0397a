use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt;

use crate::{Handler, HandlerKind};

// -----------------------------------------------------------------------------
// HandlerChain

/// The ordered, non-empty list of handlers resolved for a type, most
/// specific first.
///
/// Wrapper handlers use [`skip_until_not`](Self::skip_until_not) to reach
/// the handler that would have been chosen without them.
pub struct HandlerChain<H: ?Sized> {
    entries: Rc<[Rc<H>]>,
}

impl<H: ?Sized> Clone for HandlerChain<H> {
    #[inline]
    fn clone(&self) -> Self {
        Self {
            entries: Rc::clone(&self.entries),
        }
    }
}

impl<H: ?Sized + Handler> HandlerChain<H> {
    /// Returns `None` for an empty list.
    pub fn new(entries: Vec<Rc<H>>) -> Option<Self> {
        (!entries.is_empty()).then(|| Self {
            entries: entries.into(),
        })
    }

    /// Returns a chain with `handler` in front.
    pub fn prepend(&self, handler: Rc<H>) -> Self {
        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        entries.push(handler);
        entries.extend(self.entries.iter().cloned());
        Self {
            entries: entries.into(),
        }
    }

    /// The most specific handler.
    #[inline]
    pub fn first(&self) -> &Rc<H> {
        &self.entries[0]
    }

    /// The least specific handler.
    #[inline]
    pub fn last(&self) -> &Rc<H> {
        &self.entries[self.entries.len() - 1]
    }

    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Rc<H>> {
        self.entries.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Kinds of the handlers, in chain order.
    pub fn kinds(&self) -> Vec<HandlerKind> {
        self.entries.iter().map(|h| h.kind()).collect()
    }

    /// Returns the handler following the first handler of `kind`.
    pub fn next_after(&self, kind: HandlerKind) -> Option<&Rc<H>> {
        let index = self.entries.iter().position(|h| h.kind() == kind)?;
        self.entries.get(index + 1)
    }

    /// Returns the first handler whose kind is not in `excluded`.
    ///
    /// If every handler is excluded the last one is returned, so callers
    /// always get a handler.
    pub fn skip_until_not(&self, excluded: &[HandlerKind]) -> &Rc<H> {
        self.entries
            .iter()
            .find(|h| !excluded.contains(&h.kind()))
            .unwrap_or_else(|| self.last())
    }
}

impl<H: ?Sized + Handler> fmt::Debug for HandlerChain<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|h| h.kind()))
            .finish()
    }
}
