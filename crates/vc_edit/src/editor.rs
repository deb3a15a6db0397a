use alloc::rc::Rc;

use vc_handler::{Handler, HandlerChain, HandlerError, HandlerRegistry, HandlerRequest};
use vc_meta::Value;

use crate::EditContext;

// -----------------------------------------------------------------------------
// PropertyEditor

/// Edits and measures values of one type.
///
/// Editors are resolved per type through an [`EditorRegistry`]; the first
/// handler of a chain is the editor used for a value, wrappers reach the
/// editor behind them with [`HandlerChain::skip_until_not`].
pub trait PropertyEditor: Handler {
    /// Draws `value` and returns it after user interaction.
    ///
    /// Shared values (objects, sequences) may be mutated in place; the
    /// returned value replaces the edited one when it differs.
    fn edit(&self, cx: &mut EditContext<'_>, label: &str, value: Value) -> Value;

    /// Height [`edit`](Self::edit) would use for `value`.
    fn measure(&self, cx: &mut EditContext<'_>, label: &str, value: &Value) -> f32;
}

/// The registry of the editor family.
pub type EditorRegistry = HandlerRegistry<dyn PropertyEditor>;

/// A chain of editors, most specific first.
pub type EditorChain = HandlerChain<dyn PropertyEditor>;

/// Signature of the constructor every built-in editor exposes.
pub type CreateEditor = fn(&HandlerRequest<'_>) -> Result<Rc<dyn PropertyEditor>, HandlerError>;
