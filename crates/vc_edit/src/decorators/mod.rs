//! Attribute-driven editors layered in front of a member's editor.
//!
//! A decorator is registered for an attribute type in the editor
//! registry's [`DecoratorRegistry`](vc_handler::DecoratorRegistry). When a
//! member carries mapped attributes, [`compose`] wraps the selected
//! decorators and the member's chain into an [`AttributeEditor`].

mod attributes;

pub use attributes::{Comment, InspectorDivider, InspectorHidePrimary, Margin};

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use vc_handler::{DecoratorSet, Handler};
use vc_meta::Value;

use crate::metrics::{COMMENT_MIN_HEIGHT, DIVIDER_HEIGHT, LINE_HEIGHT};
use crate::{EditContext, EditorChain, EditorRegistry, NoteKind, PropertyEditor};

// -----------------------------------------------------------------------------
// Decorator editors

#[derive(Debug)]
pub struct MarginEditor {
    margin: f32,
}

impl Handler for MarginEditor {
    fn is_decorator(&self) -> bool {
        true
    }
}

impl PropertyEditor for MarginEditor {
    fn edit(&self, cx: &mut EditContext<'_>, _label: &str, value: Value) -> Value {
        cx.surface().space(self.margin);
        value
    }

    fn measure(&self, _cx: &mut EditContext<'_>, _label: &str, _value: &Value) -> f32 {
        self.margin
    }
}

#[derive(Debug)]
pub struct DividerEditor;

impl Handler for DividerEditor {
    fn is_decorator(&self) -> bool {
        true
    }
}

impl PropertyEditor for DividerEditor {
    fn edit(&self, cx: &mut EditContext<'_>, _label: &str, value: Value) -> Value {
        cx.surface().divider();
        value
    }

    fn measure(&self, _cx: &mut EditContext<'_>, _label: &str, _value: &Value) -> f32 {
        DIVIDER_HEIGHT
    }
}

#[derive(Debug)]
pub struct CommentEditor {
    text: String,
    kind: NoteKind,
}

impl Handler for CommentEditor {
    fn is_decorator(&self) -> bool {
        true
    }
}

impl PropertyEditor for CommentEditor {
    fn edit(&self, cx: &mut EditContext<'_>, _label: &str, value: Value) -> Value {
        cx.surface().note(&self.text, self.kind);
        value
    }

    fn measure(&self, _cx: &mut EditContext<'_>, _label: &str, _value: &Value) -> f32 {
        let height = LINE_HEIGHT * self.text.lines().count().max(1) as f32;
        match self.kind {
            NoteKind::None => height,
            _ => height.max(COMMENT_MIN_HEIGHT),
        }
    }
}

/// Draws nothing; registered as replacing so the primary editor is hidden.
#[derive(Debug)]
pub struct HidePrimaryEditor;

impl Handler for HidePrimaryEditor {
    fn is_decorator(&self) -> bool {
        true
    }
}

impl PropertyEditor for HidePrimaryEditor {
    fn edit(&self, _cx: &mut EditContext<'_>, _label: &str, value: Value) -> Value {
        value
    }

    fn measure(&self, _cx: &mut EditContext<'_>, _label: &str, _value: &Value) -> f32 {
        0.0
    }
}

/// Maps the built-in decorator attributes.
pub fn register_builtin_decorators(editors: &mut EditorRegistry) {
    let decorators = editors.decorators_mut();
    decorators.register_attribute::<Margin>(false, |margin| {
        Rc::new(MarginEditor { margin: margin.0 }) as Rc<dyn PropertyEditor>
    });
    decorators.register_attribute::<InspectorDivider>(false, |_| {
        Rc::new(DividerEditor) as Rc<dyn PropertyEditor>
    });
    decorators.register_attribute::<Comment>(false, |comment| {
        Rc::new(CommentEditor {
            text: comment.text.clone(),
            kind: comment.kind,
        }) as Rc<dyn PropertyEditor>
    });
    decorators.register_attribute::<InspectorHidePrimary>(true, |_| {
        Rc::new(HidePrimaryEditor) as Rc<dyn PropertyEditor>
    });
}

// -----------------------------------------------------------------------------
// AttributeEditor

/// Runs a member's decorators in order, then its primary editor unless a
/// decorator replaces it.
///
/// Heights add up: the decorators' heights plus the primary editor's when
/// it is shown.
pub struct AttributeEditor {
    set: DecoratorSet<dyn PropertyEditor>,
    chain: EditorChain,
}

impl AttributeEditor {
    #[inline]
    pub fn shows_primary(&self) -> bool {
        self.set.show_primary
    }

    #[inline]
    pub fn decorators(&self) -> &[Rc<dyn PropertyEditor>] {
        &self.set.decorators
    }
}

/// The composer of the editor registry.
pub fn compose(
    set: DecoratorSet<dyn PropertyEditor>,
    chain: EditorChain,
) -> Rc<dyn PropertyEditor> {
    Rc::new(AttributeEditor { set, chain })
}

impl Handler for AttributeEditor {}

impl PropertyEditor for AttributeEditor {
    fn edit(&self, cx: &mut EditContext<'_>, label: &str, value: Value) -> Value {
        let mut value = value;
        for decorator in &self.set.decorators {
            value = decorator.edit(cx, label, value);
        }
        if self.set.show_primary {
            value = self.chain.first().edit(cx, label, value);
        }
        value
    }

    fn measure(&self, cx: &mut EditContext<'_>, label: &str, value: &Value) -> f32 {
        let mut height: f32 = self
            .set
            .decorators
            .iter()
            .map(|decorator| decorator.measure(cx, label, value))
            .sum();
        if self.set.show_primary {
            height += self.chain.first().measure(cx, label, value);
        }
        height
    }
}

impl fmt::Debug for AttributeEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let decorators: Vec<_> = self.set.decorators.iter().map(|d| d.kind()).collect();
        f.debug_struct("AttributeEditor")
            .field("decorators", &decorators)
            .field("show_primary", &self.set.show_primary)
            .field("chain", &self.chain)
            .finish()
    }
}
