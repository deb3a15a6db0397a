use alloc::string::String;

use vc_meta::Attribute;

use crate::NoteKind;

/// Adds vertical space above a member.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin(pub f32);

impl Attribute for Margin {
    fn order(&self) -> Option<f64> {
        Some(0.0)
    }
}

/// Draws a divider above a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InspectorDivider;

impl Attribute for InspectorDivider {
    fn order(&self) -> Option<f64> {
        Some(300.0)
    }
}

/// Draws a note above a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: String,
    pub kind: NoteKind,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: NoteKind::None,
        }
    }

    pub fn with_kind(mut self, kind: NoteKind) -> Self {
        self.kind = kind;
        self
    }
}

impl Attribute for Comment {}

/// Hides the editor of a member while keeping its other decorators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InspectorHidePrimary;

impl Attribute for InspectorHidePrimary {
    fn order(&self) -> Option<f64> {
        Some(f64::MAX)
    }
}
