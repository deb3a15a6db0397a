//! The widgets editors draw with.

use alloc::borrow::ToOwned;
use alloc::string::String;
use alloc::vec::Vec;

use vc_meta::Value;

// -----------------------------------------------------------------------------
// NoteKind

/// Severity of a note drawn by [`EditSurface::note`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NoteKind {
    #[default]
    None,
    Info,
    Warning,
    Error,
}

// -----------------------------------------------------------------------------
// EditSurface

/// Immediate-mode widgets.
///
/// Every input widget receives the current value and returns the value
/// after user interaction, which is the same value if nothing happened.
pub trait EditSurface {
    fn label(&mut self, text: &str);

    /// Attaches a tooltip to the next widget.
    fn tooltip(&mut self, text: &str);

    /// A free-form field for an inline value.
    fn field(&mut self, label: &str, value: Value) -> Value;

    fn toggle(&mut self, label: &str, value: bool) -> bool;

    /// Picks one of `options`; `None` is the empty selection.
    fn choose(&mut self, label: &str, options: &[String], selected: Option<usize>)
    -> Option<usize>;

    /// Returns `true` if the button was pressed.
    fn button(&mut self, label: &str) -> bool;

    fn note(&mut self, text: &str, kind: NoteKind);

    fn divider(&mut self);

    fn space(&mut self, height: f32);
}

// -----------------------------------------------------------------------------
// HeadlessSurface

/// A widget call recorded by [`HeadlessSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Label(String),
    Tooltip(String),
    Field { label: String, value: Value },
    Toggle { label: String, value: bool },
    Choose { label: String, options: Vec<String>, selected: Option<usize> },
    Button(String),
    Note { text: String, kind: NoteKind },
    Divider,
    Space(f32),
}

#[derive(Debug)]
enum Response {
    Field(Value),
    Toggle(bool),
    Choose(Option<usize>),
    Press,
}

/// A surface without a screen.
///
/// Records every widget call and answers from scripted responses, each
/// consumed by the first widget with the matching label. Unscripted
/// widgets leave their value unchanged.
///
/// # Examples
///
/// ```
/// use vc_edit::{EditSurface, HeadlessSurface, SurfaceEvent};
///
/// let mut surface = HeadlessSurface::new();
/// surface.press("Apply");
///
/// assert!(surface.button("Apply"));
/// assert!(!surface.button("Apply"));
/// assert_eq!(surface.events()[0], SurfaceEvent::Button("Apply".into()));
/// ```
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    events: Vec<SurfaceEvent>,
    responses: Vec<(String, Response)>,
}

impl HeadlessSurface {
    #[inline]
    pub const fn new() -> Self {
        Self {
            events: Vec::new(),
            responses: Vec::new(),
        }
    }

    /// The next field labelled `label` returns `value`.
    pub fn set_field(&mut self, label: &str, value: impl Into<Value>) -> &mut Self {
        self.responses
            .push((label.to_owned(), Response::Field(value.into())));
        self
    }

    /// The next toggle labelled `label` returns `value`.
    pub fn set_toggle(&mut self, label: &str, value: bool) -> &mut Self {
        self.responses.push((label.to_owned(), Response::Toggle(value)));
        self
    }

    /// The next chooser labelled `label` returns `selected`.
    pub fn set_choice(&mut self, label: &str, selected: Option<usize>) -> &mut Self {
        self.responses
            .push((label.to_owned(), Response::Choose(selected)));
        self
    }

    /// The next button labelled `label` reports a press.
    pub fn press(&mut self, label: &str) -> &mut Self {
        self.responses.push((label.to_owned(), Response::Press));
        self
    }

    #[inline]
    pub fn events(&self) -> &[SurfaceEvent] {
        &self.events
    }

    /// Drops recorded events, scripted responses are kept.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Labels of every labelled widget, in call order.
    pub fn labels(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|event| match event {
                SurfaceEvent::Label(label)
                | SurfaceEvent::Button(label)
                | SurfaceEvent::Field { label, .. }
                | SurfaceEvent::Toggle { label, .. }
                | SurfaceEvent::Choose { label, .. } => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }

    fn take(&mut self, label: &str, matches: fn(&Response) -> bool) -> Option<Response> {
        let index = self
            .responses
            .iter()
            .position(|(l, response)| l == label && matches(response))?;
        Some(self.responses.remove(index).1)
    }
}

impl EditSurface for HeadlessSurface {
    fn label(&mut self, text: &str) {
        self.events.push(SurfaceEvent::Label(text.to_owned()));
    }

    fn tooltip(&mut self, text: &str) {
        self.events.push(SurfaceEvent::Tooltip(text.to_owned()));
    }

    fn field(&mut self, label: &str, value: Value) -> Value {
        self.events.push(SurfaceEvent::Field {
            label: label.to_owned(),
            value: value.clone(),
        });
        match self.take(label, |r| matches!(r, Response::Field(_))) {
            Some(Response::Field(value)) => value,
            _ => value,
        }
    }

    fn toggle(&mut self, label: &str, value: bool) -> bool {
        self.events.push(SurfaceEvent::Toggle {
            label: label.to_owned(),
            value,
        });
        match self.take(label, |r| matches!(r, Response::Toggle(_))) {
            Some(Response::Toggle(value)) => value,
            _ => value,
        }
    }

    fn choose(
        &mut self,
        label: &str,
        options: &[String],
        selected: Option<usize>,
    ) -> Option<usize> {
        self.events.push(SurfaceEvent::Choose {
            label: label.to_owned(),
            options: options.to_vec(),
            selected,
        });
        match self.take(label, |r| matches!(r, Response::Choose(_))) {
            Some(Response::Choose(selected)) => selected,
            _ => selected,
        }
    }

    fn button(&mut self, label: &str) -> bool {
        self.events.push(SurfaceEvent::Button(label.to_owned()));
        self.take(label, |r| matches!(r, Response::Press)).is_some()
    }

    fn note(&mut self, text: &str, kind: NoteKind) {
        self.events.push(SurfaceEvent::Note {
            text: text.to_owned(),
            kind,
        });
    }

    fn divider(&mut self) {
        self.events.push(SurfaceEvent::Divider);
    }

    fn space(&mut self, height: f32) {
        self.events.push(SurfaceEvent::Space(height));
    }
}

#[cfg(test)]
mod tests {
    use super::{EditSurface, HeadlessSurface, SurfaceEvent};
    use alloc::string::String;
    use vc_meta::Value;

    #[test]
    fn responses_are_consumed_by_label() {
        let mut surface = HeadlessSurface::new();
        surface.set_field("Hp", 10).set_toggle("Alive", false);

        assert_eq!(surface.field("Name", Value::Null), Value::Null);
        assert_eq!(surface.field("Hp", Value::Int(3)), Value::Int(10));
        assert_eq!(surface.field("Hp", Value::Int(3)), Value::Int(3));
        assert!(!surface.toggle("Alive", true));

        let options = [String::from("A"), String::from("B")];
        assert_eq!(surface.choose("Kind", &options, Some(1)), Some(1));
        assert_eq!(surface.labels(), ["Name", "Hp", "Hp", "Alive", "Kind"]);
    }

    #[test]
    fn unmatched_kinds_are_not_consumed() {
        let mut surface = HeadlessSurface::new();
        surface.press("Go");

        assert!(!surface.toggle("Go", false));
        assert!(surface.button("Go"));
        assert_eq!(surface.events().len(), 2);
        assert_eq!(surface.events()[1], SurfaceEvent::Button(String::from("Go")));
    }
}
