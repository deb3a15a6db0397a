//! Fixed layout metrics used by `measure`.

/// Height of a single line: labels, fields, toggles and choosers.
pub const LINE_HEIGHT: f32 = 17.0;

/// Height of the gap drawn between two members.
pub const DIVIDER_HEIGHT: f32 = 2.0;

pub const BUTTON_HEIGHT: f32 = 18.0;

/// Minimum height of a typed comment.
pub const COMMENT_MIN_HEIGHT: f32 = 40.0;

/// Nesting depth past which null references are no longer instantiated
/// automatically while editing.
pub const MAX_NESTING_DEPTH: usize = 15;
