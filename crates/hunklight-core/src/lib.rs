//! Hunklight Core - intra-line highlighting for colored unified diffs
//!
//! This library buffers the added and removed lines of each hunk of an
//! already colored diff, pairs them up, and marks the characters that
//! actually changed without disturbing the existing color escapes.

pub mod escape;
pub mod highlight;
pub mod hunk;
pub mod line;
pub mod stream;

pub use escape::{denormalize, normalize, EscapeError};
pub use highlight::{
    diff_spans, Decoration, FlushOutcome, HighlightSpan, HighlightStyle, Highlighter,
};
pub use hunk::{HunkBuffer, HunkState};
pub use line::LineKind;
pub use stream::{run, Error, Stats};
