//! Classification of normalized diff lines

use crate::escape::skip_leading_color_escapes;

/// What a line is, judged by its first visible character(s).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// `@@ -a,b +c,d @@`
    HunkHeader,
    /// Line present only in the old version
    Removed,
    /// Line present only in the new version
    Added,
    /// Anything else: context lines, file headers, blank lines
    Other,
}

impl LineKind {
    /// Classify a normalized line. Leading color escapes are ignored.
    pub fn classify(line: &str) -> Self {
        let visible = skip_leading_color_escapes(line);
        if visible.starts_with("@@") {
            LineKind::HunkHeader
        } else if visible.starts_with('-') {
            LineKind::Removed
        } else if visible.starts_with('+') {
            LineKind::Added
        } else {
            LineKind::Other
        }
    }

    pub fn is_change(self) -> bool {
        matches!(self, LineKind::Removed | LineKind::Added)
    }
}

/// Whether a line that ends a run of changes keeps us inside a hunk:
/// a context line (leading space) or another header (leading `@`).
pub fn continues_hunk(line: &str) -> bool {
    let visible = skip_leading_color_escapes(line);
    visible.starts_with('@') || visible.starts_with(' ')
}
