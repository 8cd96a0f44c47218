//! Pairwise intra-line highlighting
//!
//! Removed and added lines of a hunk are paired by index when both sides have
//! the same number of lines. For each pair the common prefix and common suffix
//! are found with a two-cursor scan over scan units; whatever is left in the
//! middle is wrapped in a highlight decoration.

use crate::escape::{color_escape_len, sgr, token_len};

/// A pair of SGR parameter lists wrapped around a differing span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    /// Parameters that turn the highlight on
    pub open: String,
    /// Parameters that turn it off again
    pub close: String,
}

impl Decoration {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    pub fn reverse() -> Self {
        Self::new("7", "27")
    }

    fn wrap(&self, line: &str, span: HighlightSpan) -> String {
        if span.is_empty() {
            return line.to_string();
        }
        let open = sgr(&self.open);
        let close = sgr(&self.close);
        let mut out = String::with_capacity(line.len() + open.len() + close.len());
        out.push_str(&line[..span.start]);
        out.push_str(&open);
        out.push_str(&line[span.start..span.end]);
        out.push_str(&close);
        out.push_str(&line[span.end..]);
        out
    }
}

/// Decorations for both sides of a pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightStyle {
    pub added: Decoration,
    pub removed: Decoration,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self::reverse()
    }
}

impl HighlightStyle {
    /// Reverse video on both sides.
    pub fn reverse() -> Self {
        Self {
            added: Decoration::reverse(),
            removed: Decoration::reverse(),
        }
    }

    /// Black text on a green (added) or red (removed) background.
    pub fn background() -> Self {
        Self {
            added: Decoration::new("30;42", "39;49"),
            removed: Decoration::new("30;41", "39;49"),
        }
    }
}

/// Half-open byte range of the differing part of a normalized line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
}

impl HighlightSpan {
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

/// How a hunk was emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    /// Nothing was buffered
    Empty,
    /// Lines were emitted unchanged, removed first
    Verbatim { removed: usize, added: usize },
    /// Lines were paired by index and highlighted
    Paired(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnitKind {
    /// A whole color escape, invisible to comparison
    Color,
    /// One escaped token or one character
    Text,
}

#[derive(Debug, Clone, Copy)]
struct Unit {
    start: usize,
    end: usize,
    kind: UnitKind,
}

/// A normalized line split into scan units.
struct Units<'a> {
    line: &'a str,
    units: Vec<Unit>,
}

impl<'a> Units<'a> {
    fn new(line: &'a str) -> Self {
        let mut units = Vec::new();
        let mut pos = 0;
        while pos < line.len() {
            let rest = &line[pos..];
            let (len, kind) = match color_escape_len(rest) {
                Some(len) => (len, UnitKind::Color),
                None => (token_len(rest), UnitKind::Text),
            };
            units.push(Unit {
                start: pos,
                end: pos + len,
                kind,
            });
            pos += len;
        }
        Self { line, units }
    }

    fn len(&self) -> usize {
        self.units.len()
    }

    fn is_color(&self, idx: usize) -> bool {
        self.units[idx].kind == UnitKind::Color
    }

    fn text(&self, idx: usize) -> &'a str {
        let unit = self.units[idx];
        let line: &'a str = self.line;
        &line[unit.start..unit.end]
    }

    /// Byte offset of unit `idx`, or the line length past the last unit.
    fn offset(&self, idx: usize) -> usize {
        self.units.get(idx).map_or(self.line.len(), |u| u.start)
    }
}

/// Compute the differing spans of a removed/added pair.
///
/// Returns `(removed_span, added_span)`. Color escapes are skipped on both
/// sides during the scans. A leading `-` on the removed side and `+` on the
/// added side count as equal once per pair.
pub fn diff_spans(removed: &str, added: &str) -> (HighlightSpan, HighlightSpan) {
    let r = Units::new(removed);
    let a = Units::new(added);

    // Common prefix
    let (mut ap, mut rp) = (0, 0);
    let mut seen_sign = false;
    loop {
        if ap < a.len() && a.is_color(ap) {
            ap += 1;
        } else if rp < r.len() && r.is_color(rp) {
            rp += 1;
        } else if ap == a.len() || rp == r.len() {
            break;
        } else if a.text(ap) == r.text(rp) {
            ap += 1;
            rp += 1;
        } else if !seen_sign && r.text(rp) == "-" && a.text(ap) == "+" {
            seen_sign = true;
            ap += 1;
            rp += 1;
        } else {
            break;
        }
    }

    // Common suffix, never crossing the prefix boundary
    let (mut as_, mut rs) = (a.len(), r.len());
    loop {
        if as_ > ap && a.is_color(as_ - 1) {
            as_ -= 1;
        } else if rs > rp && r.is_color(rs - 1) {
            rs -= 1;
        } else if as_ == ap || rs == rp {
            break;
        } else if a.text(as_ - 1) == r.text(rs - 1) {
            as_ -= 1;
            rs -= 1;
        } else {
            break;
        }
    }

    (
        HighlightSpan {
            start: r.offset(rp),
            end: r.offset(rs),
        },
        HighlightSpan {
            start: a.offset(ap),
            end: a.offset(as_),
        },
    )
}

/// Emits one hunk's buffered lines, highlighting paired lines.
#[derive(Debug, Clone)]
pub struct Highlighter {
    style: HighlightStyle,
    enabled: bool,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self {
            style: HighlightStyle::default(),
            enabled: true,
        }
    }
}

impl Highlighter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(mut self, style: HighlightStyle) -> Self {
        self.style = style;
        self
    }

    /// With highlighting disabled every hunk is emitted verbatim.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn style(&self) -> &HighlightStyle {
        &self.style
    }

    /// Highlight one pair, returning `(removed, added)`.
    pub fn highlight_pair(&self, removed: &str, added: &str) -> (String, String) {
        let (removed_span, added_span) = diff_spans(removed, added);
        (
            self.style.removed.wrap(removed, removed_span),
            self.style.added.wrap(added, added_span),
        )
    }

    /// Emit a hunk into `out`: all removed lines, then all added lines.
    pub fn flush(
        &self,
        removed: Vec<String>,
        added: Vec<String>,
        out: &mut Vec<String>,
    ) -> FlushOutcome {
        if removed.is_empty() && added.is_empty() {
            return FlushOutcome::Empty;
        }

        if self.enabled && !removed.is_empty() && removed.len() == added.len() {
            let pairs = removed.len();
            let mut highlighted_added = Vec::with_capacity(pairs);
            for (old, new) in removed.iter().zip(added.iter()) {
                let (old, new) = self.highlight_pair(old, new);
                out.push(old);
                highlighted_added.push(new);
            }
            out.append(&mut highlighted_added);
            log::debug!("flushed hunk with {} highlighted pairs", pairs);
            FlushOutcome::Paired(pairs)
        } else {
            let outcome = FlushOutcome::Verbatim {
                removed: removed.len(),
                added: added.len(),
            };
            log::debug!(
                "flushed hunk verbatim: {} removed, {} added",
                removed.len(),
                added.len()
            );
            out.extend(removed);
            out.extend(added);
            outcome
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spanned(line: &str, span: HighlightSpan) -> &str {
        &line[span.start..span.end]
    }

    #[test]
    fn test_identical_lines_have_empty_spans() {
        let (r, a) = diff_spans("foo", "foo");
        assert!(r.is_empty());
        assert!(a.is_empty());
    }

    #[test]
    fn test_sign_characters_are_not_a_difference() {
        let (r, a) = diff_spans("-value", "+value");
        assert!(r.is_empty());
        assert!(a.is_empty());
    }

    #[test]
    fn test_sign_tolerance_applies_once() {
        let (r, a) = diff_spans("--x", "++x");
        assert_eq!(spanned("--x", r), "-");
        assert_eq!(spanned("++x", a), "+");
    }

    #[test]
    fn test_changed_word() {
        let removed = "-hello world";
        let added = "+hello there";
        let (r, a) = diff_spans(removed, added);
        assert_eq!(spanned(removed, r), "world");
        assert_eq!(spanned(added, a), "there");
    }

    #[test]
    fn test_common_suffix() {
        let removed = "-let x = foo(1);";
        let added = "+let x = bar(1);";
        let (r, a) = diff_spans(removed, added);
        assert_eq!(spanned(removed, r), "foo");
        assert_eq!(spanned(added, a), "bar");
    }

    #[test]
    fn test_pure_insertion_leaves_shorter_side_empty() {
        let removed = "-ab";
        let added = "+aXb";
        let (r, a) = diff_spans(removed, added);
        assert!(r.is_empty());
        assert_eq!(r.start, 2);
        assert_eq!(spanned(added, a), "X");
    }

    #[test]
    fn test_prefix_of_other() {
        let (r, a) = diff_spans("-foo", "+foobar");
        assert!(r.is_empty());
        assert_eq!(spanned("+foobar", a), "bar");
    }

    #[test]
    fn test_color_escapes_are_transparent() {
        let removed = "\\x1b[31m-hello world\\x1b[m";
        let added = "\\x1b[32m+hello there\\x1b[m";
        let (r, a) = diff_spans(removed, added);
        assert_eq!(spanned(removed, r), "world");
        assert_eq!(spanned(added, a), "there");
    }

    #[test]
    fn test_lines_differing_only_in_color_have_empty_spans() {
        let (r, a) = diff_spans("\\x1b[31m-foo\\x1b[m", "\\x1b[1;32m+foo");
        assert!(r.is_empty());
        assert!(a.is_empty());
    }

    #[test]
    fn test_escaped_tokens_are_compared_whole() {
        // tab vs carriage return: the span must cover the whole `\xNN` token
        let removed = "-a\\x09b";
        let added = "+a\\x0db";
        let (r, a) = diff_spans(removed, added);
        assert_eq!(spanned(removed, r), "\\x09");
        assert_eq!(spanned(added, a), "\\x0d");
    }

    #[test]
    fn test_multibyte_characters_are_compared_whole() {
        let removed = "-naïve";
        let added = "+naíve";
        let (r, a) = diff_spans(removed, added);
        assert_eq!(spanned(removed, r), "ï");
        assert_eq!(spanned(added, a), "í");
    }

    #[test]
    fn test_highlight_pair_preserves_escapes() {
        let highlighter = Highlighter::new();
        let (r, a) = highlighter.highlight_pair(
            "\\x1b[31m-hello world\\x1b[m",
            "\\x1b[32m+hello there\\x1b[m",
        );
        assert_eq!(r, "\\x1b[31m-hello \\x1b[7mworld\\x1b[27m\\x1b[m");
        assert_eq!(a, "\\x1b[32m+hello \\x1b[7mthere\\x1b[27m\\x1b[m");
    }

    #[test]
    fn test_highlight_pair_background_style() {
        let highlighter = Highlighter::new().with_style(HighlightStyle::background());
        let (r, a) = highlighter.highlight_pair("-ab", "-ac");
        assert_eq!(r, "-a\\x1b[30;41mb\\x1b[39;49m");
        assert_eq!(a, "-a\\x1b[30;42mc\\x1b[39;49m");
    }

    #[test]
    fn test_empty_span_is_left_untouched() {
        let highlighter = Highlighter::new();
        let (r, a) = highlighter.highlight_pair("-same", "+same");
        assert_eq!(r, "-same");
        assert_eq!(a, "+same");
    }

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_flush_equal_counts_emits_removed_then_added() {
        let highlighter = Highlighter::new();
        let mut out = Vec::new();
        let outcome = highlighter.flush(
            lines(&["-one", "-two"]),
            lines(&["+onE", "+twO"]),
            &mut out,
        );
        assert_eq!(outcome, FlushOutcome::Paired(2));
        assert_eq!(
            out,
            vec![
                "-on\\x1b[7me\\x1b[27m",
                "-tw\\x1b[7mo\\x1b[27m",
                "+on\\x1b[7mE\\x1b[27m",
                "+tw\\x1b[7mO\\x1b[27m",
            ]
        );
    }

    #[test]
    fn test_flush_unequal_counts_is_verbatim() {
        let highlighter = Highlighter::new();
        let mut out = Vec::new();
        let outcome = highlighter.flush(
            lines(&["-one", "-two"]),
            lines(&["+uno"]),
            &mut out,
        );
        assert_eq!(
            outcome,
            FlushOutcome::Verbatim {
                removed: 2,
                added: 1
            }
        );
        assert_eq!(out, lines(&["-one", "-two", "+uno"]));
    }

    #[test]
    fn test_flush_one_sided_hunks_are_verbatim() {
        let highlighter = Highlighter::new();
        let mut out = Vec::new();
        highlighter.flush(Vec::new(), lines(&["+a", "+b"]), &mut out);
        highlighter.flush(lines(&["-c"]), Vec::new(), &mut out);
        assert_eq!(out, lines(&["+a", "+b", "-c"]));
    }

    #[test]
    fn test_flush_disabled_is_verbatim() {
        let highlighter = Highlighter::new().with_enabled(false);
        let mut out = Vec::new();
        let outcome = highlighter.flush(lines(&["-a"]), lines(&["+b"]), &mut out);
        assert!(matches!(outcome, FlushOutcome::Verbatim { .. }));
        assert_eq!(out, lines(&["-a", "+b"]));
    }

    #[test]
    fn test_flush_nothing() {
        let mut out = Vec::new();
        let outcome = Highlighter::new().flush(Vec::new(), Vec::new(), &mut out);
        assert_eq!(outcome, FlushOutcome::Empty);
        assert!(out.is_empty());
    }
}
