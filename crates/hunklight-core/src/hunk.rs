//! Hunk buffering state machine
//!
//! Hunks have no explicit end marker, so the first line inside a hunk that
//! is neither added nor removed ends the current run of changes. That line
//! triggers a flush of the buffered lines before it is emitted itself.

use crate::highlight::{FlushOutcome, Highlighter};
use crate::line::{continues_hunk, LineKind};

/// Where the machine is relative to hunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HunkState {
    #[default]
    OutsideHunk,
    InHunk,
}

/// Per-stream hunk state: the current state plus the buffered changes.
///
/// Outside a hunk both buffers are empty.
#[derive(Debug, Default)]
pub struct HunkBuffer {
    state: HunkState,
    added: Vec<String>,
    removed: Vec<String>,
}

impl HunkBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> HunkState {
        self.state
    }

    pub fn in_hunk(&self) -> bool {
        self.state == HunkState::InHunk
    }

    pub fn added(&self) -> &[String] {
        &self.added
    }

    pub fn removed(&self) -> &[String] {
        &self.removed
    }

    /// Whether no changed lines are buffered
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Feed one normalized line. Lines ready for output are appended to `out`.
    ///
    /// Returns the flush outcome when the line closed a run of changes.
    pub fn handle_line(
        &mut self,
        line: String,
        highlighter: &Highlighter,
        out: &mut Vec<String>,
    ) -> Option<FlushOutcome> {
        if !self.in_hunk() {
            if LineKind::classify(&line) == LineKind::HunkHeader {
                self.transition(HunkState::InHunk);
            }
            out.push(line);
            return None;
        }

        match LineKind::classify(&line) {
            LineKind::Removed => {
                self.removed.push(line);
                None
            }
            LineKind::Added => {
                self.added.push(line);
                None
            }
            LineKind::HunkHeader | LineKind::Other => {
                let outcome = self.flush(highlighter, out);
                let next = if continues_hunk(&line) {
                    HunkState::InHunk
                } else {
                    HunkState::OutsideHunk
                };
                out.push(line);
                self.transition(next);
                Some(outcome)
            }
        }
    }

    /// Flush whatever is still buffered at end of input.
    pub fn finish(&mut self, highlighter: &Highlighter, out: &mut Vec<String>) -> FlushOutcome {
        let outcome = self.flush(highlighter, out);
        self.transition(HunkState::OutsideHunk);
        outcome
    }

    fn flush(&mut self, highlighter: &Highlighter, out: &mut Vec<String>) -> FlushOutcome {
        let removed = std::mem::take(&mut self.removed);
        let added = std::mem::take(&mut self.added);
        highlighter.flush(removed, added, out)
    }

    fn transition(&mut self, next: HunkState) {
        if self.state != next {
            log::trace!("hunk state {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }
}
