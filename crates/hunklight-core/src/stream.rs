//! Stream driver: raw diff lines in, highlighted lines out

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::escape::{denormalize, normalize, EscapeError};
use crate::highlight::{FlushOutcome, Highlighter};
use crate::hunk::HunkBuffer;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Malformed escaping: {0}")]
    MalformedEscaping(#[from] EscapeError),
    #[error("Failed to read input: {0}")]
    InputRead(io::Error),
    #[error("Failed to write output: {0}")]
    OutputWrite(io::Error),
}

impl Error {
    /// The reader on the other end of the pipe went away.
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, Error::OutputWrite(e) if e.kind() == io::ErrorKind::BrokenPipe)
    }
}

/// Counters for one processed stream
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Lines read from the input
    pub lines: usize,
    /// Hunks that had at least one changed line
    pub hunks: usize,
    /// Removed/added pairs that went through highlighting
    pub pairs: usize,
}

impl Stats {
    fn record(&mut self, outcome: FlushOutcome) {
        match outcome {
            FlushOutcome::Empty => {}
            FlushOutcome::Verbatim { .. } => self.hunks += 1,
            FlushOutcome::Paired(pairs) => {
                self.hunks += 1;
                self.pairs += pairs;
            }
        }
    }
}

/// Process a whole diff stream.
///
/// Lines are split on `\n`; any other byte, `\r` included, belongs to the
/// line. Output is written as soon as it is known, so everything emitted
/// before an error stays valid. A read error stops processing without
/// flushing the hunk in progress.
pub fn run<R: BufRead, W: Write>(
    mut reader: R,
    mut writer: W,
    highlighter: &Highlighter,
) -> Result<Stats, Error> {
    let mut buffer = HunkBuffer::new();
    let mut stats = Stats::default();
    let mut raw = Vec::new();
    let mut pending = Vec::new();

    loop {
        raw.clear();
        let read = reader.read_until(b'\n', &mut raw).map_err(Error::InputRead)?;
        if read == 0 {
            break;
        }
        if raw.last() == Some(&b'\n') {
            raw.pop();
        }
        stats.lines += 1;

        if let Some(outcome) = buffer.handle_line(normalize(&raw), highlighter, &mut pending) {
            stats.record(outcome);
        }
        emit(&mut writer, &mut pending)?;
    }

    stats.record(buffer.finish(highlighter, &mut pending));
    emit(&mut writer, &mut pending)?;
    writer.flush().map_err(Error::OutputWrite)?;

    log::debug!(
        "processed {} lines, {} hunks, {} highlighted pairs",
        stats.lines,
        stats.hunks,
        stats.pairs
    );
    Ok(stats)
}

fn emit<W: Write>(writer: &mut W, lines: &mut Vec<String>) -> Result<(), Error> {
    for line in lines.drain(..) {
        let bytes = denormalize(&line)?;
        writer.write_all(&bytes).map_err(Error::OutputWrite)?;
        writer.write_all(b"\n").map_err(Error::OutputWrite)?;
    }
    Ok(())
}
