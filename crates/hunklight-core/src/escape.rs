//! Escape codec for terminal lines
//!
//! Raw diff lines carry ESC bytes and are not guaranteed to be UTF-8. Before
//! any matching happens a line is normalized into printable text where every
//! control byte is spelled `\xNN`, so a color escape can be recognised as the
//! literal text `\x1b[...m`. Emitted lines go through [`denormalize`] to get
//! the original bytes back.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

static COLOR_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\\x1b\[[0-9;]*m").expect("invalid regex"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EscapeError {
    #[error("malformed escaping at byte {position}: {reason}")]
    Malformed {
        position: usize,
        reason: &'static str,
    },
}

/// Render a raw line in its escaped, printable form.
///
/// Backslashes are doubled, ASCII control bytes and bytes outside valid UTF-8
/// become `\xNN`. Everything else is copied unchanged.
pub fn normalize(raw: &[u8]) -> String {
    let mut out = String::with_capacity(raw.len());
    for chunk in raw.utf8_chunks() {
        for ch in chunk.valid().chars() {
            match ch {
                '\\' => out.push_str("\\\\"),
                c if c.is_ascii_control() => push_hex(&mut out, c as u8),
                c => out.push(c),
            }
        }
        for &byte in chunk.invalid() {
            push_hex(&mut out, byte);
        }
    }
    out
}

/// Inverse of [`normalize`].
///
/// Fails on a dangling backslash, an unknown escape, or a `\x` that is not
/// followed by two hex digits.
pub fn denormalize(line: &str) -> Result<Vec<u8>, EscapeError> {
    let bytes = line.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        match bytes.get(i + 1) {
            Some(b'\\') => {
                out.push(b'\\');
                i += 2;
            }
            Some(b'x') => {
                let byte = bytes
                    .get(i + 2..i + 4)
                    .and_then(hex_byte)
                    .ok_or(EscapeError::Malformed {
                        position: i,
                        reason: "expected two hex digits after \\x",
                    })?;
                out.push(byte);
                i += 4;
            }
            Some(_) => {
                return Err(EscapeError::Malformed {
                    position: i,
                    reason: "unknown escape",
                })
            }
            None => {
                return Err(EscapeError::Malformed {
                    position: i,
                    reason: "dangling backslash",
                })
            }
        }
    }

    Ok(out)
}

/// Length of the normalized color escape at the start of `text`, if any.
///
/// This is the single definition of "color escape" used by line
/// classification and by the highlighter's scanner.
pub fn color_escape_len(text: &str) -> Option<usize> {
    COLOR_ESCAPE.find(text).map(|m| m.end())
}

/// Strip a run of leading color escapes.
pub fn skip_leading_color_escapes(mut text: &str) -> &str {
    while let Some(len) = color_escape_len(text) {
        text = &text[len..];
    }
    text
}

/// Length of the first printable unit of a normalized line: an escaped
/// token (`\\` or `\xNN`) or a single character.
pub fn token_len(text: &str) -> usize {
    let bytes = text.as_bytes();
    match bytes {
        [b'\\', b'\\', ..] => 2,
        [b'\\', b'x', hi, lo, ..] if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => 4,
        _ => text.chars().next().map_or(0, char::len_utf8),
    }
}

/// Normalized SGR escape for the given parameter list, e.g. `7` gives `\x1b[7m`.
pub fn sgr(params: &str) -> String {
    format!("\\x1b[{params}m")
}

/// Whether `params` is a valid SGR parameter list (digits and semicolons).
pub fn is_sgr_params(params: &str) -> bool {
    params.bytes().all(|b| b.is_ascii_digit() || b == b';')
}

fn push_hex(out: &mut String, byte: u8) {
    let _ = write!(out, "\\x{byte:02x}");
}

fn hex_byte(digits: &[u8]) -> Option<u8> {
    match digits {
        [hi, lo] => Some((hex_value(*hi)? << 4) | hex_value(*lo)?),
        _ => None,
    }
}

fn hex_value(digit: u8) -> Option<u8> {
    (digit as char).to_digit(16).map(|v| v as u8)
}
