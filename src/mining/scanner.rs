//! Balanced-delimiter block scanning
//!
//! Finds the extent of a `{ ... }` (or `( ... )`, `[ ... ]`) block in test
//! source text without parsing it. Quoted strings and comments are skipped so
//! delimiters inside them never count towards nesting.
//!
//! All delimiters, quotes and comment markers are ASCII, so scanning bytes is
//! safe on UTF-8 text: those bytes never occur inside a multi-byte sequence.

use std::ops::Range;

/// Quote state while scanning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quote {
    Single,
    Double,
    Backtick,
}

impl Quote {
    fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'\'' => Some(Self::Single),
            b'"' => Some(Self::Double),
            b'`' => Some(Self::Backtick),
            _ => None,
        }
    }
}

/// Closing delimiter for a supported opening delimiter
fn closing_for(open: u8) -> Option<u8> {
    match open {
        b'{' => Some(b'}'),
        b'(' => Some(b')'),
        b'[' => Some(b']'),
        _ => None,
    }
}

/// Byte-level cursor that knows whether it is inside a string or comment
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
    quote: Option<Quote>,
}

/// What the cursor saw at one structural position
enum Token {
    /// A byte outside of any string or comment
    Code(u8),
    /// A byte that belongs to a string literal or comment
    Skipped,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str, pos: usize) -> Self {
        Self {
            bytes: text.as_bytes(),
            pos,
            quote: None,
        }
    }

    /// Advance one step and report the byte position plus its classification
    fn next(&mut self) -> Option<(usize, Token)> {
        let at = self.pos;
        let b = *self.bytes.get(at)?;

        if let Some(quote) = self.quote {
            if b == b'\\' {
                // Escape consumes the following byte whatever it is
                self.pos = (at + 2).min(self.bytes.len());
            } else {
                if Quote::from_byte(b) == Some(quote) {
                    self.quote = None;
                }
                self.pos = at + 1;
            }
            return Some((at, Token::Skipped));
        }

        if let Some(quote) = Quote::from_byte(b) {
            self.quote = Some(quote);
            self.pos = at + 1;
            return Some((at, Token::Skipped));
        }

        if b == b'/' {
            match self.bytes.get(at + 1) {
                Some(b'/') => {
                    self.pos = self.bytes[at..]
                        .iter()
                        .position(|&c| c == b'\n')
                        .map_or(self.bytes.len(), |off| at + off);
                    return Some((at, Token::Skipped));
                }
                Some(b'*') => {
                    self.pos = self.bytes[at + 2..]
                        .windows(2)
                        .position(|w| w == b"*/")
                        .map_or(self.bytes.len(), |off| at + 2 + off + 2);
                    return Some((at, Token::Skipped));
                }
                _ => {}
            }
        }

        self.pos = at + 1;
        Some((at, Token::Code(b)))
    }
}

/// Find the index of the delimiter closing the block opened at `open_index`
///
/// Returns `None` when `open_index` is not an opening delimiter or when the
/// text ends before the block is balanced.
pub fn find_matching_close(text: &str, open_index: usize) -> Option<usize> {
    let open = *text.as_bytes().get(open_index)?;
    let close = closing_for(open)?;

    let mut depth = 0usize;
    let mut cursor = Cursor::new(text, open_index);
    while let Some((at, token)) = cursor.next() {
        let Token::Code(b) = token else { continue };
        if b == open {
            depth += 1;
        } else if b == close {
            depth -= 1;
            if depth == 0 {
                return Some(at);
            }
        }
    }
    None
}

/// Byte ranges of `text` covered by string literals and comments, in order
///
/// Adjacent ranges are merged, so a whole string literal is one range.
pub fn skipped_ranges(text: &str) -> Vec<Range<usize>> {
    let mut ranges: Vec<Range<usize>> = Vec::new();
    let mut cursor = Cursor::new(text, 0);
    while let Some((at, token)) = cursor.next() {
        if let Token::Skipped = token {
            match ranges.last_mut() {
                Some(last) if last.end == at => last.end = cursor.pos,
                _ => ranges.push(at..cursor.pos),
            }
        }
    }
    ranges
}

/// Whether `pos` falls inside one of `ranges` (as returned by [`skipped_ranges`])
pub fn in_skipped(ranges: &[Range<usize>], pos: usize) -> bool {
    let idx = ranges.partition_point(|r| r.end <= pos);
    ranges.get(idx).is_some_and(|r| r.start <= pos)
}

/// Find the first `{` at or after `from` that is outside strings and comments
pub fn find_block_open(text: &str, from: usize) -> Option<usize> {
    let mut cursor = Cursor::new(text, from);
    while let Some((at, token)) = cursor.next() {
        if let Token::Code(b'{') = token {
            return Some(at);
        }
    }
    None
}
