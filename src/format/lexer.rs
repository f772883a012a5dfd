//! Line masking for VHDL source
//!
//! Most formatting rules must only look at code, never at the inside of string
//! literals, character literals or comments. [`mask_line`] produces a copy of a
//! line with the same byte layout where those regions are blanked out, so byte
//! offsets found in the mask can be used directly on the original line.

use crate::error::FormatError;

/// Filler written over string and character literal contents
const LITERAL_FILL: u8 = b'_';

/// A line with literal contents blanked and the comment located
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskedLine {
    /// Same byte length as the original; literal bodies replaced by `_`,
    /// the comment (if any) replaced by spaces
    pub mask: String,
    /// Byte offset of the `--` starting a comment
    pub comment_start: Option<usize>,
}

impl MaskedLine {
    /// Code portion of the mask (everything before the comment)
    #[must_use]
    pub fn code(&self) -> &str {
        &self.mask[..self.comment_start.unwrap_or(self.mask.len())]
    }
}

/// Mask string literals, character literals and comments in one line
///
/// A character literal is a single character between apostrophes; any other
/// apostrophe is an attribute tick (`clk'event`) and is left alone.
pub fn mask_line(line: &str) -> Result<MaskedLine, FormatError> {
    let bytes = line.as_bytes();
    let mut mask = bytes.to_vec();
    let mut comment_start = None;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                comment_start = Some(i);
                for b in &mut mask[i..] {
                    *b = b' ';
                }
                break;
            }
            b'"' => {
                let mut j = i + 1;
                loop {
                    match bytes.get(j) {
                        None => return Err(FormatError::new("unterminated string literal")),
                        // Doubled quote is an escaped quote inside the literal
                        Some(b'"') if bytes.get(j + 1) == Some(&b'"') => j += 2,
                        Some(b'"') => break,
                        Some(_) => j += 1,
                    }
                }
                for b in &mut mask[i + 1..j] {
                    *b = LITERAL_FILL;
                }
                i = j + 1;
            }
            b'\'' => {
                // 'x' where x is one (possibly multi-byte) character
                let char_len = line[i + 1..].chars().next().map_or(0, char::len_utf8);
                let close = i + 1 + char_len;
                if char_len > 0 && bytes.get(close) == Some(&b'\'') && !follows_identifier(bytes, i)
                {
                    for b in &mut mask[i + 1..close] {
                        *b = LITERAL_FILL;
                    }
                    i = close + 1;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }

    // Only ASCII bytes were written into literal and comment ranges, and those
    // ranges were cut on character boundaries
    let mask = String::from_utf8(mask)
        .map_err(|_| FormatError::new("internal error: mask is not valid UTF-8"))?;

    Ok(MaskedLine {
        mask,
        comment_start,
    })
}

/// True when the apostrophe at `pos` is an attribute tick such as `sig'range`
fn follows_identifier(bytes: &[u8], pos: usize) -> bool {
    pos > 0 && (bytes[pos - 1].is_ascii_alphanumeric() || bytes[pos - 1] == b'_' || bytes[pos - 1] == b')')
}
