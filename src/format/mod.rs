//! VHDL source formatting.
//!
//! The batch pipeline only knows the [`Beautifier`] trait: source text and
//! settings in, formatted text or a [`FormatError`] out. [`VhdlBeautifier`] is
//! the bundled implementation, organized into submodules:
//! - [`lexer`]: Masks string literals, character literals and comments
//! - [`statements`]: Comment/report removal, alias substitution, line-break rules
//! - [`case_convert`]: Converts case of reserved words and type names
//! - [`indenter`]: Manages indentation levels based on VHDL block structure
//! - [`aligner`]: Aligns `:` / `<=` style symbols across neighbouring lines

pub mod aligner;
pub mod case_convert;
pub mod indenter;
pub mod lexer;
pub mod statements;

pub use aligner::align_symbols;
pub use case_convert::{convert_case, CaseSettings};
pub use indenter::VhdlIndenter;
pub use lexer::{mask_line, MaskedLine};
pub use statements::{apply_new_line_settings, remove_comments, remove_reports, substitute_aliases};

use crate::config::BeautifierSettings;
use crate::error::FormatError;

/// A pure source-to-source formatter
///
/// Implementations are shared by every job of a batch, so they must be `Sync`
/// and must not keep per-call state.
pub trait Beautifier: Send + Sync {
    fn beautify(&self, input: &str, settings: &BeautifierSettings) -> Result<String, FormatError>;
}

impl<F> Beautifier for F
where
    F: Fn(&str, &BeautifierSettings) -> Result<String, FormatError> + Send + Sync,
{
    fn beautify(&self, input: &str, settings: &BeautifierSettings) -> Result<String, FormatError> {
        self(input, settings)
    }
}

/// The bundled line-oriented VHDL beautifier
#[derive(Debug, Clone, Copy, Default)]
pub struct VhdlBeautifier;

impl Beautifier for VhdlBeautifier {
    fn beautify(&self, input: &str, settings: &BeautifierSettings) -> Result<String, FormatError> {
        beautify(input, settings)
    }
}

/// Format VHDL source text
///
/// Line numbers in errors refer to the text after comment/report removal and
/// line-break rules have been applied.
pub fn beautify(input: &str, settings: &BeautifierSettings) -> Result<String, FormatError> {
    let trailing_newline = input.ends_with('\n');
    let mut lines: Vec<String> = input.lines().map(str::to_string).collect();

    for (idx, line) in lines.iter().enumerate() {
        mask_line(line).map_err(|e| FormatError::at_line(e.message, idx + 1))?;
    }

    if settings.remove_comments {
        lines = remove_comments(&lines)?;
    }
    if settings.remove_reports {
        lines = remove_reports(&lines)?;
    }
    if settings.check_alias {
        lines = substitute_aliases(&lines)?;
    }
    if let Some(new_lines) = &settings.new_line_settings {
        lines = apply_new_line_settings(&lines, new_lines)?;
    }

    let case = CaseSettings {
        keywords: settings.key_word_case,
        types: settings.type_case,
    };
    let mut indenter = VhdlIndenter::new();
    let mut out = Vec::with_capacity(lines.len());

    for (idx, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            out.push(String::new());
            continue;
        }
        let masked = mask_line(trimmed).map_err(|e| FormatError::at_line(e.message, idx + 1))?;
        let depth = indenter.process_line(masked.code(), idx + 1)?;
        let converted = convert_case(trimmed, &masked, case);
        out.push(format!("{}{converted}", settings.indentation.repeat(depth)));
    }

    if let Some(align) = &settings.sign_align_settings {
        align_symbols(&mut out, align)?;
    }

    let mut formatted = out.join(&settings.end_of_line);
    if trailing_newline && !out.is_empty() {
        formatted.push_str(&settings.end_of_line);
    }
    Ok(formatted)
}

/// Rewrite every line break (`\r\n`, `\r` or `\n`) as `end_of_line`
#[must_use]
pub fn encode_line_endings(text: &str, end_of_line: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                chars.next_if_eq(&'\n');
                out.push_str(end_of_line);
            }
            '\n' => out.push_str(end_of_line),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_line_endings() {
        assert_eq!(encode_line_endings("a\nb\r\nc\rd", "\r\n"), "a\r\nb\r\nc\r\nd");
        assert_eq!(encode_line_endings("a\r\nb\r\n", "\n"), "a\nb\n");
        assert_eq!(encode_line_endings("", "\r\n"), "");
    }

    #[test]
    fn test_encode_line_endings_is_idempotent() {
        let once = encode_line_endings("x\ny\n", "\r\n");
        assert_eq!(encode_line_endings(&once, "\r\n"), once);
    }

    #[test]
    fn test_closure_is_a_beautifier() {
        let upper = |input: &str, _: &BeautifierSettings| Ok::<_, FormatError>(input.to_uppercase());
        let settings = BeautifierSettings::default();
        assert_eq!(upper.beautify("abc", &settings).unwrap(), "ABC");
    }

    #[test]
    fn test_blank_input() {
        let settings = BeautifierSettings::default();
        assert_eq!(beautify("", &settings).unwrap(), "");
        assert_eq!(beautify("\n\n", &settings).unwrap(), "\r\n\r\n");
    }
}
