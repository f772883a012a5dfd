//! Case conversion for VHDL reserved words and standard type names
//!
//! Implements the `key_word_case` and `type_case` settings. Only code is
//! touched: string literals, character literals and comments keep their
//! original spelling.

use std::sync::LazyLock;

use regex::Regex;

use super::lexer::MaskedLine;
use crate::config::CaseMode;

/// VHDL reserved words (VHDL-2008)
static KEYWORDS_RE: LazyLock<Regex> = LazyLock::new(|| {
    word_set_regex(&[
        "abs", "access", "after", "alias", "all", "and", "architecture", "array", "assert",
        "assume", "attribute", "begin", "block", "body", "buffer", "bus", "case", "component",
        "configuration", "constant", "context", "cover", "default", "disconnect", "downto",
        "else", "elsif", "end", "entity", "exit", "fairness", "file", "for", "force", "function",
        "generate", "generic", "group", "guarded", "if", "impure", "in", "inertial", "inout",
        "is", "label", "library", "linkage", "literal", "loop", "map", "mod", "nand", "new",
        "next", "nor", "not", "null", "of", "on", "open", "or", "others", "out", "package",
        "parameter", "port", "postponed", "procedure", "process", "property", "protected",
        "pure", "range", "record", "register", "reject", "release", "rem", "report", "restrict",
        "return", "rol", "ror", "select", "sequence", "severity", "shared", "signal", "sla",
        "sll", "sra", "srl", "strong", "subtype", "then", "to", "transport", "type",
        "unaffected", "units", "until", "use", "variable", "vmode", "vprop", "vunit", "wait",
        "when", "while", "with", "xnor", "xor",
    ])
});

/// Standard and IEEE library type names
static TYPES_RE: LazyLock<Regex> = LazyLock::new(|| {
    word_set_regex(&[
        "bit", "bit_vector", "boolean", "boolean_vector", "character", "delay_length",
        "file_open_kind", "file_open_status", "integer", "integer_vector", "line", "natural",
        "positive", "real", "real_vector", "severity_level", "signed", "std_logic",
        "std_logic_vector", "std_ulogic", "std_ulogic_vector", "string", "text", "time",
        "time_vector", "unsigned",
    ])
});

fn word_set_regex(words: &[&str]) -> Regex {
    Regex::new(&format!(r"(?i)\b({})\b", words.join("|"))).unwrap()
}

/// Case settings resolved for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaseSettings {
    pub keywords: CaseMode,
    pub types: CaseMode,
}

impl CaseSettings {
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.keywords == CaseMode::None && self.types == CaseMode::None
    }
}

/// Convert reserved words and type names in the code portion of `line`
///
/// `masked` must be the mask of `line`; matches are searched in the mask so
/// literal and comment text is never converted.
#[must_use]
pub fn convert_case(line: &str, masked: &MaskedLine, settings: CaseSettings) -> String {
    if settings.is_noop() {
        return line.to_string();
    }

    let code = masked.code();
    let mut out = line.as_bytes().to_vec();

    for (re, mode) in [(&*KEYWORDS_RE, settings.keywords), (&*TYPES_RE, settings.types)] {
        if mode == CaseMode::None {
            continue;
        }
        for m in re.find_iter(code) {
            // Skip words glued to an extended identifier or numeric literal
            if code[..m.start()].ends_with(&['\\', '#'][..]) {
                continue;
            }
            let target = &mut out[m.start()..m.end()];
            match mode {
                CaseMode::Uppercase => target.make_ascii_uppercase(),
                CaseMode::Lowercase => target.make_ascii_lowercase(),
                CaseMode::None => {}
            }
        }
    }

    // Matches are ASCII words, so case changes keep the bytes valid UTF-8
    String::from_utf8(out).unwrap_or_else(|_| line.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::lexer::mask_line;

    fn convert(line: &str, keywords: CaseMode, types: CaseMode) -> String {
        let masked = mask_line(line).unwrap();
        convert_case(line, &masked, CaseSettings { keywords, types })
    }

    #[test]
    fn test_keywords_upper() {
        assert_eq!(
            convert("entity foo is", CaseMode::Uppercase, CaseMode::None),
            "ENTITY foo IS"
        );
    }

    #[test]
    fn test_keywords_lower() {
        assert_eq!(
            convert("END ARCHITECTURE Rtl;", CaseMode::Lowercase, CaseMode::None),
            "end architecture Rtl;"
        );
    }

    #[test]
    fn test_types_only() {
        assert_eq!(
            convert(
                "signal s : std_logic_vector(7 downto 0);",
                CaseMode::None,
                CaseMode::Uppercase
            ),
            "signal s : STD_LOGIC_VECTOR(7 downto 0);"
        );
    }

    #[test]
    fn test_identifier_containing_keyword_untouched() {
        assert_eq!(
            convert("signal end_of_frame : bit;", CaseMode::Uppercase, CaseMode::Uppercase),
            "SIGNAL end_of_frame : BIT;"
        );
    }

    #[test]
    fn test_strings_and_comments_untouched() {
        assert_eq!(
            convert(
                "report \"end of sim\" severity note; -- process done",
                CaseMode::Uppercase,
                CaseMode::None
            ),
            "REPORT \"end of sim\" SEVERITY note; -- process done"
        );
    }

    #[test]
    fn test_none_is_identity() {
        let line = "Entity Foo Is";
        assert_eq!(convert(line, CaseMode::None, CaseMode::None), line);
    }
}
