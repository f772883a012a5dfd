//! Block-structured indentation for VHDL
//!
//! [`VhdlIndenter`] is fed one line of masked code at a time and returns the
//! nesting depth that line is printed at. It tracks a stack of open blocks:
//! design units, processes and subprograms, `if`/`case`/loop/generate
//! statements, records, components, and parenthesised lists spanning lines.
//!
//! Subprogram and unit headers may spread their parameter list and `is`
//! over several lines; the block opens on the line that ends in `is`.
//! Inside a configuration declaration every `for` opens a block that
//! closes with `end for`.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::FormatError;

/// An `end` anywhere past the first word closes the block on the same line
static INLINE_END_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bend\b").unwrap());

/// Design units that open with `<keyword> ... is`
const UNIT_KEYWORDS: &[&str] = &["entity", "architecture", "package", "context"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    /// entity, architecture, package, context
    Unit,
    /// configuration declaration; its `for` lines open blocks
    Configuration,
    /// process, subprogram, block, component, record, protected type,
    /// block or component configuration
    Body,
    If,
    /// `case` bodies indent twice: once for `when`, once for its statements
    Case,
    /// loop or generate
    Loop,
    /// open parenthesis carried over to following lines
    Paren,
}

#[derive(Debug, Clone, Copy)]
struct Block {
    kind: BlockKind,
    levels: usize,
    /// Block the header owning this parenthesis opens once it reaches `is`
    resumes: Option<BlockKind>,
}

/// Tracks nesting across the lines of one file
#[derive(Debug, Default)]
pub struct VhdlIndenter {
    stack: Vec<Block>,
    /// Header whose parameter list is complete but whose `is` is still ahead
    awaiting_is: Option<BlockKind>,
}

impl VhdlIndenter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current nesting depth
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.iter().map(|b| b.levels).sum()
    }

    fn top(&self) -> Option<BlockKind> {
        self.stack.last().map(|b| b.kind)
    }

    fn push(&mut self, kind: BlockKind, resumes: Option<BlockKind>) {
        let levels = if kind == BlockKind::Case { 2 } else { 1 };
        self.stack.push(Block {
            kind,
            levels,
            resumes,
        });
    }

    fn in_configuration(&self) -> bool {
        self.stack.iter().any(|b| b.kind == BlockKind::Configuration)
    }

    /// Process one line of masked code and return the depth to print it at
    ///
    /// `line_no` is only used for error reporting.
    pub fn process_line(&mut self, code: &str, line_no: usize) -> Result<usize, FormatError> {
        let lower = code.trim().to_ascii_lowercase();
        if lower.is_empty() {
            return Ok(self.depth());
        }

        let (body, labelled) = strip_label(&lower);
        let first = first_word(body);

        if first == "end" {
            self.awaiting_is = None;
            self.close_block(line_no)?;
            let depth = self.depth();
            self.track_parens(body, None);
            return Ok(depth);
        }

        let top = self.top();
        let outdent = match first {
            "begin" => top.is_some_and(|k| k != BlockKind::Paren),
            "else" | "elsif" => top == Some(BlockKind::If),
            "when" => top == Some(BlockKind::Case),
            _ => body.starts_with(')') && top == Some(BlockKind::Paren),
        };
        let depth = if outdent {
            self.depth().saturating_sub(1)
        } else {
            self.depth()
        };

        let closes_inline = INLINE_END_RE.is_match(&body[first.len()..]);
        let pending = self.awaiting_is.take();
        if closes_inline {
            self.track_parens(body, None);
            return Ok(depth);
        }

        let opened = match pending {
            Some(kind) if ends_with_word(body, "is") => Some(kind),
            _ => self.opener(body, first, labelled),
        };
        let header = match opened {
            Some(kind) => {
                self.push(kind, None);
                None
            }
            None if labelled => pending,
            None => pending.or_else(|| header_kind(body, first)),
        };
        self.track_parens(body, header);
        Ok(depth)
    }

    /// Pop the innermost statement block, discarding unbalanced parentheses above it
    fn close_block(&mut self, line_no: usize) -> Result<(), FormatError> {
        while let Some(block) = self.stack.pop() {
            if block.kind != BlockKind::Paren {
                return Ok(());
            }
        }
        Err(FormatError::at_line(
            "\"end\" without a matching block",
            line_no,
        ))
    }

    /// Follow parentheses left open across lines
    ///
    /// `header` is the block a subprogram or unit header on this line will
    /// open once its `is` shows up, possibly after a multi-line list.
    fn track_parens(&mut self, body: &str, header: Option<BlockKind>) {
        let opens = body.matches('(').count();
        let closes = body.matches(')').count();
        if opens > closes {
            self.push(BlockKind::Paren, header);
            return;
        }

        let mut resumes = None;
        for _ in opens..closes {
            if self.top() != Some(BlockKind::Paren) {
                break;
            }
            if let Some(block) = self.stack.pop() {
                resumes = block.resumes.or(resumes);
            }
        }

        if let Some(kind) = resumes.or(header) {
            // A header still waiting for its `is` ends at the first `;`
            if ends_with_word(body, "is") {
                self.push(kind, None);
            } else if !body.contains(';') {
                self.awaiting_is = Some(kind);
            }
        }
    }

    /// Block opened by a line, if any
    fn opener(&self, body: &str, first: &str, labelled: bool) -> Option<BlockKind> {
        match first {
            "process" => return Some(BlockKind::Body),
            "postponed" if second_word(body, first) == "process" => return Some(BlockKind::Body),
            "if" => return Some(BlockKind::If),
            "case" => return Some(BlockKind::Case),
            // `label: component name` is an instantiation, not a declaration
            "component" if !labelled => return Some(BlockKind::Body),
            "block" => return Some(BlockKind::Body),
            _ => {}
        }

        if ends_with_word(body, "loop") || ends_with_word(body, "generate") {
            return Some(BlockKind::Loop);
        }
        // Block and component configurations always close with `end for`
        if first == "for" && self.in_configuration() {
            return Some(BlockKind::Body);
        }
        if ends_with_word(body, "record")
            || ends_with_word(body, "protected")
            || ends_with_word(body, "protected body")
        {
            return Some(BlockKind::Body);
        }
        if !ends_with_word(body, "is") {
            return None;
        }
        header_kind(body, first)
    }
}

/// Block a unit or subprogram header opens, whether or not its `is` is on this line
fn header_kind(body: &str, first: &str) -> Option<BlockKind> {
    match first {
        "configuration" => Some(BlockKind::Configuration),
        _ if UNIT_KEYWORDS.contains(&first) => Some(BlockKind::Unit),
        "function" | "procedure" => Some(BlockKind::Body),
        "pure" | "impure" if second_word(body, first) == "function" => Some(BlockKind::Body),
        _ => None,
    }
}

/// Remove a leading `label :` (but not `name :=`); reports whether one was removed
fn strip_label(code: &str) -> (&str, bool) {
    let ident_len = code
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(code.len());
    if ident_len == 0 {
        return (code, false);
    }
    let rest = code[ident_len..].trim_start();
    match rest.strip_prefix(':') {
        Some(after) if !after.starts_with('=') => (after.trim_start(), true),
        _ => (code, false),
    }
}

fn first_word(code: &str) -> &str {
    let len = code
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(code.len());
    &code[..len]
}

fn second_word(code: &str, first: &str) -> String {
    first_word(code[first.len()..].trim_start()).to_string()
}

fn ends_with_word(code: &str, word: &str) -> bool {
    let code = code.trim_end();
    code.strip_suffix(word).is_some_and(|head| {
        !head
            .chars()
            .next_back()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
    })
}
