//! Whole-statement rewrites applied before indentation
//!
//! - [`remove_comments`]: drops `--` comments (and lines that only held a comment)
//! - [`remove_reports`]: drops `report` and `assert` statements, including continuations
//! - [`substitute_aliases`]: replaces uses of an alias with the aliased name
//! - [`apply_new_line_settings`]: inserts and removes line breaks after configured tokens

use std::sync::LazyLock;

use regex::Regex;

use super::lexer::{mask_line, MaskedLine};
use crate::config::NewLineSettings;
use crate::error::FormatError;

/// `[label :] assert|report` at the start of a statement
static REPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(?:\w+\s*:\s*)?(?:assert|report)\b").unwrap());

/// `alias name [: subtype] is target;`
static ALIAS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*alias\s+(\w+)\b[^;]*?\bis\s+([^;]+?)\s*;").unwrap()
});

fn mask_at(line: &str, line_no: usize) -> Result<MaskedLine, FormatError> {
    mask_line(line).map_err(|e| FormatError::at_line(e.message, line_no))
}

/// Strip comments; lines holding nothing but a comment disappear
pub fn remove_comments(lines: &[String]) -> Result<Vec<String>, FormatError> {
    let mut out = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        let masked = mask_at(line, idx + 1)?;
        match masked.comment_start {
            Some(start) => {
                let code = line[..start].trim_end();
                if !code.trim().is_empty() {
                    out.push(code.to_string());
                }
            }
            None => out.push(line.clone()),
        }
    }
    Ok(out)
}

/// Drop `report` and `assert` statements up to their terminating `;`
pub fn remove_reports(lines: &[String]) -> Result<Vec<String>, FormatError> {
    let mut out = Vec::with_capacity(lines.len());
    let mut skipping = false;
    for (idx, line) in lines.iter().enumerate() {
        let masked = mask_at(line, idx + 1)?;
        let code = masked.code();
        if !skipping && REPORT_RE.is_match(code) {
            skipping = true;
        }
        if skipping {
            if code.contains(';') {
                skipping = false;
            }
            continue;
        }
        out.push(line.clone());
    }
    Ok(out)
}

/// Replace every later use of a declared alias with its target
pub fn substitute_aliases(lines: &[String]) -> Result<Vec<String>, FormatError> {
    let mut aliases: Vec<(Regex, String)> = Vec::new();
    let mut out = Vec::with_capacity(lines.len());

    for (idx, line) in lines.iter().enumerate() {
        let masked = mask_at(line, idx + 1)?;
        if let Some(caps) = ALIAS_RE.captures(masked.code()) {
            if let (Some(name), Some(target)) = (caps.get(1), caps.get(2)) {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(name.as_str()));
                let re = Regex::new(&pattern)
                    .map_err(|e| FormatError::at_line(format!("bad alias name: {e}"), idx + 1))?;
                aliases.push((re, line[target.range()].to_string()));
            }
            out.push(line.clone());
            continue;
        }

        let mut current = line.clone();
        for (re, target) in &aliases {
            let masked = mask_at(&current, idx + 1)?;
            let ranges: Vec<_> = re.find_iter(masked.code()).map(|m| m.range()).collect();
            // Replace back to front so earlier ranges stay valid
            for range in ranges.into_iter().rev() {
                current.replace_range(range, target);
            }
        }
        out.push(current);
    }
    Ok(out)
}

/// Compiled form of one configured line-break token
enum Token {
    Word(Regex),
    Symbol(String),
}

impl Token {
    fn compile(raw: &str) -> Option<Token> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if raw.chars().all(|c| c.is_alphanumeric() || c == '_') {
            let re = Regex::new(&format!(r"(?i)\b{}\b", regex::escape(raw))).ok()?;
            Some(Token::Word(re))
        } else {
            Some(Token::Symbol(raw.to_string()))
        }
    }

    /// End offsets of every occurrence in `code`
    fn match_ends(&self, code: &str) -> Vec<usize> {
        match self {
            Token::Word(re) => re.find_iter(code).map(|m| m.end()).collect(),
            Token::Symbol(s) => code.match_indices(s.as_str()).map(|(i, _)| i + s.len()).collect(),
        }
    }

    fn ends(&self, code: &str) -> bool {
        let code = code.trim_end();
        self.match_ends(code).last() == Some(&code.len())
    }
}

fn paren_depth(code: &str) -> i32 {
    code.bytes().fold(0, |depth, b| match b {
        b'(' => depth + 1,
        b')' => depth - 1,
        _ => depth,
    })
}

/// First offset after a break token, outside parentheses, with more code behind it
fn find_break(masked: &MaskedLine, tokens: &[Token]) -> Option<usize> {
    let code = masked.code();
    tokens
        .iter()
        .flat_map(|t| t.match_ends(code))
        .filter(|&end| paren_depth(&code[..end]) == 0 && !code[end..].trim().is_empty())
        .min()
}

/// Insert breaks after `new_line_after` tokens, then join lines ending in `no_new_line_after`
pub fn apply_new_line_settings(
    lines: &[String],
    settings: &NewLineSettings,
) -> Result<Vec<String>, FormatError> {
    let breaks: Vec<Token> = settings
        .new_line_after
        .iter()
        .filter_map(|t| Token::compile(t))
        .collect();
    let joins: Vec<Token> = settings
        .no_new_line_after
        .iter()
        .filter_map(|t| Token::compile(t))
        .collect();

    let mut split = Vec::with_capacity(lines.len());
    for (idx, line) in lines.iter().enumerate() {
        let mut rest = line.clone();
        loop {
            let masked = mask_at(&rest, idx + 1)?;
            match find_break(&masked, &breaks) {
                Some(end) => {
                    split.push(rest[..end].trim_end().to_string());
                    rest = rest[end..].trim_start().to_string();
                }
                None => {
                    split.push(rest);
                    break;
                }
            }
        }
    }

    if joins.is_empty() {
        return Ok(split);
    }

    let mut out: Vec<String> = Vec::with_capacity(split.len());
    let mut pending_join = false;
    for (idx, line) in split.into_iter().enumerate() {
        let masked = mask_at(&line, idx + 1)?;
        let is_code = !masked.code().trim().is_empty();
        match out.last_mut() {
            Some(prev) if pending_join && is_code => {
                prev.push(' ');
                prev.push_str(line.trim_start());
            }
            _ => {
                out.push(line);
            }
        }
        if let Some(last) = out.last() {
            let last_masked = mask_at(last, idx + 1)?;
            pending_join = last_masked.comment_start.is_none()
                && joins.iter().any(|t| t.ends(last_masked.code()));
        }
    }
    Ok(out)
}
