//! Vertical alignment of symbols such as `:` and `<=` across lines
//!
//! Lines are grouped by their indentation prefix. In [`AlignMode::Local`] a
//! group is a run of consecutive lines that all contain the symbol; in
//! [`AlignMode::Global`] every line of the file with the same prefix belongs to
//! one group. Within a group the text before the symbol is padded so the
//! symbols line up in one column.

use std::collections::HashMap;

use super::lexer::mask_line;
use crate::config::{AlignMode, SignAlignSettings};
use crate::error::FormatError;

/// Byte offset of the first code occurrence of `symbol` in `line`
fn find_symbol(line: &str, symbol: &str) -> Result<Option<usize>, FormatError> {
    let masked = mask_line(line)?;
    let code = masked.code();
    let found = code.match_indices(symbol).map(|(i, _)| i).find(|&i| {
        // A bare `:` must not be the start of `:=`
        !(symbol == ":" && code[i + 1..].starts_with('='))
    });
    Ok(found)
}

fn indent_prefix(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Align every configured symbol, one symbol at a time
pub fn align_symbols(lines: &mut [String], settings: &SignAlignSettings) -> Result<(), FormatError> {
    for symbol in settings.symbols.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let mut positions = Vec::with_capacity(lines.len());
        for line in lines.iter() {
            positions.push(find_symbol(line, symbol)?);
        }

        let groups = match settings.mode {
            AlignMode::Local => local_groups(lines, &positions),
            AlignMode::Global => global_groups(lines, &positions),
        };

        for group in groups.into_iter().filter(|g| g.len() > 1) {
            align_group(lines, &positions, &group, symbol);
        }
    }
    Ok(())
}

fn local_groups(lines: &[String], positions: &[Option<usize>]) -> Vec<Vec<usize>> {
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        let continues = current
            .last()
            .is_some_and(|&prev| indent_prefix(&lines[prev]) == indent_prefix(line));
        if positions[idx].is_none() || !continues {
            groups.push(std::mem::take(&mut current));
        }
        if positions[idx].is_some() {
            current.push(idx);
        }
    }
    groups.push(current);
    groups
}

fn global_groups(lines: &[String], positions: &[Option<usize>]) -> Vec<Vec<usize>> {
    let mut by_prefix: HashMap<&str, Vec<usize>> = HashMap::new();
    for (idx, line) in lines.iter().enumerate() {
        if positions[idx].is_some() {
            by_prefix.entry(indent_prefix(line)).or_default().push(idx);
        }
    }
    by_prefix.into_values().collect()
}

fn align_group(lines: &mut [String], positions: &[Option<usize>], group: &[usize], symbol: &str) {
    let heads: Vec<(usize, String, String)> = group
        .iter()
        .filter_map(|&idx| {
            let pos = positions[idx]?;
            let line = &lines[idx];
            Some((idx, line[..pos].trim_end().to_string(), line[pos + symbol.len()..].to_string()))
        })
        .collect();

    let column = heads
        .iter()
        .map(|(_, head, _)| head.chars().count() + 1)
        .max()
        .unwrap_or(0);

    for (idx, head, tail) in heads {
        let pad = column - head.chars().count();
        lines[idx] = format!("{head}{}{symbol}{tail}", " ".repeat(pad));
    }
}
