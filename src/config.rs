//! Configuration management for vhdlformat.
//!
//! This module provides the two records every run is built from:
//! - [`BeautifierSettings`]: options handed to the beautifier for every file
//! - [`CommandOptions`]: how the batch itself behaves (inputs, output mode, verbosity)
//!
//! Settings can be loaded from:
//! - TOML files (`vhdlformat.toml`)
//! - CLI arguments (which override file settings)
//!
//! Config files are auto-discovered by searching the current directory and its
//! parents up to the filesystem root, plus the user's home directory.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config file names to search for (in order of priority, later overrides earlier)
const CONFIG_FILE_NAMES: &[&str] = &["vhdlformat.toml"];

/// Get the user's home directory
fn dirs_home() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home));
    }
    if let Ok(userprofile) = std::env::var("USERPROFILE") {
        return Some(PathBuf::from(userprofile));
    }
    None
}

/// Case normalization applied to reserved words or type names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum CaseMode {
    #[default]
    Uppercase,
    Lowercase,
    /// Leave the original spelling untouched
    None,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown case mode \"{0}\" (expected uppercase, lowercase or none)")]
pub struct ParseCaseModeError(String);

impl FromStr for CaseMode {
    type Err = ParseCaseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uppercase" | "upper" => Ok(CaseMode::Uppercase),
            "lowercase" | "lower" => Ok(CaseMode::Lowercase),
            "none" | "defaultcase" => Ok(CaseMode::None),
            _ => Err(ParseCaseModeError(s.to_string())),
        }
    }
}

impl TryFrom<String> for CaseMode {
    type Error = ParseCaseModeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for CaseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CaseMode::Uppercase => "uppercase",
            CaseMode::Lowercase => "lowercase",
            CaseMode::None => "none",
        })
    }
}

/// How far a run of aligned lines extends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignMode {
    /// Consecutive lines at the same indentation
    #[default]
    Local,
    /// Every line of the file at the same indentation
    Global,
}

/// Alignment of symbols such as `:` and `<=` across neighbouring lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignAlignSettings {
    pub mode: AlignMode,
    pub symbols: Vec<String>,
}

impl Default for SignAlignSettings {
    fn default() -> Self {
        SignAlignSettings {
            mode: AlignMode::Local,
            symbols: vec![":".to_string(), "<=".to_string(), ":=".to_string()],
        }
    }
}

/// Line-break insertion and removal rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewLineSettings {
    /// Break the line after these tokens when more code follows on the same line
    pub new_line_after: Vec<String>,
    /// Join the next code line when a line ends with one of these tokens
    pub no_new_line_after: Vec<String>,
}

impl Default for NewLineSettings {
    fn default() -> Self {
        NewLineSettings {
            new_line_after: vec![";".to_string(), "then".to_string()],
            no_new_line_after: Vec::new(),
        }
    }
}

/// Options handed to the beautifier, shared read-only by every file job of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeautifierSettings {
    /// Strip `--` comments (default: false)
    pub remove_comments: bool,

    /// Strip `report` and `assert` statements (default: false)
    pub remove_reports: bool,

    /// Replace uses of an alias with the aliased name (default: false)
    pub check_alias: bool,

    /// Symbol alignment rules (default: disabled)
    pub sign_align_settings: Option<SignAlignSettings>,

    /// Case of reserved words (default: uppercase)
    pub key_word_case: CaseMode,

    /// Case of standard type names (default: uppercase)
    pub type_case: CaseMode,

    /// Unit inserted per nesting level (default: one tab)
    pub indentation: String,

    /// Line-break rules (default: disabled)
    pub new_line_settings: Option<NewLineSettings>,

    /// Line terminator written to output (default: CRLF)
    pub end_of_line: String,
}

/// Partial settings for TOML parsing
///
/// All fields are `Option<T>` so we can distinguish between
/// "explicitly set" and "not specified" when merging configs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct PartialSettings {
    pub remove_comments: Option<bool>,
    pub remove_reports: Option<bool>,
    pub check_alias: Option<bool>,
    pub sign_align_settings: Option<SignAlignSettings>,
    pub key_word_case: Option<CaseMode>,
    pub type_case: Option<CaseMode>,
    pub indentation: Option<String>,
    pub new_line_settings: Option<NewLineSettings>,
    pub end_of_line: Option<String>,
}

impl Default for BeautifierSettings {
    fn default() -> Self {
        BeautifierSettings {
            remove_comments: false,
            remove_reports: false,
            check_alias: false,
            sign_align_settings: None,
            key_word_case: CaseMode::Uppercase,
            type_case: CaseMode::Uppercase,
            indentation: "\t".to_string(),
            new_line_settings: None,
            end_of_line: "\r\n".to_string(),
        }
    }
}

impl BeautifierSettings {
    /// Validate settings values
    ///
    /// Returns an error message if validation fails, None if valid.
    /// `indentation` and `end_of_line` are opaque and never checked.
    #[must_use]
    pub fn validate(&self) -> Option<String> {
        if let Some(align) = &self.sign_align_settings {
            if align.symbols.iter().all(|s| s.trim().is_empty()) {
                return Some("sign_align_settings.symbols must name at least one symbol".to_string());
            }
        }
        None
    }

    /// Load settings from a TOML file on top of the defaults
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let mut settings = Self::default();
        settings.apply_partial(&read_partial(path)?);
        Ok(settings)
    }

    /// Apply a partial config, only overriding fields that are explicitly set
    pub(crate) fn apply_partial(&mut self, partial: &PartialSettings) {
        if let Some(v) = partial.remove_comments {
            self.remove_comments = v;
        }
        if let Some(v) = partial.remove_reports {
            self.remove_reports = v;
        }
        if let Some(v) = partial.check_alias {
            self.check_alias = v;
        }
        if let Some(v) = &partial.sign_align_settings {
            self.sign_align_settings = Some(v.clone());
        }
        if let Some(v) = partial.key_word_case {
            self.key_word_case = v;
        }
        if let Some(v) = partial.type_case {
            self.type_case = v;
        }
        if let Some(v) = &partial.indentation {
            self.indentation = parse_indentation(v);
        }
        if let Some(v) = &partial.new_line_settings {
            self.new_line_settings = Some(v.clone());
        }
        if let Some(v) = &partial.end_of_line {
            self.end_of_line = parse_end_of_line(v);
        }
    }

    /// Discover config files from `start_dir` and its parents
    ///
    /// Returns list of config file paths in order of priority (least specific first),
    /// beginning with the home directory config.
    #[must_use]
    pub fn discover_config_files(start_dir: &Path) -> Vec<PathBuf> {
        let mut config_files = Vec::new();

        if let Some(home) = dirs_home() {
            for config_name in CONFIG_FILE_NAMES {
                let home_config = home.join(config_name);
                if home_config.is_file() {
                    config_files.push(home_config);
                }
            }
        }

        let mut ancestors: Vec<&Path> = start_dir.ancestors().collect();
        // Root first, so closer directories override
        ancestors.reverse();

        for ancestor in ancestors {
            for config_name in CONFIG_FILE_NAMES {
                let config_path = ancestor.join(config_name);
                if config_path.is_file() && !config_files.contains(&config_path) {
                    config_files.push(config_path);
                }
            }
        }

        config_files
    }

    /// Load and merge settings from discovered config files
    ///
    /// Later files override earlier ones. Files that fail to parse are skipped.
    #[must_use]
    pub fn from_discovered_files(start_dir: &Path) -> Self {
        let mut settings = Self::default();
        for path in Self::discover_config_files(start_dir) {
            match read_partial(&path) {
                Ok(partial) => {
                    tracing::debug!(path = %path.display(), "applying config file");
                    settings.apply_partial(&partial);
                }
                Err(e) => tracing::warn!("skipping config file {}: {e:#}", path.display()),
            }
        }
        settings
    }
}

fn read_partial(path: &Path) -> anyhow::Result<PartialSettings> {
    let contents = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}

/// Expand `\t`, `\r`, `\n` and `\\` escapes typed on a command line
#[must_use]
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Interpret an `--indentation` value
#[must_use]
pub fn parse_indentation(value: &str) -> String {
    unescape(value)
}

/// Interpret an `--end-of-line` value: `crlf`, `lf`, `cr` or an escaped literal
#[must_use]
pub fn parse_end_of_line(value: &str) -> String {
    match value.to_ascii_lowercase().as_str() {
        "crlf" => "\r\n".to_string(),
        "lf" => "\n".to_string(),
        "cr" => "\r".to_string(),
        _ => unescape(value),
    }
}

/// How the batch itself runs; built once from parsed arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOptions {
    /// Files to process, never empty once resolved
    pub inputs: Vec<PathBuf>,

    /// Write results back to the input path instead of printing them
    pub overwrite: bool,

    /// Suppress stdout echo and informational lines
    pub quiet: bool,

    /// Print the full error chain on failure
    pub verbose: bool,

    /// Enable debug tracing
    pub debug: bool,

    /// Worker threads (None or 0 = automatic, 1 = sequential)
    pub jobs: Option<usize>,
}
