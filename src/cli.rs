//! Command-line interface for vhdlformat.
//!
//! Defines CLI arguments using clap builder API and resolves them, together
//! with any config file, into [`CommandOptions`] and [`BeautifierSettings`].

use std::path::{Path, PathBuf};

use clap::{Arg, ArgAction, Command};

use crate::config::{
    parse_end_of_line, parse_indentation, BeautifierSettings, CaseMode, CommandOptions,
};
use crate::error::UsageError;
use crate::process::collect_files;

/// CLI arguments parsed from command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    /// Files or directories to format
    pub inputs: Vec<PathBuf>,

    /// Overwrite files in place instead of printing
    pub overwrite: bool,

    pub quiet: bool,

    pub verbose: bool,

    pub remove_comments: bool,

    pub remove_reports: bool,

    pub check_alias: bool,

    /// Case of reserved words
    pub key_word_case: Option<CaseMode>,

    /// Case of type names
    pub type_case: Option<CaseMode>,

    /// Raw indentation unit, escapes not yet expanded
    pub indentation: Option<String>,

    /// Raw line terminator (`crlf`, `lf`, `cr` or an escaped literal)
    pub end_of_line: Option<String>,

    /// Config file path
    pub config: Option<PathBuf>,

    /// Recursive directory processing
    pub recursive: bool,

    /// Exclude patterns for files/directories (glob patterns)
    pub exclude: Vec<String>,

    /// Number of parallel jobs (0 = auto, 1 = sequential)
    pub jobs: Option<usize>,

    /// Enable debug output
    pub debug: bool,
}

/// Build the clap Command for parsing CLI arguments
#[must_use]
pub fn build_cli() -> Command {
    Command::new("vhdlformat")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Batch beautifier for VHDL source files")
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .short('v')
                .long("version")
                .help("Print version")
                .action(ArgAction::Version),
        )
        .arg(
            Arg::new("inputs")
                .help("Files or directories to format")
                .value_name("FILE")
                .num_args(1..)
                .required(false)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("write")
                .long("write")
                .alias("overwrite")
                .help("Overwrite files in place instead of printing the result")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .help("Suppress formatted output and informational messages")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .help("Print the full error chain when a file fails")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("remove-comments")
                .long("remove-comments")
                .alias("removeComments")
                .help("Remove comments")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("remove-reports")
                .long("remove-reports")
                .alias("removeReports")
                .help("Remove report and assert statements")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("check-alias")
                .long("check-alias")
                .alias("checkAlias")
                .help("Replace uses of aliases with the aliased name")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("key-word-case")
                .long("key-word-case")
                .alias("keyWordCase")
                .help("Case of reserved words: uppercase, lowercase or none [default: uppercase]")
                .value_name("CASE")
                .value_parser(clap::value_parser!(CaseMode)),
        )
        .arg(
            Arg::new("type-case")
                .long("type-case")
                .alias("typeCase")
                .help("Case of type names: uppercase, lowercase or none [default: uppercase]")
                .value_name("CASE")
                .value_parser(clap::value_parser!(CaseMode)),
        )
        .arg(
            Arg::new("indentation")
                .long("indentation")
                .help("Indentation unit, escapes like \\t are expanded [default: \\t]")
                .value_name("TEXT")
                .allow_hyphen_values(true),
        )
        .arg(
            Arg::new("end-of-line")
                .long("end-of-line")
                .alias("endOfLine")
                .help("Line terminator: crlf, lf, cr or an escaped literal [default: crlf]")
                .value_name("EOL"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to configuration file (overrides auto-discovery)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("recursive")
                .short('r')
                .long("recursive")
                .help("Recursively format directories")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("exclude")
                .short('e')
                .long("exclude")
                .help("Exclude files/directories matching pattern (glob syntax, can be repeated)")
                .value_name("PATTERN")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .help("Number of parallel jobs (0=auto, 1=sequential)")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("debug")
                .short('D')
                .long("debug")
                .help("Enable debug output (shows settings and job stages)")
                .action(ArgAction::SetTrue),
        )
}

/// Parse CLI arguments from command line
///
/// On `--help`, `--version` or a malformed command line clap prints the
/// message and exits (0 for help/version, 2 for errors).
#[must_use]
pub fn parse_args() -> CliArgs {
    args_from_matches(&build_cli().get_matches())
}

/// Parse CLI arguments from an iterator (for testing)
#[must_use]
pub fn parse_args_from<I, T>(args: I) -> CliArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    args_from_matches(&build_cli().get_matches_from(args))
}

/// Parse CLI arguments from an iterator without exiting on errors
pub fn try_parse_args_from<I, T>(args: I) -> Result<CliArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Ok(args_from_matches(&build_cli().try_get_matches_from(args)?))
}

/// Convert clap `ArgMatches` to `CliArgs`
fn args_from_matches(matches: &clap::ArgMatches) -> CliArgs {
    let strings = |id: &str| -> Vec<String> {
        matches
            .get_many::<String>(id)
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default()
    };

    CliArgs {
        inputs: matches
            .get_many::<PathBuf>("inputs")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        overwrite: matches.get_flag("write"),
        quiet: matches.get_flag("quiet"),
        verbose: matches.get_flag("verbose"),
        remove_comments: matches.get_flag("remove-comments"),
        remove_reports: matches.get_flag("remove-reports"),
        check_alias: matches.get_flag("check-alias"),
        key_word_case: matches.get_one::<CaseMode>("key-word-case").copied(),
        type_case: matches.get_one::<CaseMode>("type-case").copied(),
        indentation: matches.get_one::<String>("indentation").cloned(),
        end_of_line: matches.get_one::<String>("end-of-line").cloned(),
        config: matches.get_one::<PathBuf>("config").cloned(),
        recursive: matches.get_flag("recursive"),
        exclude: strings("exclude"),
        jobs: matches.get_one::<usize>("jobs").copied(),
        debug: matches.get_flag("debug"),
    }
}

impl CliArgs {
    /// Resolve arguments into the records a batch runs from
    ///
    /// Config files are discovered from the current directory.
    pub fn resolve(&self) -> Result<(CommandOptions, BeautifierSettings), UsageError> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        self.resolve_in(&cwd)
    }

    /// Like [`CliArgs::resolve`], discovering config files from `start_dir`
    pub fn resolve_in(
        &self,
        start_dir: &Path,
    ) -> Result<(CommandOptions, BeautifierSettings), UsageError> {
        let options = self.command_options()?;
        let settings = self.settings(start_dir)?;
        Ok((options, settings))
    }

    /// Batch options with directory arguments expanded
    pub fn command_options(&self) -> Result<CommandOptions, UsageError> {
        if self.inputs.is_empty() {
            return Err(UsageError::NoInputFiles);
        }

        let inputs = collect_files(&self.inputs, self.recursive, &self.exclude);
        if inputs.is_empty() {
            return Err(UsageError::NoInputFiles);
        }

        Ok(CommandOptions {
            inputs,
            overwrite: self.overwrite,
            quiet: self.quiet,
            verbose: self.verbose,
            debug: self.debug,
            jobs: self.jobs,
        })
    }

    /// Beautifier settings: defaults, then config file(s), then flags
    pub fn settings(&self, start_dir: &Path) -> Result<BeautifierSettings, UsageError> {
        let mut settings = match &self.config {
            Some(path) => {
                BeautifierSettings::from_toml_file(path).map_err(|e| UsageError::Config {
                    path: path.clone(),
                    message: format!("{e:#}"),
                })?
            }
            None => BeautifierSettings::from_discovered_files(start_dir),
        };

        // Flags can only switch these on; a config file may already have
        settings.remove_comments |= self.remove_comments;
        settings.remove_reports |= self.remove_reports;
        settings.check_alias |= self.check_alias;

        if let Some(case) = self.key_word_case {
            settings.key_word_case = case;
        }
        if let Some(case) = self.type_case {
            settings.type_case = case;
        }
        if let Some(indentation) = &self.indentation {
            settings.indentation = parse_indentation(indentation);
        }
        if let Some(end_of_line) = &self.end_of_line {
            settings.end_of_line = parse_end_of_line(end_of_line);
        }

        match settings.validate() {
            Some(message) => Err(UsageError::InvalidSettings(message)),
            None => Ok(settings),
        }
    }
}
