//! vhdlformat - Batch beautifier for VHDL source files
//!
//! Runs every input file through a [`Beautifier`] concurrently, printing or
//! overwriting the result, and isolates each file's failure from the others.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::struct_excessive_bools)]

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod process;
pub mod report;

// Re-export commonly used types
pub use cli::{build_cli, parse_args, parse_args_from, try_parse_args_from, CliArgs};
pub use config::{BeautifierSettings, CaseMode, CommandOptions};
pub use error::{FormatError, JobError, Result, UsageError};
pub use format::{Beautifier, VhdlBeautifier};
pub use process::{BatchRunner, BatchSummary, JobOutcome};
pub use report::Reporter;
