//! Error types and result aliases for vhdlformat.
//!
//! This module defines the error handling infrastructure:
//! - [`Result<T>`]: Type alias for `anyhow::Result<T>` used at the binary boundary
//! - [`UsageError`]: Invalid or insufficient command-line input, fatal before any job runs
//! - [`JobError`]: A single file's failure, isolated to that file's job
//! - [`FormatError`]: Rejection reported by a beautifier

use std::path::PathBuf;

use anyhow::Result as AnyhowResult;
use thiserror::Error;

pub type Result<T> = AnyhowResult<T>;

/// Errors that abort the whole invocation before the batch starts
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("must specify at least one input filename")]
    NoInputFiles,

    #[error("could not load config file \"{}\": {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Failure reported by a beautifier for one input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct FormatError {
    pub message: String,
    /// 1-based input line the failure was detected on, when known
    pub line: Option<usize>,
}

impl FormatError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        FormatError {
            message: message.into(),
            line: None,
        }
    }

    #[must_use]
    pub fn at_line(message: impl Into<String>, line: usize) -> Self {
        FormatError {
            message: message.into(),
            line: Some(line),
        }
    }
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Why reading an input file failed
#[derive(Debug, Error)]
pub enum ReadFailure {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("file is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("file is {size} bytes, limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
}

/// Stage a file job was in when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    Reading,
    Transforming,
    Writing,
}

impl std::fmt::Display for JobStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            JobStage::Reading => "read",
            JobStage::Transforming => "format",
            JobStage::Writing => "write",
        })
    }
}

/// Per-file failure, caught at the job boundary
#[derive(Debug, Error)]
pub enum JobError {
    #[error("could not find file \"{}\"", path.display())]
    FileNotFound { path: PathBuf },

    #[error("could not read file \"{}\"", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: ReadFailure,
    },

    #[error("could not beautify \"{}\"", path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    #[error("could not save \"{}\"", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl JobError {
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        match self {
            JobError::FileNotFound { path }
            | JobError::Read { path, .. }
            | JobError::Format { path, .. }
            | JobError::Write { path, .. } => path,
        }
    }

    #[must_use]
    pub fn stage(&self) -> JobStage {
        match self {
            JobError::FileNotFound { .. } | JobError::Read { .. } => JobStage::Reading,
            JobError::Format { .. } => JobStage::Transforming,
            JobError::Write { .. } => JobStage::Writing,
        }
    }

    /// Short cause line: the innermost source message, if any
    #[must_use]
    pub fn cause(&self) -> Option<String> {
        match self {
            JobError::FileNotFound { .. } => None,
            JobError::Read { source, .. } => Some(source.to_string()),
            JobError::Format { source, .. } => Some(source.to_string()),
            JobError::Write { source, .. } => Some(source.to_string()),
        }
    }
}
