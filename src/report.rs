//! User-facing console messages.
//!
//! Every line follows the `-- [LEVEL]: message` protocol. Formatted text never
//! carries a prefix. Which stream informational lines go to depends on the
//! output mode: when files are overwritten stdout is free, so they go there;
//! when formatted text is printed they go to stderr to keep stdout clean.
//! Errors always go to stderr.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use crate::config::CommandOptions;
use crate::error::JobError;

type Sink = Mutex<Box<dyn Write + Send>>;

/// Thread-safe console reporter shared by every job of a batch
pub struct Reporter {
    out: Sink,
    err: Sink,
    /// Informational lines go to stdout instead of stderr
    info_to_out: bool,
    quiet: bool,
    verbose: bool,
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("info_to_out", &self.info_to_out)
            .field("quiet", &self.quiet)
            .field("verbose", &self.verbose)
            .finish_non_exhaustive()
    }
}

impl Reporter {
    /// Reporter writing to the process stdout and stderr
    #[must_use]
    pub fn stdio(options: &CommandOptions) -> Self {
        Self::with_writers(io::stdout(), io::stderr(), options)
    }

    /// Reporter writing to arbitrary sinks (used by tests)
    pub fn with_writers<O, E>(out: O, err: E, options: &CommandOptions) -> Self
    where
        O: Write + Send + 'static,
        E: Write + Send + 'static,
    {
        Reporter {
            out: Mutex::new(Box::new(out)),
            err: Mutex::new(Box::new(err)),
            info_to_out: options.overwrite,
            quiet: options.quiet,
            verbose: options.verbose,
        }
    }

    fn write_line(sink: &Sink, line: &str) {
        // A poisoned lock only means another job panicked mid-write
        let mut guard = sink.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        // Console write failures (closed pipe) must not fail the job
        let _ = writeln!(guard, "{line}");
        let _ = guard.flush();
    }

    /// Informational line, suppressed in quiet mode
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        let line = format!("-- [INFO]: {message}");
        if self.info_to_out {
            Self::write_line(&self.out, &line);
        } else {
            Self::write_line(&self.err, &line);
        }
    }

    /// Announce that a job starts reading its file
    pub fn reading_file(&self, path: &Path) {
        self.info(&format!("reading file \"{}\"", path.display()));
    }

    /// Announce that a file was read and formatted to stdout
    pub fn read_file(&self, path: &Path) {
        self.info(&format!("read file \"{}\"", path.display()));
    }

    /// Announce that a file was overwritten
    pub fn saved_file(&self, path: &Path) {
        self.info(&format!("saved file \"{}\"", path.display()));
    }

    /// Echo formatted text to stdout, unless quiet
    pub fn formatted_text(&self, text: &str) {
        if self.quiet {
            return;
        }
        let mut guard = self.out.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let _ = guard.write_all(text.as_bytes());
        if !text.ends_with('\n') {
            let _ = guard.write_all(b"\n");
        }
        let _ = guard.flush();
    }

    /// Report a failed job; never suppressed
    pub fn failure(&self, error: &JobError) {
        let mut line = format!("-- [ERROR]: {error}");
        if let Some(cause) = error.cause() {
            line.push_str(": ");
            line.push_str(&cause);
        }
        Self::write_line(&self.err, &line);
        if self.verbose {
            Self::write_line(&self.err, &format!("-- [DEBUG]: {error:#?}"));
        }
    }

    /// Error not tied to one file
    pub fn error(&self, message: &str) {
        Self::write_line(&self.err, &format!("-- [ERROR]: {message}"));
    }

    /// Usage line printed when arguments are insufficient
    pub fn usage(&self) {
        Self::write_line(
            &self.err,
            "-- USAGE: vhdlformat [--write] [--quiet] [--verbose] <filename 1> [filename 2] ... [filename N]",
        );
    }
}
