//! Formatting of exactly one file
//!
//! A job moves through `Reading → Transforming → Writing|Printing` and ends
//! in a [`JobOutcome`]. Every failure is turned into a [`JobError`] value at
//! the job boundary, including a panicking beautifier, so sibling jobs are
//! never affected.

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use crate::config::{BeautifierSettings, CommandOptions};
use crate::error::{FormatError, JobError, ReadFailure};
use crate::format::{encode_line_endings, Beautifier};
use crate::report::Reporter;

/// Files larger than this are rejected to prevent memory exhaustion
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Everything a job borrows from the batch; shared read-only by all jobs
#[derive(Clone, Copy)]
pub struct JobContext<'a> {
    pub beautifier: &'a dyn Beautifier,
    pub settings: &'a BeautifierSettings,
    pub options: &'a CommandOptions,
    pub reporter: &'a Reporter,
}

/// Terminal state of one job
#[derive(Debug)]
pub enum JobOutcome {
    /// Formatted text replaced the file at this path
    Written(PathBuf),
    /// Formatted text to be echoed on stdout
    Printed(String),
    Failed(JobError),
}

impl JobOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self, JobOutcome::Failed(_))
    }

    #[must_use]
    pub fn error(&self) -> Option<&JobError> {
        match self {
            JobOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}

/// Run one file through read, transform and write/print
///
/// Failures are reported through the context's reporter and returned as
/// [`JobOutcome::Failed`]; this function never panics on bad input.
pub fn run(path: &Path, ctx: &JobContext<'_>) -> JobOutcome {
    match execute(path, ctx) {
        Ok(outcome) => outcome,
        Err(error) => {
            tracing::debug!(path = %path.display(), stage = %error.stage(), "job failed");
            ctx.reporter.failure(&error);
            JobOutcome::Failed(error)
        }
    }
}

fn execute(path: &Path, ctx: &JobContext<'_>) -> Result<JobOutcome, JobError> {
    ctx.reporter.reading_file(path);
    let source = read_source(path)?;

    tracing::debug!(path = %path.display(), bytes = source.len(), "transforming");
    let formatted = transform(path, &source, ctx)?;

    if ctx.options.overwrite {
        tracing::debug!(path = %path.display(), "writing");
        // One whole-buffer write: no partial output from this process
        fs::write(path, formatted.as_bytes()).map_err(|source| JobError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        ctx.reporter.saved_file(path);
        Ok(JobOutcome::Written(path.to_path_buf()))
    } else {
        ctx.reporter.read_file(path);
        Ok(JobOutcome::Printed(formatted))
    }
}

fn read_source(path: &Path) -> Result<String, JobError> {
    let read_error = |source: ReadFailure| JobError::Read {
        path: path.to_path_buf(),
        source,
    };

    if !path.exists() {
        return Err(JobError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    tracing::debug!(path = %path.display(), "reading");
    let size = fs::metadata(path).map_err(|e| read_error(e.into()))?.len();
    if size > MAX_FILE_SIZE {
        return Err(read_error(ReadFailure::TooLarge {
            size,
            limit: MAX_FILE_SIZE,
        }));
    }

    let bytes = fs::read(path).map_err(|e| read_error(e.into()))?;
    String::from_utf8(bytes).map_err(|e| read_error(e.into()))
}

fn transform(path: &Path, source: &str, ctx: &JobContext<'_>) -> Result<String, JobError> {
    let format_error = |source: FormatError| JobError::Format {
        path: path.to_path_buf(),
        source,
    };

    // The beautifier is shared and stateless, so observing it after a panic is sound
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        ctx.beautifier.beautify(source, ctx.settings)
    }))
    .map_err(|payload| format_error(FormatError::new(panic_message(payload.as_ref()))))?;

    let formatted = result.map_err(format_error)?;
    Ok(encode_line_endings(&formatted, &ctx.settings.end_of_line))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("beautifier panicked: {detail}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JobStage;
    use crate::report::test_support::SharedBuffer;

    fn stub(input: &str, _: &BeautifierSettings) -> Result<String, FormatError> {
        if input.contains("BROKEN") {
            return Err(FormatError::new("sentinel rejected"));
        }
        Ok(input.to_uppercase())
    }

    struct Harness {
        settings: BeautifierSettings,
        options: CommandOptions,
        reporter: Reporter,
        err: SharedBuffer,
    }

    impl Harness {
        fn new(options: CommandOptions) -> Self {
            let err = SharedBuffer::default();
            let reporter = Reporter::with_writers(SharedBuffer::default(), err.clone(), &options);
            Harness {
                settings: BeautifierSettings::default(),
                options,
                reporter,
                err,
            }
        }

        fn run(&self, path: &Path, beautifier: &dyn Beautifier) -> JobOutcome {
            let ctx = JobContext {
                beautifier,
                settings: &self.settings,
                options: &self.options,
                reporter: &self.reporter,
            };
            run(path, &ctx)
        }
    }

    #[test]
    fn test_print_mode_returns_text_and_leaves_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.vhd");
        fs::write(&path, "entity a is\nend;\n").unwrap();

        let harness = Harness::new(CommandOptions::default());
        let outcome = harness.run(&path, &stub);

        match outcome {
            JobOutcome::Printed(text) => assert_eq!(text, "ENTITY A IS\r\nEND;\r\n"),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), "entity a is\nend;\n");
    }

    #[test]
    fn test_read_start_is_reported_before_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.vhd");
        fs::write(&path, "x\n").unwrap();

        let harness = Harness::new(CommandOptions::default());
        assert!(harness.run(&path, &stub).is_success());

        let shown = path.display();
        assert_eq!(
            harness.err.contents(),
            format!("-- [INFO]: reading file \"{shown}\"\n-- [INFO]: read file \"{shown}\"\n")
        );
    }

    #[test]
    fn test_overwrite_mode_rewrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.vhd");
        fs::write(&path, "x\n").unwrap();

        let harness = Harness::new(CommandOptions {
            overwrite: true,
            ..Default::default()
        });
        let outcome = harness.run(&path, &stub);

        assert!(matches!(outcome, JobOutcome::Written(ref p) if p == &path));
        assert_eq!(fs::read_to_string(&path).unwrap(), "X\r\n");
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let harness = Harness::new(CommandOptions::default());
        let outcome = harness.run(&dir.path().join("missing.vhd"), &stub);

        let error = outcome.error().unwrap();
        assert!(matches!(error, JobError::FileNotFound { .. }));
        assert!(harness.err.contents().contains("could not find file"));
    }

    #[test]
    fn test_invalid_utf8_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bin.vhd");
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let harness = Harness::new(CommandOptions::default());
        let outcome = harness.run(&path, &stub);
        let error = outcome.error().unwrap();
        assert_eq!(error.stage(), JobStage::Reading);
        assert!(matches!(
            error,
            JobError::Read {
                source: ReadFailure::Utf8(_),
                ..
            }
        ));
    }

    #[test]
    fn test_beautifier_error_keeps_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.vhd");
        fs::write(&path, "BROKEN").unwrap();

        let harness = Harness::new(CommandOptions {
            overwrite: true,
            ..Default::default()
        });
        let outcome = harness.run(&path, &stub);

        let error = outcome.error().unwrap();
        assert_eq!(error.stage(), JobStage::Transforming);
        assert_eq!(error.cause().as_deref(), Some("sentinel rejected"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "BROKEN");
    }

    #[test]
    fn test_panicking_beautifier_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.vhd");
        fs::write(&path, "x").unwrap();

        let panicking = |_: &str, _: &BeautifierSettings| -> Result<String, FormatError> {
            panic!("kaboom")
        };
        let harness = Harness::new(CommandOptions::default());
        let outcome = harness.run(&path, &panicking);

        let error = outcome.error().unwrap();
        assert!(matches!(error, JobError::Format { .. }));
        assert!(error.cause().unwrap().contains("kaboom"));
    }

    #[test]
    fn test_directory_path_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let harness = Harness::new(CommandOptions::default());
        let outcome = harness.run(dir.path(), &stub);
        assert!(matches!(outcome.error(), Some(JobError::Read { .. })));
    }
}
