//! Concurrent fan-out of file jobs and exit-status aggregation

use std::path::PathBuf;

use anyhow::Context;

use super::job::{self, JobContext, JobOutcome};
use crate::config::{BeautifierSettings, CommandOptions};
use crate::format::Beautifier;
use crate::report::Reporter;
use crate::Result;

/// Every job succeeded (or help/version was printed)
pub const EXIT_SUCCESS: u8 = 0;
/// At least one job failed, or the batch could not be started
pub const EXIT_FAILURE: u8 = 1;
/// Invalid or insufficient arguments; no job was run
pub const EXIT_USAGE: u8 = 2;

/// Outcome of one input path
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: JobOutcome,
}

/// Outcomes of every job of a batch, in input order
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub reports: Vec<FileReport>,
}

impl BatchSummary {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.reports.iter().filter(|r| r.outcome.is_success()).count()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.reports.len() - self.succeeded()
    }

    /// Process exit status, decided only once every job has settled
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        if self.failed() == 0 {
            EXIT_SUCCESS
        } else {
            EXIT_FAILURE
        }
    }
}

/// Runs one [`job`] per input path on a rayon pool
pub struct BatchRunner<'a> {
    ctx: JobContext<'a>,
}

impl<'a> BatchRunner<'a> {
    #[must_use]
    pub fn new(
        beautifier: &'a dyn Beautifier,
        settings: &'a BeautifierSettings,
        options: &'a CommandOptions,
        reporter: &'a Reporter,
    ) -> Self {
        BatchRunner {
            ctx: JobContext {
                beautifier,
                settings,
                options,
                reporter,
            },
        }
    }

    /// Format every input and wait for all of them
    ///
    /// Jobs start in input order and run concurrently. A failing job never
    /// stops the others; its error is part of the returned summary. The only
    /// error returned here is failing to create the worker pool.
    pub fn run(&self) -> Result<BatchSummary> {
        let options = self.ctx.options;
        let inputs = &options.inputs;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.jobs.unwrap_or(0))
            .thread_name(|i| format!("vhdlformat-{i}"))
            .build()
            .context("failed to start worker threads")?;

        tracing::debug!(
            files = inputs.len(),
            threads = pool.current_num_threads(),
            "starting batch"
        );

        let mut slots: Vec<Option<JobOutcome>> = inputs.iter().map(|_| None).collect();
        let ctx = &self.ctx;
        pool.install(|| {
            rayon::scope_fifo(|scope| {
                for (slot, path) in slots.iter_mut().zip(inputs) {
                    scope.spawn_fifo(move |_| {
                        *slot = Some(job::run(path, ctx));
                    });
                }
            });
        });

        let reports: Vec<FileReport> = slots
            .into_iter()
            .zip(inputs)
            .map(|(slot, path)| FileReport {
                path: path.clone(),
                outcome: slot.expect("scope_fifo joins every spawned job"),
            })
            .collect();

        // Echo in input order so output of different files never interleaves
        for report in &reports {
            if let JobOutcome::Printed(text) = &report.outcome {
                self.ctx.reporter.formatted_text(text);
            }
        }

        let summary = BatchSummary { reports };
        if inputs.len() > 1 {
            let (success, errors) = (summary.succeeded(), summary.failed());
            if errors == 0 {
                self.ctx
                    .reporter
                    .info(&format!("formatted {success} files successfully"));
            } else {
                self.ctx
                    .reporter
                    .info(&format!("formatted {success} files, {errors} errors"));
            }
        }
        Ok(summary)
    }
}
