//! Batch processing of input files.
//!
//! A batch goes through three steps:
//! - [`collect`]: expand the command-line paths into the list of files
//! - [`job`]: read, beautify and write (or print) exactly one file
//! - [`batch`]: run one job per file on a thread pool and aggregate the
//!   outcomes into an exit status
//!
//! A failing file never affects the others; every job ends in a
//! [`JobOutcome`] and the exit status is computed once all of them settled.

pub mod batch;
pub mod collect;
pub mod job;

pub use batch::{BatchRunner, BatchSummary, FileReport, EXIT_FAILURE, EXIT_SUCCESS, EXIT_USAGE};
pub use collect::{collect_files, is_vhdl_file};
pub use job::{JobContext, JobOutcome, MAX_FILE_SIZE};
