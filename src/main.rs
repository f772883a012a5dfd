//! vhdlformat - Batch beautifier for VHDL source files

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::process::ExitCode;

use vhdlformat::process::{EXIT_FAILURE, EXIT_USAGE};
use vhdlformat::{
    logging, parse_args, BatchRunner, CommandOptions, Reporter, UsageError, VhdlBeautifier,
};

fn main() -> ExitCode {
    // Exits on its own for --help, --version and malformed arguments
    let args = parse_args();
    logging::init(args.debug);

    let (options, settings) = match args.resolve() {
        Ok(resolved) => resolved,
        Err(e) => {
            let reporter = Reporter::stdio(&CommandOptions::default());
            if matches!(e, UsageError::NoInputFiles) {
                reporter.usage();
            }
            reporter.error(&e.to_string());
            return ExitCode::from(EXIT_USAGE);
        }
    };

    if options.debug {
        match toml::to_string_pretty(&settings) {
            Ok(dump) => tracing::debug!("effective settings:\n{dump}"),
            Err(e) => tracing::warn!("could not serialize settings: {e}"),
        }
        tracing::debug!(files = options.inputs.len(), "resolved inputs");
    }

    let reporter = Reporter::stdio(&options);
    let beautifier = VhdlBeautifier;

    match BatchRunner::new(&beautifier, &settings, &options, &reporter).run() {
        Ok(summary) => ExitCode::from(summary.exit_code()),
        Err(e) => {
            reporter.error(&format!("{e:#}"));
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
