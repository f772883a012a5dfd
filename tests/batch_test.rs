//! Batch behavior tests
//!
//! These tests drive the batch runner end to end on scratch directories and
//! check output routing, on-disk results and failure isolation.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod common;

use std::fs;
use std::path::PathBuf;

use common::{capture, sentinel_stub, write_files};
use vhdlformat::format::{beautify, encode_line_endings};
use vhdlformat::process::{EXIT_FAILURE, EXIT_SUCCESS};
use vhdlformat::{
    BatchRunner, BeautifierSettings, CliArgs, CommandOptions, FormatError, JobError, JobOutcome,
    UsageError, VhdlBeautifier,
};

const SOURCES: &[(&str, &str)] = &[
    ("a.vhd", "entity a is\nend entity;\n"),
    (
        "b.vhd",
        "architecture rtl of b is\nbegin\nq <= d;\nend architecture;\n",
    ),
    ("c.vhdl", "package c is\nconstant w : integer := 8;\nend package;\n"),
];

fn expected_output(source: &str, settings: &BeautifierSettings) -> String {
    encode_line_endings(&beautify(source, settings).unwrap(), &settings.end_of_line)
}

#[test]
fn test_print_mode_echoes_in_order_and_leaves_files_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_files(dir.path(), SOURCES);

    let options = CommandOptions {
        inputs: paths.clone(),
        ..Default::default()
    };
    let settings = BeautifierSettings::default();
    let (reporter, out, err) = capture(&options);

    let summary = BatchRunner::new(&VhdlBeautifier, &settings, &options, &reporter)
        .run()
        .unwrap();

    assert_eq!(summary.exit_code(), EXIT_SUCCESS);
    let expected: String = SOURCES
        .iter()
        .map(|(_, src)| expected_output(src, &settings))
        .collect();
    assert_eq!(out.contents(), expected);

    for (path, (_, src)) in paths.iter().zip(SOURCES) {
        assert_eq!(fs::read_to_string(path).unwrap(), *src);
    }

    let log = err.contents();
    for path in &paths {
        assert!(log.contains(&format!("-- [INFO]: read file \"{}\"", path.display())));
    }
}

#[test]
fn test_write_mode_rewrites_files_with_configured_line_endings() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_files(dir.path(), SOURCES);

    let options = CommandOptions {
        inputs: paths.clone(),
        overwrite: true,
        ..Default::default()
    };
    let settings = BeautifierSettings::default();
    let (reporter, out, err) = capture(&options);

    let summary = BatchRunner::new(&VhdlBeautifier, &settings, &options, &reporter)
        .run()
        .unwrap();
    assert_eq!(summary.exit_code(), EXIT_SUCCESS);

    for (path, (_, src)) in paths.iter().zip(SOURCES) {
        let on_disk = fs::read_to_string(path).unwrap();
        assert_eq!(on_disk, expected_output(src, &settings));
        assert!(on_disk.contains("\r\n"));
        assert!(!on_disk.replace("\r\n", "").contains('\n'));
    }

    // Overwrite mode keeps stdout for informational lines only
    let stdout = out.contents();
    assert!(stdout.lines().all(|l| l.starts_with("-- [INFO]: ")));
    assert!(stdout.contains("saved file"));
    assert_eq!(err.contents(), "");
}

#[test]
fn test_write_mode_with_lf_settings() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_files(dir.path(), &[("crlf.vhd", "entity e is\r\nend;\r\n")]);

    let options = CommandOptions {
        inputs: paths.clone(),
        overwrite: true,
        quiet: true,
        ..Default::default()
    };
    let settings = BeautifierSettings {
        end_of_line: "\n".to_string(),
        ..Default::default()
    };
    let (reporter, out, _err) = capture(&options);

    BatchRunner::new(&VhdlBeautifier, &settings, &options, &reporter)
        .run()
        .unwrap();

    assert_eq!(fs::read_to_string(&paths[0]).unwrap(), "ENTITY e IS\nEND;\n");
    assert_eq!(out.contents(), "");
}

#[test]
fn test_one_missing_file_of_many() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = write_files(dir.path(), SOURCES);
    let missing = dir.path().join("missing.vhd");
    paths.insert(1, missing.clone());

    let options = CommandOptions {
        inputs: paths.clone(),
        ..Default::default()
    };
    let settings = BeautifierSettings::default();
    let (reporter, out, err) = capture(&options);

    let summary = BatchRunner::new(&VhdlBeautifier, &settings, &options, &reporter)
        .run()
        .unwrap();

    assert_eq!(summary.succeeded(), SOURCES.len());
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.exit_code(), EXIT_FAILURE);

    let failures: Vec<&JobError> = summary
        .reports
        .iter()
        .filter_map(|r| r.outcome.error())
        .collect();
    assert!(matches!(
        failures.as_slice(),
        [JobError::FileNotFound { path }] if path == &missing
    ));

    let expected: String = SOURCES
        .iter()
        .map(|(_, src)| expected_output(src, &settings))
        .collect();
    assert_eq!(out.contents(), expected);
    assert!(err.contents().contains(&format!(
        "-- [ERROR]: could not find file \"{}\"",
        missing.display()
    )));
}

#[test]
fn test_sentinel_failure_does_not_affect_siblings() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_files(
        dir.path(),
        &[
            ("one.vhd", "one\n"),
            ("bad.vhd", "BROKEN\n"),
            ("two.vhd", "two\n"),
        ],
    );

    let options = CommandOptions {
        inputs: paths.clone(),
        overwrite: true,
        jobs: Some(3),
        ..Default::default()
    };
    let settings = BeautifierSettings::default();
    let (reporter, _out, err) = capture(&options);

    let summary = BatchRunner::new(&sentinel_stub, &settings, &options, &reporter)
        .run()
        .unwrap();

    assert_eq!(summary.exit_code(), EXIT_FAILURE);
    assert_eq!(fs::read_to_string(&paths[0]).unwrap(), "ONE\r\n");
    assert_eq!(fs::read_to_string(&paths[1]).unwrap(), "BROKEN\n");
    assert_eq!(fs::read_to_string(&paths[2]).unwrap(), "TWO\r\n");

    assert!(matches!(summary.reports[1].outcome, JobOutcome::Failed(JobError::Format { .. })));
    assert!(err.contents().contains("sentinel rejected"));
}

#[test]
fn test_panicking_beautifier_is_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_files(dir.path(), &[("ok.vhd", "ok"), ("boom.vhd", "PANIC")]);

    let beautifier = |input: &str, _: &BeautifierSettings| -> Result<String, FormatError> {
        assert!(!input.contains("PANIC"), "refusing {input}");
        Ok(input.to_string())
    };
    let options = CommandOptions {
        inputs: paths,
        quiet: true,
        ..Default::default()
    };
    let settings = BeautifierSettings::default();
    let (reporter, out, _err) = capture(&options);

    let summary = BatchRunner::new(&beautifier, &settings, &options, &reporter)
        .run()
        .unwrap();

    assert!(summary.reports[0].outcome.is_success());
    let error = summary.reports[1].outcome.error().unwrap();
    assert!(matches!(error, JobError::Format { .. }));
    assert!(error.cause().unwrap().contains("refusing PANIC"));
    // Quiet suppresses the echo of the successful file too
    assert_eq!(out.contents(), "");
}

#[test]
fn test_sequential_run_matches_parallel_run() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_files(dir.path(), SOURCES);
    let settings = BeautifierSettings::default();

    let run_with = |jobs: usize| {
        let options = CommandOptions {
            inputs: paths.clone(),
            jobs: Some(jobs),
            ..Default::default()
        };
        let (reporter, out, _err) = capture(&options);
        BatchRunner::new(&VhdlBeautifier, &settings, &options, &reporter)
            .run()
            .unwrap();
        out.contents()
    };

    assert_eq!(run_with(1), run_with(0));
}

#[test]
fn test_zero_inputs_is_usage_error() {
    let args = CliArgs {
        overwrite: true,
        ..Default::default()
    };
    assert!(matches!(
        args.command_options(),
        Err(UsageError::NoInputFiles)
    ));
}

#[test]
fn test_directory_argument_expands_to_vhdl_files() {
    let dir = tempfile::tempdir().unwrap();
    write_files(dir.path(), SOURCES);
    fs::write(dir.path().join("notes.txt"), "not vhdl").unwrap();

    let args = CliArgs {
        inputs: vec![dir.path().to_path_buf()],
        ..Default::default()
    };
    let options = args.command_options().unwrap();
    let expected: Vec<PathBuf> = SOURCES.iter().map(|(name, _)| dir.path().join(name)).collect();
    assert_eq!(options.inputs, expected);
}
